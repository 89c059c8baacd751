//! Decoding of JPEG interchange format streams.

use crate::dct;
use crate::entropy::extend;
use crate::error::{
    ChecksumMismatchSnafu, CorruptedMarkerSnafu, Error, InvalidCodeSnafu, Result,
    UnsupportedModeSnafu,
};
use crate::huffman::HuffmanTable;
use crate::lossless::Predictor;
use crate::marker;
use crate::quant::ZIGZAG;
use crate::{div_ceil, Image, ImageInfo};
use dcmio_encoding::cursor::{BitReader, SliceCursor};
use dcmio_encoding::Endianness;
use snafu::{ensure, OptionExt};
use tracing::{debug, warn};

/// Decode a complete JPEG stream.
pub fn decode(data: &[u8]) -> Result<Image> {
    Decoder::new(data).decode()
}

#[derive(Debug)]
struct Component {
    id: u8,
    h: usize,
    v: usize,
    tq: usize,
    /// reconstructed samples, padded to whole MCUs
    plane: Vec<u16>,
    plane_width: usize,
    point_transform: u8,
    scanned: bool,
}

#[derive(Debug)]
struct Frame {
    sof: u8,
    precision: u8,
    width: u16,
    height: u16,
    components: Vec<Component>,
    hmax: usize,
    vmax: usize,
    mcux: usize,
    mcuy: usize,
}

impl Frame {
    fn is_lossless(&self) -> bool {
        self.sof == marker::SOF3
    }

    /// Side of a data unit in samples.
    fn unit(&self) -> usize {
        if self.is_lossless() {
            1
        } else {
            8
        }
    }

    /// Allocate the sample planes, on the first scan of the frame.
    fn allocate_planes(&mut self) {
        let unit = self.unit();
        for c in &mut self.components {
            if c.plane.is_empty() {
                c.plane = vec![0; c.plane_width * self.mcuy * c.v * unit];
            }
        }
    }

    fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width,
            height: self.height,
            components: self.components.len() as u8,
            precision: self.precision,
        }
    }
}

/// One component taking part in a scan.
struct ScanComponent<'t> {
    index: usize,
    dc: &'t HuffmanTable,
    ac: Option<&'t HuffmanTable>,
    quant: Option<&'t [u16; 64]>,
    prediction: i32,
}

/// The body of a marker segment.
struct Segment<'a> {
    marker: u8,
    offset: usize,
    cursor: SliceCursor<'a>,
}

impl<'a> Segment<'a> {
    fn corrupted(&self, reason: impl Into<String>) -> Error {
        CorruptedMarkerSnafu {
            marker: self.marker,
            offset: self.offset + self.cursor.tell(),
            reason: reason.into(),
        }
        .build()
    }

    fn u8(&mut self) -> Result<u8> {
        self.cursor
            .read_u8()
            .map_err(|_| self.corrupted("segment is truncated"))
    }

    fn u16(&mut self) -> Result<u16> {
        self.cursor
            .read_u16(Endianness::Big)
            .map_err(|_| self.corrupted("segment is truncated"))
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.cursor
            .read_bytes(n)
            .map_err(|_| self.corrupted("segment is truncated"))
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

/// A JPEG decoder over an in-memory stream.
///
/// Tables and the frame header are kept across scans,
/// so that a frame may be coded in several non-interleaved scans.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    quant: [Option<[u16; 64]>; 4],
    dc_tables: [Option<HuffmanTable>; 4],
    ac_tables: [Option<HuffmanTable>; 4],
    restart_interval: usize,
    frame: Option<Frame>,
    scans: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Decoder {
            data,
            pos: 0,
            quant: [None; 4],
            dc_tables: Default::default(),
            ac_tables: Default::default(),
            restart_interval: 0,
            frame: None,
            scans: 0,
        }
    }

    /// Read the stream up to the frame header
    /// and describe the image it declares.
    pub fn read_info(mut self) -> Result<ImageInfo> {
        self.run(true)?;
        let frame = self.frame.as_ref().context(CorruptedMarkerSnafu {
            marker: marker::EOI,
            offset: self.pos,
            reason: "no frame header",
        })?;
        Ok(frame.info())
    }

    /// Decode the whole stream.
    pub fn decode(mut self) -> Result<Image> {
        self.run(false)?;
        let frame = self.frame.take().context(CorruptedMarkerSnafu {
            marker: marker::EOI,
            offset: self.pos,
            reason: "no frame header",
        })?;
        Ok(assemble(frame))
    }

    fn run(&mut self, stop_at_frame: bool) -> Result<()> {
        ensure!(
            self.data.get(0..2) == Some(&[0xFF, marker::SOI][..]),
            CorruptedMarkerSnafu {
                marker: marker::SOI,
                offset: 0usize,
                reason: "stream does not start with SOI",
            }
        );
        self.pos = 2;

        loop {
            let Some((m, offset)) = self.next_marker() else {
                ensure!(
                    self.scans > 0 || (stop_at_frame && self.frame.is_some()),
                    CorruptedMarkerSnafu {
                        marker: marker::EOI,
                        offset: self.pos,
                        reason: "stream ended before any scan",
                    }
                );
                warn!("JPEG stream has no EOI marker");
                return Ok(());
            };

            match m {
                marker::EOI => {
                    ensure!(
                        self.scans > 0,
                        CorruptedMarkerSnafu {
                            marker: m,
                            offset,
                            reason: "end of image before any scan",
                        }
                    );
                    return Ok(());
                }
                marker::SOF0 | marker::SOF1 | marker::SOF3 => {
                    let segment = self.segment(m, offset)?;
                    self.read_frame(m, segment)?;
                    if stop_at_frame {
                        return Ok(());
                    }
                }
                m if marker::is_sof(m) => {
                    return UnsupportedModeSnafu {
                        mode: marker::process_name(m),
                    }
                    .fail();
                }
                marker::DHT => {
                    let segment = self.segment(m, offset)?;
                    self.read_huffman_tables(segment)?;
                }
                marker::DQT => {
                    let segment = self.segment(m, offset)?;
                    self.read_quant_tables(segment)?;
                }
                marker::DRI => {
                    let mut segment = self.segment(m, offset)?;
                    self.restart_interval = usize::from(segment.u16()?);
                }
                marker::SOS => {
                    let segment = self.segment(m, offset)?;
                    self.read_scan(segment)?;
                }
                marker::DAC => {
                    return UnsupportedModeSnafu {
                        mode: "arithmetic coding",
                    }
                    .fail();
                }
                marker::DHP | marker::EXP => {
                    return UnsupportedModeSnafu {
                        mode: "hierarchical",
                    }
                    .fail();
                }
                marker::SOI => {
                    return CorruptedMarkerSnafu {
                        marker: m,
                        offset,
                        reason: "unexpected start of image",
                    }
                    .fail();
                }
                m if marker::is_rst(m) => {
                    warn!("Ignoring restart marker {:#04X} outside of a scan", m);
                }
                // TEM has no segment
                0x01 => {}
                // DNL after the first scan: the height is already known
                m if marker::is_skippable(m) || m == marker::DNL => {
                    self.segment(m, offset)?;
                }
                m => {
                    warn!("Skipping unknown marker {:#04X} at offset {}", m, offset);
                    self.segment(m, offset)?;
                }
            }
        }
    }

    /// Find the next marker, skipping fill bytes.
    /// Returns the marker code and the offset of its `FF` prefix.
    fn next_marker(&mut self) -> Option<(u8, usize)> {
        let start = self.pos;
        while self.pos + 1 < self.data.len() {
            if self.data[self.pos] == 0xFF {
                let m = self.data[self.pos + 1];
                if m != 0xFF && m != 0x00 {
                    if self.data[start] != 0xFF {
                        warn!(
                            "Skipped {} extraneous bytes before marker {:#04X}",
                            self.pos - start,
                            m
                        );
                    }
                    let offset = self.pos;
                    self.pos += 2;
                    return Some((m, offset));
                }
            }
            self.pos += 1;
        }
        self.pos = self.data.len();
        None
    }

    fn segment(&mut self, m: u8, offset: usize) -> Result<Segment<'a>> {
        let data = self.data;
        let len = match data.get(self.pos..self.pos + 2) {
            Some(b) => usize::from(u16::from_be_bytes([b[0], b[1]])),
            None => 0,
        };
        ensure!(
            len >= 2 && self.pos + len <= data.len(),
            CorruptedMarkerSnafu {
                marker: m,
                offset,
                reason: "invalid segment length",
            }
        );
        let body = &data[self.pos + 2..self.pos + len];
        let segment = Segment {
            marker: m,
            offset: self.pos + 2,
            cursor: SliceCursor::new(body),
        };
        self.pos += len;
        Ok(segment)
    }

    fn read_frame(&mut self, sof: u8, mut seg: Segment<'a>) -> Result<()> {
        if self.frame.is_some() {
            return Err(seg.corrupted("more than one frame"));
        }
        let precision = seg.u8()?;
        let height = seg.u16()?;
        let width = seg.u16()?;
        let count = seg.u8()?;

        let precision_ok = match sof {
            marker::SOF0 => precision == 8,
            marker::SOF1 => precision == 8 || precision == 12,
            _ => (2..=16).contains(&precision),
        };
        if !precision_ok {
            return Err(seg.corrupted(format!(
                "{}-bit samples are not valid for the {} process",
                precision,
                marker::process_name(sof)
            )));
        }
        ensure!(
            height > 0,
            UnsupportedModeSnafu {
                mode: "image height defined by DNL",
            }
        );
        if width == 0 || count == 0 {
            return Err(seg.corrupted("empty frame"));
        }
        ensure!(
            count <= 4,
            UnsupportedModeSnafu {
                mode: format!("{} components", count),
            }
        );

        let mut components: Vec<Component> = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let id = seg.u8()?;
            let hv = seg.u8()?;
            let tq = seg.u8()?;
            let (h, v) = (usize::from(hv >> 4), usize::from(hv & 0x0F));
            if !(1..=4).contains(&h) || !(1..=4).contains(&v) || tq > 3 {
                return Err(seg.corrupted("invalid component parameters"));
            }
            if components.iter().any(|c| c.id == id) {
                return Err(seg.corrupted(format!("component {} declared twice", id)));
            }
            components.push(Component {
                id,
                h,
                v,
                tq: usize::from(tq),
                plane: Vec::new(),
                plane_width: 0,
                point_transform: 0,
                scanned: false,
            });
        }

        if sof == marker::SOF3 {
            if count == 1 {
                components[0].h = 1;
                components[0].v = 1;
            } else {
                ensure!(
                    components.iter().all(|c| c.h == 1 && c.v == 1),
                    UnsupportedModeSnafu {
                        mode: "lossless with subsampled components",
                    }
                );
            }
        }

        let hmax = components.iter().map(|c| c.h).max().unwrap_or(1);
        let vmax = components.iter().map(|c| c.v).max().unwrap_or(1);
        let mut frame = Frame {
            sof,
            precision,
            width,
            height,
            components,
            hmax,
            vmax,
            mcux: 0,
            mcuy: 0,
        };
        let unit = frame.unit();
        frame.mcux = div_ceil(usize::from(width), unit * hmax);
        frame.mcuy = div_ceil(usize::from(height), unit * vmax);
        for c in &mut frame.components {
            c.plane_width = frame.mcux * c.h * unit;
        }

        debug!(
            "JPEG frame: {} ({}x{}, {} components, {} bits)",
            marker::process_name(sof),
            width,
            height,
            count,
            precision
        );
        self.frame = Some(frame);
        Ok(())
    }

    fn read_huffman_tables(&mut self, mut seg: Segment<'a>) -> Result<()> {
        while seg.remaining() > 0 {
            let tcth = seg.u8()?;
            let (tc, th) = (tcth >> 4, usize::from(tcth & 0x0F));
            if tc > 1 || th > 3 {
                return Err(seg.corrupted(format!("invalid Huffman table {:#04X}", tcth)));
            }
            let mut counts = [0u8; 16];
            counts.copy_from_slice(seg.bytes(16)?);
            let total = counts.iter().map(|&c| usize::from(c)).sum();
            let symbols = seg.bytes(total)?;
            let table = HuffmanTable::new(counts, symbols)?;
            if tc == 0 {
                self.dc_tables[th] = Some(table);
            } else {
                self.ac_tables[th] = Some(table);
            }
        }
        Ok(())
    }

    fn read_quant_tables(&mut self, mut seg: Segment<'a>) -> Result<()> {
        while seg.remaining() > 0 {
            let pqtq = seg.u8()?;
            let (pq, tq) = (pqtq >> 4, usize::from(pqtq & 0x0F));
            if pq > 1 || tq > 3 {
                return Err(seg.corrupted(format!(
                    "invalid quantization table {:#04X}",
                    pqtq
                )));
            }
            let mut table = [0u16; 64];
            for &n in ZIGZAG.iter() {
                table[n] = if pq == 0 {
                    u16::from(seg.u8()?)
                } else {
                    seg.u16()?
                };
            }
            if table.contains(&0) {
                return Err(seg.corrupted("zero quantization value"));
            }
            self.quant[tq] = Some(table);
        }
        Ok(())
    }

    fn read_scan(&mut self, mut seg: Segment<'a>) -> Result<()> {
        let Some(mut frame) = self.frame.take() else {
            return Err(seg.corrupted("scan before frame header"));
        };
        let result = self.read_scan_in(&mut frame, &mut seg);
        self.frame = Some(frame);
        result
    }

    fn read_scan_in(&mut self, frame: &mut Frame, seg: &mut Segment<'a>) -> Result<()> {
        frame.allocate_planes();
        let count = usize::from(seg.u8()?);
        if count == 0 || count > 4 {
            return Err(seg.corrupted(format!("{} components in scan", count)));
        }
        let lossless = frame.is_lossless();

        let mut scan: Vec<ScanComponent> = Vec::with_capacity(count);
        for _ in 0..count {
            let id = seg.u8()?;
            let tdta = seg.u8()?;
            let index = frame
                .components
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| seg.corrupted(format!("unknown component {}", id)))?;
            let (td, ta) = (usize::from(tdta >> 4), usize::from(tdta & 0x0F));
            let dc = self
                .dc_tables
                .get(td)
                .and_then(Option::as_ref)
                .ok_or_else(|| seg.corrupted(format!("undefined DC table {}", td)))?;
            let (ac, quant) = if lossless {
                (None, None)
            } else {
                let ac = self
                    .ac_tables
                    .get(ta)
                    .and_then(Option::as_ref)
                    .ok_or_else(|| seg.corrupted(format!("undefined AC table {}", ta)))?;
                let tq = frame.components[index].tq;
                let quant = self.quant[tq].as_ref().ok_or_else(|| {
                    seg.corrupted(format!("undefined quantization table {}", tq))
                })?;
                (Some(ac), Some(quant))
            };
            scan.push(ScanComponent {
                index,
                dc,
                ac,
                quant,
                prediction: 0,
            });
        }
        let ss = seg.u8()?;
        let se = seg.u8()?;
        let ahal = seg.u8()?;
        let (ah, al) = (ahal >> 4, ahal & 0x0F);

        if lossless {
            ensure!(
                ss != 0,
                UnsupportedModeSnafu {
                    mode: "lossless without prediction",
                }
            );
            if ss > 7 || ah != 0 || al >= frame.precision {
                return Err(seg.corrupted("invalid lossless scan parameters"));
            }
            if se != 0 {
                warn!("Ignoring end of spectral selection {} in lossless scan", se);
            }
        } else if ss != 0 || se != 63 || ahal != 0 {
            return Err(seg.corrupted("invalid spectral selection for sequential DCT"));
        }
        if count > 1 {
            let blocks: usize = scan
                .iter()
                .map(|sc| frame.components[sc.index].h * frame.components[sc.index].v)
                .sum();
            if blocks > 10 {
                return Err(seg.corrupted("too many data units per MCU"));
            }
        }

        // entropy-coded data follows the header
        let base = self.pos;
        let mut reader = BitReader::jpeg(&self.data[base..]);
        let layout = ScanLayout::new(frame, &scan);
        debug!(
            "JPEG scan of {} component(s), {}x{} MCUs, restart interval {}",
            count, layout.mcus_x, layout.mcus_y, self.restart_interval
        );
        if lossless {
            for sc in &scan {
                frame.components[sc.index].point_transform = al;
            }
            decode_lossless_scan(
                frame,
                &scan,
                &layout,
                ss,
                al,
                self.restart_interval,
                &mut reader,
                base,
            )?;
        } else {
            decode_dct_scan(
                frame,
                &mut scan,
                &layout,
                self.restart_interval,
                &mut reader,
                base,
            )?;
        }
        ensure!(
            !reader.overrun(),
            ChecksumMismatchSnafu {
                offset: base + reader.position(),
                reason: "entropy-coded data ended early",
            }
        );
        for sc in &scan {
            frame.components[sc.index].scanned = true;
        }

        self.pos = base + reader.position();
        self.scans += 1;
        Ok(())
    }
}

/// The MCU grid of a scan.
struct ScanLayout {
    mcus_x: usize,
    mcus_y: usize,
    interleaved: bool,
}

impl ScanLayout {
    fn new(frame: &Frame, scan: &[ScanComponent]) -> Self {
        if scan.len() == 1 {
            // a non-interleaved scan covers the component itself
            let c = &frame.components[scan[0].index];
            let unit = frame.unit();
            let width = div_ceil(usize::from(frame.width) * c.h, frame.hmax);
            let height = div_ceil(usize::from(frame.height) * c.v, frame.vmax);
            ScanLayout {
                mcus_x: div_ceil(width, unit),
                mcus_y: div_ceil(height, unit),
                interleaved: false,
            }
        } else {
            ScanLayout {
                mcus_x: frame.mcux,
                mcus_y: frame.mcuy,
                interleaved: true,
            }
        }
    }

    fn total(&self) -> usize {
        self.mcus_x * self.mcus_y
    }
}

/// Consume the restart marker expected after interval `count` (0-based).
fn expect_restart(reader: &mut BitReader, count: usize, base: usize) -> Result<()> {
    let expected = marker::RST0 + (count % 8) as u8;
    let offset = base + reader.position();
    ensure!(
        !reader.overrun(),
        ChecksumMismatchSnafu {
            offset,
            reason: "entropy-coded data ended before a restart marker",
        }
    );
    match reader.next_marker() {
        Some(m) if m == expected => Ok(()),
        Some(m) => ChecksumMismatchSnafu {
            offset,
            reason: format!("expected RST{}, found marker {:#04X}", count % 8, m),
        }
        .fail(),
        None => ChecksumMismatchSnafu {
            offset,
            reason: format!("expected RST{}", count % 8),
        }
        .fail(),
    }
}

fn decode_dct_scan(
    frame: &mut Frame,
    scan: &mut [ScanComponent],
    layout: &ScanLayout,
    restart_interval: usize,
    reader: &mut BitReader,
    base: usize,
) -> Result<()> {
    let precision = frame.precision;
    for mcu in 0..layout.total() {
        if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
            expect_restart(reader, mcu / restart_interval - 1, base)?;
            for sc in scan.iter_mut() {
                sc.prediction = 0;
            }
        }
        let (mx, my) = (mcu % layout.mcus_x, mcu / layout.mcus_x);
        for sc in scan.iter_mut() {
            let component = &mut frame.components[sc.index];
            let (bh, bv) = if layout.interleaved {
                (component.h, component.v)
            } else {
                (1, 1)
            };
            for by in 0..bv {
                for bx in 0..bh {
                    let samples = decode_block(reader, sc, precision, base)?;
                    let x0 = (mx * bh + bx) * 8;
                    let y0 = (my * bv + by) * 8;
                    for (y, row) in samples.chunks_exact(8).enumerate() {
                        let start = (y0 + y) * component.plane_width + x0;
                        component.plane[start..start + 8].copy_from_slice(row);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Decode one 8x8 block into samples.
fn decode_block(
    reader: &mut BitReader,
    sc: &mut ScanComponent,
    precision: u8,
    base: usize,
) -> Result<[u16; 64]> {
    let (Some(ac), Some(quant)) = (sc.ac, sc.quant) else {
        return InvalidCodeSnafu {
            offset: base + reader.position(),
        }
        .fail();
    };

    let mut coefficients = [0f32; 64];
    let t = sc.dc.decode(reader)?;
    ensure!(
        t <= 15,
        InvalidCodeSnafu {
            offset: base + reader.position()
        }
    );
    sc.prediction += extend(reader.read_bits(t), t);
    coefficients[0] = sc.prediction as f32 * f32::from(quant[0]);

    let mut k = 1;
    while k < 64 {
        let rs = ac.decode(reader)?;
        let (r, s) = (usize::from(rs >> 4), rs & 0x0F);
        if s == 0 {
            if r == 15 {
                k += 16;
                continue;
            }
            // end of block
            break;
        }
        k += r;
        ensure!(
            k < 64,
            InvalidCodeSnafu {
                offset: base + reader.position()
            }
        );
        let n = ZIGZAG[k];
        coefficients[n] = extend(reader.read_bits(s), s) as f32 * f32::from(quant[n]);
        k += 1;
    }

    let shift = (1u32 << (precision - 1)) as f32;
    let max = ((1u32 << precision) - 1) as f32;
    let mut samples = [0u16; 64];
    for (s, v) in samples.iter_mut().zip(dct::inverse(&coefficients)) {
        *s = (v + shift).round().clamp(0., max) as u16;
    }
    Ok(samples)
}

#[allow(clippy::too_many_arguments)]
fn decode_lossless_scan(
    frame: &mut Frame,
    scan: &[ScanComponent],
    layout: &ScanLayout,
    selection: u8,
    point_transform: u8,
    restart_interval: usize,
    reader: &mut BitReader,
    base: usize,
) -> Result<()> {
    let mut predictors: Vec<Predictor> = scan
        .iter()
        .map(|_| Predictor::new(selection, frame.precision, point_transform))
        .collect();

    for mcu in 0..layout.total() {
        let (x, y) = (mcu % layout.mcus_x, mcu / layout.mcus_x);
        if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
            expect_restart(reader, mcu / restart_interval - 1, base)?;
            for p in &mut predictors {
                p.restart(y);
            }
        }
        for (sc, predictor) in scan.iter().zip(predictors.iter_mut()) {
            let component = &mut frame.components[sc.index];
            let width = component.plane_width;
            let prediction = predictor.predict(&component.plane, width, x, y);
            let t = sc.dc.decode(reader)?;
            let diff = match t {
                0 => 0,
                16 => 32768,
                t if t < 16 => extend(reader.read_bits(t), t),
                _ => {
                    return InvalidCodeSnafu {
                        offset: base + reader.position(),
                    }
                    .fail()
                }
            };
            component.plane[y * width + x] = ((prediction + diff) & 0xFFFF) as u16;
        }
    }
    Ok(())
}

/// Gather the component planes into one interleaved image,
/// upsampling subsampled components by repetition.
fn assemble(frame: Frame) -> Image {
    let info = frame.info();
    let wide = info.bytes_per_sample() == 2;
    let max = u32::from(info.max_sample());
    for c in frame.components.iter().filter(|c| !c.scanned) {
        warn!("JPEG component {} has no scan", c.id);
    }

    let mut data = Vec::with_capacity(info.data_len());
    for y in 0..usize::from(info.height) {
        for x in 0..usize::from(info.width) {
            for c in &frame.components {
                let cx = x * c.h / frame.hmax;
                let cy = y * c.v / frame.vmax;
                let raw = u32::from(c.plane[cy * c.plane_width + cx]);
                let sample = (raw << c.point_transform).min(max) as u16;
                if wide {
                    data.extend_from_slice(&sample.to_le_bytes());
                } else {
                    data.push(sample as u8);
                }
            }
        }
    }
    Image { info, data }
}
