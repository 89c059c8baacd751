//! Encoding of images into JPEG interchange format streams.
//!
//! All components are coded at full resolution in a single interleaved scan.

use crate::dct;
use crate::entropy::{category, extra_bits};
use crate::error::{InvalidInputSnafu, Result, WriteStreamSnafu};
use crate::huffman::HuffmanTable;
use crate::lossless::{wrap_difference, Predictor};
use crate::marker;
use crate::quant::{self, ZIGZAG};
use crate::{div_ceil, read_sample, ImageInfo};
use dcmio_encoding::cursor::BitWriter;
use snafu::{ensure, ResultExt};
use std::io::Write;
use tracing::debug;

/// The JPEG coding process to encode with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Process {
    /// Baseline sequential DCT, 8-bit samples
    Baseline,
    /// Extended sequential DCT, 8 or 12-bit samples
    Extended,
    /// Lossless sequential, 2 to 16-bit samples
    Lossless,
}

impl Process {
    fn sof(self) -> u8 {
        match self {
            Process::Baseline => marker::SOF0,
            Process::Extended => marker::SOF1,
            Process::Lossless => marker::SOF3,
        }
    }
}

/// Options of the JPEG encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegEncodeOptions {
    /// quality factor of the DCT processes, from 1 to 100
    pub quality: u8,
    /// number of MCUs between restart markers, 0 for none
    pub restart_interval: u16,
    /// derive Huffman tables from the image instead of using the standard ones
    /// (always done for 12-bit and lossless images)
    pub optimize_huffman: bool,
    /// predictor selection value of the lossless process, from 1 to 7
    pub predictor: u8,
    /// point transform of the lossless process
    pub point_transform: u8,
}

impl Default for JpegEncodeOptions {
    fn default() -> Self {
        JpegEncodeOptions {
            quality: 90,
            restart_interval: 0,
            optimize_huffman: false,
            predictor: 1,
            point_transform: 0,
        }
    }
}

/// Encode interleaved samples laid out as described by `info`.
pub fn encode(
    info: &ImageInfo,
    data: &[u8],
    process: Process,
    options: &JpegEncodeOptions,
) -> Result<Vec<u8>> {
    Encoder::new(process)
        .with_options(options.clone())
        .encode(info, data)
}

/// A JPEG encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    process: Process,
    options: JpegEncodeOptions,
}

impl Encoder {
    pub fn new(process: Process) -> Self {
        Encoder {
            process,
            options: JpegEncodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: JpegEncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn process(&self) -> Process {
        self.process
    }

    pub fn options(&self) -> &JpegEncodeOptions {
        &self.options
    }

    /// Encode interleaved samples into a complete JPEG stream.
    pub fn encode(&self, info: &ImageInfo, data: &[u8]) -> Result<Vec<u8>> {
        self.validate(info, data)?;
        let planes = split_planes(info, data)?;
        debug!(
            "Encoding {}x{} image ({} components, {} bits) as {:?} JPEG",
            info.width, info.height, info.components, info.precision, self.process
        );

        let mut out = Vec::new();
        put_marker(&mut out, marker::SOI);
        match self.process {
            Process::Lossless => self.encode_lossless(info, &planes, &mut out)?,
            Process::Baseline | Process::Extended => self.encode_dct(info, &planes, &mut out)?,
        }
        put_marker(&mut out, marker::EOI);
        Ok(out)
    }

    fn validate(&self, info: &ImageInfo, data: &[u8]) -> Result<()> {
        let options = &self.options;
        ensure!(
            (1..=4).contains(&info.components),
            InvalidInputSnafu {
                reason: format!("{} components", info.components),
            }
        );
        ensure!(
            info.width > 0 && info.height > 0,
            InvalidInputSnafu {
                reason: "empty image",
            }
        );
        let precision_ok = match self.process {
            Process::Baseline => info.precision == 8,
            Process::Extended => info.precision == 8 || info.precision == 12,
            Process::Lossless => (2..=16).contains(&info.precision),
        };
        ensure!(
            precision_ok,
            InvalidInputSnafu {
                reason: format!(
                    "{}-bit samples cannot be coded with the {:?} process",
                    info.precision, self.process
                ),
            }
        );
        ensure!(
            data.len() == info.data_len(),
            InvalidInputSnafu {
                reason: format!("{} bytes given, {} expected", data.len(), info.data_len()),
            }
        );
        match self.process {
            Process::Lossless => {
                ensure!(
                    (1..=7).contains(&options.predictor),
                    InvalidInputSnafu {
                        reason: format!("predictor {}", options.predictor),
                    }
                );
                ensure!(
                    options.point_transform < info.precision,
                    InvalidInputSnafu {
                        reason: format!("point transform {}", options.point_transform),
                    }
                );
            }
            _ => {
                ensure!(
                    (1..=100).contains(&options.quality),
                    InvalidInputSnafu {
                        reason: format!("quality {}", options.quality),
                    }
                );
            }
        }
        Ok(())
    }

    fn encode_dct(&self, info: &ImageInfo, planes: &[Vec<u16>], out: &mut Vec<u8>) -> Result<()> {
        let components = planes.len();
        let max_q = if info.precision == 8 { 255 } else { 32767 };
        let mut quant_tables = vec![quant::scaled(
            &quant::STD_LUMINANCE,
            self.options.quality,
            max_q,
        )];
        if components > 1 {
            quant_tables.push(quant::scaled(
                &quant::STD_CHROMINANCE,
                self.options.quality,
                max_q,
            ));
        }
        for (id, table) in quant_tables.iter().enumerate() {
            put_quant_table(out, id as u8, table);
        }
        put_frame(out, self.process.sof(), info, |c| table_id(c) as u8);

        let (width, height) = (usize::from(info.width), usize::from(info.height));
        let blocks: Vec<Vec<[i32; 64]>> = planes
            .iter()
            .enumerate()
            .map(|(c, plane)| {
                quantize_plane(plane, width, height, info.precision, &quant_tables[table_id(c)])
            })
            .collect();
        let mcus = div_ceil(width, 8) * div_ceil(height, 8);
        let restart_interval = usize::from(self.options.restart_interval);

        let tables = if self.options.optimize_huffman || info.precision > 8 {
            let mut counter = FrequencyCounter::default();
            walk_dct(&blocks, mcus, restart_interval, &mut counter)?;
            counter.tables(table_count(components))?
        } else {
            let mut tables = [
                vec![HuffmanTable::std_dc_luminance()],
                vec![HuffmanTable::std_ac_luminance()],
            ];
            if components > 1 {
                tables[0].push(HuffmanTable::std_dc_chrominance());
                tables[1].push(HuffmanTable::std_ac_chrominance());
            }
            tables
        };
        put_huffman_tables(out, &tables);
        put_restart_interval(out, self.options.restart_interval);
        put_scan(out, components, 0, 63, 0);

        let mut emitter = HuffmanEmitter {
            writer: BitWriter::jpeg(&mut *out),
            tables: &tables,
        };
        walk_dct(&blocks, mcus, restart_interval, &mut emitter)?;
        emitter.writer.finish().context(WriteStreamSnafu)?;
        Ok(())
    }

    fn encode_lossless(
        &self,
        info: &ImageInfo,
        planes: &[Vec<u16>],
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let components = planes.len();
        let pt = self.options.point_transform;
        let shifted: Vec<Vec<u16>> = planes
            .iter()
            .map(|p| p.iter().map(|&s| s >> pt).collect())
            .collect();
        let scan = LosslessScan {
            planes: &shifted,
            width: usize::from(info.width),
            height: usize::from(info.height),
            selection: self.options.predictor,
            precision: info.precision,
            point_transform: pt,
            restart_interval: usize::from(self.options.restart_interval),
        };

        let mut counter = FrequencyCounter::default();
        scan.walk(&mut counter)?;
        let tables = counter.tables(table_count(components))?;

        put_frame(out, marker::SOF3, info, |_| 0);
        put_huffman_tables(out, &tables);
        put_restart_interval(out, self.options.restart_interval);
        put_scan(out, components, self.options.predictor, 0, pt);

        let mut emitter = HuffmanEmitter {
            writer: BitWriter::jpeg(&mut *out),
            tables: &tables,
        };
        scan.walk(&mut emitter)?;
        emitter.writer.finish().context(WriteStreamSnafu)?;
        Ok(())
    }
}

/// Huffman and quantization table used by a component:
/// the first one gets table 0, the others table 1.
fn table_id(component: usize) -> usize {
    usize::from(component > 0)
}

fn table_count(components: usize) -> usize {
    if components > 1 {
        2
    } else {
        1
    }
}

/// Separate interleaved samples into one plane per component,
/// checking that every sample fits the precision.
fn split_planes(info: &ImageInfo, data: &[u8]) -> Result<Vec<Vec<u16>>> {
    let components = usize::from(info.components);
    let pixels = usize::from(info.width) * usize::from(info.height);
    let wide = info.bytes_per_sample() == 2;
    let max = info.max_sample();
    let mut planes = vec![Vec::with_capacity(pixels); components];
    for i in 0..pixels * components {
        let sample = read_sample(data, i, wide);
        ensure!(
            sample <= max,
            InvalidInputSnafu {
                reason: format!(
                    "sample value {} does not fit in {} bits",
                    sample, info.precision
                ),
            }
        );
        planes[i % components].push(sample);
    }
    Ok(planes)
}

/// Level shift, transform and quantize every block of a plane.
/// Coefficients are kept in zig-zag order.
/// Partial blocks at the right and bottom edges repeat the last sample.
fn quantize_plane(
    plane: &[u16],
    width: usize,
    height: usize,
    precision: u8,
    quant: &[u16; 64],
) -> Vec<[i32; 64]> {
    let shift = (1u32 << (precision - 1)) as f32;
    // keep values within the categories allowed for the precision
    let ac_limit = (1i32 << (precision + 2)) - 1;
    let dc_limit = 1i32 << (precision + 2);
    let (blocks_x, blocks_y) = (div_ceil(width, 8), div_ceil(height, 8));

    let mut blocks = Vec::with_capacity(blocks_x * blocks_y);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let mut samples = [0f32; 64];
            for (i, s) in samples.iter_mut().enumerate() {
                let x = (bx * 8 + i % 8).min(width - 1);
                let y = (by * 8 + i / 8).min(height - 1);
                *s = f32::from(plane[y * width + x]) - shift;
            }
            let coefficients = dct::forward(&samples);
            let mut block = [0i32; 64];
            for (k, &n) in ZIGZAG.iter().enumerate() {
                let q = (coefficients[n] / f32::from(quant[n])).round() as i32;
                block[k] = if k == 0 {
                    q.clamp(-dc_limit, dc_limit - 1)
                } else {
                    q.clamp(-ac_limit, ac_limit)
                };
            }
            blocks.push(block);
        }
    }
    blocks
}

/// Receives the symbols of a scan, in coding order.
trait SymbolSink {
    /// A symbol of the DC (class 0) or AC (class 1) table `table`,
    /// followed by `count` extra bits.
    fn symbol(&mut self, class: usize, table: usize, symbol: u8, bits: u32, count: u8)
        -> Result<()>;

    /// The end of restart interval `index` (0-based).
    fn restart(&mut self, index: usize) -> Result<()>;
}

/// Counts symbol occurrences, to build optimal tables.
#[derive(Debug)]
struct FrequencyCounter {
    /// by class, table and symbol
    counts: [[[u64; 256]; 2]; 2],
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        FrequencyCounter {
            counts: [[[0; 256]; 2]; 2],
        }
    }
}

impl FrequencyCounter {
    /// Optimal tables of each class for the first `count` table ids.
    /// Classes with no symbols at all get no tables.
    fn tables(&self, count: usize) -> Result<[Vec<HuffmanTable>; 2]> {
        let mut tables: [Vec<HuffmanTable>; 2] = Default::default();
        for (class, per_class) in self.counts.iter().enumerate() {
            if per_class.iter().all(|t| t.iter().all(|&f| f == 0)) {
                continue;
            }
            for freq in per_class.iter().take(count) {
                tables[class].push(HuffmanTable::optimal(freq)?);
            }
        }
        Ok(tables)
    }
}

impl SymbolSink for FrequencyCounter {
    fn symbol(&mut self, class: usize, table: usize, symbol: u8, _: u32, _: u8) -> Result<()> {
        self.counts[class][table][usize::from(symbol)] += 1;
        Ok(())
    }

    fn restart(&mut self, _: usize) -> Result<()> {
        Ok(())
    }
}

/// Writes the Huffman codes of the symbols to entropy-coded data.
struct HuffmanEmitter<'t, W> {
    writer: BitWriter<W>,
    tables: &'t [Vec<HuffmanTable>; 2],
}

impl<W: Write> SymbolSink for HuffmanEmitter<'_, W> {
    fn symbol(
        &mut self,
        class: usize,
        table: usize,
        symbol: u8,
        bits: u32,
        count: u8,
    ) -> Result<()> {
        self.tables[class][table].encode(symbol, &mut self.writer)?;
        self.writer.write_bits(bits, count).context(WriteStreamSnafu)
    }

    fn restart(&mut self, index: usize) -> Result<()> {
        self.writer
            .write_marker(marker::RST0 + (index % 8) as u8)
            .context(WriteStreamSnafu)
    }
}

/// Feed the symbols of an interleaved sequential DCT scan
/// of full resolution components.
fn walk_dct<S: SymbolSink>(
    blocks: &[Vec<[i32; 64]>],
    mcus: usize,
    restart_interval: usize,
    sink: &mut S,
) -> Result<()> {
    let mut predictions = vec![0i32; blocks.len()];
    for mcu in 0..mcus {
        if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
            sink.restart(mcu / restart_interval - 1)?;
            predictions.fill(0);
        }
        for (c, component) in blocks.iter().enumerate() {
            let table = table_id(c);
            let block = &component[mcu];

            let diff = block[0] - predictions[c];
            predictions[c] = block[0];
            let t = category(diff);
            sink.symbol(0, table, t, extra_bits(diff, t), t)?;

            let mut run = 0u8;
            for &v in &block[1..] {
                if v == 0 {
                    run += 1;
                    continue;
                }
                while run > 15 {
                    // ZRL
                    sink.symbol(1, table, 0xF0, 0, 0)?;
                    run -= 16;
                }
                let s = category(v);
                sink.symbol(1, table, (run << 4) | s, extra_bits(v, s), s)?;
                run = 0;
            }
            if run > 0 {
                // EOB
                sink.symbol(1, table, 0x00, 0, 0)?;
            }
        }
    }
    Ok(())
}

/// An interleaved lossless scan over point-transformed planes.
struct LosslessScan<'p> {
    planes: &'p [Vec<u16>],
    width: usize,
    height: usize,
    selection: u8,
    precision: u8,
    point_transform: u8,
    restart_interval: usize,
}

impl LosslessScan<'_> {
    fn walk<S: SymbolSink>(&self, sink: &mut S) -> Result<()> {
        let mut predictors: Vec<Predictor> = self
            .planes
            .iter()
            .map(|_| Predictor::new(self.selection, self.precision, self.point_transform))
            .collect();
        let ri = self.restart_interval;

        for mcu in 0..self.width * self.height {
            let (x, y) = (mcu % self.width, mcu / self.width);
            if ri > 0 && mcu > 0 && mcu % ri == 0 {
                sink.restart(mcu / ri - 1)?;
                for p in &mut predictors {
                    p.restart(y);
                }
            }
            for (c, (plane, predictor)) in self.planes.iter().zip(&mut predictors).enumerate() {
                let prediction = predictor.predict(plane, self.width, x, y);
                let diff = wrap_difference(i32::from(plane[y * self.width + x]) - prediction);
                let t = category(diff);
                if t == 16 {
                    sink.symbol(0, table_id(c), 16, 0, 0)?;
                } else {
                    sink.symbol(0, table_id(c), t, extra_bits(diff, t), t)?;
                }
            }
        }
        Ok(())
    }
}

fn put_marker(out: &mut Vec<u8>, m: u8) {
    out.extend_from_slice(&[0xFF, m]);
}

fn put_segment(out: &mut Vec<u8>, m: u8, body: &[u8]) {
    put_marker(out, m);
    out.extend_from_slice(&((body.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(body);
}

fn put_quant_table(out: &mut Vec<u8>, id: u8, table: &[u16; 64]) {
    let wide = table.iter().any(|&q| q > 255);
    let mut body = vec![(u8::from(wide) << 4) | id];
    for &n in ZIGZAG.iter() {
        if wide {
            body.extend_from_slice(&table[n].to_be_bytes());
        } else {
            body.push(table[n] as u8);
        }
    }
    put_segment(out, marker::DQT, &body);
}

fn put_frame(out: &mut Vec<u8>, sof: u8, info: &ImageInfo, quant_table: impl Fn(usize) -> u8) {
    let mut body = vec![info.precision];
    body.extend_from_slice(&info.height.to_be_bytes());
    body.extend_from_slice(&info.width.to_be_bytes());
    body.push(info.components);
    for c in 0..usize::from(info.components) {
        body.extend_from_slice(&[c as u8 + 1, 0x11, quant_table(c)]);
    }
    put_segment(out, sof, &body);
}

fn put_huffman_tables(out: &mut Vec<u8>, tables: &[Vec<HuffmanTable>; 2]) {
    let mut body = Vec::new();
    for (class, per_class) in tables.iter().enumerate() {
        for (id, table) in per_class.iter().enumerate() {
            body.push(((class as u8) << 4) | id as u8);
            body.extend_from_slice(table.counts());
            body.extend_from_slice(table.symbols());
        }
    }
    put_segment(out, marker::DHT, &body);
}

fn put_restart_interval(out: &mut Vec<u8>, interval: u16) {
    if interval > 0 {
        put_segment(out, marker::DRI, &interval.to_be_bytes());
    }
}

fn put_scan(out: &mut Vec<u8>, components: usize, ss: u8, se: u8, al: u8) {
    let mut body = vec![components as u8];
    for c in 0..components {
        let t = table_id(c) as u8;
        body.extend_from_slice(&[c as u8 + 1, (t << 4) | t]);
    }
    body.extend_from_slice(&[ss, se, al]);
    put_segment(out, marker::SOS, &body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::error::{ErrorKind, Kind};

    fn gray(width: u16, height: u16) -> (ImageInfo, Vec<u8>) {
        let info = ImageInfo {
            width,
            height,
            components: 1,
            precision: 8,
        };
        let data = (0..usize::from(width) * usize::from(height))
            .map(|i| (i * 7 % 256) as u8)
            .collect();
        (info, data)
    }

    #[test]
    fn stream_starts_and_ends_with_markers() {
        let (info, data) = gray(9, 9);
        let jpeg = encode(&info, &data, Process::Baseline, &Default::default()).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, marker::SOI]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, marker::EOI]);
        // baseline frame header present
        assert!(jpeg.windows(2).any(|w| w == [0xFF, marker::SOF0]));
    }

    #[test]
    fn rejects_bad_input() {
        let (info, data) = gray(4, 4);
        let err = encode(&info, &data[1..], Process::Baseline, &Default::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let info12 = ImageInfo {
            precision: 12,
            ..info
        };
        let data12 = vec![0u8; info12.data_len()];
        let err = encode(&info12, &data12, Process::Baseline, &Default::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let options = JpegEncodeOptions {
            predictor: 0,
            ..Default::default()
        };
        let err = encode(&info, &data, Process::Lossless, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // 10-bit sample over a 9-bit precision
        let info9 = ImageInfo {
            precision: 9,
            ..info
        };
        let mut data9 = vec![0u8; info9.data_len()];
        data9[1] = 0x02;
        let err = encode(&info9, &data9, Process::Lossless, &Default::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn restart_markers_are_numbered_cyclically() {
        let (info, data) = gray(80, 16);
        let options = JpegEncodeOptions {
            restart_interval: 1,
            ..Default::default()
        };
        let jpeg = encode(&info, &data, Process::Baseline, &options).unwrap();
        // 20 MCUs, 19 restart markers
        let found: Vec<u8> = jpeg
            .windows(2)
            .filter(|w| w[0] == 0xFF && marker::is_rst(w[1]))
            .map(|w| w[1] - marker::RST0)
            .collect();
        assert_eq!(found.len(), 19);
        for (i, &n) in found.iter().enumerate() {
            assert_eq!(usize::from(n), i % 8);
        }
    }
}
