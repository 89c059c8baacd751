//! Position-aware byte and bit cursors.
//!
//! - [`StreamReader`] and [`StreamWriter`] wrap sequential sources and sinks,
//!   keeping track of the absolute byte position for error reporting.
//! - [`SliceCursor`] reads from an in-memory region without copying.
//! - [`BitReader`] and [`BitWriter`] read and write bit-level data,
//!   most significant bit first,
//!   optionally applying JPEG byte stuffing (`FF 00`).

use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use dcmio_core::error::{ErrorKind, Kind};
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::io::{self, Read, Write};

/// An error raised by a cursor.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum CursorError {
    /// The source ended before the requested amount of data
    #[snafu(display(
        "Unexpected end of stream at position {}: {} bytes requested",
        position,
        requested
    ))]
    EndOfStream {
        position: u64,
        requested: u64,
        backtrace: Backtrace,
    },
    /// The underlying source failed
    #[snafu(display("Could not read from source at position {}", position))]
    ReadSource {
        position: u64,
        source: io::Error,
        backtrace: Backtrace,
    },
    /// The underlying destination failed
    #[snafu(display("Could not write to destination at position {}", position))]
    WriteTarget {
        position: u64,
        source: io::Error,
        backtrace: Backtrace,
    },
    /// Sequential sources cannot go back
    #[snafu(display(
        "Cannot seek backwards from position {} to {} on a sequential stream",
        position,
        target
    ))]
    BackwardSeek {
        position: u64,
        target: u64,
        backtrace: Backtrace,
    },
    /// A seek or sub-range outside of an in-memory region
    #[snafu(display(
        "Range {}..{} is out of bounds for a region of {} bytes",
        start,
        end,
        len
    ))]
    OutOfBounds {
        start: u64,
        end: u64,
        len: u64,
        backtrace: Backtrace,
    },
}

impl Kind for CursorError {
    fn kind(&self) -> ErrorKind {
        match self {
            CursorError::EndOfStream { .. } | CursorError::OutOfBounds { .. } => {
                ErrorKind::EndOfStream
            }
            CursorError::ReadSource { source, .. }
                if source.kind() == io::ErrorKind::UnexpectedEof =>
            {
                ErrorKind::EndOfStream
            }
            CursorError::ReadSource { .. } => ErrorKind::Read,
            CursorError::WriteTarget { .. } => ErrorKind::Write,
            CursorError::BackwardSeek { .. } => ErrorKind::UnsupportedOperation,
        }
    }
}

/// Result type for cursor operations.
pub type Result<T, E = CursorError> = std::result::Result<T, E>;

#[inline]
fn u16_from(bytes: &[u8], endianness: Endianness) -> u16 {
    match endianness {
        Endianness::Little => LittleEndian::read_u16(bytes),
        Endianness::Big => BigEndian::read_u16(bytes),
    }
}

#[inline]
fn u32_from(bytes: &[u8], endianness: Endianness) -> u32 {
    match endianness {
        Endianness::Little => LittleEndian::read_u32(bytes),
        Endianness::Big => BigEndian::read_u32(bytes),
    }
}

/// A sequential byte reader which knows its position.
///
/// Seeking forward skips bytes.
/// Seeking backward is not supported.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    position: u64,
}

impl<R> StreamReader<R>
where
    R: Read,
{
    /// Wrap a byte source, starting at position 0.
    pub fn new(inner: R) -> Self {
        StreamReader { inner, position: 0 }
    }

    /// Wrap a byte source whose first byte is at the given position.
    pub fn with_position(inner: R, position: u64) -> Self {
        StreamReader { inner, position }
    }

    /// The number of bytes consumed so far.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Fill the whole buffer,
    /// failing with `EndOfStream` if the source ends first.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.position;
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.position = start + filled as u64;
                    return EndOfStreamSnafu {
                        position: self.position,
                        requested: (buf.len() - filled) as u64,
                    }
                    .fail();
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.position = start + filled as u64;
                    return Err(e).context(ReadSourceSnafu {
                        position: self.position,
                    });
                }
            }
        }
        self.position = start + filled as u64;
        Ok(())
    }

    /// Read exactly `n` bytes into a new vector.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read an unsigned 16-bit integer.
    pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16_from(&buf, endianness))
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32_from(&buf, endianness))
    }

    /// Discard the next `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())
            .context(ReadSourceSnafu {
                position: self.position,
            })?;
        self.position += copied;
        ensure!(
            copied == n,
            EndOfStreamSnafu {
                position: self.position,
                requested: n - copied,
            }
        );
        Ok(())
    }

    /// Move to the given absolute position.
    ///
    /// Fails with `BackwardSeek` if the position was already passed.
    pub fn seek(&mut self, target: u64) -> Result<()> {
        ensure!(
            target >= self.position,
            BackwardSeekSnafu {
                position: self.position,
                target,
            }
        );
        self.skip(target - self.position)
    }

    /// Retrieve the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    ///
    /// Reading from it directly desynchronizes the position.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// A sequential byte writer which knows its position.
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: W,
    position: u64,
}

impl<W> StreamWriter<W>
where
    W: Write,
{
    /// Wrap a byte sink, starting at position 0.
    pub fn new(inner: W) -> Self {
        StreamWriter { inner, position: 0 }
    }

    /// The number of bytes written so far.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Write all of the given bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).context(WriteTargetSnafu {
            position: self.position,
        })?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Write an unsigned 16-bit integer.
    pub fn write_u16(&mut self, value: u16, endianness: Endianness) -> Result<()> {
        let bytes = match endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(&bytes)
    }

    /// Write an unsigned 32-bit integer.
    pub fn write_u32(&mut self, value: u32, endianness: Endianness) -> Result<()> {
        let bytes = match endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(&bytes)
    }

    /// Flush the underlying sink.
    pub fn flush_all(&mut self) -> Result<()> {
        self.inner.flush().context(WriteTargetSnafu {
            position: self.position,
        })
    }

    /// Retrieve the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A zero-copy reader over an in-memory byte region.
#[derive(Debug, Clone, Copy)]
pub struct SliceCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    /// Read from the start of the given region.
    pub fn new(data: &'a [u8]) -> Self {
        SliceCursor { data, pos: 0 }
    }

    /// The current position within the region.
    #[inline]
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// The total size of the region.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the region is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The unread part of the region.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Move to an absolute position within the region.
    /// Seeking to the very end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        ensure!(
            pos <= self.data.len(),
            OutOfBoundsSnafu {
                start: pos as u64,
                end: pos as u64,
                len: self.data.len() as u64,
            }
        );
        self.pos = pos;
        Ok(())
    }

    /// Skip the next `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        ensure!(
            n <= self.remaining(),
            EndOfStreamSnafu {
                position: self.pos as u64,
                requested: n as u64,
            }
        );
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read an unsigned 16-bit integer.
    pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16> {
        self.read_bytes(2).map(|b| u16_from(b, endianness))
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
        self.read_bytes(4).map(|b| u32_from(b, endianness))
    }

    /// A cursor over `len` bytes starting at `start`
    /// (relative to the beginning of this region),
    /// sharing the same memory.
    pub fn sub_range(&self, start: usize, len: usize) -> Result<SliceCursor<'a>> {
        let end = start.checked_add(len).unwrap_or(usize::MAX);
        ensure!(
            end <= self.data.len(),
            OutOfBoundsSnafu {
                start: start as u64,
                end: end as u64,
                len: self.data.len() as u64,
            }
        );
        Ok(SliceCursor::new(&self.data[start..end]))
    }
}

impl Read for SliceCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// An MSB-first bit reader over an in-memory region.
///
/// In JPEG mode, `FF 00` is read as a single `FF` data byte
/// and any other `FF xx` sequence is recognized as a marker,
/// which ends the entropy-coded data:
/// reads beyond it yield zero bits and are counted as overrun.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    current: u8,
    bits_left: u8,
    stuffing: bool,
    marker: Option<u8>,
    overrun: usize,
}

impl<'a> BitReader<'a> {
    /// Read plain bits, with no byte stuffing.
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            pos: 0,
            current: 0,
            bits_left: 0,
            stuffing: false,
            marker: None,
            overrun: 0,
        }
    }

    /// Read JPEG entropy-coded data,
    /// removing byte stuffing and stopping at markers.
    pub fn jpeg(data: &'a [u8]) -> Self {
        BitReader {
            stuffing: true,
            ..BitReader::new(data)
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.marker.is_some() || self.pos >= self.data.len() {
            self.overrun += 1;
            return 0;
        }
        let b = self.data[self.pos];
        if self.stuffing && b == 0xFF {
            match self.data.get(self.pos + 1) {
                Some(0x00) => {
                    self.pos += 2;
                    return 0xFF;
                }
                Some(&m) => {
                    self.marker = Some(m);
                    self.overrun += 1;
                    return 0;
                }
                None => {
                    self.pos += 1;
                    self.overrun += 1;
                    return 0;
                }
            }
        }
        self.pos += 1;
        b
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> u32 {
        if self.bits_left == 0 {
            self.current = self.next_byte();
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        u32::from((self.current >> self.bits_left) & 1)
    }

    /// Read `count` bits (up to 32) as an unsigned integer.
    pub fn read_bits(&mut self, count: u8) -> u32 {
        let mut bits = 0u32;
        for _ in 0..count {
            bits = (bits << 1) | self.read_bit();
        }
        bits
    }

    /// Discard the remaining bits of the current byte.
    pub fn align(&mut self) {
        self.bits_left = 0;
    }

    /// Whether bits were requested past the end of the data
    /// or past a marker.
    pub fn overrun(&self) -> bool {
        self.overrun > 0
    }

    /// The marker which stopped the entropy-coded data, if one was met.
    pub fn pending_marker(&self) -> Option<u8> {
        self.marker
    }

    /// Byte-align and consume the next marker,
    /// skipping any `FF` fill bytes before it.
    /// Clears the overrun state.
    ///
    /// Returns `None` if the next bytes are not a marker.
    pub fn next_marker(&mut self) -> Option<u8> {
        self.align();
        self.marker = None;
        self.overrun = 0;
        while self.data.get(self.pos) == Some(&0xFF) {
            match self.data.get(self.pos + 1) {
                Some(0xFF) => self.pos += 1,
                Some(0x00) | None => return None,
                Some(&m) => {
                    self.pos += 2;
                    return Some(m);
                }
            }
        }
        None
    }

    /// The position of the next unread byte in the region.
    /// If a marker was met, this is the position of its `FF` prefix.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// An MSB-first bit writer.
///
/// In JPEG mode, every `FF` data byte is followed by a stuffed `00`.
/// Incomplete bytes are padded with 1-bits on flush.
#[derive(Debug)]
pub struct BitWriter<W> {
    inner: W,
    acc: u32,
    nbits: u8,
    stuffing: bool,
    written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Write plain bits, with no byte stuffing.
    pub fn new(inner: W) -> Self {
        BitWriter {
            inner,
            acc: 0,
            nbits: 0,
            stuffing: false,
            written: 0,
        }
    }

    /// Write JPEG entropy-coded data, with byte stuffing.
    pub fn jpeg(inner: W) -> Self {
        BitWriter {
            stuffing: true,
            ..BitWriter::new(inner)
        }
    }

    fn emit(&mut self, byte: u8) -> Result<()> {
        let position = self.written;
        self.inner
            .write_all(&[byte])
            .context(WriteTargetSnafu { position })?;
        self.written += 1;
        if self.stuffing && byte == 0xFF {
            self.inner
                .write_all(&[0x00])
                .context(WriteTargetSnafu { position })?;
            self.written += 1;
        }
        Ok(())
    }

    /// Write the `count` low bits of `value` (up to 24).
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 24);
        if count == 0 {
            return Ok(());
        }
        let mask = (1u32 << count) - 1;
        self.acc = (self.acc << count) | (value & mask);
        self.nbits += count;
        while self.nbits >= 8 {
            self.nbits -= 8;
            let byte = (self.acc >> self.nbits) as u8;
            self.emit(byte)?;
        }
        self.acc &= (1u32 << self.nbits) - 1;
        Ok(())
    }

    /// Pad the current byte with 1-bits and write it out.
    pub fn flush_bits(&mut self) -> Result<()> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.write_bits((1 << pad) - 1, pad)?;
        }
        Ok(())
    }

    /// Flush pending bits, then write a marker (`FF xx`) unstuffed.
    pub fn write_marker(&mut self, marker: u8) -> Result<()> {
        self.flush_bits()?;
        let position = self.written;
        self.inner
            .write_all(&[0xFF, marker])
            .context(WriteTargetSnafu { position })?;
        self.written += 2;
        Ok(())
    }

    /// The number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush pending bits and retrieve the underlying sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush_bits()?;
        Ok(self.inner)
    }
}
