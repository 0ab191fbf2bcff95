//! Bounds-checked byte cursor (read side) and growable sink (write side).
//!
//! Multi-byte values are decoded with the byte order recorded in the file
//! header, so every integer accessor takes an [`Endian`].

use crate::consts::{ALIGNMENT, PADDING_BYTE};
use crate::errors::{FormatError, Result};
use byteorder::{BigEndian as BE, ByteOrder, LittleEndian as LE, WriteBytesExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The header stores the order inline: first byte greater than the
    /// second means little-endian, anything else big-endian.
    pub fn from_marker(marker: [u8; 2]) -> Self {
        if marker[0] > marker[1] { Endian::Little } else { Endian::Big }
    }

    pub fn marker(self) -> [u8; 2] {
        match self {
            Endian::Little => [0xFF, 0xFE],
            Endian::Big => [0xFE, 0xFF],
        }
    }

    pub fn u16_from(self, b: &[u8]) -> u16 {
        match self {
            Endian::Little => LE::read_u16(b),
            Endian::Big => BE::read_u16(b),
        }
    }

    pub fn u32_from(self, b: &[u8]) -> u32 {
        match self {
            Endian::Little => LE::read_u32(b),
            Endian::Big => BE::read_u32(b),
        }
    }
}

#[inline]
fn padding_len(pos: usize, origin: usize) -> usize {
    let rem = pos.saturating_sub(origin) % ALIGNMENT;
    if rem == 0 { 0 } else { ALIGNMENT - rem }
}

pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize { self.pos }
    pub fn len(&self) -> usize { self.buf.len() }
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }
    pub fn remaining(&self) -> usize { self.buf.len().saturating_sub(self.pos) }

    fn need(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(FormatError::Truncated { offset: self.pos, wanted: n, available: self.remaining() });
        }
        Ok(())
    }

    /// Absolute seek. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(FormatError::Truncated {
                offset: self.pos,
                wanted: pos - self.pos.min(pos),
                available: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads `n` bytes and puts the position back where it was.
    pub fn peek_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let pos = self.pos;
        let out = self.read_bytes(n);
        self.pos = pos;
        out
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16> {
        Ok(endian.u16_from(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        Ok(endian.u32_from(self.read_bytes(4)?))
    }

    /// Borrow `[start, end)` without moving the cursor.
    pub fn slice(&self, start: usize, end: usize) -> Result<&'a [u8]> {
        if start > end || end > self.buf.len() {
            return Err(FormatError::Truncated {
                offset: start,
                wanted: end.saturating_sub(start),
                available: self.buf.len().saturating_sub(start),
            });
        }
        Ok(&self.buf[start..end])
    }

    /// Move forward to the next 16-byte boundary measured from `origin`.
    pub fn skip_padding(&mut self, origin: usize) -> Result<()> {
        let pad = padding_len(self.pos, origin);
        self.need(pad)?;
        self.pos += pad;
        Ok(())
    }
}

/// In-memory output buffer; the document is serialized here before it is
/// published to disk in one go.
pub struct ByteSink {
    buf: Vec<u8>,
    endian: Endian,
}

impl ByteSink {
    pub fn new(endian: Endian) -> Self {
        Self { buf: Vec::new(), endian }
    }

    pub fn with_capacity(endian: Endian, cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap), endian }
    }

    pub fn position(&self) -> usize { self.buf.len() }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        match self.endian {
            Endian::Little => self.buf.write_u16::<LE>(v)?,
            Endian::Big => self.buf.write_u16::<BE>(v)?,
        }
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        match self.endian {
            Endian::Little => self.buf.write_u32::<LE>(v)?,
            Endian::Big => self.buf.write_u32::<BE>(v)?,
        }
        Ok(())
    }

    /// Overwrite a previously written u32 (size fields are back-patched).
    pub fn patch_u32(&mut self, at: usize, v: u32) -> Result<()> {
        let available = self.buf.len().saturating_sub(at);
        let Some(dst) = self.buf.get_mut(at..at + 4) else {
            return Err(FormatError::Truncated { offset: at, wanted: 4, available });
        };
        match self.endian {
            Endian::Little => LE::write_u32(dst, v),
            Endian::Big => BE::write_u32(dst, v),
        }
        Ok(())
    }

    /// Emit filler bytes up to the next 16-byte boundary measured from `origin`.
    pub fn write_padding(&mut self, origin: usize) {
        let pad = padding_len(self.buf.len(), origin);
        self.buf.resize(self.buf.len() + pad, PADDING_BYTE);
    }

    pub fn into_inner(self) -> Vec<u8> { self.buf }
    pub fn as_slice(&self) -> &[u8] { &self.buf }
}
