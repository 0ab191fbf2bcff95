//! File header (32 bytes, byte order given by the marker at offset 8):
//!
//!   magic[8]        = "MsgStdBn"
//!   byte_order[2]   = FF FE (little) / FE FF (big)
//!   reserved1[2]    = 0
//!   encoding[1]     = 0 (UTF-8) / 1 (UTF-16)
//!   version[1]      = 3
//!   sections[2]
//!   reserved2[2]    = 0
//!   file_size[4]
//!   reserved3[10]   = 0

use crate::consts::{ENCODING_UTF16, ENCODING_UTF8, HDR_SIZE, MAGIC};
use crate::cursor::{ByteCursor, ByteSink, Endian};
use crate::errors::{FormatError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// 1-byte code units
    Utf8,
    /// 2-byte code units in the file's byte order
    Utf16,
}

impl TextEncoding {
    pub fn from_selector(b: u8) -> Result<Self> {
        match b {
            ENCODING_UTF8 => Ok(TextEncoding::Utf8),
            ENCODING_UTF16 => Ok(TextEncoding::Utf16),
            other => Err(FormatError::UnsupportedEncoding(other)),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            TextEncoding::Utf8 => ENCODING_UTF8,
            TextEncoding::Utf16 => ENCODING_UTF16,
        }
    }

    pub fn unit_size(self) -> usize {
        match self {
            TextEncoding::Utf8 => 1,
            TextEncoding::Utf16 => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub magic: [u8; 8],
    pub byte_order: [u8; 2],
    pub reserved1: u16,
    pub encoding: u8,
    pub version: u8,
    pub section_count: u16,
    pub reserved2: u16,
    pub file_size: u32,
    pub reserved3: [u8; 10],
}

impl Header {
    pub const SIZE: usize = HDR_SIZE;

    pub fn read(c: &mut ByteCursor<'_>) -> Result<Self> {
        let magic: [u8; 8] = c.read_array()?;
        if &magic != MAGIC {
            return Err(FormatError::BadMagic { found: magic });
        }
        let byte_order: [u8; 2] = c.read_array()?;
        let endian = Endian::from_marker(byte_order);

        let reserved1 = c.read_u16(endian)?;
        let encoding = c.read_u8()?;
        TextEncoding::from_selector(encoding)?;
        let version = c.read_u8()?;
        let section_count = c.read_u16(endian)?;
        let reserved2 = c.read_u16(endian)?;
        let file_size = c.read_u32(endian)?;
        let reserved3: [u8; 10] = c.read_array()?;

        Ok(Self {
            magic,
            byte_order,
            reserved1,
            encoding,
            version,
            section_count,
            reserved2,
            file_size,
            reserved3,
        })
    }

    /// The declared size must match the real input length.
    pub fn check_size(&self, actual: u64) -> Result<()> {
        if u64::from(self.file_size) != actual {
            return Err(FormatError::SizeMismatch { declared: self.file_size, actual });
        }
        Ok(())
    }

    /// Emits every field as stored; `file_size` is whatever the caller left there.
    pub fn write(&self, s: &mut ByteSink) -> Result<()> {
        s.write_bytes(&self.magic);
        s.write_bytes(&self.byte_order);
        s.write_u16(self.reserved1)?;
        s.write_u8(self.encoding);
        s.write_u8(self.version);
        s.write_u16(self.section_count)?;
        s.write_u16(self.reserved2)?;
        s.write_u32(self.file_size)?;
        s.write_bytes(&self.reserved3);
        Ok(())
    }

    pub fn endian(&self) -> Endian {
        Endian::from_marker(self.byte_order)
    }

    pub fn text_encoding(&self) -> TextEncoding {
        // validated in `read`; a hand-built header with a bad selector falls back to 16-bit
        TextEncoding::from_selector(self.encoding).unwrap_or(TextEncoding::Utf16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(endian: Endian) -> Header {
        Header {
            magic: *MAGIC,
            byte_order: endian.marker(),
            reserved1: 0,
            encoding: ENCODING_UTF16,
            version: 3,
            section_count: 3,
            reserved2: 0,
            file_size: 0x1234,
            reserved3: [0; 10],
        }
    }

    #[test]
    fn header_write_then_read() {
        for endian in [Endian::Little, Endian::Big] {
            let h = sample(endian);
            let mut s = ByteSink::new(endian);
            h.write(&mut s).unwrap();
            assert_eq!(s.position(), Header::SIZE);
            let bytes = s.into_inner();
            let mut c = ByteCursor::new(&bytes);
            let back = Header::read(&mut c).unwrap();
            assert_eq!(back, h);
            assert_eq!(back.endian(), endian);
            assert_eq!(back.text_encoding(), TextEncoding::Utf16);
            assert_eq!(back.text_encoding().selector(), back.encoding);
        }
    }

    #[test]
    fn file_size_sits_at_fixed_offset() {
        let h = sample(Endian::Big);
        let mut s = ByteSink::new(Endian::Big);
        h.write(&mut s).unwrap();
        let bytes = s.into_inner();
        assert_eq!(&bytes[0x12..0x16], &[0x00, 0x00, 0x12, 0x34]);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = vec![0u8; Header::SIZE];
        bytes[..8].copy_from_slice(b"MsgPrjBn");
        let mut c = ByteCursor::new(&bytes);
        match Header::read(&mut c) {
            Err(FormatError::BadMagic { found }) => assert_eq!(&found, b"MsgPrjBn"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn unknown_encoding_rejected() {
        let h = Header { encoding: 2, ..sample(Endian::Little) };
        let mut s = ByteSink::new(Endian::Little);
        h.write(&mut s).unwrap();
        let bytes = s.into_inner();
        assert!(matches!(
            Header::read(&mut ByteCursor::new(&bytes)),
            Err(FormatError::UnsupportedEncoding(2))
        ));
    }

    #[test]
    fn size_check() {
        let h = sample(Endian::Little);
        assert!(h.check_size(0x1234).is_ok());
        assert!(matches!(
            h.check_size(0x1240),
            Err(FormatError::SizeMismatch { declared: 0x1234, actual: 0x1240 })
        ));
    }
}
