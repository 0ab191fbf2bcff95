//! TXT2: the string pool.
//!
//! Payload (offsets relative to the count field):
//!   u32 count
//!   repeat count * u32 offset
//!   string data; entry i spans [offset[i], offset[i+1]) and the last one
//!   runs to the end of the payload.

use crate::cursor::{ByteCursor, ByteSink, Endian};
use crate::errors::{FormatError, Result};
use crate::header::TextEncoding;
use crate::section::{close_payload, payload_bounds, ReadContext, SectionHeader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    /// Exact on-disk bytes; this is what gets written back.
    pub raw: Vec<u8>,
    /// Decoded text without the trailing NUL terminator.
    pub text: String,
}

impl PoolEntry {
    pub fn decode(raw: &[u8], encoding: TextEncoding, endian: Endian) -> Self {
        let text = decode_text(raw, encoding, endian);
        Self { raw: raw.to_vec(), text }
    }

    /// Re-encodes `text`, keeping a terminator if the old value had one.
    pub fn encode(text: &str, terminated: bool, encoding: TextEncoding, endian: Endian) -> Self {
        let mut raw = Vec::with_capacity((text.len() + 1) * encoding.unit_size());
        match encoding {
            TextEncoding::Utf8 => raw.extend_from_slice(text.as_bytes()),
            TextEncoding::Utf16 => {
                for u in text.encode_utf16() {
                    raw.extend_from_slice(&u16_bytes(u, endian));
                }
            }
        }
        if terminated {
            raw.resize(raw.len() + encoding.unit_size(), 0);
        }
        Self { raw, text: text.to_owned() }
    }

    pub fn is_terminated(&self, encoding: TextEncoding) -> bool {
        let unit = encoding.unit_size();
        self.raw.len() >= unit && self.raw[self.raw.len() - unit..].iter().all(|&b| b == 0)
    }
}

fn u16_bytes(u: u16, endian: Endian) -> [u8; 2] {
    match endian {
        Endian::Little => u.to_le_bytes(),
        Endian::Big => u.to_be_bytes(),
    }
}

fn decode_text(raw: &[u8], encoding: TextEncoding, endian: Endian) -> String {
    let unit = encoding.unit_size();
    let body = if raw.len() >= unit && raw[raw.len() - unit..].iter().all(|&b| b == 0) {
        &raw[..raw.len() - unit]
    } else {
        raw
    };
    let codec = match (encoding, endian) {
        (TextEncoding::Utf8, _) => encoding_rs::UTF_8,
        (TextEncoding::Utf16, Endian::Little) => encoding_rs::UTF_16LE,
        (TextEncoding::Utf16, Endian::Big) => encoding_rs::UTF_16BE,
    };
    codec.decode_without_bom_handling(body).0.into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPool {
    pub header: SectionHeader,
    pub entries: Vec<PoolEntry>,
}

impl StringPool {
    pub fn read(c: &mut ByteCursor<'_>, ctx: &ReadContext) -> Result<Self> {
        let header = SectionHeader::read(c, ctx.endian)?;
        let (start, end) = payload_bounds(c, &header)?;

        let count = c.read_u32(ctx.endian)? as usize;
        let mut offsets = Vec::new();
        for _ in 0..count {
            offsets.push(start + c.read_u32(ctx.endian)? as usize);
        }

        let limit = ctx.file_size.min(c.len());
        let mut entries = Vec::with_capacity(offsets.len());
        for (i, &from) in offsets.iter().enumerate() {
            let to = offsets.get(i + 1).copied().unwrap_or(end).min(limit);
            if from > limit {
                return Err(FormatError::Truncated { offset: from, wanted: 0, available: 0 });
            }
            // a backwards offset yields an empty entry
            let raw = c.slice(from, to.max(from))?;
            entries.push(PoolEntry::decode(raw, ctx.encoding, ctx.endian));
        }

        close_payload(c, end, ctx.origin)?;
        Ok(Self { header, entries })
    }

    pub fn write(&self, s: &mut ByteSink, origin: usize) -> Result<()> {
        let frame = self.header.begin(s)?;
        let count = self.entries.len();
        s.write_u32(count as u32)?;
        let mut off = 4 + 4 * count;
        for e in &self.entries {
            let v = u32::try_from(off)
                .map_err(|_| FormatError::Encode("string pool exceeds 4 GiB".into()))?;
            s.write_u32(v)?;
            off += e.raw.len();
        }
        for e in &self.entries {
            s.write_bytes(&e.raw);
        }
        frame.finish(s, origin)?;
        Ok(())
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, index: u32) -> Option<&PoolEntry> {
        self.entries.get(index as usize)
    }
}
