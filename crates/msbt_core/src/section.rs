//! Section framing and tag dispatch.
//!
//! Every section starts with the same 16-byte prefix:
//!   tag[4]  size[4] (payload bytes, prefix excluded)  reserved[8]
//! and is followed by `0xAB` filler up to the next 16-byte boundary.

use crate::consts::{OPAQUE_TAGS, SECTION_HDR_SIZE, TAG_LBL1, TAG_TXT2};
use crate::cursor::{ByteCursor, ByteSink, Endian};
use crate::errors::{FormatError, Result};
use crate::header::TextEncoding;
use crate::labels::LabelTable;
use crate::opaque::OpaqueSection;
use crate::strings::StringPool;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeader {
    pub tag: [u8; 4],
    pub size: u32,
    pub reserved: [u8; 8],
}

impl SectionHeader {
    pub const SIZE: usize = SECTION_HDR_SIZE;

    pub fn read(c: &mut ByteCursor<'_>, endian: Endian) -> Result<Self> {
        let tag: [u8; 4] = c.read_array()?;
        let size = c.read_u32(endian)?;
        let reserved: [u8; 8] = c.read_array()?;
        Ok(Self { tag, size, reserved })
    }

    pub fn tag_str(&self) -> String {
        FormatError::tag_name(&self.tag)
    }

    /// Writes the prefix with a zero size and returns the frame to close later.
    pub(crate) fn begin(&self, s: &mut ByteSink) -> Result<SectionFrame> {
        s.write_bytes(&self.tag);
        let size_at = s.position();
        s.write_u32(0)?;
        s.write_bytes(&self.reserved);
        Ok(SectionFrame { size_at, payload_start: s.position() })
    }
}

/// Positions needed to back-patch a section's size once its payload is out.
pub(crate) struct SectionFrame {
    size_at: usize,
    pub payload_start: usize,
}

impl SectionFrame {
    pub fn finish(self, s: &mut ByteSink, origin: usize) -> Result<u32> {
        let size = u32::try_from(s.position() - self.payload_start)
            .map_err(|_| FormatError::Encode("section payload exceeds 4 GiB".into()))?;
        s.patch_u32(self.size_at, size)?;
        s.write_padding(origin);
        Ok(size)
    }
}

/// Parameters every section reader needs from the header.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext {
    pub endian: Endian,
    pub encoding: TextEncoding,
    /// Declared total file size; string data never extends past it.
    pub file_size: usize,
    /// Alignment origin (start of the section table).
    pub origin: usize,
}

/// Bounds of a section payload within the input.
pub(crate) fn payload_bounds(c: &ByteCursor<'_>, header: &SectionHeader) -> Result<(usize, usize)> {
    let start = c.position();
    let end = start.saturating_add(header.size as usize);
    c.slice(start, end)?;
    Ok((start, end))
}

/// Leave the cursor at the payload end, then skip the filler.
pub(crate) fn close_payload(c: &mut ByteCursor<'_>, end: usize, origin: usize) -> Result<()> {
    c.seek(end)?;
    c.skip_padding(origin)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Labels(LabelTable),
    Strings(StringPool),
    Opaque(OpaqueSection),
}

impl Section {
    /// Peeks the tag and hands off to the matching reader.
    pub fn read(c: &mut ByteCursor<'_>, ctx: &ReadContext) -> Result<Self> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(c.peek_bytes(4)?);
        match tag {
            TAG_LBL1 => Ok(Section::Labels(LabelTable::read(c, ctx)?)),
            TAG_TXT2 => Ok(Section::Strings(StringPool::read(c, ctx)?)),
            t if OPAQUE_TAGS.contains(&t) => Ok(Section::Opaque(OpaqueSection::read(c, ctx)?)),
            other => Err(FormatError::UnknownSection(FormatError::tag_name(&other))),
        }
    }

    pub fn write(&self, s: &mut ByteSink, origin: usize) -> Result<()> {
        match self {
            Section::Labels(t) => t.write(s, origin),
            Section::Strings(p) => p.write(s, origin),
            Section::Opaque(o) => o.write(s, origin),
        }
    }

    pub fn header(&self) -> &SectionHeader {
        match self {
            Section::Labels(t) => &t.header,
            Section::Strings(p) => &p.header,
            Section::Opaque(o) => &o.header,
        }
    }

    pub fn tag(&self) -> [u8; 4] {
        self.header().tag
    }
}
