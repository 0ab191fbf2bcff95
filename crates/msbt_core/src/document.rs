//! Whole-file parse and write.

use crate::config::WriteOptions;
use crate::consts::{FILE_SIZE_OFFSET, HDR_SIZE};
use crate::cursor::{ByteCursor, ByteSink, Endian};
use crate::errors::{FormatError, Result};
use crate::header::{Header, TextEncoding};
use crate::labels::LabelTable;
use crate::opaque::OpaqueSection;
use crate::section::{ReadContext, Section};
use crate::strings::{PoolEntry, StringPool};
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace};

/// A label joined with the pool entry its index points at.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLabel<'a> {
    pub name: &'a str,
    pub index: u32,
    pub group: u32,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    header: Header,
    /// Sections in file order.
    sections: Vec<Section>,
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        let mmap = unsafe { Mmap::map(&f)? };
        Self::parse(&mmap)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut c = ByteCursor::new(bytes);
        let header = Header::read(&mut c)?;
        header.check_size(bytes.len() as u64)?;

        let ctx = ReadContext {
            endian: header.endian(),
            encoding: header.text_encoding(),
            file_size: header.file_size as usize,
            origin: HDR_SIZE,
        };
        debug!(sections = header.section_count, endian = ?ctx.endian, encoding = ?ctx.encoding, "parsing");

        let mut sections: Vec<Section> = Vec::with_capacity(header.section_count as usize);
        for _ in 0..header.section_count {
            let at = c.position();
            let section = Section::read(&mut c, &ctx)?;
            let tag = section.tag();
            if sections.iter().any(|s| s.tag() == tag) {
                return Err(FormatError::DuplicateSection(FormatError::tag_name(&tag)));
            }
            trace!(tag = %section.header().tag_str(), offset = at, size = section.header().size, "section");
            sections.push(section);
        }

        let doc = Self { header, sections };
        doc.check_links()?;
        Ok(doc)
    }

    /// Every label must point at an existing pool entry.
    fn check_links(&self) -> Result<()> {
        let Some(table) = self.label_table() else { return Ok(()) };
        let pool_len = self.string_pool().map_or(0, StringPool::len);
        if let Some(l) = table.labels.iter().find(|l| l.index as usize >= pool_len) {
            return Err(FormatError::DanglingLabelIndex { label: l.name.clone(), index: l.index, pool_len });
        }
        Ok(())
    }

    pub fn header(&self) -> &Header { &self.header }
    pub fn endian(&self) -> Endian { self.header.endian() }
    pub fn encoding(&self) -> TextEncoding { self.header.text_encoding() }
    pub fn sections(&self) -> &[Section] { &self.sections }

    pub fn section_order(&self) -> Vec<[u8; 4]> {
        self.sections.iter().map(Section::tag).collect()
    }

    pub fn label_table(&self) -> Option<&LabelTable> {
        self.sections.iter().find_map(|s| match s {
            Section::Labels(t) => Some(t),
            _ => None,
        })
    }

    pub fn string_pool(&self) -> Option<&StringPool> {
        self.sections.iter().find_map(|s| match s {
            Section::Strings(p) => Some(p),
            _ => None,
        })
    }

    fn string_pool_mut(&mut self) -> Option<&mut StringPool> {
        self.sections.iter_mut().find_map(|s| match s {
            Section::Strings(p) => Some(p),
            _ => None,
        })
    }

    pub fn opaque(&self, tag: &[u8; 4]) -> Option<&OpaqueSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Opaque(o) if &o.header.tag == tag => Some(o),
            _ => None,
        })
    }

    pub fn has_labels(&self) -> bool {
        self.label_table().is_some_and(|t| !t.is_empty())
    }

    /// Labels in table order, each with the text at its index.
    pub fn labels(&self) -> impl Iterator<Item = ResolvedLabel<'_>> + '_ {
        let pool = self.string_pool();
        self.label_table()
            .into_iter()
            .flat_map(|t| t.labels.iter())
            .map(move |l| ResolvedLabel {
                name: &l.name,
                index: l.index,
                group: l.group,
                text: pool.and_then(|p| p.get(l.index)).map_or("", |e| e.text.as_str()),
            })
    }

    pub fn get(&self, name: &str) -> Option<ResolvedLabel<'_>> {
        self.labels().find(|l| l.name == name)
    }

    /// Replace pool entry `index`. The header's file size is left alone.
    pub fn set_text(&mut self, index: u32, text: &str) -> Result<()> {
        let (encoding, endian) = (self.encoding(), self.endian());
        let pool = self.string_pool_mut();
        let pool_len = pool.as_ref().map_or(0, |p| p.len());
        let Some(entry) = pool.and_then(|p| p.entries.get_mut(index as usize)) else {
            return Err(FormatError::StringIndexOutOfRange { index, pool_len });
        };
        let terminated = entry.is_terminated(encoding);
        *entry = PoolEntry::encode(text, terminated, encoding, endian);
        Ok(())
    }

    pub fn set_label_text(&mut self, name: &str, text: &str) -> Result<()> {
        let index = self
            .label_table()
            .and_then(|t| t.get(name))
            .map(|l| l.index)
            .ok_or_else(|| FormatError::UnknownLabel(name.to_owned()))?;
        self.set_text(index, text)
    }

    fn serialize(&self) -> Result<ByteSink> {
        let mut s = ByteSink::with_capacity(self.endian(), self.header.file_size as usize);
        self.header.write(&mut s)?;
        for section in &self.sections {
            section.write(&mut s, HDR_SIZE)?;
        }
        Ok(s)
    }

    /// Header plus sections in original order, padding regenerated.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.serialize()?.into_inner())
    }

    pub fn serialized_len(&self) -> Result<usize> {
        Ok(self.serialize()?.position())
    }

    /// Sets the header's file size to the serialized length and returns it.
    pub fn recompute_file_size(&mut self) -> Result<u32> {
        let len = u32::try_from(self.serialized_len()?)
            .map_err(|_| FormatError::Encode("file exceeds 4 GiB".into()))?;
        self.header.file_size = len;
        Ok(len)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_with(path, &WriteOptions::default())
    }

    /// Serializes into a temp file next to `path`, then renames it over
    /// `path`. On error the target is untouched.
    pub fn write_with(&self, path: impl AsRef<Path>, opts: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let mut s = self.serialize()?;
        if opts.recompute_file_size {
            let len = u32::try_from(s.position())
                .map_err(|_| FormatError::Encode("file exceeds 4 GiB".into()))?;
            s.patch_u32(FILE_SIZE_OFFSET, len)?;
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::Builder::new().prefix(".msbt_").tempfile_in(dir)?;
        tmp.as_file_mut().write_all(s.as_slice())?;
        if opts.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(path)?;
        debug!(path = %path.display(), bytes = s.position(), "written");
        Ok(())
    }
}
