//! LBL1: label names bucketed into groups, each bound to a string index.
//!
//! Payload (offsets relative to the group-count field):
//!   u32 group_count
//!   repeat group_count * { u32 label_count, u32 offset }
//!   labels: { u8 len, name[len], u32 string_index }

use crate::consts::LABEL_MAX_LEN;
use crate::cursor::{ByteCursor, ByteSink};
use crate::errors::{FormatError, Result};
use crate::section::{close_payload, payload_bounds, ReadContext, SectionHeader};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub label_count: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Index into the string pool.
    pub index: u32,
    /// Position of the enclosing group; doubles as the hash bucket.
    pub group: u32,
}

impl Label {
    fn encoded_len(&self) -> usize {
        1 + self.name.len() + 4
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    pub header: SectionHeader,
    /// Descriptors as read; `write` recomputes them from `labels`.
    pub groups: Vec<Group>,
    /// All labels, group by group, in file order within a group.
    pub labels: Vec<Label>,
}

impl LabelTable {
    pub fn read(c: &mut ByteCursor<'_>, ctx: &ReadContext) -> Result<Self> {
        let header = SectionHeader::read(c, ctx.endian)?;
        let (start, end) = payload_bounds(c, &header)?;
        // group offsets are untrusted; keep every read inside this payload
        let mut body = ByteCursor::new(c.slice(0, end)?);
        body.seek(start)?;

        let group_count = body.read_u32(ctx.endian)?;
        let mut groups = Vec::new();
        for _ in 0..group_count {
            let label_count = body.read_u32(ctx.endian)?;
            let offset = body.read_u32(ctx.endian)?;
            groups.push(Group { label_count, offset });
        }

        let mut labels = Vec::new();
        for (gi, g) in groups.iter().enumerate() {
            if g.label_count == 0 {
                continue;
            }
            body.seek(start.saturating_add(g.offset as usize))?;
            for _ in 0..g.label_count {
                let len = body.read_u8()? as usize;
                let at = body.position();
                let name = std::str::from_utf8(body.read_bytes(len)?)
                    .map_err(|_| FormatError::BadLabelName { offset: at })?
                    .to_owned();
                let index = body.read_u32(ctx.endian)?;
                labels.push(Label { name, index, group: gi as u32 });
            }
        }

        close_payload(c, end, ctx.origin)?;
        Ok(Self { header, groups, labels })
    }

    /// Labels are emitted group by group, keeping their relative order, so an
    /// unmodified table comes out with the same offsets it was read with.
    pub fn write(&self, s: &mut ByteSink, origin: usize) -> Result<()> {
        let group_count = self.groups.len();
        let mut buckets: Vec<Vec<&Label>> = vec![Vec::new(); group_count];
        for l in &self.labels {
            if l.name.len() > LABEL_MAX_LEN {
                return Err(FormatError::LabelTooLong { name: l.name.clone(), len: l.name.len() });
            }
            let g = l.group as usize;
            if g >= group_count {
                return Err(FormatError::Encode(format!(
                    "label {:?} is in group {g}, table has {group_count}",
                    l.name
                )));
            }
            buckets[g].push(l);
        }

        let frame = self.header.begin(s)?;
        s.write_u32(group_count as u32)?;
        let mut off = 4 + 8 * group_count;
        for b in &buckets {
            s.write_u32(b.len() as u32)?;
            s.write_u32(off as u32)?;
            off += b.iter().map(|l| l.encoded_len()).sum::<usize>();
        }
        for l in buckets.into_iter().flatten() {
            s.write_u8(l.name.len() as u8);
            s.write_bytes(l.name.as_bytes());
            s.write_u32(l.index)?;
        }
        frame.finish(s, origin)?;
        Ok(())
    }

    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }
}
