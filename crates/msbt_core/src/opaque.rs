use crate::consts::TAG_ATR1;
use crate::cursor::{ByteCursor, ByteSink};
use crate::errors::Result;
use crate::section::{close_payload, payload_bounds, ReadContext, SectionHeader};

/// NLI1 / ATO1 / ATR1 / TSY1, carried as raw bytes.
///
/// ATR1 starts with an attribute count that sits in front of the payload and
/// is not counted in the section size; `payload` holds the `size` bytes after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueSection {
    pub header: SectionHeader,
    pub attribute_count: Option<u32>,
    pub payload: Vec<u8>,
}

impl OpaqueSection {
    pub fn read(c: &mut ByteCursor<'_>, ctx: &ReadContext) -> Result<Self> {
        let header = SectionHeader::read(c, ctx.endian)?;
        let attribute_count = if header.tag == TAG_ATR1 {
            Some(c.read_u32(ctx.endian)?)
        } else {
            None
        };
        let (start, end) = payload_bounds(c, &header)?;
        let payload = c.read_bytes(end - start)?.to_vec();

        close_payload(c, end, ctx.origin)?;
        Ok(Self { header, attribute_count, payload })
    }

    pub fn write(&self, s: &mut ByteSink, origin: usize) -> Result<()> {
        let mut frame = self.header.begin(s)?;
        if let Some(n) = self.attribute_count {
            s.write_u32(n)?;
            // the count is outside the size field
            frame.payload_start = s.position();
        }
        s.write_bytes(&self.payload);
        frame.finish(s, origin)?;
        Ok(())
    }
}
