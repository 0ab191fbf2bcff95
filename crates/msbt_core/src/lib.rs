pub mod consts;
pub mod errors;
pub mod cursor;
pub mod header;
pub mod section;
pub mod labels;
pub mod strings;
pub mod opaque;
pub mod config;
pub mod document;

pub use config::WriteOptions;
pub use cursor::{ByteCursor, ByteSink, Endian};
pub use document::{Document, ResolvedLabel};
pub use errors::{FormatError, Result};
pub use header::{Header, TextEncoding};
pub use labels::{Group, Label, LabelTable};
pub use opaque::OpaqueSection;
pub use section::{Section, SectionHeader};
pub use strings::{PoolEntry, StringPool};
