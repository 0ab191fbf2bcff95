use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Bad magic: {found:02x?}")]
    BadMagic { found: [u8; 8] },

    #[error("File size mismatch: header says {declared}, file has {actual} bytes")]
    SizeMismatch { declared: u32, actual: u64 },

    #[error("Unknown section: {0:?}")]
    UnknownSection(String),

    #[error("Duplicate section: {0:?}")]
    DuplicateSection(String),

    #[error("Label {label:?} points at string #{index}, pool has {pool_len}")]
    DanglingLabelIndex { label: String, index: u32, pool_len: usize },

    #[error("String #{index} does not exist, pool has {pool_len}")]
    StringIndexOutOfRange { index: u32, pool_len: usize },

    #[error("No label named {0:?}")]
    UnknownLabel(String),

    #[error("Truncated at {offset}: wanted {wanted} bytes, {available} available")]
    Truncated { offset: usize, wanted: usize, available: usize },

    #[error("Unsupported encoding selector {0:#04x}")]
    UnsupportedEncoding(u8),

    #[error("Label name at {offset} is not UTF-8")]
    BadLabelName { offset: usize },

    #[error("Label {name:?} is {len} bytes, max 255")]
    LabelTooLong { name: String, len: usize },

    #[error("Encode: {0}")]
    Encode(String),
}

impl FormatError {
    pub(crate) fn tag_name(tag: &[u8]) -> String {
        String::from_utf8_lossy(tag).into_owned()
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
