use serde::{Deserialize, Serialize};

/// Knobs for `Document::write_with`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Patch the header's file-size field with the serialized length.
    /// Off by default: the header is written exactly as held.
    #[serde(default)]
    pub recompute_file_size: bool,
    /// fsync the temp file before it replaces the target.
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_sync() -> bool { true }

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            recompute_file_size: false,
            sync: default_sync(),
        }
    }
}
