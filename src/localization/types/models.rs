//! Shared data types for the localization containers.

use flate2::Compression;

/// String id stored on branch nodes that carry no string of their own.
pub const BRANCH_ID: i32 = -1;

/// Knobs for writing a container back to disk.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// zlib level used for the payload.
    pub compression: Compression,
    /// Create missing parent directories before writing.
    pub create_dirs: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            create_dirs: true,
        }
    }
}

/// A key carried over from one key table into another by
/// [`KeyTable::merge_from`](crate::KeyTable::merge_from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRemap {
    pub key: String,
    /// Id of the key in the table it came from.
    pub source_id: i32,
    /// Id freshly assigned in the receiving table.
    pub target_id: i32,
}
