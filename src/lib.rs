//! # ace7-localization
//!
//! Reader and writer for the localization containers of Ace Combat 7:
//! the `Cmn.dat` key table mapping variable names to string ids, and the
//! per-language string lists `A.dat`..`M.dat` holding the text for each id.
pub mod localization;

// Re-export the main types for convenience
pub use localization::{
    codec::crypto::crypt_in_place,
    types::models::{IdRemap, WriteOptions, BRANCH_ID},
    KeyTable,
    Language,
    LocalizationError,
    NodeHandle,
    Result,
    StringList,
    TrieNode,
};
