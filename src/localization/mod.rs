//! Core localization container module.
//!
//! ```text
//! Cmn.dat  ──unseal──▶ KeyTable    "AircraftShort_Name_a10a" → 1
//! A.dat    ──unseal──▶ StringList  [1] → "A-10A Thunderbolt II"
//! ```
//!
//! Loading is fully in memory: the whole file is read, the keystream removed,
//! the zlib stream inflated and the structure built before anything is
//! returned. A failed load leaves no partial state behind.

pub mod codec;
pub mod format;
pub mod key_table;
pub mod string_list;
pub mod types;

pub use key_table::{Entries, KeyTable, NodeHandle, TrieNode};
pub use string_list::StringList;
pub use types::error::{LocalizationError, Result};
pub use types::language::Language;
pub use types::models::{IdRemap, WriteOptions, BRANCH_ID};
