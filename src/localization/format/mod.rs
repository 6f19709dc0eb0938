//! File format layer for localization containers.
//!
//! # Module Organization
//!
//! - [`binary`]: int32 and string primitives over a buffered payload
//! - [`container`]: the keystream + zlib envelope around every payload
//!
//! # Architecture
//!
//! ```text
//! Cmn.dat / A.dat..M.dat:
//! ┌──────────────────────┐
//! │  keystream (seeded)  │ ← container::unseal()
//! │ ┌──────────────────┐ │
//! │ │  zlib stream     │ │
//! │ │ ┌──────────────┐ │ │
//! │ │ │  payload     │ │ │ ← binary::BinaryReader
//! │ │ └──────────────┘ │ │
//! │ └──────────────────┘ │
//! └──────────────────────┘
//! ```

pub mod binary;
pub mod container;
