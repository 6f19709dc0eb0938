//! Codec layer for encryption and compression operations.
//!
//! # Submodules
//!
//! - [`crypto`][]: The position-keyed XOR keystream and its seeds
//! - [`compression`][]: zlib inflate/deflate

pub mod compression;
pub mod crypto;
