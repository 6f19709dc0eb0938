//! Container envelope shared by the key table and the string lists.
//!
//! ```text
//! on disk:  keystream(zlib(payload), seed)
//! load:     bytes -> crypt(seed) -> inflate -> payload
//! save:     payload -> deflate -> crypt(seed(compressed_len)) -> bytes
//! ```
//!
//! The seed is always computed from the length of the compressed stream, so
//! it is known both before decoding and after encoding.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::localization::codec::{compression, crypto};
use crate::localization::types::error::Result;
use crate::localization::types::models::WriteOptions;

/// Removes the keystream and inflates the payload.
pub fn unseal(mut data: Vec<u8>, seed: u32) -> Result<Vec<u8>> {
    debug!("Unsealing container: {} bytes, seed {:#010x}", data.len(), seed);
    crypto::crypt_in_place(&mut data, seed);
    let payload = compression::decompress(&data)?;
    debug!("Container payload: {} bytes", payload.len());
    Ok(payload)
}

/// Deflates the payload and applies the keystream. `seed_for` receives the
/// compressed length.
pub fn seal(payload: &[u8], options: &WriteOptions, seed_for: impl FnOnce(usize) -> u32) -> Result<Vec<u8>> {
    let mut data = compression::compress(payload, options.compression)?;
    let seed = seed_for(data.len());
    debug!(
        "Sealing container: payload {} bytes, compressed {} bytes, seed {:#010x}",
        payload.len(),
        data.len(),
        seed
    );
    crypto::crypt_in_place(&mut data, seed);
    Ok(data)
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    info!("Reading container: {}", path.display());
    Ok(fs::read(path)?)
}

pub fn write_file(path: &Path, data: &[u8], options: &WriteOptions) -> Result<()> {
    if options.create_dirs {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
    }
    info!("Writing container: {} ({} bytes)", path.display(), data.len());
    fs::write(path, data)?;
    Ok(())
}
