//! Keystream cipher guarding every localization container.
//!
//! Both the key table (`Cmn.dat`) and the per-language string lists
//! (`A.dat`..`M.dat`) are XORed with the same keystream. The keystream only
//! depends on a 32-bit seed and the byte position, so the transform is its
//! own inverse.

use log::trace;

use crate::localization::types::language::Language;

/// XORs `data` in place with the keystream derived from `seed`.
///
/// # Algorithm
/// Two 32-bit accumulators, `a = 0` and `b = seed`. For each byte:
/// 1. `b = b * 5 + 1`
/// 2. `bit = (!((a << 3) ^ a) >> 7) & 1`
/// 3. `a = (a << 1) | bit`
/// 4. XOR the byte with `low8(a) + low8(b)` (wrapping)
///
/// Applying it twice with the same seed restores the input.
pub fn crypt_in_place(data: &mut [u8], seed: u32) {
    trace!("Applying keystream to {} bytes (seed {:#010x})", data.len(), seed);

    let mut a: u32 = 0;
    let mut b: u32 = seed;
    for byte in data.iter_mut() {
        b = b.wrapping_mul(5).wrapping_add(1);
        let bit = (!((a << 3) ^ a) >> 7) & 1;
        a = (a << 1) | bit;
        *byte ^= (a as u8).wrapping_add(b as u8);
    }
}

/// Seed for the key-table container: the length of the compressed payload,
/// which is also the length of the file on disk.
pub fn key_table_seed(container_len: usize) -> u32 {
    container_len as u32
}

/// Seed for a string-list container: file length plus the language offset.
pub fn string_list_seed(container_len: usize, language: Language) -> u32 {
    (container_len as u32).wrapping_add(language.cipher_offset())
}
