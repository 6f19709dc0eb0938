//! Primitive reader/writer for container payloads.
//!
//! Integers are 32-bit little-endian. Strings carry no length or terminator of
//! their own inside the key table; the caller writes the length as a separate
//! preceding integer. String lists use NUL-terminated records instead.

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::UTF_8;

use crate::localization::types::error::{LocalizationError, Result};

/// Cursor over a fully buffered, decompressed payload.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    remaining: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { remaining: data, position: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn read_i32(&mut self, context: &'static str) -> Result<i32> {
        let bytes = self.read_bytes(4, context)?;
        Ok(LittleEndian::read_i32(bytes))
    }

    /// Reads an int32 that must be a non-negative length or count.
    pub fn read_len(&mut self, context: &'static str) -> Result<usize> {
        let value = self.read_i32(context)?;
        usize::try_from(value).map_err(|_| {
            LocalizationError::MalformedContainer(format!(
                "negative {} ({}) at offset {}",
                context,
                value,
                self.position - 4
            ))
        })
    }

    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if self.remaining.len() < len {
            return Err(LocalizationError::Truncated {
                context,
                needed: len as u64,
                remaining: self.remaining.len() as u64,
            });
        }
        let (head, tail) = self.remaining.split_at(len);
        self.remaining = tail;
        self.position += len;
        Ok(head)
    }

    /// Reads exactly `len` bytes of UTF-8 text.
    pub fn read_string(&mut self, len: usize, context: &'static str) -> Result<String> {
        let start = self.position;
        let bytes = self.read_bytes(len, context)?;
        decode_utf8(bytes, context, start)
    }

    /// Reads text up to the next NUL byte (consumed, not returned) or up to
    /// the end of the buffer when no terminator follows.
    pub fn read_terminated_string(&mut self, context: &'static str) -> Result<String> {
        let start = self.position;
        let (len, terminator) = match self.remaining.iter().position(|&byte| byte == 0) {
            Some(end) => (end, 1),
            None => (self.remaining.len(), 0),
        };
        let bytes = self.read_bytes(len, context)?;
        self.read_bytes(terminator, context)?;
        decode_utf8(bytes, context, start)
    }
}

fn decode_utf8(bytes: &[u8], context: &'static str, offset: usize) -> Result<String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            LocalizationError::MalformedContainer(format!(
                "{} at offset {} is not valid UTF-8",
                context, offset
            ))
        })
}

/// Growable output buffer for a payload about to be compressed.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut field = [0u8; 4];
        LittleEndian::write_i32(&mut field, value);
        self.buffer.extend_from_slice(&field);
    }

    /// Writes a length or count field.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let value = i32::try_from(len).map_err(|_| {
            LocalizationError::MalformedContainer(format!("length {} does not fit in an int32 field", len))
        })?;
        self.write_i32(value);
        Ok(())
    }

    /// Writes the raw UTF-8 bytes of `text` with no length and no terminator.
    pub fn write_str(&mut self, text: &str) {
        self.buffer.extend_from_slice(text.as_bytes());
    }

    /// Writes `text` followed by a NUL byte.
    pub fn write_terminated_str(&mut self, text: &str) {
        self.write_str(text);
        self.buffer.push(0);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
