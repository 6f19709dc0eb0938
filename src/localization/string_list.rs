//! Per-language string lists (`A.dat`..`M.dat`).
//!
//! The payload is a run of NUL-terminated UTF-8 strings filling the whole
//! buffer. The string at position `k` is the text for key-table id `k`.
//! Files are sealed like the key table, but the cipher seed is the file
//! length plus the language offset.

use std::path::Path;

use log::{debug, info, warn};

use super::codec::crypto;
use super::format::binary::{BinaryReader, BinaryWriter};
use super::format::container;
use super::types::error::Result;
use super::types::language::Language;
use super::types::models::{IdRemap, WriteOptions};

/// Most empty strings [`StringList::set`] will pad in for one id past the end.
pub const MAX_PADDING: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringList {
    language: Language,
    strings: Vec<String>,
}

impl StringList {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            strings: Vec::new(),
        }
    }

    /// Decodes a sealed string list for `language`.
    pub fn from_container(data: &[u8], language: Language) -> Result<Self> {
        let seed = crypto::string_list_seed(data.len(), language);
        let payload = container::unseal(data.to_vec(), seed)?;
        let list = Self::from_payload(&payload, language)?;
        info!("String list {} loaded: {} strings", language, list.len());
        Ok(list)
    }

    pub fn to_container(&self, options: &WriteOptions) -> Result<Vec<u8>> {
        let payload = self.to_payload();
        container::seal(&payload, options, |len| crypto::string_list_seed(len, self.language))
    }

    pub fn read(path: impl AsRef<Path>, language: Language) -> Result<Self> {
        let data = container::read_file(path.as_ref())?;
        Self::from_container(&data, language)
    }

    /// Reads a string list whose language is named by the file, e.g. `D.dat`.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let language = Language::from_path(path)?;
        Self::read(path, language)
    }

    pub fn write(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        let data = self.to_container(options)?;
        container::write_file(path.as_ref(), &data, options)
    }

    pub fn from_payload(payload: &[u8], language: Language) -> Result<Self> {
        let mut reader = BinaryReader::new(payload);
        let mut strings = Vec::new();
        while !reader.is_empty() {
            strings.push(reader.read_terminated_string("string record")?);
        }
        Ok(Self { language, strings })
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        for text in &self.strings {
            writer.write_terminated_str(text);
        }
        debug!("String list {} serialized: {} bytes", self.language, writer.len());
        writer.into_inner()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Text for a key-table id. Branch ids (`-1`) and ids past the end give `None`.
    pub fn get(&self, id: i32) -> Option<&str> {
        let index = usize::try_from(id).ok()?;
        self.strings.get(index).map(String::as_str)
    }

    /// Stores `text` at `id`, padding the list with empty strings if it is too short.
    /// Negative ids, and ids more than [`MAX_PADDING`] past the end, are ignored
    /// and return `false`.
    pub fn set(&mut self, id: i32, text: impl Into<String>) -> bool {
        let Ok(index) = usize::try_from(id) else {
            return false;
        };
        if index.saturating_sub(self.strings.len()) > MAX_PADDING {
            warn!(
                "Refusing id {} in {}: list holds {} strings",
                id,
                self.language,
                self.strings.len()
            );
            return false;
        }
        if index >= self.strings.len() {
            self.strings.resize(index + 1, String::new());
        }
        self.strings[index] = text.into();
        true
    }

    /// Appends `text` and returns its id.
    pub fn push(&mut self, text: impl Into<String>) -> usize {
        self.strings.push(text.into());
        self.strings.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }

    /// Copies the text of every remapped key from `source` into this list.
    /// Returns how many strings were copied.
    pub fn apply_remap(&mut self, source: &StringList, remaps: &[IdRemap]) -> usize {
        let mut copied = 0;
        for remap in remaps {
            if let Some(text) = source.get(remap.source_id) {
                if self.set(remap.target_id, text) {
                    copied += 1;
                }
            }
        }
        debug!("Copied {} of {} remapped strings into {}", copied, remaps.len(), self.language);
        copied
    }
}
