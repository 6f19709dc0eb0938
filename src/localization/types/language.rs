//! Languages supported by the per-language string lists.
//!
//! Each language is identified by a single ASCII letter (`A`..=`M`) which is
//! also the file stem of its string list (`A.dat`, `B.dat`, ...). The letter
//! offsets the cipher seed of that file.

use std::fmt;
use std::path::Path;

use super::error::{LocalizationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    English,
    TraditionalChinese,
    French,
    German,
    Italian,
    Japanese,
    Korean,
    EuropeanSpanish,
    LatinAmericanSpanish,
    Polish,
    BrazilianPortuguese,
    Russian,
    SimplifiedChinese,
}

impl Language {
    /// Every supported language, in letter order.
    pub const ALL: [Language; 13] = [
        Language::English,
        Language::TraditionalChinese,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::EuropeanSpanish,
        Language::LatinAmericanSpanish,
        Language::Polish,
        Language::BrazilianPortuguese,
        Language::Russian,
        Language::SimplifiedChinese,
    ];

    /// Parses a language letter. Only uppercase `A`..=`M` are accepted.
    pub fn from_letter(letter: char) -> Result<Self> {
        match letter {
            'A'..='M' => Ok(Self::ALL[(letter as u8 - b'A') as usize]),
            _ => Err(LocalizationError::UnknownLanguageLetter(letter)),
        }
    }

    /// Derives the language from a string-list file name such as `.../Localization/Game/C.dat`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let letter = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.chars().next())
            .ok_or_else(|| {
                LocalizationError::MalformedContainer(format!(
                    "cannot derive a language letter from path {}",
                    path.display()
                ))
            })?;
        Self::from_letter(letter)
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::TraditionalChinese => "Traditional Chinese",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::EuropeanSpanish => "European Spanish",
            Language::LatinAmericanSpanish => "Latin American Spanish",
            Language::Polish => "Polish",
            Language::BrazilianPortuguese => "Brazilian Portuguese",
            Language::Russian => "Russian",
            Language::SimplifiedChinese => "Simplified Chinese",
        }
    }

    /// Amount added to the file length to form the string-list cipher seed
    /// (letter code point minus 65).
    pub fn cipher_offset(self) -> u32 {
        self as u32
    }
}

impl TryFrom<char> for Language {
    type Error = LocalizationError;
    fn try_from(letter: char) -> Result<Self> {
        Self::from_letter(letter)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.letter(), self.name())
    }
}
