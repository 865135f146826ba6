//! Redemption code domain types and the batch code generator.
//!
//! A redemption code is a short, fixed-length string drawn from an uppercase
//! alphanumeric alphabet with the visually ambiguous characters (`0`, `O`,
//! `1`, `I`) removed, so codes survive being read aloud or retyped from a
//! screenshot. Codes are grouped into named batches; each code carries its
//! creation timestamp and usage flag.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description};

use crate::core::item::{ItemProcessor, ItemProcessorResult};

pub mod code_generator;

/// Default number of characters in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Characters excluded from the default alphabet.
pub const AMBIGUOUS_CHARS: &[char] = &['0', 'O', '1', 'I'];

/// The set of characters codes are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAlphabet {
    chars: Vec<char>,
}

impl CodeAlphabet {
    /// Builds an alphabet of `A-Z` and `0-9` minus the excluded characters.
    pub fn new(excluded: &[char]) -> Self {
        let chars = ('A'..='Z')
            .chain('0'..='9')
            .filter(|c| !excluded.contains(c))
            .collect();

        Self { chars }
    }

    /// The default alphabet: 32 symbols, ambiguous characters removed.
    pub fn without_ambiguous() -> Self {
        Self::new(AMBIGUOUS_CHARS)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Draws a code of `length` characters uniformly from the alphabet.
    pub fn sample<R: rand::Rng>(&self, rng: &mut R, length: usize) -> String {
        use rand::RngExt;
        (0..length)
            .map(|_| self.chars[rng.random_range(0..self.chars.len())])
            .collect()
    }

    /// Number of distinct codes of `length`, or `None` if it overflows.
    pub fn capacity(&self, length: usize) -> Option<u128> {
        u32::try_from(length)
            .ok()
            .and_then(|exp| (self.chars.len() as u128).checked_pow(exp))
    }
}

impl Default for CodeAlphabet {
    fn default() -> Self {
        Self::without_ambiguous()
    }
}

/// Everything known about a code except the code itself; the value side of
/// the store's code-keyed map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMetadata {
    pub used: bool,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub batch: String,
}

/// One generated redemption code, as it flows through readers and writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub batch: String,
    pub used: bool,
}

impl CodeRecord {
    /// Splits the record into the store's key/value form.
    pub fn into_parts(self) -> (String, CodeMetadata) {
        (
            self.code,
            CodeMetadata {
                used: self.used,
                created_at: self.created_at,
                batch: self.batch,
            },
        )
    }

    pub fn from_parts(code: String, metadata: CodeMetadata) -> Self {
        Self {
            code,
            created_at: metadata.created_at,
            batch: metadata.batch,
            used: metadata.used,
        }
    }
}

impl fmt::Display for CodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code:{}, batch:{}, used:{}",
            self.code, self.batch, self.used
        )
    }
}

/// Extracts the bare code, for plain-list exports.
#[derive(Default)]
pub struct CodeKeyProcessor;

impl ItemProcessor<CodeRecord, String> for CodeKeyProcessor {
    fn process(&self, item: &CodeRecord) -> ItemProcessorResult<String> {
        Ok(item.code.clone())
    }
}

/// Timestamp slug used in batch names and export file names.
pub fn timestamp_slug() -> String {
    let now = OffsetDateTime::now_utc();

    match format_description::parse("[year][month][day]_[hour][minute][second]") {
        Ok(format) => now
            .format(&format)
            .unwrap_or_else(|_| now.unix_timestamp().to_string()),
        Err(_) => now.unix_timestamp().to_string(),
    }
}

/// Default name for a batch generated now.
pub fn default_batch_name() -> String {
    format!("batch_{}", timestamp_slug())
}
