use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
};

use log::debug;
use time::OffsetDateTime;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

use super::{CodeAlphabet, CodeRecord, DEFAULT_CODE_LENGTH, default_batch_name};

/// An [`ItemReader`] that emits a batch of unique random redemption codes.
///
/// Each read draws a code from the alphabet and rejects it if it was already
/// issued in this batch, so one generator instance never produces duplicates.
/// The reader is exhausted after `count` codes.
///
/// # Examples
///
/// ```
/// use redeem_batch::core::item::ItemReader;
/// use redeem_batch::item::codes::code_generator::CodeGeneratorBuilder;
///
/// let generator = CodeGeneratorBuilder::new()
///     .count(3)
///     .length(8)
///     .batch("batch_demo")
///     .build();
///
/// let record = generator.read().unwrap().unwrap();
/// assert_eq!(record.code.len(), 8);
/// assert_eq!(record.batch, "batch_demo");
/// assert!(!record.used);
/// ```
pub struct CodeGenerator {
    alphabet: CodeAlphabet,
    length: usize,
    batch: String,
    remaining: Cell<usize>,
    issued: RefCell<HashSet<String>>,
}

impl ItemReader<CodeRecord> for CodeGenerator {
    fn read(&self) -> ItemReaderResult<CodeRecord> {
        if self.remaining.get() == 0 {
            return Ok(None);
        }

        // Rejection sampling cannot terminate once every code of this
        // length has been issued.
        let mut issued = self.issued.borrow_mut();
        if let Some(capacity) = self.alphabet.capacity(self.length) {
            if issued.len() as u128 >= capacity {
                return Err(BatchError::ItemReader(format!(
                    "code space exhausted: {} codes of length {} already issued",
                    issued.len(),
                    self.length
                )));
            }
        }

        let mut rng = rand::rng();
        let code = loop {
            let candidate = self.alphabet.sample(&mut rng, self.length);
            if issued.insert(candidate.clone()) {
                break candidate;
            }
            debug!("Duplicate code drawn, resampling: {}", candidate);
        };

        self.remaining.set(self.remaining.get() - 1);

        Ok(Some(CodeRecord {
            code,
            created_at: OffsetDateTime::now_utc(),
            batch: self.batch.clone(),
            used: false,
        }))
    }
}

/// Builder for [`CodeGenerator`].
#[derive(Default)]
pub struct CodeGeneratorBuilder {
    count: usize,
    length: Option<usize>,
    batch: Option<String>,
    alphabet: Option<CodeAlphabet>,
}

impl CodeGeneratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of codes the generator will emit.
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Code length in characters (default 8).
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Batch name stamped on every record (default: timestamped name).
    pub fn batch(mut self, batch: &str) -> Self {
        self.batch = Some(batch.to_string());
        self
    }

    /// Alphabet to draw from (default: ambiguous characters removed).
    pub fn alphabet(mut self, alphabet: CodeAlphabet) -> Self {
        self.alphabet = Some(alphabet);
        self
    }

    pub fn build(self) -> CodeGenerator {
        CodeGenerator {
            alphabet: self.alphabet.unwrap_or_default(),
            length: self.length.unwrap_or(DEFAULT_CODE_LENGTH),
            batch: self.batch.unwrap_or_else(default_batch_name),
            remaining: Cell::new(self.count),
            issued: RefCell::new(HashSet::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::item::codes::AMBIGUOUS_CHARS;

    #[test]
    fn generator_should_emit_requested_number_of_codes() {
        let generator = CodeGeneratorBuilder::new()
            .count(5)
            .length(8)
            .batch("batch_test")
            .build();

        let mut codes = HashSet::new();
        while let Some(record) = generator.read().unwrap() {
            assert_eq!(record.code.len(), 8);
            assert_eq!(record.batch, "batch_test");
            assert!(!record.used);
            codes.insert(record.code);
        }

        assert_eq!(codes.len(), 5);
        assert!(generator.read().unwrap().is_none());
    }

    #[test]
    fn codes_should_only_use_allowed_characters() {
        let generator = CodeGeneratorBuilder::new().count(50).build();

        while let Some(record) = generator.read().unwrap() {
            for c in record.code.chars() {
                assert!(
                    c.is_ascii_uppercase() || c.is_ascii_digit(),
                    "unexpected character {c:?}"
                );
                assert!(
                    !AMBIGUOUS_CHARS.contains(&c),
                    "ambiguous character {c:?} in {}",
                    record.code
                );
            }
        }
    }

    #[test]
    fn exhausted_code_space_should_error_instead_of_spinning() {
        // Two symbols, length one: only two distinct codes exist.
        let generator = CodeGeneratorBuilder::new()
            .count(3)
            .length(1)
            .alphabet(CodeAlphabet::new(&[
                'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
                'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', '0', '1', '2', '3', '4', '5', '6', '7',
                '8', '9',
            ]))
            .build();

        assert!(generator.read().unwrap().is_some());
        assert!(generator.read().unwrap().is_some());
        assert!(generator.read().is_err());
    }

    #[test]
    fn default_length_should_be_eight() {
        let generator = CodeGeneratorBuilder::new().count(1).build();

        let record = generator.read().unwrap().unwrap();
        assert_eq!(record.code.len(), DEFAULT_CODE_LENGTH);
    }
}
