//! The central code store.
//!
//! The store is a single JSON file holding every known code and its usage
//! status across batches, keyed by code. Newly generated batch files have
//! the same shape, so importing a batch is a merge by key where the batch's
//! record wins.
//!
//! There is deliberately no locking or transactional machinery around the
//! file; a missing store is simply created and a corrupt one is rebuilt
//! from the incoming batch.

use std::{collections::BTreeMap, fs, io::ErrorKind, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{error::BatchError, item::codes::CodeMetadata};

/// Default location of the store file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/codes.json";

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The code is not in the store.
    NotFound,
    /// The code exists but was already redeemed.
    AlreadyUsed,
    /// The code was valid and is now marked used.
    Accepted,
}

/// The cumulative map of all known codes.
///
/// Keys are sorted, so saving the store always produces a deterministic
/// file regardless of generation or import order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeStore {
    records: BTreeMap<String, CodeMetadata>,
}

impl CodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from `path`.
    ///
    /// # Returns
    /// - `Ok(CodeStore)` when the file exists and parses
    /// - `Err(BatchError::Store)` when the file is missing or malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|error| {
            BatchError::Store(format!("cannot read {}: {}", path.display(), error))
        })?;

        serde_json::from_str(&content).map_err(|error| {
            BatchError::Store(format!("cannot parse {}: {}", path.display(), error))
        })
    }

    /// Loads a store, falling back to an empty one.
    ///
    /// A missing file is the normal first-run case. A file that exists but
    /// does not parse is reported and discarded, matching the import
    /// behavior of the original tooling.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(store) => store,
                Err(error) => {
                    warn!(
                        "Store {} is empty or malformed, starting fresh: {}",
                        path.display(),
                        error
                    );
                    Self::new()
                }
            },
            Err(error) if error.kind() == ErrorKind::NotFound => Self::new(),
            Err(error) => {
                warn!("Cannot read store {}: {}", path.display(), error);
                Self::new()
            }
        }
    }

    /// Writes the store to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BatchError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    BatchError::Store(format!(
                        "cannot create directory {}: {}",
                        parent.display(),
                        error
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|error| BatchError::Store(error.to_string()))?;

        fs::write(path, json).map_err(|error| {
            BatchError::Store(format!("cannot write {}: {}", path.display(), error))
        })
    }

    /// Merges `batch` into the store. Keys present in both take the
    /// batch's record; keys only in the store are untouched.
    pub fn merge(&mut self, batch: CodeStore) {
        self.records.extend(batch.records);
    }

    pub fn insert(&mut self, code: String, metadata: CodeMetadata) {
        self.records.insert(code, metadata);
    }

    pub fn get(&self, code: &str) -> Option<&CodeMetadata> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the stored codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Attempts to redeem a code, marking it used on success.
    pub fn redeem(&mut self, code: &str) -> Redemption {
        match self.records.get_mut(code) {
            None => Redemption::NotFound,
            Some(metadata) if metadata.used => Redemption::AlreadyUsed,
            Some(metadata) => {
                metadata.used = true;
                Redemption::Accepted
            }
        }
    }
}
