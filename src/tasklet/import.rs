//! # Batch Import Tasklet
//!
//! Merges a generated batch file into the central code store. The merge is
//! by code: keys already in the store survive unless the batch carries the
//! same key, in which case the batch's record wins.
//!
//! ## Examples
//!
//! ```no_run
//! use redeem_batch::core::step::{StepBuilder, StepExecution, Step};
//! use redeem_batch::tasklet::import::ImportTaskletBuilder;
//!
//! # fn example() -> Result<(), redeem_batch::BatchError> {
//! let tasklet = ImportTaskletBuilder::new()
//!     .source_path("codes_20251209_180435.json")
//!     .store_path("data/codes.json")
//!     .build()?;
//!
//! let step = StepBuilder::new("import-codes").tasklet(&tasklet).build();
//!
//! let mut step_execution = StepExecution::new("import-codes");
//! step.execute(&mut step_execution)?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use log::info;

use crate::{
    BatchError,
    core::step::{RepeatStatus, StepExecution, Tasklet},
    store::{CodeStore, DEFAULT_STORE_PATH},
};

/// A tasklet that loads a batch file, merges it into the store and rewrites
/// the store file.
///
/// A missing batch file fails the step. A missing store file starts a new
/// store; a malformed one is discarded with a warning, matching the
/// original import tool.
pub struct ImportTasklet {
    /// Batch file produced by the generator
    source_path: PathBuf,
    /// Store file to merge into
    store_path: PathBuf,
}

impl Tasklet for ImportTasklet {
    fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
        if !self.source_path.exists() {
            return Err(BatchError::Tasklet(format!(
                "batch file not found: {}",
                self.source_path.display()
            )));
        }

        let batch = CodeStore::load(&self.source_path)
            .map_err(|error| BatchError::Tasklet(error.to_string()))?;
        info!(
            "Read {} codes from {}",
            batch.len(),
            self.source_path.display()
        );

        let mut store = CodeStore::load_or_default(&self.store_path);
        info!("Existing store holds {} codes", store.len());

        store.merge(batch);

        store
            .save(&self.store_path)
            .map_err(|error| BatchError::Tasklet(error.to_string()))?;
        info!(
            "Store {} now holds {} codes",
            self.store_path.display(),
            store.len()
        );

        Ok(RepeatStatus::Finished)
    }
}

/// Builder for [`ImportTasklet`].
#[derive(Default)]
pub struct ImportTaskletBuilder {
    source_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
}

impl ImportTaskletBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch file to import.
    pub fn source_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Store file to merge into (default `data/codes.json`).
    pub fn store_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.store_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// # Returns
    /// - `Ok(ImportTasklet)`: successfully created tasklet
    /// - `Err(BatchError)`: no source path was configured
    pub fn build(self) -> Result<ImportTasklet, BatchError> {
        let source_path = self
            .source_path
            .ok_or_else(|| BatchError::Tasklet("source path is required".to_string()))?;

        Ok(ImportTasklet {
            source_path,
            store_path: self
                .store_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
        })
    }
}
