//! JSON export of generated batches.
//!
//! A batch file is a JSON object keyed by code, the same shape the central
//! store uses, so a batch file can be merged into the store by key:
//!
//! ```json
//! {
//!   "ABCD2345": {
//!     "used": false,
//!     "createdAt": "2025-12-09T18:04:35Z",
//!     "batch": "batch_20251209_180435"
//!   }
//! }
//! ```

/// A module providing facilities for writing code batches as JSON.
pub mod json_writer;
