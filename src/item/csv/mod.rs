//! CSV export of generated batches.
//!
//! The writer serializes records into a tabular sheet through serde, one row
//! per record, with an optional header row. It follows the builder pattern
//! used by every other reader and writer in this crate.
//!
//! # Examples
//!
//! ```
//! use redeem_batch::item::csv::csv_writer::CsvItemWriterBuilder;
//! use redeem_batch::core::item::ItemWriter;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Row<'a> {
//!     code: &'a str,
//!     used: bool,
//! }
//!
//! let writer = CsvItemWriterBuilder::new()
//!     .has_headers(true)
//!     .from_writer(vec![]);
//!
//! writer
//!     .write(&[
//!         Row { code: "ABCD2345", used: false },
//!         Row { code: "WXYZ6789", used: true },
//!     ])
//!     .unwrap();
//!
//! let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(data, "code,used\nABCD2345,false\nWXYZ6789,true\n");
//! ```

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;
