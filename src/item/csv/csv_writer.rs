use std::{
    cell::RefCell,
    fs::File,
    io::{self, Write},
    path::Path,
    result,
};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// A CSV item writer that serializes records row by row using serde.
pub struct CsvItemWriter<W: Write> {
    wrapper: RefCell<Writer<W>>,
}

impl<W: Write, O: Serialize> ItemWriter<O> for CsvItemWriter<W> {
    fn write(&self, items: &[O]) -> ItemWriterResult {
        let mut wrapper = self.wrapper.borrow_mut();

        for item in items {
            wrapper
                .serialize(item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> CsvItemWriter<W> {
    /// Flushes and returns the underlying writer, consuming `self`.
    pub fn into_inner(self) -> result::Result<W, BatchError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

/// Builder for [`CsvItemWriter`].
///
/// Defaults: comma delimiter, no header row.
#[derive(Default)]
pub struct CsvItemWriterBuilder {
    delimiter: u8,
    has_headers: bool,
}

impl CsvItemWriterBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// When enabled, a header row derived from the record's field names is
    /// written before the first record.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvItemWriter<File> {
        let wtr = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .from_path(path)
            .expect("Unable to open file");

        CsvItemWriter {
            wrapper: RefCell::new(wtr),
        }
    }

    pub fn from_writer<W: io::Write>(self, wtr: W) -> CsvItemWriter<W> {
        let wtr = WriterBuilder::new()
            .flexible(false)
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .from_writer(wtr);

        CsvItemWriter {
            wrapper: RefCell::new(wtr),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use time::OffsetDateTime;

    use super::*;
    use crate::item::codes::CodeRecord;

    fn record(code: &str, used: bool) -> CodeRecord {
        CodeRecord {
            code: code.to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            batch: "batch_test".to_string(),
            used,
        }
    }

    #[test]
    fn records_should_serialize_with_headers() -> anyhow::Result<()> {
        let writer = CsvItemWriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);

        writer.write(&[record("ABCD2345", false), record("WXYZ6789", true)])?;

        let data = String::from_utf8(writer.into_inner()?)?;
        assert_eq!(
            data,
            "code,created_at,batch,used
ABCD2345,1970-01-01T00:00:00Z,batch_test,false
WXYZ6789,1970-01-01T00:00:00Z,batch_test,true
"
        );

        Ok(())
    }

    #[test]
    fn custom_delimiter_should_apply() -> anyhow::Result<()> {
        let writer = CsvItemWriterBuilder::new()
            .has_headers(false)
            .delimiter(b';')
            .from_writer(vec![]);

        writer.write(&[record("ABCD2345", false)])?;

        let data = String::from_utf8(writer.into_inner()?)?;
        assert!(data.contains(';'));
        assert!(!data.contains(','));

        Ok(())
    }

    #[test]
    fn records_should_be_written_to_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("codes.csv");

        {
            let writer = CsvItemWriterBuilder::new().has_headers(true).from_path(&path);
            writer.write(&[record("ABCD2345", false)])?;
            ItemWriter::<CodeRecord>::flush(&writer)?;
        }

        let data = read_to_string(&path)?;
        assert!(data.starts_with("code,created_at,batch,used"));
        assert!(data.contains("ABCD2345"));

        Ok(())
    }
}
