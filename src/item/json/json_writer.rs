use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
    item::codes::{CodeMetadata, CodeRecord},
};

/// An [`ItemWriter`] that persists a batch as a code-keyed JSON object.
///
/// Records are accumulated across chunks; the complete map is serialized
/// once on `close()`, since a keyed object cannot be streamed chunk by
/// chunk the way a JSON array could.
pub struct JsonCodeWriter {
    stream: RefCell<BufWriter<File>>,
    records: RefCell<BTreeMap<String, CodeMetadata>>,
    use_pretty_formatter: bool,
}

impl ItemWriter<CodeRecord> for JsonCodeWriter {
    fn write(&self, items: &[CodeRecord]) -> ItemWriterResult {
        let mut records = self.records.borrow_mut();

        for item in items {
            let (code, metadata) = item.clone().into_parts();
            records.insert(code, metadata);
        }
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        let records = self.records.borrow();

        let json = if self.use_pretty_formatter {
            serde_json::to_string_pretty(&*records)
        } else {
            serde_json::to_string(&*records)
        }
        .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        let mut stream = self.stream.borrow_mut();
        stream
            .write_all(json.as_bytes())
            .and_then(|()| stream.write_all(b"\n"))
            .and_then(|()| stream.flush())
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

/// Builder for [`JsonCodeWriter`].
#[derive(Default)]
pub struct JsonCodeWriterBuilder {
    pretty_formatter: bool,
}

impl JsonCodeWriterBuilder {
    pub fn new() -> Self {
        Self {
            pretty_formatter: false,
        }
    }

    pub fn pretty_formatter(mut self, yes: bool) -> Self {
        self.pretty_formatter = yes;
        self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> JsonCodeWriter {
        let file = File::create(path).expect("Unable to open file");

        JsonCodeWriter {
            stream: RefCell::new(BufWriter::new(file)),
            records: RefCell::new(BTreeMap::new()),
            use_pretty_formatter: self.pretty_formatter,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs::read_to_string};

    use time::OffsetDateTime;

    use super::*;

    fn record(code: &str) -> CodeRecord {
        CodeRecord {
            code: code.to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            batch: "batch_test".to_string(),
            used: false,
        }
    }

    #[test]
    fn batch_should_serialize_as_code_keyed_object() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("codes.json");

        let writer = JsonCodeWriterBuilder::new()
            .pretty_formatter(true)
            .from_path(&path);

        writer.write(&[record("ABCD2345"), record("WXYZ6789")])?;
        writer.write(&[record("EFGH2345")])?;
        writer.close()?;

        let parsed: BTreeMap<String, CodeMetadata> =
            serde_json::from_str(&read_to_string(&path)?)?;

        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains_key("ABCD2345"));
        assert!(parsed.contains_key("WXYZ6789"));
        assert!(parsed.contains_key("EFGH2345"));
        assert!(!parsed["ABCD2345"].used);
        assert_eq!(parsed["ABCD2345"].batch, "batch_test");

        Ok(())
    }

    #[test]
    fn rewriting_a_code_should_keep_last_record() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("codes.json");

        let writer = JsonCodeWriterBuilder::new().from_path(&path);

        let mut updated = record("ABCD2345");
        updated.used = true;

        writer.write(&[record("ABCD2345")])?;
        writer.write(&[updated])?;
        writer.close()?;

        let parsed: BTreeMap<String, CodeMetadata> =
            serde_json::from_str(&read_to_string(&path)?)?;

        assert_eq!(parsed.len(), 1);
        assert!(parsed["ABCD2345"].used);

        Ok(())
    }
}
