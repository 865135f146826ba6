use std::{
    cell::RefCell,
    fmt::Display,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// An [`ItemWriter`] that writes each item's `Display` form on its own line.
///
/// Used for the plain code list: feed it the bare code strings (see
/// `CodeKeyProcessor`) and the output is one code per line.
pub struct TextItemWriter<W: Write> {
    stream: RefCell<BufWriter<W>>,
}

impl<W: Write, O: Display> ItemWriter<O> for TextItemWriter<W> {
    fn write(&self, items: &[O]) -> ItemWriterResult {
        let mut stream = self.stream.borrow_mut();

        for item in items {
            writeln!(stream, "{}", item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> TextItemWriter<W> {
    /// Flushes and returns the underlying writer, consuming `self`.
    pub fn into_inner(self) -> Result<W, BatchError> {
        self.stream
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

/// Builder for [`TextItemWriter`].
#[derive(Default)]
pub struct TextItemWriterBuilder;

impl TextItemWriterBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> TextItemWriter<File> {
        let file = File::create(path).expect("Unable to open file");

        TextItemWriter {
            stream: RefCell::new(BufWriter::new(file)),
        }
    }

    pub fn from_writer<W: io::Write>(self, wtr: W) -> TextItemWriter<W> {
        TextItemWriter {
            stream: RefCell::new(BufWriter::new(wtr)),
        }
    }
}
