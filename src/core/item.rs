use std::cell::{Cell, RefCell};

use crate::error::BatchError;

/// Type alias for item reader results.
///
/// - `Ok(Some(item))`: an item was read
/// - `Ok(None)`: the input is exhausted
/// - `Err(BatchError)`: the read failed
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Type alias for item processor results.
pub type ItemProcessorResult<O> = Result<O, BatchError>;

/// Type alias for item writer results.
pub type ItemWriterResult = Result<(), BatchError>;

/// Represents the retrieval of input for a step, one item at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Represents the business logic applied to each item read by the
/// `ItemReader` before it reaches the `ItemWriter`.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Represents the output of a step, one chunk of items at a time.
///
/// `open` is called once before the first chunk and `close` once after the
/// last one; both default to no-ops for writers without a lifecycle.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Processor that forwards items unchanged, for steps that only move data.
#[derive(Default)]
pub struct PassThroughProcessor;

impl<I: Clone> ItemProcessor<I, I> for PassThroughProcessor {
    fn process(&self, item: &I) -> ItemProcessorResult<I> {
        Ok(item.clone())
    }
}

/// Reader backed by an in-memory vector.
///
/// Used to fan a materialized batch out to several writers: each export step
/// gets its own reader over the same records.
pub struct VecItemReader<I> {
    items: Vec<I>,
    index: Cell<usize>,
}

impl<I> VecItemReader<I> {
    pub fn new(items: Vec<I>) -> Self {
        Self {
            items,
            index: Cell::new(0),
        }
    }
}

impl<I: Clone> ItemReader<I> for VecItemReader<I> {
    fn read(&self) -> ItemReaderResult<I> {
        let index = self.index.get();
        match self.items.get(index) {
            Some(item) => {
                self.index.set(index + 1);
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }
}

/// Writer that collects items into an in-memory vector.
#[derive(Default)]
pub struct VecItemWriter<O> {
    items: RefCell<Vec<O>>,
}

impl<O> VecItemWriter<O> {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl<O: Clone> VecItemWriter<O> {
    /// Returns a copy of everything written so far.
    pub fn get_items(&self) -> Vec<O> {
        self.items.borrow().clone()
    }
}

impl<O: Clone> ItemWriter<O> for VecItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult {
        self.items.borrow_mut().extend_from_slice(items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_reader_should_drain_items_in_order() {
        let reader = VecItemReader::new(vec![1, 2, 3]);

        assert_eq!(reader.read().unwrap(), Some(1));
        assert_eq!(reader.read().unwrap(), Some(2));
        assert_eq!(reader.read().unwrap(), Some(3));
        assert_eq!(reader.read().unwrap(), None);
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn vec_writer_should_accumulate_chunks() {
        let writer = VecItemWriter::new();

        writer.write(&["a".to_string(), "b".to_string()]).unwrap();
        writer.write(&["c".to_string()]).unwrap();

        assert_eq!(writer.len(), 3);
        assert_eq!(writer.get_items(), vec!["a", "b", "c"]);
    }

    #[test]
    fn pass_through_processor_should_clone_item() {
        let processor = PassThroughProcessor;
        let item = "unchanged".to_string();

        assert_eq!(processor.process(&item).unwrap(), item);
    }
}
