use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::item::{ItemProcessor, ItemReader, ItemWriter};

/// Status of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Status of a step prior to and during its execution.
    Starting,
    /// The step completed without exceeding its skip limit.
    Success,
    /// The step failed while reading items.
    ReadError,
    /// The step failed while processing items.
    ProcessorError,
    /// The step failed while writing items.
    WriteError,
    /// The tasklet backing the step returned an error.
    TaskletError,
}

/// Status of a single read chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The reader is exhausted.
    Finished,
    /// The chunk holds items and more may follow.
    Full,
}

/// Outcome of one tasklet invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet wants to be invoked again.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// Execution details and counters for one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully processed
    pub process_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of errors encountered during processing
    pub process_error_count: usize,
    /// Number of errors encountered during writing
    pub write_error_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            process_count: 0,
            write_count: 0,
            read_error_count: 0,
            process_error_count: 0,
            write_error_count: 0,
        }
    }
}

/// An independent, sequential phase of a batch job.
pub trait Step {
    /// Executes the step, recording counters and status into `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: the step completed successfully
    /// - `Err(BatchError)`: the step failed
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    /// Returns the name of the step.
    fn get_name(&self) -> &str;
}

/// A single unit of work executed outside the chunk-oriented model, for
/// operations that do not decompose into read/process/write (file merges,
/// cleanups, transfers).
pub trait Tasklet {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError>;
}

/// Step backed by a [`Tasklet`], invoked until it reports `Finished`.
pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl Step for TaskletStep<'_> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let status = loop {
            match self.tasklet.execute(step_execution) {
                Ok(RepeatStatus::Continuable) => continue,
                Ok(RepeatStatus::Finished) => break StepStatus::Success,
                Err(error) => {
                    warn!("Tasklet error in step {}: {}", step_execution.name, error);
                    break StepStatus::TaskletError;
                }
            }
        };
        step_execution.status = status;

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        if step_execution.status == StepStatus::Success {
            Ok(())
        } else {
            Err(BatchError::Step(step_execution.name.clone()))
        }
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

/// Step that reads, processes and writes items in chunks of `chunk_size`.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for processing items
    processor: &'a dyn ItemProcessor<I, O>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<O>,
    /// Number of items to process in each chunk
    chunk_size: u16,
    /// Maximum number of errors allowed before failing the step
    skip_limit: u16,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        Self::manage_error(self.writer.open());

        loop {
            let (read_items, chunk_status) = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(_) => break,
            };

            if !read_items.is_empty() {
                let processed_items = match self.process_chunk(step_execution, &read_items) {
                    Ok(items) => items,
                    Err(_) => break,
                };

                if self.write_chunk(step_execution, &processed_items).is_err() {
                    break;
                }
            }

            if chunk_status == ChunkStatus::Finished {
                step_execution.status = StepStatus::Success;
                break;
            }
        }

        Self::manage_error(self.writer.close());

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        if step_execution.status == StepStatus::Success {
            Ok(())
        } else {
            Err(BatchError::Step(step_execution.name.clone()))
        }
    }

    fn get_name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    /// Reads up to `chunk_size` items from the reader.
    ///
    /// Read errors are skipped until the skip limit is reached.
    ///
    /// # Returns
    /// - `Ok((items, ChunkStatus::Full))`: the chunk holds items and more may follow
    /// - `Ok((items, ChunkStatus::Finished))`: the reader is exhausted
    /// - `Err(BatchError)`: a read error exceeded the skip limit
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    step_execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    let status = if read_items.is_empty() {
                        ChunkStatus::Finished
                    } else {
                        ChunkStatus::Full
                    };
                    return Ok((read_items, status));
                }
                Err(error) => {
                    warn!("Error reading item: {}", error);
                    step_execution.read_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        step_execution.status = StepStatus::ReadError;
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Applies the processor to each item of the chunk.
    ///
    /// Processing errors are skipped until the skip limit is reached.
    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());

        let mut result = Vec::with_capacity(read_items.len());

        for item in read_items {
            match self.processor.process(item) {
                Ok(processed_item) => {
                    result.push(processed_item);
                    step_execution.process_count += 1;
                }
                Err(error) => {
                    warn!("Error processing item: {}", error);
                    step_execution.process_error_count += 1;

                    if self.is_skip_limit_reached(step_execution) {
                        step_execution.status = StepStatus::ProcessorError;
                        return Err(error);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Writes a chunk of processed items through the writer.
    ///
    /// Write errors are skipped until the skip limit is reached.
    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", processed_items.len());

        if processed_items.is_empty() {
            return Ok(());
        }

        match self
            .writer
            .write(processed_items)
            .and_then(|()| self.writer.flush())
        {
            Ok(()) => {
                step_execution.write_count += processed_items.len();
                Ok(())
            }
            Err(error) => {
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += processed_items.len();

                if self.is_skip_limit_reached(step_execution) {
                    step_execution.status = StepStatus::WriteError;
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count
            + step_execution.process_error_count
            + step_execution.write_error_count
            > self.skip_limit.into()
    }

    /// Logs errors from operations that must not fail the step.
    fn manage_error(result: Result<(), BatchError>) {
        if let Err(error) = result {
            warn!("Non-fatal error: {}", error);
        }
    }
}

/// Builder for chunk-oriented steps.
pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: u16,
    skip_limit: u16,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 10,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn skip_limit(mut self, skip_limit: u16) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> ChunkOrientedStep<'a, I, O> {
        ChunkOrientedStep {
            name: self.name,
            reader: self.reader.expect("Reader is required for building a step"),
            processor: self
                .processor
                .expect("Processor is required for building a step"),
            writer: self.writer.expect("Writer is required for building a step"),
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
        }
    }
}

/// Builder for tasklet-backed steps.
pub struct TaskletStepBuilder<'a> {
    name: String,
    tasklet: Option<&'a dyn Tasklet>,
}

impl<'a> TaskletStepBuilder<'a> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasklet: None,
        }
    }

    pub fn tasklet(mut self, tasklet: &'a dyn Tasklet) -> Self {
        self.tasklet = Some(tasklet);
        self
    }

    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self
                .tasklet
                .expect("Tasklet is required for building a step"),
        }
    }
}

/// Entry point for building steps of either flavor.
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn tasklet<'a>(self, tasklet: &'a dyn Tasklet) -> TaskletStepBuilder<'a> {
        TaskletStepBuilder::new(&self.name).tasklet(tasklet)
    }

    pub fn chunk<'a, I, O>(self, chunk_size: u16) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}
