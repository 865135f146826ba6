#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Redeem-Batch

 A batch toolkit for generating, exporting and importing redemption codes.
 It grew out of a pair of fulfillment scripts and keeps their shape: generate
 a batch of unique codes, write it out in the formats the surrounding tooling
 expects, and fold new batches into one central code store.

 ## Core Concepts

 - **Job:** the entire batch process, composed of one or more `Step`s run in
   order.
 - **Step:** an independent phase of a job. Chunk-oriented steps read,
   process and write items in chunks; tasklet steps wrap a single unit of
   work such as the store merge.
 - **ItemReader:** retrieval of input for a step, one item at a time. The
   [`CodeGenerator`](item::codes::code_generator::CodeGenerator) is a reader
   that draws unique random codes instead of reading a file.
 - **ItemProcessor:** per-item transformation between reader and writer.
 - **ItemWriter:** output of a step, one chunk at a time.

 ## Features

| **Feature** | **Description**                                             |
|-------------|-------------------------------------------------------------|
| csv         | Enables the CSV `ItemWriter` for tabular exports            |
| json        | Enables the JSON `ItemWriter` for code-keyed batch files    |
| text        | Enables the plain-text `ItemWriter` for code lists          |
| logger      | Enables a logger `ItemWriter`, useful for debugging         |
| full        | Enables all writers                                         |
| cli         | Builds the `redeem-batch` binary                            |

 ## Getting Started

```
use redeem_batch::{
    core::{
        item::{PassThroughProcessor, VecItemWriter},
        job::{Job, JobBuilder},
        step::{StepBuilder, StepStatus},
    },
    item::codes::{CodeRecord, code_generator::CodeGeneratorBuilder},
};

fn main() -> Result<(), redeem_batch::BatchError> {
    let generator = CodeGeneratorBuilder::new()
        .count(5)
        .length(8)
        .batch("batch_demo")
        .build();

    let processor = PassThroughProcessor;
    let writer = VecItemWriter::new();

    let step = StepBuilder::new("generate-codes")
        .chunk::<CodeRecord, CodeRecord>(10)
        .reader(&generator)
        .processor(&processor)
        .writer(&writer)
        .build();

    let job = JobBuilder::new().start(&step).build();
    let result = job.run();

    assert!(result.is_ok());
    let step_execution = job.get_step_execution("generate-codes").unwrap();
    assert_eq!(step_execution.status, StepStatus::Success);
    assert_eq!(writer.len(), 5);

    Ok(())
}
```
*/

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of item readers / writers (code generator, csv, json, text)
pub mod item;

/// The central code store and its merge semantics
pub mod store;

/// Tasklets for work that does not decompose into chunks
pub mod tasklet;
