use std::{collections::HashSet, fs};

use time::OffsetDateTime;

use redeem_batch::{
    core::{
        item::{PassThroughProcessor, VecItemWriter},
        job::{Job, JobBuilder},
        step::{StepBuilder, StepStatus},
    },
    item::codes::{CodeMetadata, CodeRecord, code_generator::CodeGeneratorBuilder},
    item::json::json_writer::JsonCodeWriterBuilder,
    store::{CodeStore, Redemption},
    tasklet::import::ImportTaskletBuilder,
};

fn metadata(batch: &str, used: bool) -> CodeMetadata {
    CodeMetadata {
        used,
        created_at: OffsetDateTime::UNIX_EPOCH,
        batch: batch.to_string(),
    }
}

fn run_import(batch_path: &std::path::Path, store_path: &std::path::Path) -> Result<(), ()> {
    let tasklet = ImportTaskletBuilder::new()
        .source_path(batch_path)
        .store_path(store_path)
        .build()
        .expect("tasklet should build");

    let step = StepBuilder::new("import-codes").tasklet(&tasklet).build();

    let job = JobBuilder::new().start(&step).build();
    match job.run() {
        Ok(_) => {
            let step_execution = job.get_step_execution("import-codes").unwrap();
            assert_eq!(step_execution.status, StepStatus::Success);
            Ok(())
        }
        Err(_) => Err(()),
    }
}

#[test]
fn import_keeps_existing_keys_and_overwrites_shared_ones() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let batch_path = dir.path().join("batch.json");
    let store_path = dir.path().join("data").join("codes.json");

    let mut existing = CodeStore::new();
    existing.insert("AAAA2222".to_string(), metadata("batch_old", true));
    existing.insert("BBBB3333".to_string(), metadata("batch_old", false));
    existing.save(&store_path)?;

    let mut batch = CodeStore::new();
    batch.insert("BBBB3333".to_string(), metadata("batch_new", false));
    batch.insert("CCCC4444".to_string(), metadata("batch_new", false));
    batch.save(&batch_path)?;

    assert!(run_import(&batch_path, &store_path).is_ok());

    let store = CodeStore::load(&store_path)?;
    assert_eq!(store.len(), 3);

    // Pre-existing key not in the batch survives untouched.
    let untouched = store.get("AAAA2222").unwrap();
    assert_eq!(untouched.batch, "batch_old");
    assert!(untouched.used);

    // Shared key takes the batch's record.
    assert_eq!(store.get("BBBB3333").unwrap().batch, "batch_new");
    assert_eq!(store.get("CCCC4444").unwrap().batch, "batch_new");

    Ok(())
}

#[test]
fn import_into_missing_store_creates_it() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let batch_path = dir.path().join("batch.json");
    let store_path = dir.path().join("data").join("codes.json");

    let mut batch = CodeStore::new();
    batch.insert("AAAA2222".to_string(), metadata("batch_a", false));
    batch.save(&batch_path)?;

    assert!(run_import(&batch_path, &store_path).is_ok());

    let store = CodeStore::load(&store_path)?;
    assert_eq!(store.len(), 1);

    Ok(())
}

#[test]
fn import_with_missing_batch_file_fails_the_job() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    assert!(run_import(&dir.path().join("nope.json"), &dir.path().join("codes.json")).is_err());

    Ok(())
}

#[test]
fn malformed_store_is_rebuilt_from_the_batch() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let batch_path = dir.path().join("batch.json");
    let store_path = dir.path().join("codes.json");

    fs::write(&store_path, "{definitely not json")?;

    let mut batch = CodeStore::new();
    batch.insert("AAAA2222".to_string(), metadata("batch_a", false));
    batch.save(&batch_path)?;

    assert!(run_import(&batch_path, &store_path).is_ok());

    let store = CodeStore::load(&store_path)?;
    assert_eq!(store.len(), 1);
    assert!(store.contains("AAAA2222"));

    Ok(())
}

#[test]
fn exported_batch_round_trips_into_the_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let batch_path = dir.path().join("batch.json");
    let store_path = dir.path().join("data").join("codes.json");

    // Seed the store with one pre-existing code.
    let mut existing = CodeStore::new();
    existing.insert("ZZZZ9999".to_string(), metadata("batch_seed", false));
    existing.save(&store_path)?;

    // Generate a batch and export it the way the CLI does.
    let generator = CodeGeneratorBuilder::new()
        .count(10)
        .length(8)
        .batch("batch_roundtrip")
        .build();
    let processor = PassThroughProcessor;
    let collector = VecItemWriter::new();

    let generate_step = StepBuilder::new("generate-codes")
        .chunk::<CodeRecord, CodeRecord>(4)
        .reader(&generator)
        .processor(&processor)
        .writer(&collector)
        .build();

    let json_writer = JsonCodeWriterBuilder::new().from_path(&batch_path);
    let generated: Vec<CodeRecord>;
    {
        let job = JobBuilder::new().start(&generate_step).build();
        assert!(job.run().is_ok());
        generated = collector.get_items();

        let export_reader = redeem_batch::core::item::VecItemReader::new(generated.clone());
        let export_step = StepBuilder::new("export-json")
            .chunk::<CodeRecord, CodeRecord>(4)
            .reader(&export_reader)
            .processor(&processor)
            .writer(&json_writer)
            .build();
        let job = JobBuilder::new().start(&export_step).build();
        assert!(job.run().is_ok());
    }

    assert!(run_import(&batch_path, &store_path).is_ok());

    // The store's code set is the union of both inputs.
    let store = CodeStore::load(&store_path)?;
    let mut expected: HashSet<String> = generated.iter().map(|r| r.code.clone()).collect();
    expected.insert("ZZZZ9999".to_string());

    let actual: HashSet<String> = store.codes().map(str::to_string).collect();
    assert_eq!(actual, expected);
    assert_eq!(store.len(), 11);

    Ok(())
}

#[test]
fn imported_codes_can_be_redeemed_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let batch_path = dir.path().join("batch.json");
    let store_path = dir.path().join("codes.json");

    let mut batch = CodeStore::new();
    batch.insert("AAAA2222".to_string(), metadata("batch_a", false));
    batch.save(&batch_path)?;

    assert!(run_import(&batch_path, &store_path).is_ok());

    let mut store = CodeStore::load(&store_path)?;
    assert_eq!(store.redeem("AAAA2222"), Redemption::Accepted);
    store.save(&store_path)?;

    let mut reloaded = CodeStore::load(&store_path)?;
    assert_eq!(reloaded.redeem("AAAA2222"), Redemption::AlreadyUsed);

    Ok(())
}
