use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use redeem_batch::{
    core::{
        item::{PassThroughProcessor, VecItemReader, VecItemWriter},
        job::{Job, JobBuilder},
        step::StepBuilder,
    },
    item::{
        codes::{
            CodeKeyProcessor, CodeRecord, code_generator::CodeGeneratorBuilder,
            default_batch_name, timestamp_slug,
        },
        csv::csv_writer::CsvItemWriterBuilder,
        json::json_writer::JsonCodeWriterBuilder,
        text::text_writer::TextItemWriterBuilder,
    },
    store::{CodeStore, Redemption},
    tasklet::import::ImportTaskletBuilder,
};

mod cli;

use cli::{Cli, Commands};

const CHUNK_SIZE: u16 = 50;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            count,
            length,
            batch,
            output,
        } => run_generate(count, length, batch, &output),
        Commands::Import { batch_file, store } => run_import(&batch_file, &store),
        Commands::Redeem { code, store } => run_redeem(&code, &store),
    }
}

fn run_generate(
    count: usize,
    length: usize,
    batch: Option<String>,
    output: &str,
) -> anyhow::Result<()> {
    let batch_name = batch.unwrap_or_else(default_batch_name);

    println!("Generating {count} codes of length {length} for batch {batch_name}...");

    // Materialize the batch once so all three exports describe the same codes.
    let generator = CodeGeneratorBuilder::new()
        .count(count)
        .length(length)
        .batch(&batch_name)
        .build();
    let pass_through = PassThroughProcessor;
    let collector = VecItemWriter::new();

    let generate_step = StepBuilder::new("generate-codes")
        .chunk::<CodeRecord, CodeRecord>(CHUNK_SIZE)
        .reader(&generator)
        .processor(&pass_through)
        .writer(&collector)
        .build();

    JobBuilder::new()
        .name("generate".to_string())
        .start(&generate_step)
        .build()
        .run()
        .context("code generation failed")?;

    let records = collector.get_items();

    let slug = timestamp_slug();
    let json_path = PathBuf::from(format!("{output}_{slug}.json"));
    let csv_path = PathBuf::from(format!("{output}_{slug}.csv"));
    let txt_path = PathBuf::from(format!("{output}_{slug}.txt"));

    let json_reader = VecItemReader::new(records.clone());
    let json_writer = JsonCodeWriterBuilder::new()
        .pretty_formatter(true)
        .from_path(&json_path);
    let json_step = StepBuilder::new("export-json")
        .chunk::<CodeRecord, CodeRecord>(CHUNK_SIZE)
        .reader(&json_reader)
        .processor(&pass_through)
        .writer(&json_writer)
        .build();

    let csv_reader = VecItemReader::new(records.clone());
    let csv_writer = CsvItemWriterBuilder::new()
        .has_headers(true)
        .from_path(&csv_path);
    let csv_step = StepBuilder::new("export-csv")
        .chunk::<CodeRecord, CodeRecord>(CHUNK_SIZE)
        .reader(&csv_reader)
        .processor(&pass_through)
        .writer(&csv_writer)
        .build();

    let txt_reader = VecItemReader::new(records.clone());
    let key_processor = CodeKeyProcessor;
    let txt_writer = TextItemWriterBuilder::new().from_path(&txt_path);
    let txt_step = StepBuilder::new("export-txt")
        .chunk::<CodeRecord, String>(CHUNK_SIZE)
        .reader(&txt_reader)
        .processor(&key_processor)
        .writer(&txt_writer)
        .build();

    JobBuilder::new()
        .name("export".to_string())
        .start(&json_step)
        .next(&csv_step)
        .next(&txt_step)
        .build()
        .run()
        .context("batch export failed")?;

    println!("Generated {} codes.", records.len());
    println!("Files:");
    println!("  - {} (for importing into the store)", json_path.display());
    println!("  - {} (for spreadsheets)", csv_path.display());
    println!("  - {} (plain list)", txt_path.display());

    let sample: Vec<&str> = records.iter().take(5).map(|r| r.code.as_str()).collect();
    println!("Sample codes: {}", sample.join(", "));

    Ok(())
}

fn run_import(batch_file: &Path, store_path: &Path) -> anyhow::Result<()> {
    let tasklet = ImportTaskletBuilder::new()
        .source_path(batch_file)
        .store_path(store_path)
        .build()?;

    let import_step = StepBuilder::new("import-codes").tasklet(&tasklet).build();

    JobBuilder::new()
        .name("import".to_string())
        .start(&import_step)
        .build()
        .run()
        .with_context(|| format!("import of {} failed", batch_file.display()))?;

    let store = CodeStore::load(store_path)?;
    println!(
        "Import complete: {} now holds {} codes.",
        store_path.display(),
        store.len()
    );

    let sample: Vec<&str> = store.codes().take(5).collect();
    println!("Sample codes: {}", sample.join(", "));

    Ok(())
}

fn run_redeem(code: &str, store_path: &Path) -> anyhow::Result<()> {
    let mut store = CodeStore::load(store_path)
        .with_context(|| format!("cannot open store {}", store_path.display()))?;

    match store.redeem(code) {
        Redemption::NotFound => bail!("code {code} is not in the store"),
        Redemption::AlreadyUsed => bail!("code {code} has already been redeemed"),
        Redemption::Accepted => {
            store.save(store_path)?;
            info!("Code {} marked as used", code);
            println!("Code {code} redeemed.");
            Ok(())
        }
    }
}
