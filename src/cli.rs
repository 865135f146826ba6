//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for redeem-batch using clap's
//! derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use redeem_batch::store::DEFAULT_STORE_PATH;

/// Redeem-Batch - batch generation and import of redemption codes
#[derive(Parser)]
#[command(name = "redeem-batch")]
#[command(version)]
#[command(about = "Generate, export and import redemption codes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a batch of unique codes and export it as JSON, CSV and TXT
    Generate {
        /// Number of codes to generate
        #[arg(long, default_value_t = 100)]
        count: usize,

        /// Code length in characters
        #[arg(long, default_value_t = 8)]
        length: usize,

        /// Batch name (defaults to a timestamped name)
        #[arg(long)]
        batch: Option<String>,

        /// Output file name prefix
        #[arg(long, default_value = "codes")]
        output: String,
    },

    /// Import a generated batch file into the code store
    Import {
        /// Batch file produced by `generate`
        batch_file: PathBuf,

        /// Store file path
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },

    /// Redeem a code against the store, marking it used
    Redeem {
        /// The code to redeem
        code: String,

        /// Store file path
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },
}
