//! heapkv CLI
//!
//! Command-line interface for inspecting and editing a heap file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use heapkv::record::HeapReplay;
use heapkv::{HeapError, Store, StoreConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// heapkv CLI
#[derive(Parser, Debug)]
#[command(name = "heapkv-cli")]
#[command(about = "CLI for the heapkv key-value heap")]
#[command(version)]
struct Args {
    /// Heap file
    #[arg(short, long, default_value = "./heap.db")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// List all live keys
    Keys,

    /// Check every record's checksum without opening the store
    Verify,

    /// Rewrite the heap keeping only live records
    Compact,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,heapkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(HeapError::NotFound) => {
            eprintln!("(not found)");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> heapkv::Result<()> {
    if let Commands::Verify = args.command {
        let stats = HeapReplay::verify(&args.file)?;
        println!(
            "ok: {} records, {} live keys, {} superseded, {} bytes",
            stats.records_replayed, stats.live_keys, stats.superseded_records, stats.bytes_replayed
        );
        return Ok(());
    }

    let create = matches!(args.command, Commands::Set { .. });
    let config = StoreConfig::builder()
        .path(&args.file)
        .create_if_missing(create)
        .build();
    let store = Store::with_config(config)?;

    match args.command {
        Commands::Get { key } => println!("{}", store.get(&key)?),
        Commands::Set { key, value } => store.set(&key, &value)?,
        Commands::Keys => {
            for key in store.iter_keys() {
                println!("{}", key);
            }
        }
        Commands::Compact => {
            let stats = store.compact()?;
            println!(
                "compacted: {} live records, {} -> {} bytes ({} reclaimed)",
                stats.live_records,
                stats.bytes_before,
                stats.bytes_after,
                stats.bytes_reclaimed()
            );
        }
        Commands::Verify => unreachable!("handled above"),
    }

    store.close()
}
