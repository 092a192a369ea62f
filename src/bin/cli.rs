//! recordkv CLI
//!
//! Command-line interface for inspecting and editing a recordkv store file.

use std::process;

use clap::{Parser, Subcommand};
use recordkv::{Config, Engine, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// recordkv CLI
#[derive(Parser, Debug)]
#[command(name = "recordkv-cli")]
#[command(about = "CLI for recordkv single-file key-value stores")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./recordkv.db")]
    file: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

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

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    Keys,

    /// Show file size and free-space usage
    Stats,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.verbose {
        "info,recordkv=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("recordkv CLI v{}", recordkv::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder().path(&args.file).build();
    let mut store: Engine<String> = Engine::open(config)?;

    match args.command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            store.put(&key, &value)?;
            println!("OK");
        }
        Commands::Del { key } => {
            let removed = store.remove(&key)?;
            println!("{}", if removed { "1" } else { "0" });
        }
        Commands::Keys => {
            for key in store.keys() {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            let stats = store.stats();
            println!("keys:           {}", stats.keys);
            println!("file length:    {}", stats.file_len);
            println!("free intervals: {}", stats.free_intervals);
            println!("free bytes:     {}", stats.free_bytes);
            println!("largest free:   {}", stats.largest_free);
        }
    }

    store.close()
}
