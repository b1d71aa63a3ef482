//! TabKV CLI
//!
//! Offline inspection of transaction log files.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tabkv::txlog::{self, ReplaySummary};
use tabkv::MapStore;

/// TabKV CLI
#[derive(Parser, Debug)]
#[command(name = "tabkv-cli")]
#[command(about = "Inspect TabKV transaction logs")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check decoding and sequence order without loading anything
    Verify {
        /// The log file to check
        path: PathBuf,
    },

    /// Replay a log and print the resulting key-value pairs
    Dump {
        /// The log file to replay
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> tabkv::Result<()> {
    match command {
        Commands::Verify { path } => {
            let summary = txlog::verify(&path)?;
            print_summary(&summary);
        }
        Commands::Dump { path } => {
            let store = MapStore::new();
            let file = File::open(&path)?;
            let summary = txlog::replay_into(BufReader::new(file), &store)?;
            for (key, value) in store.snapshot() {
                println!("{}\t{}", key, value);
            }
            eprintln!("{} keys after {} records", store.len(), summary.records);
        }
    }
    Ok(())
}

fn print_summary(summary: &ReplaySummary) {
    println!("records:       {}", summary.records);
    println!("puts:          {}", summary.puts);
    println!("deletes:       {}", summary.deletes);
    println!("last sequence: {}", summary.last_sequence);
}
