//! TabKV Server Binary
//!
//! Replays the transaction log and serves the HTTP API.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tabkv::network::Server;
use tabkv::{Config, Engine, SyncStrategy};
use tokio::sync::oneshot;
use tracing_subscriber::{fmt, EnvFilter};

/// TabKV Server
#[derive(Parser, Debug)]
#[command(name = "tabkv-server")]
#[command(about = "Key-value store over HTTP backed by a transaction log")]
#[command(version)]
struct Args {
    /// Transaction log file
    #[arg(short = 'f', long, default_value = "./transactions.log")]
    log_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Pending-write queue capacity
    #[arg(short, long, default_value = "16")]
    queue_capacity: usize,

    /// Sync strategy: os, every-write or every-n:<N>
    #[arg(short, long, default_value = "os")]
    sync: SyncStrategy,

    /// How long shutdown waits for queued records to drain
    #[arg(long, default_value = "5000")]
    close_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tabkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("TabKV Server v{}", tabkv::VERSION);
    tracing::info!("Transaction log: {}", args.log_file);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .log_path(&args.log_file)
        .listen_addr(&args.listen)
        .queue_capacity(args.queue_capacity)
        .sync_strategy(args.sync)
        .close_timeout_ms(args.close_timeout_ms)
        .build();

    // Open engine; a corrupt log stops us here
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Engine initialized at sequence {}",
        engine.current_sequence()
    );

    // Forward the log's one-shot failure into the async world. The receiver
    // disconnects once the appender exits, which ends this thread.
    let failures = engine.failures();
    let (failed_tx, failed_rx) = oneshot::channel();
    std::thread::spawn(move || {
        if let Ok(err) = failures.recv() {
            let _ = failed_tx.send(err);
        }
    });

    let halted = Arc::new(AtomicBool::new(false));
    let halted_flag = Arc::clone(&halted);
    let shutdown = async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            Ok(err) = failed_rx => {
                tracing::error!("Durability lost, shutting down: {}", err);
                halted_flag.store(true, Ordering::Release);
            }
        }
    };

    let server = Server::new(&config.listen_addr, Arc::clone(&engine));
    let served = server.run(shutdown).await;

    if let Err(e) = engine.close() {
        tracing::warn!("Closing transaction log: {}", e);
    }

    if let Err(e) = served {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    if halted.load(Ordering::Acquire) {
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}
