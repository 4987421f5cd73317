//! Filegate simulation binary.
//!
//! # Usage
//!
//! ```bash
//! # Prompt for the client count, use ./file1.txt
//! filegate
//!
//! # Five clients, wait for notifications before polling the gate
//! filegate --clients 5 --await-acks-ms 100
//! ```

use std::{io::Write, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use filegate_core::{AckPolicy, Coordinator};
use filegate_sim::{
    DEFAULT_FILE_NAME, FileAuditSink, FsStorage, SimConfig, Simulation, SystemEnv,
    report::{prompt_client_count, write_deferred_report},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated coordinated access to a shared file
#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(about = "Simulate coordinated shared-file access by concurrent clients")]
#[command(version)]
struct Args {
    /// Number of clients (prompted on stdin when omitted)
    #[arg(short, long)]
    clients: Option<usize>,

    /// File every client opens, relative to the data directory
    #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
    file: String,

    /// Directory holding the shared files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Append-only audit log
    #[arg(long, default_value = "file_access.log")]
    audit_log: PathBuf,

    /// Space-time diagram output
    #[arg(long, default_value = "spacetime_diagram.txt")]
    diagram: PathBuf,

    /// Wait up to this many milliseconds for peer notifications before
    /// polling the gate (default: do not wait)
    #[arg(long)]
    await_acks_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let client_count = match args.clients {
        Some(count) => count,
        None => prompt_client_count(&mut std::io::stdin().lock(), &mut std::io::stdout().lock())?,
    };

    let ack_policy = args.await_acks_ms.map_or(AckPolicy::FireAndForget, |ms| {
        AckPolicy::AwaitNotifications { timeout: Duration::from_millis(ms) }
    });

    let config = SimConfig { client_count, file_name: args.file, ack_policy };

    tracing::info!("Starting {} clients on {}", config.client_count, config.file_name);

    let storage = FsStorage::new(args.data_dir);
    let audit = FileAuditSink::open(&args.audit_log)?;
    let coordinator = Arc::new(Coordinator::new(config.coordinator_config(), storage, audit));

    let report = Simulation::new(config, coordinator, SystemEnv::new()).run().await?;

    std::fs::write(&args.diagram, report.diagram.render())?;

    let mut stdout = std::io::stdout().lock();
    write_deferred_report(&mut stdout, &report.deferred)?;
    stdout.flush()?;

    Ok(())
}
