//! End-to-end runs against the filesystem.
//!
//! Each test runs the full client scenario in a temporary data directory
//! and checks the audit log file, the stored file, the diagram and the
//! deferred report.

use std::{path::Path, sync::Arc};

use filegate_core::{AckPolicy, Coordinator};
use filegate_sim::{
    FileAuditSink, FsStorage, RunReport, SimConfig, SimError, Simulation, SystemEnv,
    report::write_deferred_report,
};

async fn run_in(dir: &Path, config: SimConfig) -> Result<RunReport, SimError> {
    let storage = FsStorage::new(dir);
    let audit = FileAuditSink::open(dir.join("file_access.log"))?;
    let coordinator = Arc::new(Coordinator::new(config.coordinator_config(), storage, audit));
    Simulation::new(config, coordinator, SystemEnv::new()).run().await
}

fn audit_lines(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("file_access.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn three_clients_share_one_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file1.txt"), "seed").unwrap();

    let report = run_in(dir.path(), SimConfig::default()).await.unwrap();

    let lines = audit_lines(dir.path());
    assert_eq!(lines.len(), 6);
    assert_eq!(lines.iter().filter(|l| l.contains(" Write file file1.txt ")).count(), 3);
    assert_eq!(lines.iter().filter(|l| l.contains(" Read file file1.txt ")).count(), 3);

    let mut timestamps: Vec<u64> =
        lines.iter().map(|l| l.rsplit(' ').next().unwrap().parse().unwrap()).collect();
    timestamps.sort_unstable();
    assert_eq!(timestamps, (1..=6).collect::<Vec<_>>());

    // Oracle: audit lines are in ledger order, so the last Write line names
    // the final content
    let last_writer = lines
        .iter()
        .rev()
        .find(|l| l.contains(" Write "))
        .and_then(|l| l.split(' ').nth(1))
        .unwrap();
    let stored = std::fs::read_to_string(dir.path().join("file1.txt")).unwrap();
    assert_eq!(stored, format!("Content written by Client {last_writer}"));

    assert_eq!(report.diagram.spans().len(), 3);
    assert_eq!(report.deferred.len(), 6);
    assert_eq!(report.deferred.iter().filter(|l| l.starts_with("Write by Client ")).count(), 3);

    let mut out = Vec::new();
    write_deferred_report(&mut out, &report.deferred).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Deferred Array Operations:\n1. "));
    assert!(printed.contains("\n6. "));
}

#[tokio::test]
async fn missing_file_makes_every_client_inert() {
    let dir = tempfile::tempdir().unwrap();

    let report = run_in(dir.path(), SimConfig::default()).await.unwrap();

    assert!(audit_lines(dir.path()).is_empty());
    assert!(report.deferred.is_empty());
    assert!(report.diagram.spans().is_empty());
    assert_eq!(report.diagram.render(), "");
    assert!(!dir.path().join("file1.txt").exists());
}

#[tokio::test]
async fn audit_log_accumulates_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shared.txt"), "").unwrap();

    let config = SimConfig {
        client_count: 2,
        file_name: "shared.txt".to_string(),
        ack_policy: AckPolicy::FireAndForget,
    };
    run_in(dir.path(), config.clone()).await.unwrap();
    run_in(dir.path(), config).await.unwrap();

    let lines = audit_lines(dir.path());
    assert_eq!(lines.len(), 8);
    // Each run has its own clock
    assert_eq!(lines.iter().filter(|l| l.ends_with(" at timestamp 1")).count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn awaited_policy_completes_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file1.txt"), "").unwrap();

    let config = SimConfig {
        client_count: 5,
        ack_policy: AckPolicy::AwaitNotifications {
            timeout: std::time::Duration::from_secs(5),
        },
        ..SimConfig::default()
    };
    let report = run_in(dir.path(), config).await.unwrap();

    assert_eq!(audit_lines(dir.path()).len(), 10);
    assert_eq!(report.deferred.len(), 10);
    assert_eq!(report.diagram.spans().len(), 5);
}
