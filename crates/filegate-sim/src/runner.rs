//! Client runner.
//!
//! Spawns one task per client. Each task runs open, write, read, close in
//! order. A failed open leaves the client inert; a failed write or read is
//! logged and the client moves on to its next step.

use std::sync::Arc;

use filegate_core::{AuditSink, ClientId, Coordinator, Environment, Storage};
use tokio::task::JoinSet;

use crate::{
    SimConfig,
    diagram::{ClientSpan, SpaceTimeDiagram},
    error::SimError,
};

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Client spans in completion order.
    pub diagram: SpaceTimeDiagram,
    /// Drained deferred operation labels.
    pub deferred: Vec<String>,
}

/// One run of the shared-file scenario.
pub struct Simulation<S, A, E> {
    config: SimConfig,
    coordinator: Arc<Coordinator<S, A>>,
    env: E,
}

impl<S, A, E> Simulation<S, A, E>
where
    S: Storage,
    A: AuditSink,
    E: Environment,
{
    /// Prepare a run against `coordinator`.
    pub fn new(config: SimConfig, coordinator: Arc<Coordinator<S, A>>, env: E) -> Self {
        Self { config, coordinator, env }
    }

    /// Coordinator shared by all clients.
    pub fn coordinator(&self) -> &Arc<Coordinator<S, A>> {
        &self.coordinator
    }

    /// Run every client to completion and drain the deferred queue.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Internal` if a client task panics.
    pub async fn run(&self) -> Result<RunReport, SimError> {
        let mut diagram = SpaceTimeDiagram::new(self.env.now());
        let mut clients = JoinSet::new();

        for client_id in 1..=self.config.client_count as ClientId {
            clients.spawn(run_client(
                Arc::clone(&self.coordinator),
                self.env.clone(),
                client_id,
                self.config.file_name.clone(),
            ));
        }

        while let Some(joined) = clients.join_next().await {
            let span = joined.map_err(|e| SimError::Internal(format!("client task: {e}")))?;
            if let Some(span) = span {
                diagram.record(span);
            }
        }

        tracing::info!(
            "{} clients finished, {} operations completed",
            self.config.client_count,
            self.coordinator.audit().len()
        );

        Ok(RunReport { diagram, deferred: self.coordinator.drain_deferred() })
    }
}

async fn run_client<S, A, E>(
    coordinator: Arc<Coordinator<S, A>>,
    env: E,
    client_id: ClientId,
    file_name: String,
) -> Option<ClientSpan>
where
    S: Storage,
    A: AuditSink,
    E: Environment,
{
    let file = match coordinator.open_file(client_id, &file_name) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Client {} has no handle for {}: {}", client_id, file_name, e);
            return None;
        },
    };

    let start = env.now();

    if let Err(e) =
        coordinator.write_file(client_id, &file, SimConfig::content_for(client_id)).await
    {
        tracing::warn!("Client {} write failed: {}", client_id, e);
    }

    if let Err(e) = coordinator.read_file(client_id, &file).await {
        tracing::warn!("Client {} read failed: {}", client_id, e);
    }

    coordinator.close_file(&file);

    Some(ClientSpan { client_id, start, end: env.now() })
}

impl<S, A, E> std::fmt::Debug for Simulation<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation").field("config", &self.config).finish_non_exhaustive()
    }
}
