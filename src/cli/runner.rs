// Runner - Bootstrap source execution logic
// Principle: Orchestrate emitter startup, event logging, and graceful shutdown

use crate::network::{
    resolve_candidate, Bootstrap, BootstrapConfig, BootstrapStats, DefaultRecordFactory,
    DiscoveryError, DiscoveryEvent, PeerRecord,
};
use futures::future::join_all;
use std::future::Future;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Run the bootstrap source until Ctrl+C
pub async fn run_bootstrap(config: BootstrapConfig) -> Result<BootstrapStats, RunnerError> {
    run_until(config, signal::ctrl_c()).await
}

/// Run the bootstrap source until `shutdown` resolves
pub async fn run_until<F>(
    config: BootstrapConfig,
    shutdown: F,
) -> Result<BootstrapStats, RunnerError>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut bootstrap = Bootstrap::new(config);
    let mut events = bootstrap.subscribe();

    bootstrap.start();
    info!("✅ Bootstrap source started");

    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            // Handle shutdown signals
            signal = &mut shutdown => {
                match signal {
                    Ok(()) => {
                        info!("⚠️  Shutdown requested, stopping bootstrap source...");
                        break Ok(());
                    }
                    Err(e) => break Err(RunnerError::Signal(e.to_string())),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => log_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event log lagging, skipped {} discovered peers", skipped);
                    }
                    Err(RecvError::Closed) => break Ok(()),
                }
            }
        }
    };

    bootstrap.stop();

    let stats = bootstrap.stats();
    info!(
        "👋 Bootstrap stopped after {} passes: {} peers emitted, {} candidates rejected",
        stats.passes, stats.peers_emitted, stats.candidates_rejected
    );

    result.map(|()| stats)
}

fn log_event(event: &DiscoveryEvent) {
    let record = event.record();
    for addr in &record.addresses {
        info!("📡 Discovered peer {} at {}", record.id, addr);
    }
    if record.addresses.is_empty() {
        debug!("📡 Discovered peer {} without address", record.id);
    }
}

/// Outcome of resolving one bootnode
#[derive(Debug)]
pub struct CheckReport {
    pub candidate: String,
    pub result: Result<PeerRecord, DiscoveryError>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Resolve every bootnode once, concurrently, in list order
pub async fn check_bootstrap(config: &BootstrapConfig) -> Vec<CheckReport> {
    let factory = DefaultRecordFactory;

    let results = join_all(
        config
            .list
            .iter()
            .map(|candidate| resolve_candidate(candidate, &factory)),
    )
    .await;

    config
        .list
        .iter()
        .cloned()
        .zip(results)
        .map(|(candidate, result)| CheckReport { candidate, result })
        .collect()
}

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Signal error: {0}")]
    Signal(String),
}
