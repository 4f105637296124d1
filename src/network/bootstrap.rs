// Bootstrap - Re-announce a fixed list of bootnodes on a timer
// Principle: Every valid entry is emitted on every pass, failures are local and retried next pass

use libp2p::{Multiaddr, PeerId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::address;
use super::discovery::{Diagnostic, DiscoveryError, DiscoveryEvent, DiscoverySource};
use super::identity::{self, DefaultRecordFactory, PeerRecord, RecordFactory};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Source label used by the aggregating discovery framework
pub const TAG: &str = "bootstrap";

/// Default time between discovery passes
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10_000);

/// Buffered events per subscriber before it starts lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Buffered diagnostics per receiver before it starts lagging
pub const DIAGNOSTIC_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Bootstrap source configuration, captured once at construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Candidate bootnode multiaddrs
    /// Format: /ip4/<IP>/tcp/<PORT>/p2p/<PEER_ID>
    #[serde(default)]
    pub list: Vec<String>,

    /// Milliseconds between passes; absent or 0 means the default
    #[serde(default)]
    pub interval: Option<u64>,
}

impl BootstrapConfig {
    pub fn new(list: Vec<String>) -> Self {
        Self {
            list,
            interval: None,
        }
    }

    pub fn with_interval_ms(mut self, interval: u64) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Effective interval between passes
    pub fn interval(&self) -> Duration {
        match self.interval {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => DEFAULT_INTERVAL,
        }
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Cumulative counters over the lifetime of an emitter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapStats {
    /// Discovery passes started
    pub passes: u64,

    /// Peer records emitted
    pub peers_emitted: u64,

    /// Candidate resolutions that failed
    pub candidates_rejected: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    passes: AtomicU64,
    peers_emitted: AtomicU64,
    candidates_rejected: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> BootstrapStats {
        BootstrapStats {
            passes: self.passes.load(Ordering::Relaxed),
            peers_emitted: self.peers_emitted.load(Ordering::Relaxed),
            candidates_rejected: self.candidates_rejected.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// CANDIDATE RESOLUTION
// =============================================================================

/// Validate a candidate and decode the peer identity it embeds
pub fn prepare_candidate(candidate: &str) -> Result<(Multiaddr, PeerId), DiscoveryError> {
    let addr = address::parse_candidate(candidate)?;

    let encoded = address::peer_id_str(&addr).ok_or_else(|| {
        DiscoveryError::IdentityDecodeFailure(format!("{}: no peer id in multiaddr", candidate))
    })?;
    let peer_id = identity::decode_peer_id(&encoded)?;

    Ok((addr, peer_id))
}

/// Resolve a candidate all the way to an emittable record
pub async fn resolve_candidate(
    candidate: &str,
    factory: &dyn RecordFactory,
) -> Result<PeerRecord, DiscoveryError> {
    let (addr, peer_id) = prepare_candidate(candidate)?;

    let mut record = factory.create(peer_id).await?;
    record.add_address(addr);
    Ok(record)
}

// =============================================================================
// DISCOVERY PASS
// =============================================================================

/// State shared by the timer task and every in-flight resolution
struct Shared {
    list: Arc<[String]>,
    factory: Arc<dyn RecordFactory>,
    events: broadcast::Sender<DiscoveryEvent>,
    diagnostics: broadcast::Sender<Diagnostic>,
    stats: StatCounters,
}

impl Shared {
    /// Run one pass over the candidate list
    ///
    /// Validation happens inline; record construction is spawned per
    /// candidate and never awaited here, so a slow peer only delays its own
    /// emission. Must be called from within a tokio runtime.
    fn run_pass(self: &Arc<Self>) {
        let pass = self.stats.passes.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("🔍 Bootstrap pass #{} over {} candidates", pass, self.list.len());

        for candidate in self.list.iter() {
            let (addr, peer_id) = match prepare_candidate(candidate) {
                Ok(prepared) => prepared,
                Err(e) => {
                    self.report(candidate, e);
                    continue;
                }
            };

            let shared = Arc::clone(self);
            let candidate = candidate.clone();
            tokio::spawn(async move {
                match shared.factory.create(peer_id).await {
                    Ok(mut record) => {
                        record.add_address(addr);
                        shared.emit(record);
                    }
                    Err(e) => shared.report(&candidate, e),
                }
            });
        }
    }

    fn emit(&self, record: PeerRecord) {
        self.stats.peers_emitted.fetch_add(1, Ordering::Relaxed);
        debug!("📡 Bootstrap peer discovered: {}", record.id);

        // No subscribers is fine, the event is simply dropped
        let _ = self.events.send(DiscoveryEvent::PeerDiscovered(record));
    }

    fn report(&self, candidate: &str, e: DiscoveryError) {
        self.stats.candidates_rejected.fetch_add(1, Ordering::Relaxed);

        match e {
            DiscoveryError::InvalidAddressFormat(_) => warn!("Skipping bootnode: {}", e),
            _ => error!("Skipping bootnode {}: {}", candidate, e),
        }

        let _ = self.diagnostics.send(Diagnostic::new(candidate, e));
    }
}

// =============================================================================
// BOOTSTRAP EMITTER
// =============================================================================

/// Static discovery source announcing a fixed bootnode list
///
/// `start` runs one pass immediately and then one per interval until `stop`.
/// Peers are re-announced on every pass; nothing is deduplicated.
/// Resolutions already in flight when `stop` is called may still emit.
pub struct Bootstrap {
    shared: Arc<Shared>,

    interval: Duration,

    /// Recurring pass schedule, present while running
    timer: Option<JoinHandle<()>>,
}

impl Bootstrap {
    /// Create an idle emitter using libp2p identity decoding
    pub fn new(config: BootstrapConfig) -> Self {
        Self::with_factory(config, Arc::new(DefaultRecordFactory))
    }

    /// Create an idle emitter with a custom record factory
    pub fn with_factory(config: BootstrapConfig, factory: Arc<dyn RecordFactory>) -> Self {
        let interval = config.interval();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (diagnostics, _) = broadcast::channel(DIAGNOSTIC_CHANNEL_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                list: config.list.into(),
                factory,
                events,
                diagnostics,
                stats: StatCounters::default(),
            }),
            interval,
            timer: None,
        }
    }

    /// Start emitting; no-op when already running
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        info!(
            "🔄 Starting bootstrap discovery: {} bootnodes every {:?}",
            self.shared.list.len(),
            self.interval
        );

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                shared.run_pass();
            }
        }));

        self.shared.run_pass();
    }

    /// Stop emitting; no-op when idle
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("🛑 Bootstrap discovery stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Register a new subscriber for discovered peers
    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.shared.events.subscribe()
    }

    /// Register a new receiver for per-candidate failures
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.shared.diagnostics.subscribe()
    }

    pub fn stats(&self) -> BootstrapStats {
        self.shared.stats.snapshot()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn candidates(&self) -> &[String] {
        &self.shared.list
    }
}

impl DiscoverySource for Bootstrap {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn start(&mut self) {
        Bootstrap::start(self)
    }

    fn stop(&mut self) {
        Bootstrap::stop(self)
    }

    fn is_running(&self) -> bool {
        Bootstrap::is_running(self)
    }

    fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        Bootstrap::subscribe(self)
    }
}

impl Drop for Bootstrap {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
