// Discovery - Common surface shared by every peer discovery source
// Principle: Sources emit independent "peer found" signals, the framework aggregates them

use tokio::sync::broadcast;

use super::identity::PeerRecord;

// =============================================================================
// EVENTS
// =============================================================================

/// Events published by a discovery source
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A peer was found, with the address it was found at attached
    PeerDiscovered(PeerRecord),
}

impl DiscoveryEvent {
    pub fn record(&self) -> &PeerRecord {
        match self {
            DiscoveryEvent::PeerDiscovered(record) => record,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Per-candidate failures during a discovery pass
///
/// None of these are fatal: the candidate is skipped for the current pass and
/// tried again on the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid multiaddr: {0}")]
    InvalidAddressFormat(String),

    #[error("Invalid bootstrap peer id: {0}")]
    IdentityDecodeFailure(String),

    #[error("Peer record construction failed: {0}")]
    RecordConstructionFailure(String),
}

/// Coarse classification of a [`DiscoveryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    InvalidAddressFormat,
    IdentityDecodeFailure,
    RecordConstructionFailure,
}

impl DiscoveryError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DiscoveryError::InvalidAddressFormat(_) => DiagnosticKind::InvalidAddressFormat,
            DiscoveryError::IdentityDecodeFailure(_) => DiagnosticKind::IdentityDecodeFailure,
            DiscoveryError::RecordConstructionFailure(_) => {
                DiagnosticKind::RecordConstructionFailure
            }
        }
    }
}

/// A failure captured for one candidate during one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The candidate address string as configured
    pub candidate: String,

    /// What went wrong
    pub error: DiscoveryError,
}

impl Diagnostic {
    pub fn new(candidate: &str, error: DiscoveryError) -> Self {
        Self {
            candidate: candidate.to_string(),
            error,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.error.kind()
    }
}

// =============================================================================
// DISCOVERY SOURCE
// =============================================================================

/// A source of discovered peers (bootstrap list, DHT, mDNS, ...)
///
/// Lifecycle calls are idempotent. Events are delivered to every receiver
/// obtained from [`DiscoverySource::subscribe`]; there is no acknowledgement
/// and no backpressure towards the source.
pub trait DiscoverySource: Send {
    /// Fixed label for events coming from this source
    fn tag(&self) -> &'static str;

    fn start(&mut self);

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent>;
}
