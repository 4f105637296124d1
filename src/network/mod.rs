// Network - Bootstrap list peer discovery on top of libp2p addressing
// Principle: Validate locally, announce repeatedly, never dial

pub mod address;
pub mod bootstrap;
pub mod discovery;
pub mod identity;

pub use address::{matches, parse_candidate, peer_id_str};
pub use bootstrap::{
    prepare_candidate, resolve_candidate, Bootstrap, BootstrapConfig, BootstrapStats,
    DEFAULT_INTERVAL, TAG,
};
pub use discovery::{Diagnostic, DiagnosticKind, DiscoveryError, DiscoveryEvent, DiscoverySource};
pub use identity::{decode_peer_id, DefaultRecordFactory, PeerRecord, RecordFactory};
