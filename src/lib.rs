// KratOs Bootstrap - Static peer discovery source
// Principle: A fixed bootnode list is just another discovery source

pub mod cli;
pub mod network;

#[cfg(test)]
mod tests;

pub use network::{
    Bootstrap, BootstrapConfig, BootstrapStats, Diagnostic, DiagnosticKind, DiscoveryError,
    DiscoveryEvent, DiscoverySource, PeerRecord, RecordFactory, TAG,
};
