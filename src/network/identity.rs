// Identity - Peer identity decoding and discovered peer records
// Principle: A record is built fresh for every emission, nothing is cached

use async_trait::async_trait;
use libp2p::identity::PublicKey;
use libp2p::{Multiaddr, PeerId};
use std::str::FromStr;
use std::time::Instant;

use super::discovery::DiscoveryError;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Multihash code for peer ids that inline the public key
const MULTIHASH_IDENTITY_CODE: u8 = 0x00;

/// Multihash code for peer ids derived by hashing the public key
const MULTIHASH_SHA256_CODE: u8 = 0x12;

// =============================================================================
// PEER RECORD
// =============================================================================

/// A discovered peer: its identity plus the addresses it can be found at
#[derive(Debug, Clone)]
pub struct PeerRecord {
    /// Peer ID
    pub id: PeerId,

    /// Public key, when the peer id inlines it
    pub public_key: Option<PublicKey>,

    /// Multiaddrs for this peer
    pub addresses: Vec<Multiaddr>,

    /// When this record was built
    pub created_at: Instant,
}

impl PeerRecord {
    /// Create a record with no addresses attached yet
    pub fn new(id: PeerId) -> Self {
        Self {
            id,
            public_key: None,
            addresses: Vec::new(),
            created_at: Instant::now(),
        }
    }

    /// Attach an address the peer was found at
    pub fn add_address(&mut self, addr: Multiaddr) {
        if !self.addresses.contains(&addr) {
            self.addresses.push(addr);
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a base58 peer identity string
pub fn decode_peer_id(encoded: &str) -> Result<PeerId, DiscoveryError> {
    PeerId::from_str(encoded)
        .map_err(|e| DiscoveryError::IdentityDecodeFailure(format!("{}: {}", encoded, e)))
}

/// Recover the public key inlined in a peer id, if any
///
/// SHA-256 peer ids carry no key and yield `None`. Identity peer ids must
/// carry a decodable key that hashes back to the same peer id.
pub fn inline_public_key(peer_id: &PeerId) -> Result<Option<PublicKey>, DiscoveryError> {
    let bytes = peer_id.to_bytes();

    match bytes.split_first() {
        Some((&MULTIHASH_SHA256_CODE, _)) => Ok(None),
        Some((&MULTIHASH_IDENTITY_CODE, rest)) => {
            // rest[0] is the digest length
            let digest = rest.get(1..).ok_or_else(|| {
                DiscoveryError::RecordConstructionFailure(format!("{}: empty digest", peer_id))
            })?;

            let key = PublicKey::try_decode_protobuf(digest).map_err(|e| {
                DiscoveryError::RecordConstructionFailure(format!("{}: {}", peer_id, e))
            })?;

            if PeerId::from_public_key(&key) != *peer_id {
                return Err(DiscoveryError::RecordConstructionFailure(format!(
                    "{}: inlined key does not match peer id",
                    peer_id
                )));
            }

            Ok(Some(key))
        }
        _ => Err(DiscoveryError::RecordConstructionFailure(format!(
            "{}: unsupported multihash",
            peer_id
        ))),
    }
}

// =============================================================================
// RECORD FACTORY
// =============================================================================

/// Builds the record emitted for a decoded peer identity
///
/// Construction may suspend and may fail; a failure only skips the candidate
/// for the current pass.
#[async_trait]
pub trait RecordFactory: Send + Sync {
    async fn create(&self, peer_id: PeerId) -> Result<PeerRecord, DiscoveryError>;
}

/// Record factory backed by libp2p identity decoding
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecordFactory;

#[async_trait]
impl RecordFactory for DefaultRecordFactory {
    async fn create(&self, peer_id: PeerId) -> Result<PeerRecord, DiscoveryError> {
        let public_key = inline_public_key(&peer_id)?;

        let mut record = PeerRecord::new(peer_id);
        record.public_key = public_key;
        Ok(record)
    }
}

// =============================================================================
// TESTS
// =============================================================================
