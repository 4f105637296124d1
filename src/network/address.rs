// Address - Bootnode multiaddr validation and peer identity extraction
// Principle: Only addresses that carry a peer identity can seed discovery

use libp2p::multiaddr::Protocol;
use libp2p::Multiaddr;
use std::str::FromStr;

use super::discovery::DiscoveryError;

// =============================================================================
// PROTOCOL TAGS
// =============================================================================

/// Protocol component of a multiaddr, reduced to its name.
///
/// The grammar only cares about the shape of an address, never the values
/// (IPs, ports, hostnames) carried by each component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolTag {
    Ip4,
    Ip6,
    Dns,
    Dns4,
    Dns6,
    Dnsaddr,
    Tcp,
    Udp,
    Utp,
    Quic,
    QuicV1,
    Ws,
    Wss,
    Http,
    Https,
    P2p,
    P2pCircuit,
    P2pWebRtcStar,
    P2pWebRtcDirect,
    /// Anything the grammar has no production for
    Other,
}

impl From<&Protocol<'_>> for ProtocolTag {
    fn from(protocol: &Protocol<'_>) -> Self {
        match protocol {
            Protocol::Ip4(_) => ProtocolTag::Ip4,
            Protocol::Ip6(_) => ProtocolTag::Ip6,
            Protocol::Dns(_) => ProtocolTag::Dns,
            Protocol::Dns4(_) => ProtocolTag::Dns4,
            Protocol::Dns6(_) => ProtocolTag::Dns6,
            Protocol::Dnsaddr(_) => ProtocolTag::Dnsaddr,
            Protocol::Tcp(_) => ProtocolTag::Tcp,
            Protocol::Udp(_) => ProtocolTag::Udp,
            Protocol::Utp => ProtocolTag::Utp,
            Protocol::Quic => ProtocolTag::Quic,
            Protocol::QuicV1 => ProtocolTag::QuicV1,
            Protocol::Ws(_) => ProtocolTag::Ws,
            Protocol::Wss(_) => ProtocolTag::Wss,
            Protocol::Http => ProtocolTag::Http,
            Protocol::Https => ProtocolTag::Https,
            Protocol::P2p(_) => ProtocolTag::P2p,
            Protocol::P2pCircuit => ProtocolTag::P2pCircuit,
            Protocol::P2pWebRtcStar => ProtocolTag::P2pWebRtcStar,
            Protocol::P2pWebRtcDirect => ProtocolTag::P2pWebRtcDirect,
            _ => ProtocolTag::Other,
        }
    }
}

/// Reduce a multiaddr to its sequence of protocol tags
pub fn protocol_tags(addr: &Multiaddr) -> Vec<ProtocolTag> {
    addr.iter().map(|p| ProtocolTag::from(&p)).collect()
}

// =============================================================================
// GRAMMAR
// =============================================================================
//
// Each production consumes a prefix of the tag sequence and returns what is
// left. Alternatives are tried in order and the first one that matches wins;
// a sequence never goes back to try another alternative of a sub-production.

type Rest<'a> = Option<&'a [ProtocolTag]>;

fn tag(input: &[ProtocolTag], want: ProtocolTag) -> Rest<'_> {
    match input.split_first() {
        Some((first, rest)) if *first == want => Some(rest),
        _ => None,
    }
}

fn any_of<'a>(input: &'a [ProtocolTag], tags: &[ProtocolTag]) -> Rest<'a> {
    tags.iter().find_map(|t| tag(input, *t))
}

fn dns(input: &[ProtocolTag]) -> Rest<'_> {
    any_of(
        input,
        &[ProtocolTag::Dns, ProtocolTag::Dnsaddr, ProtocolTag::Dns4, ProtocolTag::Dns6],
    )
}

fn ip(input: &[ProtocolTag]) -> Rest<'_> {
    any_of(input, &[ProtocolTag::Ip4, ProtocolTag::Ip6])
}

fn tcp(input: &[ProtocolTag]) -> Rest<'_> {
    ip(input)
        .and_then(|r| tag(r, ProtocolTag::Tcp))
        .or_else(|| dns(input).and_then(|r| tag(r, ProtocolTag::Tcp)))
}

fn udp(input: &[ProtocolTag]) -> Rest<'_> {
    ip(input).and_then(|r| tag(r, ProtocolTag::Udp))
}

fn utp(input: &[ProtocolTag]) -> Rest<'_> {
    udp(input).and_then(|r| tag(r, ProtocolTag::Utp))
}

fn quic(input: &[ProtocolTag]) -> Rest<'_> {
    udp(input)
        .and_then(|r| tag(r, ProtocolTag::Quic))
        .or_else(|| udp(input).and_then(|r| tag(r, ProtocolTag::QuicV1)))
}

/// `TCP <tag> | DNS <tag>` (websockets)
fn over_tcp_or_dns(input: &[ProtocolTag], want: ProtocolTag) -> Rest<'_> {
    tcp(input)
        .and_then(|r| tag(r, want))
        .or_else(|| dns(input).and_then(|r| tag(r, want)))
}

/// `TCP <tag> | IP <tag> | DNS <tag>` (http)
fn over_any_host(input: &[ProtocolTag], want: ProtocolTag) -> Rest<'_> {
    tcp(input)
        .and_then(|r| tag(r, want))
        .or_else(|| ip(input).and_then(|r| tag(r, want)))
        .or_else(|| dns(input).and_then(|r| tag(r, want)))
}

fn websockets(input: &[ProtocolTag]) -> Rest<'_> {
    over_tcp_or_dns(input, ProtocolTag::Ws)
}

fn websockets_secure(input: &[ProtocolTag]) -> Rest<'_> {
    over_tcp_or_dns(input, ProtocolTag::Wss)
}

fn http(input: &[ProtocolTag]) -> Rest<'_> {
    over_any_host(input, ProtocolTag::Http)
}

fn https(input: &[ProtocolTag]) -> Rest<'_> {
    over_any_host(input, ProtocolTag::Https)
}

fn star_peer(input: &[ProtocolTag]) -> Rest<'_> {
    tag(input, ProtocolTag::P2pWebRtcStar).and_then(|r| tag(r, ProtocolTag::P2p))
}

fn webrtc_star(input: &[ProtocolTag]) -> Rest<'_> {
    websockets(input)
        .and_then(star_peer)
        .or_else(|| websockets_secure(input).and_then(star_peer))
}

fn webrtc_direct(input: &[ProtocolTag]) -> Rest<'_> {
    http(input)
        .and_then(|r| tag(r, ProtocolTag::P2pWebRtcDirect))
        .or_else(|| https(input).and_then(|r| tag(r, ProtocolTag::P2pWebRtcDirect)))
}

fn reliable(input: &[ProtocolTag]) -> Rest<'_> {
    websockets(input)
        .or_else(|| websockets_secure(input))
        .or_else(|| http(input))
        .or_else(|| https(input))
        .or_else(|| webrtc_star(input))
        .or_else(|| webrtc_direct(input))
        .or_else(|| tcp(input))
        .or_else(|| utp(input))
        .or_else(|| quic(input))
        .or_else(|| dns(input))
}

/// A transport terminated by a peer identity
fn peer(input: &[ProtocolTag]) -> Rest<'_> {
    reliable(input)
        .and_then(|r| tag(r, ProtocolTag::P2p))
        .or_else(|| webrtc_star(input))
        .or_else(|| tag(input, ProtocolTag::P2p))
}

fn relay(input: &[ProtocolTag]) -> Rest<'_> {
    tag(input, ProtocolTag::P2pCircuit)
}

/// A single relay hop
fn hop(input: &[ProtocolTag]) -> Rest<'_> {
    peer(input)
        .and_then(relay)
        .and_then(peer)
        .or_else(|| peer(input).and_then(relay))
        .or_else(|| relay(input).and_then(peer))
        .or_else(|| reliable(input).and_then(relay))
        .or_else(|| relay(input).and_then(reliable))
        .or_else(|| relay(input))
}

/// One or more hops; every hop consumes at least one tag
fn circuit(input: &[ProtocolTag]) -> Rest<'_> {
    let rest = hop(input)?;
    circuit(rest).or(Some(rest))
}

fn p2p_address(input: &[ProtocolTag]) -> Rest<'_> {
    circuit(input)
        .and_then(peer)
        .and_then(circuit)
        .or_else(|| peer(input).and_then(circuit))
        .or_else(|| circuit(input).and_then(peer))
        .or_else(|| circuit(input))
        .or_else(|| peer(input))
}

/// Check whether a tag sequence is a complete peer-identity-bearing address
pub fn matches_tags(tags: &[ProtocolTag]) -> bool {
    matches!(p2p_address(tags), Some(rest) if rest.is_empty())
}

// =============================================================================
// VALIDATION & PARSING
// =============================================================================

/// Check whether a candidate string is a peer-identity-bearing multiaddr
///
/// Text that does not parse as a multiaddr never matches.
pub fn matches(candidate: &str) -> bool {
    match Multiaddr::from_str(candidate) {
        Ok(addr) => matches_tags(&protocol_tags(&addr)),
        Err(_) => false,
    }
}

/// Validate a candidate and parse it into a structured multiaddr
///
/// Format: /ip4/<IP>/tcp/<PORT>/p2p/<PEER_ID> (or any other shape the grammar accepts)
pub fn parse_candidate(candidate: &str) -> Result<Multiaddr, DiscoveryError> {
    let addr = Multiaddr::from_str(candidate)
        .map_err(|e| DiscoveryError::InvalidAddressFormat(format!("{}: {}", candidate, e)))?;

    if !matches_tags(&protocol_tags(&addr)) {
        return Err(DiscoveryError::InvalidAddressFormat(format!(
            "{}: not a peer address",
            candidate
        )));
    }

    Ok(addr)
}

/// Textual peer identity embedded in a multiaddr
///
/// When an address names several peers (relayed addresses), the last one is
/// the destination.
pub fn peer_id_str(addr: &Multiaddr) -> Option<String> {
    addr.iter()
        .filter_map(|proto| match proto {
            Protocol::P2p(peer_id) => Some(peer_id.to_base58()),
            _ => None,
        })
        .last()
}

// =============================================================================
// TESTS
// =============================================================================
