//! Trust gate for the direct transport peer.

use std::net::{IpAddr, SocketAddr};

use crate::forwarded::allow_list::AllowList;

/// Decide whether forwarded headers from `peer` are honored.
///
/// `peer` is either a bare address or the transport's `addr:port` form.
/// An empty allow-list trusts every peer; otherwise an unparsable peer is
/// never trusted.
pub fn is_trusted(peer: &str, allow_list: &AllowList) -> bool {
    if allow_list.is_empty() {
        return true;
    }

    match parse_peer_ip(peer) {
        Some(ip) => allow_list.contains(ip),
        None => false,
    }
}

fn parse_peer_ip(peer: &str) -> Option<IpAddr> {
    let peer = peer.trim();
    peer.parse::<IpAddr>()
        .or_else(|_| peer.parse::<SocketAddr>().map(|addr| addr.ip()))
        .ok()
}
