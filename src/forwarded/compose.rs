//! Peer address composition.
//!
//! # Responsibilities
//! - Split the transport's `host:port` string
//! - Merge a forwarded address and/or port with the original peer
//! - Render `host:port`, bracketing IPv6 hosts

use std::fmt;
use std::net::IpAddr;

/// Final peer identity of a request whose address or port was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeer {
    pub host: String,
    pub port: String,
}

impl fmt::Display for ResolvedPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Merge forwarded values into the original peer.
///
/// Returns `None` when the peer must be left exactly as it is: nothing was
/// forwarded, or only one part was and `original` has no `host:port` shape.
pub fn compose(original: &str, ip: Option<IpAddr>, port: Option<u16>) -> Option<ResolvedPeer> {
    match (ip, port) {
        (None, None) => None,
        (Some(ip), Some(port)) => Some(ResolvedPeer {
            host: ip.to_string(),
            port: port.to_string(),
        }),
        (ip, port) => {
            let (orig_host, orig_port) = split_host_port(original)?;
            Some(ResolvedPeer {
                host: ip.map_or_else(|| orig_host.to_string(), |ip| ip.to_string()),
                port: port.map_or_else(|| orig_port.to_string(), |port| port.to_string()),
            })
        }
    }
}

/// Split `host:port` or `[host]:port`.
///
/// Unbracketed hosts containing `:` are rejected since the port boundary is
/// ambiguous.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        let port = after.strip_prefix(':')?;
        if host.contains('[') || port.contains('[') || port.contains(']') {
            return None;
        }
        return Some((host, port));
    }

    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') || port.contains(']') {
        return None;
    }
    Some((host, port))
}
