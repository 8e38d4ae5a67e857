//! Public vs. private address classification.
//!
//! # Responsibilities
//! - Decide whether a parsed address may identify an Internet-facing client
//!
//! # Design Decisions
//! - Anything that is not global unicast is private
//! - Reserved ranges are compile-time constants, never mutated
//! - IPv4-mapped IPv6 addresses are judged by their IPv4 form

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{Ipv4Net, Ipv6Net};

/// IPv4 private ranges (RFC 1918).
const RESERVED_V4: [Ipv4Net; 3] = [
    Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 8),
    Ipv4Net::new_assert(Ipv4Addr::new(172, 16, 0, 0), 12),
    Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 0, 0), 16),
];

/// IPv6 unique-local range (RFC 4193).
const RESERVED_V6: [Ipv6Net; 1] = [Ipv6Net::new_assert(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7)];

/// Routability of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    /// Globally routable; eligible to be reported as the client address.
    Public,
    /// Loopback, link-local, multicast, unspecified or a reserved private range.
    Private,
}

impl AddressClass {
    pub fn is_public(self) -> bool {
        self == AddressClass::Public
    }
}

/// Classify an address.
pub fn classify(ip: IpAddr) -> AddressClass {
    let public = match normalize(ip) {
        IpAddr::V4(v4) => is_global_unicast_v4(v4) && !RESERVED_V4.iter().any(|net| net.contains(&v4)),
        IpAddr::V6(v6) => is_global_unicast_v6(v6) && !RESERVED_V6.iter().any(|net| net.contains(&v6)),
    };

    if public {
        AddressClass::Public
    } else {
        AddressClass::Private
    }
}

/// Unwrap IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) to plain IPv4.
pub(crate) fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

fn is_global_unicast_v4(ip: Ipv4Addr) -> bool {
    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast())
}

fn is_global_unicast_v6(ip: Ipv6Addr) -> bool {
    // fe80::/10
    let link_local = (ip.segments()[0] & 0xffc0) == 0xfe80;
    !(ip.is_unspecified() || ip.is_loopback() || ip.is_multicast() || link_local)
}
