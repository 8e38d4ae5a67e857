//! Subnet allow-list for proxies whose forwarded headers are honored.
//!
//! # Design Decisions
//! - Built once from CIDR literals; construction is all-or-nothing
//! - Entries are truncated to their network address on build
//! - Membership is plain prefix containment; IPv4-mapped peers match IPv4 ranges

use std::net::IpAddr;

use ipnet::IpNet;

use crate::forwarded::classify::normalize;
use crate::forwarded::error::XffError;

/// Immutable, ordered set of CIDR ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ranges: Vec<IpNet>,
}

impl AllowList {
    /// Compile CIDR literals, failing on the first invalid entry.
    pub fn build<I, S>(cidrs: I) -> Result<Self, XffError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = cidrs
            .into_iter()
            .map(|cidr| {
                let cidr = cidr.as_ref();
                cidr.trim()
                    .parse::<IpNet>()
                    .map(|net| net.trunc())
                    .map_err(|source| XffError::InvalidCidr {
                        cidr: cidr.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ranges })
    }

    /// True if `ip` lies within any configured range. Always false when empty.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = normalize(ip);
        self.ranges.iter().any(|net| net.contains(&ip))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpNet> {
        self.ranges.iter()
    }
}
