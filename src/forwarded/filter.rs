//! Forwarded-header filter.
//!
//! Per request:
//! ```text
//! Received → trust check ─ untrusted ─────────────────────→ Delegated
//!                        └ trusted → resolve → compose ──→ Delegated
//! ```
//! The filter never rejects a request. It only decides whether the peer
//! address seen by the next handler is rewritten.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::forwarded::allow_list::AllowList;
use crate::forwarded::chain::{resolve_ip, resolve_port};
use crate::forwarded::compose::{compose, ResolvedPeer};
use crate::forwarded::error::XffError;
use crate::forwarded::trust::is_trusted;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");

/// Construction-time filter options.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct XffOptions {
    /// CIDR ranges of proxies allowed to set forwarded headers.
    /// Empty means every peer is trusted.
    pub allowed_subnets: Vec<String>,
}

/// The request boundary the filter operates on.
pub trait PeerRequest {
    /// All values of header `name` joined with `,`; empty if absent.
    fn header_values(&self, name: &HeaderName) -> String;

    /// Transport peer address, usually `addr:port`.
    fn peer_addr(&self) -> Option<&str>;

    fn set_peer_addr(&mut self, addr: String);
}

/// Which branch the filter took for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Direct peer outside the allow-list; headers ignored.
    Untrusted,
    /// Trusted peer but no usable forwarded address or port.
    Unchanged,
    /// Peer address replaced.
    Rewritten,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Untrusted => "untrusted",
            Resolution::Unchanged => "unchanged",
            Resolution::Rewritten => "rewritten",
        }
    }
}

/// Resolve forwarded headers against `peer` without any trust check.
pub fn resolve_peer(peer: &str, forwarded_for: &str, forwarded_port: &str) -> Option<ResolvedPeer> {
    compose(peer, resolve_ip(forwarded_for), resolve_port(forwarded_port))
}

/// `X-Forwarded-For` / `X-Forwarded-Port` filter with a fixed allow-list.
#[derive(Debug, Clone, Default)]
pub struct XffFilter {
    allow_list: AllowList,
}

impl XffFilter {
    /// Build a filter, failing if any allowed subnet is not a CIDR literal.
    pub fn new(options: &XffOptions) -> Result<Self, XffError> {
        let allow_list = AllowList::build(&options.allowed_subnets)?;

        tracing::info!(
            allowed_subnets = allow_list.len(),
            trust_all = allow_list.is_empty(),
            "Forwarded header filter initialized"
        );

        Ok(Self { allow_list })
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// True if forwarded headers from `peer` are honored.
    pub fn is_trusted(&self, peer: &str) -> bool {
        is_trusted(peer, &self.allow_list)
    }

    /// Trust gate followed by header resolution.
    pub fn resolve(&self, peer: &str, forwarded_for: &str, forwarded_port: &str) -> Option<ResolvedPeer> {
        if !self.is_trusted(peer) {
            return None;
        }
        resolve_peer(peer, forwarded_for, forwarded_port)
    }

    /// Rewrite the request's peer address from its forwarded headers.
    pub fn apply<R: PeerRequest>(&self, req: &mut R) -> Resolution {
        let Some(peer) = req.peer_addr().map(str::to_owned) else {
            tracing::trace!("No peer address on request; forwarded headers ignored");
            return Resolution::Untrusted;
        };

        if !self.is_trusted(&peer) {
            tracing::trace!(peer = %peer, "Untrusted peer; forwarded headers ignored");
            return Resolution::Untrusted;
        }

        let forwarded_for = req.header_values(&X_FORWARDED_FOR);
        let forwarded_port = req.header_values(&X_FORWARDED_PORT);

        match resolve_peer(&peer, &forwarded_for, &forwarded_port) {
            Some(resolved) => {
                let resolved = resolved.to_string();
                tracing::debug!(original = %peer, resolved = %resolved, "Peer address rewritten");
                req.set_peer_addr(resolved);
                Resolution::Rewritten
            }
            None => {
                tracing::trace!(peer = %peer, "No usable forwarded address");
                Resolution::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeRequest {
        headers: HashMap<&'static str, String>,
        peer: Option<String>,
    }

    impl FakeRequest {
        fn new(peer: &str) -> Self {
            Self {
                peer: Some(peer.to_string()),
                ..Default::default()
            }
        }

        fn header(mut self, name: &'static str, value: &str) -> Self {
            self.headers.insert(name, value.to_string());
            self
        }
    }

    impl PeerRequest for FakeRequest {
        fn header_values(&self, name: &HeaderName) -> String {
            self.headers.get(name.as_str()).cloned().unwrap_or_default()
        }

        fn peer_addr(&self) -> Option<&str> {
            self.peer.as_deref()
        }

        fn set_peer_addr(&mut self, addr: String) {
            self.peer = Some(addr);
        }
    }

    fn options(subnets: &[&str]) -> XffOptions {
        XffOptions {
            allowed_subnets: subnets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_new_invalid_cidr() {
        let err = XffFilter::new(&options(&["10.0.0.0/8", "error"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid CIDR address: error");
    }

    #[test]
    fn test_default_trusts_all() {
        let filter = XffFilter::default();
        assert!(filter.allow_list().is_empty());
        assert!(filter.is_trusted("127.0.0.1"));

        let filter = XffFilter::new(&XffOptions::default()).unwrap();
        assert!(filter.is_trusted("127.0.0.1"));
    }

    #[test]
    fn test_allowed_subnets() {
        let filter = XffFilter::new(&options(&["127.0.0.0/16"])).unwrap();
        assert!(filter.is_trusted("127.0.0.1"));
        assert!(!filter.is_trusted("127.1.0.1"));
    }

    #[test]
    fn test_resolve_peer_without_headers() {
        assert_eq!(resolve_peer("1.2.3.4:1234", "", ""), None);
        assert_eq!(resolve_peer("[2001:db8:0:1:1:1:1:1]:1234", "", ""), None);
    }

    #[test]
    fn test_resolve_peer_with_xff() {
        let resolved = resolve_peer("1.2.3.4:1234", "100.0.0.1", "").unwrap();
        assert_eq!(resolved.to_string(), "100.0.0.1:1234");

        let resolved = resolve_peer("1.2.3.4:1234", "2001:db8:0:1:1:1:1:1", "").unwrap();
        assert_eq!(resolved.to_string(), "[2001:db8:0:1:1:1:1:1]:1234");
    }

    #[test]
    fn test_apply_rewrites() {
        let filter = XffFilter::default();
        let mut req = FakeRequest::new("1.2.3.4:1234")
            .header("x-forwarded-for", "192.168.110.162, 190.57.149.90, invalid")
            .header("x-forwarded-port", "8443");

        assert_eq!(filter.apply(&mut req), Resolution::Rewritten);
        assert_eq!(req.peer.as_deref(), Some("190.57.149.90:8443"));
    }

    #[test]
    fn test_apply_unchanged() {
        let filter = XffFilter::default();
        let mut req = FakeRequest::new("1.2.3.4:1234").header("x-forwarded-for", "10.0.0.1, 127.0.0.1");

        assert_eq!(filter.apply(&mut req), Resolution::Unchanged);
        assert_eq!(req.peer.as_deref(), Some("1.2.3.4:1234"));
    }

    #[test]
    fn test_apply_untrusted() {
        let filter = XffFilter::new(&options(&["10.0.0.0/8"])).unwrap();
        let mut req = FakeRequest::new("1.2.3.4:1234").header("x-forwarded-for", "68.45.152.220");

        assert_eq!(filter.apply(&mut req), Resolution::Untrusted);
        assert_eq!(req.peer.as_deref(), Some("1.2.3.4:1234"));

        let mut req = FakeRequest::new("10.20.30.40:1234").header("x-forwarded-for", "68.45.152.220");
        assert_eq!(filter.apply(&mut req), Resolution::Rewritten);
        assert_eq!(req.peer.as_deref(), Some("68.45.152.220:1234"));
    }

    #[test]
    fn test_apply_missing_peer() {
        let filter = XffFilter::default();
        let mut req = FakeRequest::default().header("x-forwarded-for", "68.45.152.220");
        assert_eq!(filter.apply(&mut req), Resolution::Untrusted);
        assert_eq!(req.peer, None);
    }

    #[test]
    fn test_options_from_toml() {
        let opts: XffOptions = toml::from_str(r#"allowed_subnets = ["10.0.0.0/8"]"#).unwrap();
        assert_eq!(opts, options(&["10.0.0.0/8"]));

        let opts: XffOptions = toml::from_str("").unwrap();
        assert!(opts.allowed_subnets.is_empty());
    }
}
