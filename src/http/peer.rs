//! Peer address carried on the request.
//!
//! Axum has no writable "remote address" field, so the peer address lives in
//! a request extension. It is seeded from `ConnectInfo<SocketAddr>` and may
//! then be overwritten by the forwarded-header filter.

use std::fmt;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderName, Request, StatusCode},
};

use crate::forwarded::PeerRequest;

/// The request's peer address, `addr:port` with IPv6 bracketed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr(pub String);

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insert `PeerAddr` from the connection info if nothing set it yet.
pub fn seed_peer_addr<B>(req: &mut Request<B>) {
    if req.extensions().get::<PeerAddr>().is_some() {
        return;
    }

    let addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    match addr {
        Some(addr) => {
            req.extensions_mut().insert(PeerAddr(addr));
        }
        None => tracing::warn!("No connection info on request; peer address unknown"),
    }
}

impl<B> PeerRequest for Request<B> {
    fn header_values(&self, name: &HeaderName) -> String {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn peer_addr(&self) -> Option<&str> {
        self.extensions().get::<PeerAddr>().map(|peer| peer.0.as_str())
    }

    fn set_peer_addr(&mut self, addr: String) {
        self.extensions_mut().insert(PeerAddr(addr));
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PeerAddr {
    type Rejection = (StatusCode, &'static str);

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .extensions
            .get::<PeerAddr>()
            .cloned()
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| PeerAddr(addr.to_string()))
            })
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Peer address unavailable"));
        std::future::ready(result)
    }
}
