//! Tower layer applying the forwarded-header filter.
//!
//! # Responsibilities
//! - Seed the peer address from connection info
//! - Run the filter, then call the inner service exactly once
//!
//! # Design Decisions
//! - The inner service is the "next handler"; its future is returned as-is
//! - The filter is shared via `Arc`, never cloned per request

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::forwarded::XffFilter;
use crate::http::peer::seed_peer_addr;
use crate::observability::metrics;

/// Layer wrapping services with [`XffService`].
#[derive(Debug, Clone)]
pub struct XffLayer {
    filter: Arc<XffFilter>,
}

impl XffLayer {
    pub fn new(filter: XffFilter) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl<S> Layer<S> for XffLayer {
    type Service = XffService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        XffService {
            inner,
            filter: self.filter.clone(),
        }
    }
}

/// Service rewriting the peer address before delegating to `inner`.
#[derive(Debug, Clone)]
pub struct XffService<S> {
    inner: S,
    filter: Arc<XffFilter>,
}

impl<S, B> Service<Request<B>> for XffService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        seed_peer_addr(&mut req);
        let resolution = self.filter.apply(&mut req);
        metrics::record_resolution(resolution);
        self.inner.call(req)
    }
}
