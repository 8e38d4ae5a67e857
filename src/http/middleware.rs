//! Axum middleware form of the forwarded-header filter.
//!
//! Used by the server, where the filter is rebuilt on config reload and
//! swapped in atomically. Each request loads the filter once and keeps it
//! for its whole duration.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::forwarded::XffFilter;
use crate::http::peer::seed_peer_addr;
use crate::observability::metrics;

/// Filter handle replaced wholesale on reload.
pub type SharedFilter = Arc<ArcSwap<XffFilter>>;

pub fn shared_filter(filter: XffFilter) -> SharedFilter {
    Arc::new(ArcSwap::from_pointee(filter))
}

pub async fn xff_middleware(
    State(filter): State<SharedFilter>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let filter = filter.load_full();

    seed_peer_addr(&mut req);
    let resolution = filter.apply(&mut req);
    metrics::record_resolution(resolution);

    next.run(req).await
}
