//! Forwarded-header peer resolution for HTTP services.
//!
//! Rewrites a request's peer address from `X-Forwarded-For` and
//! `X-Forwarded-Port`, but only when the direct peer is a trusted proxy.

pub mod config;
pub mod forwarded;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use forwarded::{XffError, XffFilter, XffOptions};
pub use http::{HttpServer, PeerAddr, XffLayer};
pub use lifecycle::Shutdown;
