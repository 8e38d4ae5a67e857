//! HTTP binding subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum, ConnectInfo<SocketAddr>)
//!     → peer.rs (seed PeerAddr extension)
//!     → layer.rs / middleware.rs (run forwarded-header filter)
//!     → server.rs (echo handler reads PeerAddr)
//! ```

pub mod layer;
pub mod middleware;
pub mod peer;
pub mod server;

pub use layer::{XffLayer, XffService};
pub use middleware::{shared_filter, xff_middleware, SharedFilter};
pub use peer::{seed_peer_addr, PeerAddr};
pub use server::HttpServer;
