//! Forwarded-header trust and resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (direct peer + X-Forwarded-* headers)
//!     → trust.rs (is the direct peer inside the allow-list?)
//!         no  → peer address left untouched
//!         yes → chain.rs (first public address / first valid port)
//!             → compose.rs (merge with original peer address)
//!             → peer address overwritten
//!     → next handler (always)
//! ```
//!
//! # Design Decisions
//! - Fail closed on trust: an unparsable direct peer is never trusted
//! - Fail open on parse: malformed forwarded tokens are skipped, never rejected
//! - Allow-list is compiled once and shared read-only between requests
//! - No per-request state survives the request

pub mod allow_list;
pub mod chain;
pub mod classify;
pub mod compose;
pub mod error;
pub mod filter;
pub mod trust;

pub use allow_list::AllowList;
pub use chain::{resolve_ip, resolve_port};
pub use classify::{classify, AddressClass};
pub use compose::{compose, split_host_port, ResolvedPeer};
pub use error::XffError;
pub use filter::{
    resolve_peer, PeerRequest, Resolution, XffFilter, XffOptions, X_FORWARDED_FOR,
    X_FORWARDED_PORT,
};
pub use trust::is_trusted;
