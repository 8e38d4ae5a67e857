//! Filter construction errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XffError {
    /// An allowed-subnet entry is not a CIDR literal.
    #[error("invalid CIDR address: {cidr}")]
    InvalidCidr {
        cidr: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}
