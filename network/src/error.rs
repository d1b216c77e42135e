//! Error type for the wire layer. Mirrors the `PeerUnreachable`/
//! `InvalidMessage` categories of the node-level error taxonomy, but stays
//! local to transport concerns — `obscura-node` wraps these into its own
//! `NodeError`.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("malformed message: {0}")]
    InvalidMessage(String),

    #[error("peer unreachable")]
    PeerUnreachable(#[source] std::io::Error),

    #[error("operation timed out")]
    Timeout,
}

pub type Result<T> = core::result::Result<T, Error>;
