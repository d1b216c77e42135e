//! Error types for the **Obscura** core crate.
//!
//! All high-level operations return [`crate::Result`], a convenient alias
//! for `core::result::Result<T, Error>`. These are validation-time failures
//! (bad signature, insufficient funds, bad linkage) — they are never fatal
//! to the process; callers drop the offending transaction/block and log.
//!
//! # Examples
//!
//! ```
//! use obscura_core::{Error, Result};
//!
//! fn demo_fn(fail: bool) -> Result<()> {
//!     if fail {
//!         Err(Error::DifficultyFail)
//!     } else {
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

/// Core crate error type.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Signature could not be verified against the provided public key.
    #[error("signature verification failed")]
    BadSignature,

    /// Transaction's `tx_id` already appears in the local chain.
    #[error("transaction already present in chain")]
    AlreadyInChain,

    /// Transaction's `tx_id` already appears in the mempool.
    #[error("transaction already present in mempool")]
    AlreadyInMempool,

    /// Sender's effective balance (chain + pending mempool outflows) is
    /// less than `amount + fee`.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// `prev_hash` field does not match the current tip's hash.
    #[error("block previous hash mismatch")]
    PrevHashMismatch,

    /// Block index is not exactly one greater than the current tip's index.
    #[error("block height non-sequential")]
    NonSequentialHeight,

    /// Block hash does not satisfy the difficulty target.
    #[error("difficulty target not met")]
    DifficultyFail,

    /// Recomputing the block's canonical hash does not match its `hash` field.
    #[error("block hash does not match its contents")]
    HashMismatch,

    /// Chain is empty, or its genesis block does not match the canonical one.
    #[error("invalid or missing genesis block")]
    InvalidGenesis,

    /// Coinbase transaction seen outside of block ingestion (e.g. over the
    /// `transaction` gossip path, which must never carry one).
    #[error("coinbase transaction rejected outside block ingestion")]
    UnexpectedCoinbase,

    /// Catch-all for lower-level failures (malformed PEM, bad hex, ...).
    #[error("{0}")]
    Other(String),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
