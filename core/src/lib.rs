//! Obscura Core Library
//!
//! Data model, canonical hashing/signing, the chain engine, mempool and
//! proof-of-work for a small permissionless replicated ledger. Networking,
//! persistence orchestration and the mining/sync loops live in
//! `obscura-node`; this crate only defines the pieces that must agree
//! byte-for-byte across every node on the network.

pub mod block;
pub mod canonical;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod mempool;
pub mod pow;
pub mod tx;

pub use block::Block;
pub use chain::Chain;
pub use config::Config;
pub use crypto::Keypair;
pub use error::{Error, Result};
pub use mempool::Mempool;
pub use tx::TxRecord;

/// Sentinel used in place of a public key / signature for miner-minted
/// coinbase transactions. Never a valid PEM-encoded key or hex signature.
pub const COINBASE: &str = "COINBASE";

/// Returns the current UNIX timestamp in seconds, as the floating-point
/// value the wire format and canonical hash expect.
pub fn now_ts() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before 1970")
        .as_secs_f64()
}
