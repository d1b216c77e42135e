//! Node-level error taxonomy: a thin wrapper over lower-layer errors so
//! call sites can match on the handling-policy category while the
//! underlying detail survives via `#[source]`.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum NodeError {
    /// Malformed JSON or unknown message `type`. Connection closed, logged,
    /// ignored.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Bad signature, duplicate, or insufficient funds. Dropped without
    /// propagating.
    #[error("invalid transaction")]
    InvalidTransaction(#[source] obscura_core::Error),

    /// Bad hash, bad link, or bad difficulty. Dropped; a link mismatch
    /// additionally triggers a pull-sync.
    #[error("invalid block")]
    InvalidBlock(#[source] obscura_core::Error),

    /// Connect/read/write failure reaching a peer. Skip that peer this
    /// round; the periodic syncer is the recovery mechanism.
    #[error("peer unreachable")]
    PeerUnreachable(#[from] obscura_network::Error),

    /// Corrupt on-disk chain snapshot. Logged; the node continues with a
    /// genesis-only chain.
    #[error("chain snapshot failed to load: {0}")]
    ChainLoadFailure(String),

    /// Keypair could not be loaded or generated. Fatal at startup.
    #[error("keypair load failure")]
    KeypairLoadFailure(#[from] obscura_wallet::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, NodeError>;
