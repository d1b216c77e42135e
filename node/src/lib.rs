//! Node orchestration: ties `obscura-core`'s chain/mempool engine to
//! `obscura-network`'s wire transport, plus the miner and syncer
//! background tasks and the on-disk chain/keypair snapshots.
//!
//! `Node` holds its `Chain` directly rather than behind an extra lock:
//! `Chain` already serializes its own readers/writers internally, and a
//! `tokio::sync::Mutex<Mempool>` is the one coarse lock that serializes
//! joint chain-plus-mempool mutations (block ingestion, mining).

pub mod error;
pub mod ingest;
pub mod miner;
pub mod persistence;
pub mod syncer;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use obscura_core::{Chain, Config};
use obscura_network::Message;
use obscura_wallet::Wallet;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub use error::{NodeError, Result};

/// Shared node state. Cheap to clone via `Arc<Node>` — every background
/// task and connection handler holds one.
pub struct Node {
    pub name: String,
    pub port: u16,
    pub dir: PathBuf,
    pub is_miner: bool,
    pub peers: Vec<SocketAddr>,
    pub config: Config,
    pub chain: Chain,
    pub mempool: Mutex<obscura_core::Mempool>,
    pub wallet: Wallet,
}

impl Node {
    /// Loads wallet and chain from `dir` (or initializes fresh state),
    /// binding no sockets yet — call [`Node::run`] to start serving.
    pub fn bootstrap(
        name: String,
        port: u16,
        dir: PathBuf,
        is_miner: bool,
        peers: Vec<SocketAddr>,
        config: Config,
    ) -> Result<Arc<Node>> {
        std::fs::create_dir_all(&dir)?;
        let wallet = Wallet::load_or_generate(&dir)?;
        let chain = persistence::load_chain(&dir, config.difficulty).unwrap_or_else(Chain::new);
        info!(name = %name, port, pubkey = %wallet.public_pem(), chain_len = chain.len(), "node bootstrapped");
        Ok(Arc::new(Node {
            name,
            port,
            dir,
            is_miner,
            peers,
            config,
            chain,
            mempool: Mutex::new(obscura_core::Mempool::new()),
            wallet,
        }))
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }

    pub fn persist(&self) {
        if let Err(e) = persistence::save_chain(&self.dir, &self.chain) {
            warn!(error = %e, "failed to snapshot chain to disk");
        }
    }

    /// Starts the listener, syncer, and (if configured) miner tasks. Runs
    /// until the process is interrupted; on return the caller should call
    /// [`Node::persist`] once more.
    pub async fn run(self: Arc<Node>) -> Result<()> {
        let listener = obscura_network::bind(self.addr()).await?;
        info!(addr = %self.addr(), "listening");

        let accept_node = self.clone();
        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        let node = accept_node.clone();
                        tokio::spawn(async move {
                            if let Err(e) = ingest::handle_connection(&node, stream).await {
                                warn!(peer = %peer_addr, error = %e, "connection handling failed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                }
            }
        });

        let syncer_node = self.clone();
        let syncer_task = tokio::spawn(async move { syncer::run_syncer(syncer_node).await });

        let miner_handle = if self.is_miner { Some(miner::spawn_miner(self.clone())) } else { None };

        let _ = tokio::join!(accept_task, syncer_task);
        if let Some(handle) = miner_handle {
            let _ = handle.join();
        }
        Ok(())
    }

    /// Gossips `message` to every configured peer, fire-and-forget.
    /// Unreachable peers are logged and skipped.
    pub async fn gossip(&self, message: &Message) {
        for peer in &self.peers {
            if let Err(e) = obscura_network::send_gossip(*peer, message, self.config.gossip_timeout).await {
                warn!(peer = %peer, error = %e, "gossip send failed");
            }
        }
    }
}
