//! The mining loop. Proof-of-work is CPU-bound, so it runs on a dedicated
//! OS thread rather than a tokio task — parked here on a
//! `std::thread::JoinHandle`. The thread calls back into the async
//! gossip/mempool APIs via a borrowed `tokio::runtime::Handle`.

use std::sync::Arc;
use std::thread::JoinHandle;

use obscura_core::chain::Chain;
use obscura_core::{Block, TxRecord};
use obscura_network::Message;
use tracing::info;

use crate::Node;

/// Spawns the miner thread. Returns its `JoinHandle` so the caller can
/// join on shutdown (daemon-style: the process exiting is what actually
/// stops it).
pub fn spawn_miner(node: Arc<Node>) -> JoinHandle<()> {
    let runtime = tokio::runtime::Handle::current();
    std::thread::spawn(move || mine_loop(node, runtime))
}

fn mine_loop(node: Arc<Node>, runtime: tokio::runtime::Handle) {
    loop {
        std::thread::sleep(node.config.miner_poll_interval);

        let picked = {
            let mempool = runtime.block_on(node.mempool.lock());
            if mempool.is_empty() {
                continue;
            }
            mempool.select_for_block(node.config.block_size_limit - 1)
        };

        let fee_sum: u64 = picked.iter().map(TxRecord::fee).sum();
        let reward = node.config.mining_reward + fee_sum;
        let coinbase = TxRecord::new_coinbase(node.wallet.public_pem(), reward);

        let tip = node.chain.last_block();
        let mut transactions = vec![coinbase];
        transactions.extend(picked.iter().cloned());
        let mut block = Block::new(tip.index + 1, tip.hash.clone(), transactions);

        // Lock-free: PoW runs on this thread-local block without holding
        // any lock, so ingest/gossip handlers are never starved while we
        // search for a nonce.
        Chain::proof_of_work(&mut block, node.config.difficulty);

        match node.chain.add_block(block.clone(), node.config.difficulty) {
            Ok(()) => {
                runtime.block_on(async {
                    let mut mempool = node.mempool.lock().await;
                    for tx in &picked {
                        if let Some(tx_id) = tx.tx_id() {
                            mempool.remove(tx_id);
                        }
                    }
                    drop(mempool);
                    node.persist();
                    node.gossip(&Message::Block(block.to_value())).await;
                });
                info!(index = block.index, "mined a block");
            }
            // The tip moved under us: discard the mined block, leave the
            // picked transactions in the mempool for the next attempt.
            Err(e) => tracing::debug!(error = %e, "mined block rejected, tip moved under us"),
        }
    }
}
