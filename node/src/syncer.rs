//! Periodic fork resolution. Also invoked ad hoc by
//! `ingest::handle_block` when an inbound block fails to link to the tip.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use obscura_core::{Block, TxRecord};
use rand::Rng;
use tracing::{info, warn};

use crate::Node;

/// Sleeps `sync_interval + U[0, sync_jitter_max)` between rounds, then
/// pulls from every peer in turn.
pub async fn run_syncer(node: Arc<Node>) {
    loop {
        let jitter_max_ms = node.config.sync_jitter_max.as_millis().max(1) as u64;
        let jitter_ms = rand::thread_rng().gen_range(0..jitter_max_ms);
        let sleep_for = node.config.sync_interval + std::time::Duration::from_millis(jitter_ms);
        tokio::time::sleep(sleep_for).await;
        sync_once(&node).await;
    }
}

/// One sync round: pull the chain from every peer and reconcile.
pub async fn sync_once(node: &Node) {
    for peer in &node.peers {
        let blocks = match obscura_network::request_chain(*peer, node.config.chain_pull_timeout).await {
            Ok(b) => b,
            Err(e) => {
                warn!(peer = %peer, error = %e, "chain pull failed, skipping this round");
                continue;
            }
        };
        let parsed: Result<Vec<Block>, _> = blocks.iter().map(Block::from_value).collect();
        match parsed {
            Ok(new_chain) => handle_chain_response(node, new_chain).await,
            Err(e) => warn!(peer = %peer, error = %e, "peer sent a malformed chain, ignoring"),
        }
    }
}

/// Reconciles against an incoming candidate chain: snapshot the old
/// chain, compute the orphan set, replace if longer and valid, purge
/// confirmed transactions from the mempool, reinject orphaned-but-still
/// valid ones, then persist.
pub async fn handle_chain_response(node: &Node, new_chain: Vec<Block>) {
    let old_chain = node.chain.get_chain_copy();
    let old_tx_map: HashMap<String, TxRecord> = old_chain
        .iter()
        .skip(1)
        .flat_map(|b| b.transactions.iter())
        .filter_map(|tx| tx.tx_id().map(|id| (id.to_string(), tx.clone())))
        .collect();
    let new_tx_ids: HashSet<String> = new_chain
        .iter()
        .skip(1)
        .flat_map(|b| b.transactions.iter())
        .filter_map(|tx| tx.tx_id().map(str::to_string))
        .collect();

    if let Err(e) = node.chain.replace_chain(new_chain, node.config.difficulty) {
        info!(reason = %e, "did not adopt peer's chain");
        return;
    }
    info!("adopted a longer chain from a peer");

    let mut mempool = node.mempool.lock().await;
    for tx_id in new_tx_ids.iter() {
        mempool.remove(tx_id);
    }
    for (tx_id, tx) in old_tx_map.iter() {
        if new_tx_ids.contains(tx_id) || mempool.contains(tx_id) {
            continue;
        }
        if node.chain.validate_for_mempool(tx, &mempool, node.config.starting_balance).is_ok() {
            mempool.insert(tx.clone());
        }
    }
    drop(mempool);

    node.persist();
}

#[cfg(test)]
mod tests {
    use super::*;
    use obscura_core::chain::Chain;
    use obscura_core::{Config, Keypair};
    use obscura_wallet::Wallet;
    use tempfile::tempdir;

    fn mine(mut block: Block, difficulty: usize) -> Block {
        Chain::proof_of_work(&mut block, difficulty);
        block
    }

    const TEST_DIFFICULTY: usize = 1;

    async fn test_node() -> Node {
        let dir = tempdir().unwrap();
        let wallet = Wallet::load_or_generate(dir.path()).unwrap();
        let config = Config { difficulty: TEST_DIFFICULTY, ..Config::default() };
        Node {
            name: "test".into(),
            port: 0,
            dir: dir.into_path(),
            is_miner: false,
            peers: vec![],
            config,
            chain: Chain::new(),
            mempool: tokio::sync::Mutex::new(obscura_core::Mempool::new()),
            wallet,
        }
    }

    #[tokio::test]
    async fn orphaned_transaction_is_reinjected_when_still_funded() {
        let node = test_node().await;
        let difficulty = TEST_DIFFICULTY;

        let sender = Keypair::generate();
        let orphan_tx = TxRecord::new_signed(&sender, "receiver".into(), 5, 0);
        let local_b1 = mine(Block::new(1, Block::genesis().hash, vec![orphan_tx.clone()]), difficulty);
        assert!(node.chain.add_block(local_b1, difficulty).is_ok());

        // competing chain, longer, does not contain orphan_tx
        let fork_b1 = mine(Block::new(1, Block::genesis().hash, vec![]), difficulty);
        let fork_b2 = mine(Block::new(2, fork_b1.hash.clone(), vec![]), difficulty);
        let new_chain = vec![Block::genesis(), fork_b1, fork_b2];

        handle_chain_response(&node, new_chain).await;

        let mempool = node.mempool.lock().await;
        assert!(mempool.contains(orphan_tx.tx_id().unwrap()));
    }

    #[tokio::test]
    async fn shorter_incoming_chain_is_ignored() {
        let node = test_node().await;
        let difficulty = TEST_DIFFICULTY;

        let b1 = mine(Block::new(1, Block::genesis().hash, vec![]), difficulty);
        assert!(node.chain.add_block(b1, difficulty).is_ok());
        let before = node.chain.get_chain_copy();

        handle_chain_response(&node, vec![Block::genesis()]).await;
        assert_eq!(node.chain.get_chain_copy(), before);
    }
}
