use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use obscura_core::{Config, TxRecord};
use obscura_network::{send_gossip, Message};
use obscura_node::{ingest, Node};
use tempfile::tempdir;

fn test_config(difficulty: usize) -> Config {
    Config {
        difficulty,
        miner_poll_interval: Duration::from_millis(20),
        sync_interval: Duration::from_millis(100),
        sync_jitter_max: Duration::from_millis(50),
        gossip_timeout: Duration::from_secs(1),
        chain_pull_timeout: Duration::from_secs(1),
        ..Config::default()
    }
}

async fn spawn(name: &str, port: u16, peer_ports: &[u16], is_miner: bool, difficulty: usize) -> Arc<Node> {
    let dir = tempdir().unwrap().into_path();
    let peers: Vec<SocketAddr> = peer_ports.iter().map(|p| SocketAddr::from(([127, 0, 0, 1], *p))).collect();
    let node = Node::bootstrap(name.to_string(), port, dir, is_miner, peers, test_config(difficulty)).unwrap();
    let runner = node.clone();
    tokio::spawn(async move {
        let _ = runner.run().await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    node
}

async fn wait_until(deadline_secs: u64, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(deadline_secs);
    loop {
        if check() {
            return;
        }
        assert!(tokio::time::Instant::now() < deadline, "condition never became true");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// A single miner mines a single pending transaction and both nodes
/// converge on the resulting balances.
#[tokio::test(flavor = "multi_thread")]
async fn single_miner_single_transaction_converges_balances() {
    let difficulty = 1;
    let miner = spawn("M", 19101, &[19102], true, difficulty).await;
    let sender = spawn("N", 19102, &[19101], false, difficulty).await;

    let request = Message::CreateTransaction { receiver_pubkey: miner.wallet.public_pem(), amount: 10, fee: 1 };
    send_gossip(sender.addr(), &request, Duration::from_secs(1)).await.unwrap();

    wait_until(15, || miner.chain.len() >= 2 && sender.chain.len() >= 2).await;

    assert_eq!(miner.chain.get_balance(&miner.wallet.public_pem(), 100), 121);
    assert_eq!(sender.chain.get_balance(&sender.wallet.public_pem(), 100), 89);
}

/// An under-funded transaction never enters the mempool and the chain
/// never grows.
#[tokio::test(flavor = "multi_thread")]
async fn insufficient_funds_never_enters_mempool() {
    let difficulty = 1;
    let miner = spawn("M2", 19201, &[19202], true, difficulty).await;
    let sender = spawn("N2", 19202, &[19201], false, difficulty).await;

    let request = Message::CreateTransaction { receiver_pubkey: miner.wallet.public_pem(), amount: 200, fee: 0 };
    send_gossip(sender.addr(), &request, Duration::from_secs(1)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(sender.mempool.lock().await.is_empty());
    assert_eq!(miner.chain.len(), 1);
    assert_eq!(sender.chain.len(), 1);
}

/// A transaction gossiped back to its originator is deduplicated by
/// `tx_id`, not double-counted in the mempool.
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_transaction_is_suppressed() {
    let difficulty = 1;
    let dir = tempdir().unwrap();
    let node = Node::bootstrap("D".into(), 0, dir.into_path(), false, vec![], test_config(difficulty)).unwrap();

    let kp = obscura_core::Keypair::generate();
    let tx = TxRecord::new_signed(&kp, "receiver-pem".into(), 5, 0);

    ingest::handle_transaction(&node, tx.to_value()).await.unwrap();
    assert_eq!(node.mempool.lock().await.len(), 1);

    // echoed back
    let err = ingest::handle_transaction(&node, tx.to_value()).await;
    assert!(err.is_err());
    assert_eq!(node.mempool.lock().await.len(), 1);
}

/// Two miners race to extend the chain concurrently; periodic sync
/// reconciles the resulting fork so both converge on the same tip.
#[tokio::test(flavor = "multi_thread")]
async fn two_miners_racing_converge_on_the_same_chain() {
    let difficulty = 1;
    let a = spawn("RaceA", 19301, &[19302], true, difficulty).await;
    let b = spawn("RaceB", 19302, &[19301], true, difficulty).await;

    wait_until(20, || {
        a.chain.len() > 1 && a.chain.len() == b.chain.len() && a.chain.last_block().hash == b.chain.last_block().hash
    })
    .await;

    assert_eq!(a.chain.last_block().hash, b.chain.last_block().hash);
}

/// Restarting with the same `--dir` reloads the same chain and keypair.
#[tokio::test]
async fn cold_restart_preserves_chain_and_keypair() {
    let dir = tempdir().unwrap().into_path();
    let difficulty = 1;

    let first = Node::bootstrap("R".into(), 0, dir.clone(), false, vec![], test_config(difficulty)).unwrap();
    // manually seal a block so there's non-genesis chain state to reload.
    let tip = first.chain.last_block();
    let mut block = obscura_core::Block::new(tip.index + 1, tip.hash, vec![]);
    obscura_core::chain::Chain::proof_of_work(&mut block, difficulty);
    assert!(first.chain.add_block(block, difficulty).is_ok());
    first.persist();

    let first_pubkey = first.wallet.public_pem();
    let first_chain_len = first.chain.len();
    drop(first);

    let second = Node::bootstrap("R".into(), 0, dir, false, vec![], test_config(difficulty)).unwrap();
    assert_eq!(second.wallet.public_pem(), first_pubkey);
    assert_eq!(second.chain.len(), first_chain_len);
    assert!(second.mempool.lock().await.is_empty(), "mempool is never persisted");
}
