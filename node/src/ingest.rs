//! Handlers for inbound connections and locally-submitted transactions.

use obscura_core::{Block, TxRecord};
use obscura_network::{read_message, Message};
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::error::{NodeError, Result};
use crate::{syncer, Node};

/// Reads the one-shot message off `stream` and dispatches it. Never
/// propagates an error out to the listener loop — failures are logged and
/// the connection is simply dropped; no error escapes a handler task.
pub async fn handle_connection(node: &Node, mut stream: TcpStream) -> Result<()> {
    let message = match read_message(&mut stream).await {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "dropping connection: malformed message");
            return Ok(());
        }
    };

    match message {
        Message::Transaction(data) => {
            if let Err(e) = handle_transaction(node, data).await {
                warn!(error = %e, "rejected incoming transaction");
            }
        }
        Message::Block(data) => {
            if let Err(e) = handle_block(node, data).await {
                warn!(error = %e, "rejected incoming block");
            }
        }
        Message::CreateTransaction { receiver_pubkey, amount, fee } => {
            if let Err(e) = handle_create_transaction(node, receiver_pubkey, amount, fee).await {
                warn!(error = %e, "could not create local transaction");
            }
        }
        Message::GetChain => {
            let blocks: Vec<Value> = node.chain.get_chain_copy().iter().map(Block::to_value).collect();
            let reply = Message::Chain(blocks).to_bytes();
            use tokio::io::AsyncWriteExt;
            let _ = stream.write_all(&reply).await;
            let _ = stream.shutdown().await;
        }
        Message::Chain(_) => {
            warn!("received unsolicited `chain` message, ignoring");
        }
    }
    Ok(())
}

/// Validates and admits a transaction already encoded on the wire, then
/// re-gossips it to every peer — newly accepted transactions are gossiped
/// whether they originated locally or arrived from a peer, which is how
/// duplicate suppression on the originating node gets exercised.
pub async fn handle_transaction(node: &Node, data: Value) -> Result<()> {
    let tx = TxRecord::from_value(&data).map_err(|e| NodeError::InvalidMessage(e.to_string()))?;
    if !matches!(tx, TxRecord::Signed { .. }) {
        return Err(NodeError::InvalidTransaction(obscura_core::Error::UnexpectedCoinbase));
    }
    admit_transaction(node, tx).await
}

/// Signs a new transaction from this node's own keypair, admits it the
/// same way, and gossips it.
pub async fn handle_create_transaction(
    node: &Node,
    receiver_pubkey: String,
    amount: u64,
    fee: u64,
) -> Result<()> {
    let tx = TxRecord::new_signed(&node.wallet.keypair, receiver_pubkey, amount, fee);
    admit_transaction(node, tx).await
}

async fn admit_transaction(node: &Node, tx: TxRecord) -> Result<()> {
    let mut mempool = node.mempool.lock().await;
    node.chain
        .validate_for_mempool(&tx, &mempool, node.config.starting_balance)
        .map_err(NodeError::InvalidTransaction)?;
    mempool.insert(tx.clone());
    drop(mempool);

    info!(tx_id = tx.tx_id().unwrap_or(""), "transaction admitted to mempool");
    node.gossip(&Message::Transaction(tx.to_value())).await;
    Ok(())
}

/// Attempts to append an inbound block. On success, clears its
/// transactions from the mempool, snapshots to disk, and re-gossips. On
/// failure, triggers an immediate pull-sync against every peer — the block
/// may have been built on a fork we haven't caught up to yet.
pub async fn handle_block(node: &Node, data: Value) -> Result<()> {
    let block = Block::from_value(&data).map_err(|e| NodeError::InvalidMessage(e.to_string()))?;
    match node.chain.add_block(block.clone(), node.config.difficulty) {
        Ok(()) => {
            {
                let mut mempool = node.mempool.lock().await;
                for tx in &block.transactions {
                    if let Some(tx_id) = tx.tx_id() {
                        mempool.remove(tx_id);
                    }
                }
            }
            node.persist();
            node.gossip(&Message::Block(block.to_value())).await;
            Ok(())
        }
        Err(e) => {
            warn!(index = block.index, error = %e, "block did not link to current tip, triggering pull-sync");
            syncer::sync_once(node).await;
            Err(NodeError::InvalidBlock(e))
        }
    }
}
