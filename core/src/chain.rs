//! The blockchain engine.
//!
//! `Chain` owns its own lock protecting the chain list, so read-mostly
//! operations — balance queries, tip lookups — never contend with
//! whatever coarser lock a node wraps around joint chain+mempool
//! mutations. Validation helpers that don't touch live chain state
//! (`is_valid_chain`, `proof_of_work`) are associated functions operating
//! on a plain `&[Block]`/`&mut Block`, so they can be called while a
//! caller already holds the chain's write lock without deadlocking.

use std::sync::RwLock;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::mempool::Mempool;
use crate::pow;
use crate::tx::TxRecord;

pub struct Chain {
    inner: RwLock<Vec<Block>>,
}

impl Chain {
    /// A fresh chain containing only the canonical genesis block.
    pub fn new() -> Self {
        Self { inner: RwLock::new(vec![Block::genesis()]) }
    }

    /// Adopts `blocks` as-is without validation. Used only when loading a
    /// chain already validated by [`Chain::is_valid_chain`] (e.g. from disk
    /// at startup, or from [`Chain::replace_chain`]).
    pub fn from_validated_blocks(blocks: Vec<Block>) -> Self {
        Self { inner: RwLock::new(blocks) }
    }

    pub fn last_block(&self) -> Block {
        self.inner.read().expect("chain lock poisoned").last().cloned().expect("chain is never empty")
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("chain lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// A deep copy of the full chain, safe to hand to callers without
    /// aliasing the live lock.
    pub fn get_chain_copy(&self) -> Vec<Block> {
        self.inner.read().expect("chain lock poisoned").clone()
    }

    pub fn contains_tx_id(&self, tx_id: &str) -> bool {
        self.inner
            .read()
            .expect("chain lock poisoned")
            .iter()
            .skip(1)
            .flat_map(|b| &b.transactions)
            .any(|tx| tx.tx_id() == Some(tx_id))
    }

    /// A single block is valid "in isolation": its hash meets the
    /// difficulty target and recomputing it matches the stored `hash`.
    /// Linkage to a predecessor is checked separately by the caller.
    pub fn is_valid_block_standalone(block: &Block, difficulty: usize) -> Result<()> {
        if !pow::hash_meets_difficulty(&block.hash, difficulty) {
            return Err(Error::DifficultyFail);
        }
        if !block.hash_matches_contents() {
            return Err(Error::HashMismatch);
        }
        Ok(())
    }

    /// Validates a full candidate chain: genesis has `prev_hash == "0"`
    /// (the same check the canonical genesis satisfies), every
    /// later block is valid in isolation, and links to its predecessor.
    pub fn is_valid_chain(chain: &[Block], difficulty: usize) -> Result<()> {
        let first = chain.first().ok_or(Error::InvalidGenesis)?;
        if first.prev_hash != crate::block::GENESIS_PREV_HASH {
            return Err(Error::InvalidGenesis);
        }
        for i in 1..chain.len() {
            if chain[i].prev_hash != chain[i - 1].hash {
                return Err(Error::PrevHashMismatch);
            }
            Self::is_valid_block_standalone(&chain[i], difficulty)?;
        }
        Ok(())
    }

    /// Appends `block` iff it links to the current tip and is valid in
    /// isolation. Never panics on bad input; returns the rejection reason
    /// instead.
    pub fn add_block(&self, block: Block, difficulty: usize) -> Result<()> {
        let mut guard = self.inner.write().expect("chain lock poisoned");
        let tip = guard.last().expect("chain is never empty");
        if block.prev_hash != tip.hash {
            return Err(Error::PrevHashMismatch);
        }
        if block.index != tip.index + 1 {
            return Err(Error::NonSequentialHeight);
        }
        Self::is_valid_block_standalone(&block, difficulty)?;
        guard.push(block);
        Ok(())
    }

    /// Replaces the local chain with `new_chain` iff it is strictly longer
    /// and fully valid. Ties are broken in favour of the incumbent.
    pub fn replace_chain(&self, new_chain: Vec<Block>, difficulty: usize) -> Result<()> {
        let mut guard = self.inner.write().expect("chain lock poisoned");
        if new_chain.len() <= guard.len() {
            return Err(Error::Other("candidate chain is not longer than the current chain".into()));
        }
        Self::is_valid_chain(&new_chain, difficulty)?;
        *guard = new_chain;
        Ok(())
    }

    /// Mines `block`: resets `nonce` to 0 then increments until its hash
    /// meets `difficulty`. Deterministic — identical block contents always
    /// yield the identical nonce.
    pub fn proof_of_work(block: &mut Block, difficulty: usize) -> String {
        block.nonce = 0;
        let mut hash = block.compute_hash();
        while !pow::hash_meets_difficulty(&hash, difficulty) {
            block.nonce += 1;
            hash = block.compute_hash();
        }
        block.hash = hash.clone();
        hash
    }

    /// Every account starts at `starting_balance`. For every non-genesis
    /// block, debit `amount + fee` from the sender and credit `amount` to
    /// the receiver; `COINBASE` has no account and is never debited.
    pub fn get_balance(&self, pubkey: &str, starting_balance: i64) -> i64 {
        let guard = self.inner.read().expect("chain lock poisoned");
        let mut balance = starting_balance;
        for block in guard.iter().skip(1) {
            for tx in &block.transactions {
                if tx.sender_pubkey() == Some(pubkey) {
                    balance -= (tx.amount() + tx.fee()) as i64;
                }
                if tx.receiver_pubkey() == Some(pubkey) {
                    balance += tx.amount() as i64;
                }
            }
        }
        balance
    }

    /// As [`Chain::get_balance`] but additionally debits `pubkey`'s pending
    /// outgoing transactions in `mempool`.
    pub fn get_balance_with_mempool(&self, pubkey: &str, mempool: &Mempool, starting_balance: i64) -> i64 {
        let mut balance = self.get_balance(pubkey, starting_balance);
        for tx in mempool.iter() {
            if tx.sender_pubkey() == Some(pubkey) {
                balance -= (tx.amount() + tx.fee()) as i64;
            }
        }
        balance
    }

    /// Full mempool-acceptance check for a signed transaction.
    /// Coinbase and genesis records are never accepted through this path —
    /// a coinbase is only ever valid embedded directly in a mined block.
    pub fn validate_for_mempool(&self, tx: &TxRecord, mempool: &Mempool, starting_balance: i64) -> Result<()> {
        let tx_id = match tx {
            TxRecord::Genesis => return Err(Error::Other("genesis record is not a transaction".into())),
            TxRecord::Coinbase { .. } => return Err(Error::UnexpectedCoinbase),
            TxRecord::Signed { tx_id, .. } => tx_id.as_str(),
        };
        if self.contains_tx_id(tx_id) {
            return Err(Error::AlreadyInChain);
        }
        if mempool.contains(tx_id) {
            return Err(Error::AlreadyInMempool);
        }
        tx.verify_signature()?;
        let sender = tx.sender_pubkey().expect("signed tx always has a sender");
        let required = (tx.amount() + tx.fee()) as i64;
        if self.get_balance_with_mempool(sender, mempool, starting_balance) < required {
            return Err(Error::InsufficientBalance);
        }
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
