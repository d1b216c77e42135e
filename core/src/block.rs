//! Block data model.
//!
//! A block is an ordered list of [`TxRecord`]s plus linkage/PoW metadata.
//! Its hash is the canonical SHA-256 of every field *except* `hash` itself;
//! recomputing it and comparing is how every validity check in
//! [`crate::chain`] works.

use serde_json::{json, Value};

use crate::canonical::canonical_hash;
use crate::error::{Error, Result};
use crate::tx::TxRecord;

/// `prev_hash` value fixed for the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub transactions: Vec<TxRecord>,
    pub prev_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    /// Builds the canonical genesis block. Identical on every node: fixed
    /// timestamp, fixed nonce, `prev_hash = "0"`, a single `Genesis`
    /// transaction descriptor — its hash is whatever `hash_input` yields on
    /// those exact fields.
    pub fn genesis() -> Self {
        let mut b = Block {
            index: 0,
            timestamp: 0.0,
            transactions: vec![TxRecord::Genesis],
            prev_hash: GENESIS_PREV_HASH.to_string(),
            nonce: 0,
            hash: String::new(),
        };
        b.hash = b.compute_hash();
        b
    }

    /// Constructs a new, not-yet-sealed block (`nonce = 0`, `hash` unset).
    /// Callers run proof-of-work (see [`crate::chain::Chain::proof_of_work`])
    /// before appending or gossiping it.
    pub fn new(index: u64, prev_hash: String, transactions: Vec<TxRecord>) -> Self {
        let mut b = Block { index, timestamp: crate::now_ts(), transactions, prev_hash, nonce: 0, hash: String::new() };
        b.hash = b.compute_hash();
        b
    }

    /// The object hashed is `{index, timestamp, transactions, prev_hash,
    /// nonce}` — `hash` itself is excluded.
    pub fn hash_input(&self) -> Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": self.transactions.iter().map(TxRecord::to_value).collect::<Vec<_>>(),
            "prev_hash": self.prev_hash,
            "nonce": self.nonce,
        })
    }

    /// Recomputes the canonical hash of this block's current contents.
    pub fn compute_hash(&self) -> String {
        canonical_hash(&self.hash_input())
    }

    /// `true` iff the stored `hash` matches a fresh recomputation.
    pub fn hash_matches_contents(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Renders the wire/disk dict form.
    pub fn to_value(&self) -> Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": self.transactions.iter().map(TxRecord::to_value).collect::<Vec<_>>(),
            "prev_hash": self.prev_hash,
            "nonce": self.nonce,
            "hash": self.hash,
        })
    }

    /// Parses a wire/disk dict back into a `Block`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let index = value
            .get("index")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Other("block dict missing `index`".into()))?;
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::Other("block dict missing `timestamp`".into()))?;
        let prev_hash = value
            .get("prev_hash")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Other("block dict missing `prev_hash`".into()))?
            .to_string();
        let nonce = value
            .get("nonce")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Other("block dict missing `nonce`".into()))?;
        let hash = value
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Other("block dict missing `hash`".into()))?
            .to_string();
        let transactions = value
            .get("transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Other("block dict missing `transactions`".into()))?
            .iter()
            .map(TxRecord::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Block { index, timestamp, transactions, prev_hash, nonce, hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_deterministic_across_calls() {
        assert_eq!(Block::genesis(), Block::genesis());
    }

    #[test]
    fn genesis_has_fixed_fields() {
        let g = Block::genesis();
        assert_eq!(g.index, 0);
        assert_eq!(g.timestamp, 0.0);
        assert_eq!(g.nonce, 0);
        assert_eq!(g.prev_hash, "0");
    }

    #[test]
    fn hash_round_trips_through_wire_dict() {
        let b = Block::genesis();
        let restored = Block::from_value(&b.to_value()).expect("parses back");
        assert_eq!(b, restored);
        assert!(restored.hash_matches_contents());
    }

    #[test]
    fn changing_nonce_changes_hash() {
        let mut b = Block::new(1, "abc".into(), vec![]);
        let h1 = b.compute_hash();
        b.nonce += 1;
        let h2 = b.compute_hash();
        assert_ne!(h1, h2);
    }
}
