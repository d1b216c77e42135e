//! Transaction data model.
//!
//! Modelled as a tagged variant rather than a single struct with sentinel
//! fields: `Genesis` (block 0's non-transaction payload), `Coinbase`
//! (miner reward, sentinel sender/signature on the wire) and `Signed` (an
//! ordinary user transfer). Wire (de)serialization flattens
//! `Coinbase`/`Signed` to a plain dict shape; `Genesis` serializes to
//! `{"type": "genesis", "message": ...}`.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::canonical::canonical_json;
use crate::crypto::{verify_hex, Keypair};
use crate::error::{Error, Result};
use crate::COINBASE;

/// One entry in a block's transaction list, or a pending mempool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TxRecord {
    /// Block 0's descriptor. Never appears outside index 0, never signed,
    /// never held in the mempool.
    Genesis,
    /// Miner-minted reward, created only by `obscura-node`'s miner and
    /// delivered solely inside a block, never via mempool admission.
    Coinbase { tx_id: String, receiver_pubkey: String, amount: u64, timestamp: f64 },
    /// An ordinary signed value transfer.
    Signed {
        tx_id: String,
        sender_pubkey: String,
        receiver_pubkey: String,
        amount: u64,
        fee: u64,
        timestamp: f64,
        signature: String,
    },
}

impl TxRecord {
    /// Signs and constructs a new user transaction from `keypair`.
    pub fn new_signed(keypair: &Keypair, receiver_pubkey: String, amount: u64, fee: u64) -> Self {
        let tx_id = Uuid::new_v4().to_string();
        let timestamp = crate::now_ts();
        let sender_pubkey = keypair.public_pem();
        let payload = signing_payload(&tx_id, &sender_pubkey, &receiver_pubkey, amount, fee, timestamp);
        let signature = keypair.sign_hex(canonical_json(&payload).as_bytes());
        TxRecord::Signed { tx_id, sender_pubkey, receiver_pubkey, amount, fee, timestamp, signature }
    }

    /// Constructs the coinbase reward transaction a miner mints for itself.
    pub fn new_coinbase(receiver_pubkey: String, amount: u64) -> Self {
        TxRecord::Coinbase {
            tx_id: Uuid::new_v4().to_string(),
            receiver_pubkey,
            amount,
            timestamp: crate::now_ts(),
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            TxRecord::Genesis => None,
            TxRecord::Coinbase { tx_id, .. } | TxRecord::Signed { tx_id, .. } => Some(tx_id),
        }
    }

    pub fn sender_pubkey(&self) -> Option<&str> {
        match self {
            TxRecord::Genesis => None,
            TxRecord::Coinbase { .. } => Some(COINBASE),
            TxRecord::Signed { sender_pubkey, .. } => Some(sender_pubkey),
        }
    }

    pub fn receiver_pubkey(&self) -> Option<&str> {
        match self {
            TxRecord::Genesis => None,
            TxRecord::Coinbase { receiver_pubkey, .. } | TxRecord::Signed { receiver_pubkey, .. } => {
                Some(receiver_pubkey)
            }
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            TxRecord::Genesis => 0,
            TxRecord::Coinbase { amount, .. } => *amount,
            TxRecord::Signed { amount, .. } => *amount,
        }
    }

    pub fn fee(&self) -> u64 {
        match self {
            TxRecord::Signed { fee, .. } => *fee,
            _ => 0,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, TxRecord::Coinbase { .. })
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, TxRecord::Genesis)
    }

    /// Re-verifies an ECDSA signature against its declared sender. Always
    /// succeeds for coinbase transactions and is never called on
    /// `Genesis`.
    pub fn verify_signature(&self) -> Result<()> {
        match self {
            TxRecord::Genesis => Ok(()),
            TxRecord::Coinbase { .. } => Ok(()),
            TxRecord::Signed { tx_id, sender_pubkey, receiver_pubkey, amount, fee, timestamp, signature } => {
                let payload = signing_payload(tx_id, sender_pubkey, receiver_pubkey, *amount, *fee, *timestamp);
                verify_hex(sender_pubkey, canonical_json(&payload).as_bytes(), signature)
            }
        }
    }

    /// Renders the wire/hash dict form.
    pub fn to_value(&self) -> Value {
        match self {
            TxRecord::Genesis => json!({"type": "genesis", "message": "Genesis Block"}),
            TxRecord::Coinbase { tx_id, receiver_pubkey, amount, timestamp } => json!({
                "tx_id": tx_id,
                "sender_pubkey": COINBASE,
                "receiver_pubkey": receiver_pubkey,
                "amount": amount,
                "fee": 0,
                "timestamp": timestamp,
                "signature": COINBASE,
            }),
            TxRecord::Signed { tx_id, sender_pubkey, receiver_pubkey, amount, fee, timestamp, signature } => {
                json!({
                    "tx_id": tx_id,
                    "sender_pubkey": sender_pubkey,
                    "receiver_pubkey": receiver_pubkey,
                    "amount": amount,
                    "fee": fee,
                    "timestamp": timestamp,
                    "signature": signature,
                })
            }
        }
    }

    /// Parses a wire/disk dict back into a `TxRecord`.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.get("type").and_then(Value::as_str) == Some("genesis") {
            return Ok(TxRecord::Genesis);
        }
        let get_str = |key: &str| -> Result<String> {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| Error::Other(format!("transaction dict missing `{key}`")))
        };
        let tx_id = get_str("tx_id")?;
        let sender_pubkey = get_str("sender_pubkey")?;
        let receiver_pubkey = get_str("receiver_pubkey")?;
        let amount = value
            .get("amount")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Other("transaction dict missing `amount`".into()))?;
        let signature = get_str("signature")?;

        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::Other("transaction dict missing `timestamp`".into()))?;
        if sender_pubkey == COINBASE {
            return Ok(TxRecord::Coinbase { tx_id, receiver_pubkey, amount, timestamp });
        }
        let fee = value.get("fee").and_then(Value::as_u64).unwrap_or(0);
        Ok(TxRecord::Signed { tx_id, sender_pubkey, receiver_pubkey, amount, fee, timestamp, signature })
    }
}

fn signing_payload(
    tx_id: &str,
    sender_pubkey: &str,
    receiver_pubkey: &str,
    amount: u64,
    fee: u64,
    timestamp: f64,
) -> Value {
    json!({
        "tx_id": tx_id,
        "sender_pubkey": sender_pubkey,
        "receiver_pubkey": receiver_pubkey,
        "amount": amount,
        "fee": fee,
        "timestamp": timestamp,
    })
}
