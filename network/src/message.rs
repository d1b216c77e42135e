//! Wire message envelope.
//!
//! `{"type": ..., "data": ...}` for every message type except
//! `create_transaction`, whose fields sit at the top level rather than
//! under `data`. Transaction and block payloads travel as plain
//! `serde_json::Value` dicts — this crate never depends on `obscura-core`;
//! callers decode/encode those dicts with `TxRecord`/`Block`'s own
//! `to_value`/`from_value`.

use serde_json::{json, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Ingest one transaction dict.
    Transaction(Value),
    /// Ingest one block dict.
    Block(Value),
    /// Client → node: sign and enter a new transaction from this node's
    /// own keypair.
    CreateTransaction { receiver_pubkey: String, amount: u64, fee: u64 },
    /// Request the full chain.
    GetChain,
    /// Reply to `GetChain`: an ordered list of block dicts.
    Chain(Vec<Value>),
}

impl Message {
    pub fn to_value(&self) -> Value {
        match self {
            Message::Transaction(tx) => json!({"type": "transaction", "data": tx}),
            Message::Block(block) => json!({"type": "block", "data": block}),
            Message::CreateTransaction { receiver_pubkey, amount, fee } => {
                json!({
                    "type": "create_transaction",
                    "receiver_pubkey": receiver_pubkey,
                    "amount": amount,
                    "fee": fee,
                })
            }
            Message::GetChain => json!({"type": "get_chain"}),
            Message::Chain(blocks) => json!({"type": "chain", "data": blocks}),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.to_value()).expect("Value always serializes")
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let ty = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidMessage("missing `type` field".into()))?;
        match ty {
            "transaction" => {
                let data = value
                    .get("data")
                    .cloned()
                    .ok_or_else(|| Error::InvalidMessage("`transaction` missing `data`".into()))?;
                Ok(Message::Transaction(data))
            }
            "block" => {
                let data = value
                    .get("data")
                    .cloned()
                    .ok_or_else(|| Error::InvalidMessage("`block` missing `data`".into()))?;
                Ok(Message::Block(data))
            }
            "create_transaction" => {
                let receiver_pubkey = value
                    .get("receiver_pubkey")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::InvalidMessage("`create_transaction` missing `receiver_pubkey`".into()))?
                    .to_string();
                let amount = value
                    .get("amount")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| Error::InvalidMessage("`create_transaction` missing `amount`".into()))?;
                let fee = value.get("fee").and_then(Value::as_u64).unwrap_or(0);
                Ok(Message::CreateTransaction { receiver_pubkey, amount, fee })
            }
            "get_chain" => Ok(Message::GetChain),
            "chain" => {
                let blocks = value
                    .get("data")
                    .and_then(Value::as_array)
                    .ok_or_else(|| Error::InvalidMessage("`chain` missing `data`".into()))?
                    .clone();
                Ok(Message::Chain(blocks))
            }
            other => Err(Error::InvalidMessage(format!("unknown message type `{other}`"))),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::InvalidMessage(e.to_string()))?;
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_chain_round_trips() {
        let msg = Message::GetChain;
        assert_eq!(Message::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn create_transaction_fields_sit_at_top_level() {
        let msg = Message::CreateTransaction { receiver_pubkey: "pk".into(), amount: 10, fee: 1 };
        let value = msg.to_value();
        assert_eq!(value["receiver_pubkey"], "pk");
        assert_eq!(value["amount"], 10);
        assert!(value.get("data").is_none());
        assert_eq!(Message::from_value(&value).unwrap(), msg);
    }

    #[test]
    fn create_transaction_fee_defaults_to_zero() {
        let value = json!({"type": "create_transaction", "receiver_pubkey": "pk", "amount": 5});
        let msg = Message::from_value(&value).unwrap();
        assert_eq!(msg, Message::CreateTransaction { receiver_pubkey: "pk".into(), amount: 5, fee: 0 });
    }

    #[test]
    fn chain_reply_round_trips() {
        let blocks = vec![json!({"index": 0}), json!({"index": 1})];
        let msg = Message::Chain(blocks);
        assert_eq!(Message::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let value = json!({"type": "bogus"});
        assert!(Message::from_value(&value).is_err());
    }

    #[test]
    fn missing_type_is_rejected() {
        let value = json!({"data": 1});
        assert!(Message::from_value(&value).is_err());
    }
}
