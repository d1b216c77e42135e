//! Wire protocol and one-shot TCP transport for Obscura nodes.
//!
//! Deliberately independent of `obscura-core`: messages carry plain
//! `serde_json::Value` dicts, so this crate only knows about framing and
//! the envelope shape, never about chain/transaction semantics.

pub mod error;
pub mod message;
pub mod transport;

pub use error::{Error, Result};
pub use message::Message;
pub use transport::{bind, read_message, request_chain, send_gossip};
