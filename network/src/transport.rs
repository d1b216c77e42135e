//! One-shot TCP transport: connect, write the full message, half-close
//! the write side, drop. Receivers read to EOF. No length prefix; framing
//! is connection lifetime.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Error, Result};
use crate::message::Message;

/// Fire-and-forget gossip send. Peer failures are returned, never panics —
/// callers log and move on to the next peer.
pub async fn send_gossip(addr: SocketAddr, message: &Message, timeout: Duration) -> Result<()> {
    tokio::time::timeout(timeout, async {
        let mut stream = TcpStream::connect(addr).await.map_err(Error::PeerUnreachable)?;
        stream.write_all(&message.to_bytes()).await.map_err(Error::PeerUnreachable)?;
        stream.shutdown().await.map_err(Error::PeerUnreachable)?;
        Ok(())
    })
    .await
    .map_err(|_| Error::Timeout)?
}

/// Sends `get_chain` and reads the `chain` reply back on the same
/// connection.
pub async fn request_chain(addr: SocketAddr, timeout: Duration) -> Result<Vec<serde_json::Value>> {
    tokio::time::timeout(timeout, async {
        let mut stream = TcpStream::connect(addr).await.map_err(Error::PeerUnreachable)?;
        stream.write_all(&Message::GetChain.to_bytes()).await.map_err(Error::PeerUnreachable)?;
        stream.shutdown().await.map_err(Error::PeerUnreachable)?;

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.map_err(Error::PeerUnreachable)?;
        match Message::from_bytes(&buf)? {
            Message::Chain(blocks) => Ok(blocks),
            _ => Err(Error::InvalidMessage("expected a `chain` reply".into())),
        }
    })
    .await
    .map_err(|_| Error::Timeout)?
}

/// Reads one message to completion from an accepted inbound connection.
pub async fn read_message(stream: &mut TcpStream) -> Result<Message> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.map_err(Error::PeerUnreachable)?;
    Message::from_bytes(&buf)
}

/// Binds the listener. The caller spawns one handler task per accepted
/// connection.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(Error::PeerUnreachable)
}
