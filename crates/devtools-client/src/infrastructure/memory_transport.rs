//! In-memory transport: a scripted stand-in for a browser target.
//!
//! A [`MemoryPeer`] is the "browser side" of one connection.  It records
//! every frame the client sends and can push frames back, either by hand
//! ([`MemoryPeer::push`]) or through a responder that runs synchronously on
//! each request.  Frames pushed by the responder are queued before the
//! client's `send` returns, so their order relative to the reply is exact.
//!
//! ```rust
//! use devtools_client::infrastructure::{MemoryConnector, MemoryPeer};
//!
//! let peer = MemoryPeer::with_responder(|request| {
//!     vec![format!(r#"{{"id":{},"result":{{}}}}"#, request["id"])]
//! });
//! let connector = MemoryConnector::new().with_peer("ws://tab/1", peer.clone());
//! # drop(connector);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::application::FrameSink;
use crate::infrastructure::transport::{Connector, FrameSource};

type Responder = dyn Fn(&Value) -> Vec<String> + Send + Sync;

struct PeerState {
    sent: Vec<String>,
    /// Dropped by [`MemoryPeer::close`]; the client then sees end-of-stream.
    to_client: Option<mpsc::UnboundedSender<String>>,
    /// Handed to the client on connect.
    client_rx: Option<mpsc::UnboundedReceiver<String>>,
}

/// Browser side of an in-memory connection.  Clones share state.
#[derive(Clone)]
pub struct MemoryPeer {
    state: Arc<Mutex<PeerState>>,
    responder: Option<Arc<Responder>>,
}

impl MemoryPeer {
    /// A peer that never answers on its own.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(Mutex::new(PeerState {
                sent: Vec::new(),
                to_client: Some(tx),
                client_rx: Some(rx),
            })),
            responder: None,
        }
    }

    /// A peer that answers every request with the frames `responder` returns.
    /// The request is passed as parsed JSON (`null` if it was not JSON).
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(responder)),
            ..Self::new()
        }
    }

    /// Every frame the client has sent, in order.
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// [`MemoryPeer::sent`], parsed.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap_or(Value::Null))
            .collect()
    }

    /// Queues a frame for the client.  Ignored after [`MemoryPeer::close`].
    pub fn push(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.lock().to_client {
            let _ = tx.send(frame.into());
        }
    }

    /// Ends the stream; frames already queued are still delivered.
    pub fn close(&self) {
        self.lock().to_client = None;
    }

    fn receive(&self, text: String) {
        let replies = self.responder.as_ref().map(|responder| {
            let request = serde_json::from_str(&text).unwrap_or(Value::Null);
            responder(&request)
        });
        self.lock().sent.push(text);
        for frame in replies.into_iter().flatten() {
            self.push(frame);
        }
    }

    fn take_client_rx(&self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.lock().client_rx.take()
    }

    fn lock(&self) -> MutexGuard<'_, PeerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryPeer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPeer")
            .field("sent", &self.lock().sent.len())
            .field("scripted", &self.responder.is_some())
            .finish()
    }
}

/// [`Connector`] resolving URLs to registered [`MemoryPeer`]s.
///
/// Unknown URLs are refused, and each peer accepts a single connection.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    peers: HashMap<String, MemoryPeer>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peer(mut self, url: &str, peer: MemoryPeer) -> Self {
        self.peers.insert(url.to_string(), peer);
        self
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), String> {
        let peer = self
            .peers
            .get(url)
            .ok_or_else(|| format!("connection refused: {url}"))?;
        let rx = peer
            .take_client_rx()
            .ok_or_else(|| format!("already connected: {url}"))?;
        Ok((
            Box::new(MemorySink { peer: peer.clone() }),
            Box::new(MemorySource { rx }),
        ))
    }
}

struct MemorySink {
    peer: MemoryPeer,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_frame(&self, text: String) -> Result<(), String> {
        if self.peer.lock().to_client.is_none() {
            return Err("peer closed".to_string());
        }
        self.peer.receive(text);
        Ok(())
    }
}

struct MemorySource {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Option<Result<String, String>> {
        self.rx.recv().await.map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_responder_frames_follow_request() {
        // Arrange
        let peer = MemoryPeer::with_responder(|req| {
            vec![
                r#"{"method":"Page.loadEventFired"}"#.to_string(),
                format!(r#"{{"id":{},"result":{{}}}}"#, req["id"]),
            ]
        });
        let connector = MemoryConnector::new().with_peer("ws://t/1", peer.clone());
        let (sink, mut source) = connector.connect("ws://t/1").await.unwrap();

        // Act
        sink.send_frame(r#"{"id":0,"method":"Page.enable","params":{}}"#.to_string())
            .await
            .unwrap();

        // Assert
        assert_eq!(
            source.next_frame().await.unwrap().unwrap(),
            r#"{"method":"Page.loadEventFired"}"#
        );
        assert_eq!(
            source.next_frame().await.unwrap().unwrap(),
            r#"{"id":0,"result":{}}"#
        );
        assert_eq!(peer.sent_json(), [json!({"id": 0, "method": "Page.enable", "params": {}})]);
    }

    #[tokio::test]
    async fn test_unknown_url_is_refused() {
        let connector = MemoryConnector::new();
        let err = connector.connect("ws://nowhere").await.err().unwrap();
        assert!(err.contains("refused"));
    }

    #[tokio::test]
    async fn test_peer_accepts_one_connection() {
        let connector = MemoryConnector::new().with_peer("ws://t/1", MemoryPeer::new());
        assert!(connector.connect("ws://t/1").await.is_ok());
        assert!(connector.connect("ws://t/1").await.is_err());
    }

    #[tokio::test]
    async fn test_close_delivers_queued_frames_then_ends() {
        let peer = MemoryPeer::new();
        let connector = MemoryConnector::new().with_peer("ws://t/1", peer.clone());
        let (_sink, mut source) = connector.connect("ws://t/1").await.unwrap();

        peer.push(r#"{"method":"Inspector.detached"}"#);
        peer.close();

        assert!(source.next_frame().await.is_some());
        assert!(source.next_frame().await.is_none());
    }
}
