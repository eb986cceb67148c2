//! Duplex text transport to a target.
//!
//! A [`Connector`] turns a `webSocketDebuggerUrl` into a write half
//! ([`FrameSink`]) and a read half ([`FrameSource`]).  The halves are
//! independent so the reader task can own the source while callers share the
//! sink.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::application::FrameSink;

/// Read half of a target connection.
#[async_trait]
pub trait FrameSource: Send {
    /// The next text frame, `Some(Err(_))` on a transport error, or `None`
    /// once the peer has closed the connection.
    async fn next_frame(&mut self) -> Option<Result<String, String>>;
}

/// Opens connections to targets.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), String>;
}

// ── WebSocket implementation ──────────────────────────────────────────────────

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production [`Connector`] backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>), String> {
        let (stream, response) = connect_async(url).await.map_err(|e| e.to_string())?;
        debug!("websocket handshake with {url} completed ({})", response.status());

        let (write, read) = stream.split();
        Ok((
            Box::new(WsSink {
                write: Mutex::new(write),
            }),
            Box::new(WsSource { read }),
        ))
    }
}

struct WsSink {
    write: Mutex<SplitSink<WsStream, WsMessage>>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_frame(&self, text: String) -> Result<(), String> {
        self.write
            .lock()
            .await
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| e.to_string())
    }
}

struct WsSource {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn next_frame(&mut self) -> Option<Result<String, String>> {
        loop {
            match self.read.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text)),
                Ok(WsMessage::Binary(bytes)) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(WsMessage::Close(frame)) => {
                    debug!("target sent close frame: {frame:?}");
                    return None;
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_)) => continue,
                Err(e) => return Some(Err(e.to_string())),
            }
        }
    }
}
