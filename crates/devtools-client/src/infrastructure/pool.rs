//! One connection per discovered target, opened eagerly.
//!
//! A target whose connection cannot be opened (or that advertises no
//! `webSocketDebuggerUrl`, e.g. because another debugger is attached) gets an
//! [`Slot::Unreachable`] entry.  The session still starts; only calls against
//! that target fail.

use std::sync::Arc;
use std::time::Duration;

use devtools_core::target::Target;
use futures_util::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::EventBacklog;
use crate::error::ClientError;
use crate::infrastructure::connection::Connection;
use crate::infrastructure::transport::Connector;

/// State of one target's connection.
#[derive(Debug)]
pub enum Slot {
    Connected(Connection),
    Unreachable { reason: String },
}

/// Connections indexed like the target list they were opened for.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    slots: Vec<Slot>,
}

impl ConnectionPool {
    /// Opens a connection to every target concurrently.
    ///
    /// Never fails as a whole: each failure is recorded in its slot.
    pub async fn open_all(
        targets: &[Target],
        connector: &dyn Connector,
        backlog: Arc<EventBacklog>,
        connect_timeout: Duration,
        session_id: Uuid,
    ) -> Self {
        let opens = targets.iter().enumerate().map(|(index, target)| {
            let backlog = Arc::clone(&backlog);
            async move {
                open_one(index, target, connector, backlog, connect_timeout, session_id).await
            }
        });
        let slots = join_all(opens).await;

        let reachable = slots
            .iter()
            .filter(|s| matches!(s, Slot::Connected(_)))
            .count();
        info!(
            "session {session_id}: connected to {reachable} of {} targets",
            slots.len()
        );
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Connected(_)))
    }

    /// The open connection for `index`, as needed by a call to `method`.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnknownTarget`] for an index outside the pool and
    /// [`ClientError::Connection`] for an unreachable or closed target.
    pub fn connection(&self, index: usize, method: &str) -> Result<&Connection, ClientError> {
        match self.slots.get(index) {
            None => Err(ClientError::UnknownTarget {
                index,
                count: self.slots.len(),
            }),
            Some(Slot::Unreachable { reason }) => Err(ClientError::Connection {
                target: index,
                method: method.to_string(),
                reason: reason.clone(),
            }),
            Some(Slot::Connected(connection)) => Ok(connection),
        }
    }

    /// Writes `text` as-is on the connection of target `index`.
    ///
    /// # Errors
    ///
    /// Same as [`ConnectionPool::connection`], plus
    /// [`ClientError::Connection`] if the write fails.
    pub async fn send(&self, index: usize, text: String) -> Result<(), ClientError> {
        const RAW: &str = "(raw frame)";
        self.connection(index, RAW)?
            .send(text)
            .await
            .map_err(|reason| ClientError::Connection {
                target: index,
                method: RAW.to_string(),
                reason,
            })
    }
}

async fn open_one(
    index: usize,
    target: &Target,
    connector: &dyn Connector,
    backlog: Arc<EventBacklog>,
    connect_timeout: Duration,
    session_id: Uuid,
) -> Slot {
    let Some(url) = target.web_socket_debugger_url.as_deref() else {
        warn!(
            "session {session_id}: target {index} ({:?}) has no webSocketDebuggerUrl",
            target.title
        );
        return Slot::Unreachable {
            reason: "target advertises no webSocketDebuggerUrl".to_string(),
        };
    };

    match tokio::time::timeout(connect_timeout, connector.connect(url)).await {
        Ok(Ok((sink, source))) => {
            info!("session {session_id}: connected to target {index} at {url}");
            Slot::Connected(Connection::spawn(
                index, url, sink, source, backlog, session_id,
            ))
        }
        Ok(Err(reason)) => {
            warn!("session {session_id}: target {index} unreachable at {url}: {reason}");
            Slot::Unreachable { reason }
        }
        Err(_) => {
            warn!("session {session_id}: connecting to target {index} timed out");
            Slot::Unreachable {
                reason: format!("connect timed out after {connect_timeout:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{MemoryConnector, MemoryPeer};
    use serde_json::Map;

    fn target(title: &str, ws: Option<&str>) -> Target {
        Target {
            id: title.to_string(),
            kind: "page".to_string(),
            title: title.to_string(),
            url: String::new(),
            web_socket_debugger_url: ws.map(str::to_string),
            extra: Map::new(),
        }
    }

    async fn open(targets: &[Target], connector: &MemoryConnector) -> ConnectionPool {
        ConnectionPool::open_all(
            targets,
            connector,
            Arc::new(EventBacklog::new()),
            Duration::from_secs(1),
            Uuid::nil(),
        )
        .await
    }

    #[tokio::test]
    async fn test_open_all_keeps_target_order() {
        // Arrange
        let connector = MemoryConnector::new()
            .with_peer("ws://t/0", MemoryPeer::new())
            .with_peer("ws://t/2", MemoryPeer::new());
        let targets = [
            target("A", Some("ws://t/0")),
            target("B", Some("ws://t/missing")),
            target("C", Some("ws://t/2")),
        ];

        // Act
        let pool = open(&targets, &connector).await;

        // Assert
        assert_eq!(pool.len(), 3);
        assert!(pool.is_reachable(0));
        assert!(!pool.is_reachable(1));
        assert!(pool.is_reachable(2));
        assert_eq!(pool.connection(2, "Page.enable").unwrap().url(), "ws://t/2");
    }

    #[tokio::test]
    async fn test_target_without_websocket_url_is_unreachable() {
        let pool = open(&[target("busy", None)], &MemoryConnector::new()).await;

        let err = pool.connection(0, "Page.enable").unwrap_err();

        assert!(matches!(
            err,
            ClientError::Connection { target: 0, ref method, ref reason }
                if method == "Page.enable" && reason.contains("webSocketDebuggerUrl")
        ));
    }

    #[tokio::test]
    async fn test_index_outside_pool_is_unknown_target() {
        let pool = open(&[], &MemoryConnector::new()).await;

        let err = pool.connection(4, "Page.enable").unwrap_err();

        assert!(matches!(err, ClientError::UnknownTarget { index: 4, count: 0 }));
    }

    #[tokio::test]
    async fn test_send_writes_raw_frame() {
        // Arrange
        let peer = MemoryPeer::new();
        let connector = MemoryConnector::new().with_peer("ws://t/0", peer.clone());
        let pool = open(&[target("A", Some("ws://t/0"))], &connector).await;

        // Act
        pool.send(0, "hello".to_string()).await.unwrap();

        // Assert
        assert_eq!(peer.sent(), ["hello"]);
    }
}
