//! The client facade.
//!
//! A [`Session`] owns everything needed to talk to one browser: the target
//! list, one connection per target, the focus pointer, the request id
//! counter, and the event backlog.  Generated domain bindings borrow it:
//!
//! ```no_run
//! use devtools_client::{ClientConfig, Domains, Session};
//!
//! # async fn example() -> Result<(), devtools_client::ClientError> {
//! let session = Session::connect(ClientConfig::default()).await?;
//! let reply = session.page().navigate("http://example.com", None, None, None).await?;
//! println!("navigated frame {}", reply["frameId"]);
//! # Ok(())
//! # }
//! ```
//!
//! Calls on one session are serialised: a second call waits until the first
//! has its reply.  Ids are still unique across targets, so frames from
//! different connections can never be confused.

use std::sync::Arc;

use devtools_core::protocol::{CallArgs, RequestIdCounter};
use devtools_core::target::Target;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::{DiscoverySource, Event, EventBacklog, FocusOutcome, TargetDirectory};
use crate::domain::ClientConfig;
use crate::error::ClientError;
use crate::infrastructure::{ConnectionPool, Connector, HttpDiscovery, WebSocketConnector};

/// A connected client for one browser.
pub struct Session {
    id: Uuid,
    config: ClientConfig,
    directory: TargetDirectory,
    pool: ConnectionPool,
    focused: usize,
    ids: RequestIdCounter,
    /// Held for the whole of each call.
    call_lock: Mutex<()>,
    backlog: Arc<EventBacklog>,
}

impl Session {
    /// Discovers targets over HTTP and connects to each over WebSocket.
    ///
    /// # Errors
    ///
    /// [`ClientError::Discovery`] if the discovery URL is invalid or the
    /// target list cannot be fetched, and
    /// [`ClientError::FocusMiss`] if `initial_focus` misses under
    /// `strict_focus`.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        config
            .validate()
            .map_err(|e| ClientError::Discovery {
                url: config.discovery_url.clone(),
                reason: e.to_string(),
            })?;
        let discovery = HttpDiscovery::new(&config.discovery_url, config.connect_timeout)?;
        Self::with_collaborators(config, &discovery, &WebSocketConnector).await
    }

    /// Like [`Session::connect`] with injected discovery and transport.
    ///
    /// # Errors
    ///
    /// Same as [`Session::connect`].
    pub async fn with_collaborators(
        config: ClientConfig,
        discovery: &dyn DiscoverySource,
        connector: &dyn Connector,
    ) -> Result<Self, ClientError> {
        let id = Uuid::new_v4();
        info!("session {id}: discovering targets at {}", discovery.endpoint());

        let directory = TargetDirectory::discover(discovery).await?;
        let backlog = Arc::new(EventBacklog::new());
        let pool = ConnectionPool::open_all(
            directory.list(),
            connector,
            Arc::clone(&backlog),
            config.connect_timeout,
            id,
        )
        .await;

        let initial_focus = config.initial_focus.clone();
        let mut session = Self {
            id,
            config,
            directory,
            pool,
            focused: 0,
            ids: RequestIdCounter::new(),
            call_lock: Mutex::new(()),
            backlog,
        };
        if let Some(query) = initial_focus {
            session.focus(&query)?;
        }
        Ok(session)
    }

    /// Identifier used in this session's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Every discovered target, in discovery order.
    pub fn targets(&self) -> &[Target] {
        self.directory.list()
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused_target(&self) -> Option<&Target> {
        self.directory.get(self.focused)
    }

    /// `true` if the target at `index` has an open connection.
    pub fn is_reachable(&self, index: usize) -> bool {
        self.pool.is_reachable(index)
    }

    /// Moves focus to the first page whose title contains `query`.
    ///
    /// On a miss focus moves to target 0 and the returned outcome carries the
    /// miss, unless `strict_focus` is set.
    ///
    /// # Errors
    ///
    /// [`ClientError::FocusMiss`] on a miss under `strict_focus`; focus is
    /// left unchanged in that case.
    pub fn focus(&mut self, query: &str) -> Result<FocusOutcome, ClientError> {
        let outcome = self.directory.focus(query);
        if let FocusOutcome::FellBack { miss, .. } = &outcome {
            if self.config.strict_focus {
                return Err(ClientError::FocusMiss {
                    query: miss.query.clone(),
                });
            }
        }
        self.focused = outcome.index();
        info!("session {}: focused target {}", self.id, self.focused);
        Ok(outcome)
    }

    /// Moves focus to an explicit target index.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnknownTarget`] if `index` is out of range.
    pub fn focus_index(&mut self, index: usize) -> Result<(), ClientError> {
        if index >= self.directory.len() {
            return Err(ClientError::UnknownTarget {
                index,
                count: self.directory.len(),
            });
        }
        self.focused = index;
        Ok(())
    }

    /// Sends `method` to the focused target and returns its `result`.
    ///
    /// # Errors
    ///
    /// See [`Session::call_on`].
    pub async fn call(&self, method: &str, args: CallArgs) -> Result<Value, ClientError> {
        self.call_on(self.focused, method, args).await
    }

    /// Sends `method` to the target at `index` and returns its `result`
    /// (`null` if the reply has none).
    ///
    /// A request id is consumed even when the call fails.
    ///
    /// # Errors
    ///
    /// - [`ClientError::UnknownTarget`] for an index outside the target list
    /// - [`ClientError::Connection`] if the target is unreachable or the
    ///   connection fails
    /// - [`ClientError::Protocol`] if the target answers with an error
    /// - [`ClientError::MalformedMessage`] if an undecodable frame arrives
    /// - [`ClientError::Timeout`] if `call_timeout` elapses
    pub async fn call_on(
        &self,
        index: usize,
        method: &str,
        args: CallArgs,
    ) -> Result<Value, ClientError> {
        let _serial = self.call_lock.lock().await;
        let id = self.ids.next();

        let connection = self.pool.connection(index, method)?;
        let result = connection
            .call(id, method, args, self.config.call_timeout)
            .await;
        if let Err(e) = &result {
            warn!("session {}: call {id} failed: {e}", self.id);
        }
        result
    }

    /// A copy of every event received so far, in receipt order.
    pub fn events(&self) -> Vec<Event> {
        self.backlog.snapshot()
    }

    /// Removes and returns every event received so far.
    pub fn drain_events(&self) -> Vec<Event> {
        self.backlog.drain()
    }

    /// The id the next call will use.
    pub fn next_request_id(&self) -> u64 {
        self.ids.peek()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("targets", &self.directory.len())
            .field("focused", &self.focused)
            .field("next_id", &self.ids.peek())
            .field("events", &self.backlog.len())
            .finish()
    }
}
