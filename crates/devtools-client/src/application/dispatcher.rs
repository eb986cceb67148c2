//! Per-connection call correlation.
//!
//! A [`CallDispatcher`] sits between one target connection and its callers.
//! Callers register a pending call under its request id, send the frame, and
//! await a one-shot completion.  The connection's reader task hands every
//! inbound frame to [`CallDispatcher::route`], which either completes the
//! matching pending call or appends the frame to the session's
//! [`EventBacklog`].
//!
//! ```text
//!   call(id=4) ──register──► pending {4 → tx}
//!        │                        ▲
//!        └─send─► socket ─► reader task ─► route(frame)
//!                                          ├─ id 4 pending → tx.send(result)
//!                                          └─ otherwise    → backlog.push(frame)
//! ```
//!
//! Pending ids are scoped to the dispatcher, so a reply can only complete a
//! call issued on the same connection.  Dropping a call future (or hitting
//! its timeout) removes the pending entry; the backlog is never touched by a
//! cancellation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use devtools_core::protocol::{CallArgs, CommandRequest, InboundMessage};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::events::EventBacklog;
use crate::error::ClientError;

/// Longest prefix of a frame written to the debug log.
const LOG_PREVIEW_CHARS: usize = 100;

/// Write half of a target connection.
///
/// The infrastructure layer implements this for WebSocket streams; tests
/// implement it with in-memory recorders.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Sends one text frame.
    async fn send_frame(&self, text: String) -> Result<(), String>;
}

type Reply = Result<Value, ClientError>;

struct PendingCall {
    method: String,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
struct DispatchState {
    pending: HashMap<u64, PendingCall>,
    /// Set once the connection is gone; later calls fail immediately.
    closed: Option<String>,
}

/// Routes inbound frames of one connection to pending calls or the backlog.
pub struct CallDispatcher {
    target: usize,
    state: Mutex<DispatchState>,
    backlog: Arc<EventBacklog>,
}

impl CallDispatcher {
    pub fn new(target: usize, backlog: Arc<EventBacklog>) -> Self {
        Self {
            target,
            state: Mutex::new(DispatchState::default()),
            backlog,
        }
    }

    /// Index of the target this dispatcher serves.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed.is_some()
    }

    /// Sends `method` with request id `id` through `sink` and waits for the
    /// matching reply.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connection`] if the connection is closed, the send
    ///   fails, or the connection drops before the reply arrives.
    /// - [`ClientError::Protocol`] if the reply carries an `error` field.
    /// - [`ClientError::MalformedMessage`] if an undecodable frame arrives
    ///   while the call is pending.
    /// - [`ClientError::Timeout`] if `timeout` elapses first.
    pub async fn call(
        &self,
        sink: &dyn FrameSink,
        id: u64,
        method: &str,
        args: CallArgs,
        timeout: Option<Duration>,
    ) -> Result<Value, ClientError> {
        let request = CommandRequest::new(id, method, args);
        let frame = request
            .to_json()
            .map_err(|e| ClientError::MalformedMessage {
                method: method.to_string(),
                reason: format!("cannot encode request: {e}"),
            })?;

        let reply = self.register(id, method)?;
        let _pending = PendingGuard {
            dispatcher: self,
            id,
        };

        debug!(target_index = self.target, "send[{id:03}] {method}({})", request.params);
        sink.send_frame(frame)
            .await
            .map_err(|reason| self.connection_error(method, reason))?;

        let received = match timeout {
            Some(after) => tokio::time::timeout(after, reply).await.map_err(|_| {
                warn!(target_index = self.target, "call {id} `{method}` timed out after {after:?}");
                ClientError::Timeout {
                    method: method.to_string(),
                    after,
                }
            })?,
            None => reply.await,
        };

        // A dropped sender means the dispatcher was torn down mid-call.
        received.unwrap_or_else(|_| {
            let reason = self
                .lock()
                .closed
                .clone()
                .unwrap_or_else(|| "connection dropped".to_string());
            Err(self.connection_error(method, reason))
        })
    }

    /// Classifies one inbound text frame.
    pub fn route(&self, text: &str) {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                self.fail_pending_malformed(&e.to_string());
                return;
            }
        };

        let pending = message
            .id()
            .and_then(|id| self.lock().pending.remove(&id).map(|call| (id, call)));

        match pending {
            Some((id, call)) => {
                debug!(target_index = self.target, "recv[{id:03}] {}", preview(text));
                let reply = message
                    .into_outcome()
                    .map_err(|payload| ClientError::Protocol {
                        method: call.method,
                        payload,
                    });
                // The caller may have given up already; nothing to do then.
                let _ = call.reply.send(reply);
            }
            None => {
                debug!(
                    target_index = self.target,
                    method = message.method().unwrap_or("-"),
                    "event {}",
                    preview(text)
                );
                self.backlog.push(self.target, message.into_value());
            }
        }
    }

    /// Marks the connection closed and fails every pending call with
    /// [`ClientError::Connection`].
    pub fn close(&self, reason: &str) {
        let drained: Vec<PendingCall> = {
            let mut state = self.lock();
            if state.closed.is_none() {
                state.closed = Some(reason.to_string());
            }
            state.pending.drain().map(|(_, call)| call).collect()
        };
        for call in drained {
            let err = self.connection_error(&call.method, reason.to_string());
            let _ = call.reply.send(Err(err));
        }
    }

    fn register(&self, id: u64, method: &str) -> Result<oneshot::Receiver<Reply>, ClientError> {
        let mut state = self.lock();
        if let Some(reason) = &state.closed {
            return Err(self.connection_error(method, reason.clone()));
        }
        let (tx, rx) = oneshot::channel();
        state.pending.insert(
            id,
            PendingCall {
                method: method.to_string(),
                reply: tx,
            },
        );
        Ok(rx)
    }

    fn cancel(&self, id: u64) {
        self.lock().pending.remove(&id);
    }

    fn fail_pending_malformed(&self, reason: &str) {
        let drained: Vec<PendingCall> = self.lock().pending.drain().map(|(_, c)| c).collect();
        warn!(
            target_index = self.target,
            pending = drained.len(),
            "undecodable frame: {reason}"
        );
        for call in drained {
            let _ = call.reply.send(Err(ClientError::MalformedMessage {
                method: call.method,
                reason: reason.to_string(),
            }));
        }
    }

    fn connection_error(&self, method: &str, reason: String) -> ClientError {
        ClientError::Connection {
            target: self.target,
            method: method.to_string(),
            reason,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the pending entry when the call future finishes or is dropped.
struct PendingGuard<'a> {
    dispatcher: &'a CallDispatcher,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.dispatcher.cancel(self.id);
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
