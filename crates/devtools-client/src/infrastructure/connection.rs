//! One open connection to a target plus its reader task.

use std::sync::Arc;
use std::time::Duration;

use devtools_core::protocol::CallArgs;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{CallDispatcher, EventBacklog, FrameSink};
use crate::error::ClientError;
use crate::infrastructure::transport::FrameSource;

/// An open target connection.
///
/// Dropping a `Connection` aborts its reader task; no close handshake is
/// sent.
pub struct Connection {
    url: String,
    sink: Box<dyn FrameSink>,
    dispatcher: Arc<CallDispatcher>,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Wraps freshly opened transport halves and spawns the reader task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        target: usize,
        url: &str,
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
        backlog: Arc<EventBacklog>,
        session_id: Uuid,
    ) -> Self {
        let dispatcher = Arc::new(CallDispatcher::new(target, backlog));
        let reader = tokio::spawn(read_frames(source, Arc::clone(&dispatcher), session_id));
        Self {
            url: url.to_string(),
            sink,
            dispatcher,
            reader,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn target(&self) -> usize {
        self.dispatcher.target()
    }

    /// `true` once the peer closed the connection or the transport failed.
    pub fn is_closed(&self) -> bool {
        self.dispatcher.is_closed()
    }

    /// Sends one command and waits for its reply.
    ///
    /// # Errors
    ///
    /// See [`CallDispatcher::call`].
    pub async fn call(
        &self,
        id: u64,
        method: &str,
        args: CallArgs,
        timeout: Option<Duration>,
    ) -> Result<Value, ClientError> {
        self.dispatcher
            .call(self.sink.as_ref(), id, method, args, timeout)
            .await
    }

    /// Writes a raw text frame.  Any reply it provokes is routed like an
    /// event, since no call is waiting for it.
    pub async fn send(&self, text: String) -> Result<(), String> {
        if self.is_closed() {
            return Err("connection closed".to_string());
        }
        self.sink.send_frame(text).await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("target", &self.target())
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Feeds every inbound frame to the dispatcher until the transport ends.
async fn read_frames(
    mut source: Box<dyn FrameSource>,
    dispatcher: Arc<CallDispatcher>,
    session_id: Uuid,
) {
    let target = dispatcher.target();
    loop {
        match source.next_frame().await {
            Some(Ok(text)) => dispatcher.route(&text),
            Some(Err(e)) => {
                warn!("session {session_id}: target {target} read failed: {e}");
                dispatcher.close(&e);
                return;
            }
            None => {
                debug!("session {session_id}: target {target} closed the connection");
                dispatcher.close("connection closed by target");
                return;
            }
        }
    }
}
