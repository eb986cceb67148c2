//! Wire messages exchanged with a debugging target.
//!
//! Every frame on a target connection is one JSON object:
//!
//! ```text
//! client → target   {"id": 7, "method": "Page.navigate", "params": {"url": "…"}}
//! target → client   {"id": 7, "result": {"frameId": "…"}}
//!                   {"id": 7, "error": {"code": -32000, "message": "…"}}
//!                   {"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}
//! ```
//!
//! Whether an inbound frame is a *reply* or an *event* is not decided here:
//! a frame with an `id` that nobody is waiting for is still an event.  This
//! module only decodes frames and exposes the fields the correlation logic
//! needs.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::protocol::args::CallArgs;

/// Errors raised while decoding an inbound frame.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The frame is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The frame is valid JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

// ── Outbound ──────────────────────────────────────────────────────────────────

/// A command frame.  Field order matches what the back-ends emit in their own
/// logs, which keeps captured traffic easy to diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl CommandRequest {
    pub fn new(id: u64, method: &str, args: CallArgs) -> Self {
        Self {
            id,
            method: method.to_string(),
            params: args.into_value(),
        }
    }

    /// Serialises the frame as compact JSON text.
    ///
    /// # Errors
    ///
    /// Only fails if a parameter value cannot be represented as JSON, which
    /// cannot happen for values built through [`CallArgs`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Inbound ───────────────────────────────────────────────────────────────────

/// A decoded inbound frame, not yet classified.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    value: Value,
}

impl InboundMessage {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError`] if the text is not a JSON object.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(_) => Ok(Self { value }),
            other => Err(MessageError::NotAnObject(json_kind(&other))),
        }
    }

    /// The numeric `id`, if the frame carries one.
    pub fn id(&self) -> Option<u64> {
        self.value.get("id").and_then(Value::as_u64)
    }

    /// The `method` field, present on events.
    pub fn method(&self) -> Option<&str> {
        self.value.get("method").and_then(Value::as_str)
    }

    /// Interprets the frame as a reply: `Err(error)` when it carries an
    /// `error` field, otherwise `Ok(result)` (`null` if `result` is missing).
    pub fn into_outcome(self) -> Result<Value, Value> {
        let Value::Object(mut fields) = self.value else {
            return Ok(Value::Null);
        };
        if let Some(error) = fields.remove("error") {
            return Err(error);
        }
        Ok(fields.remove("result").unwrap_or(Value::Null))
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// The frame exactly as received.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Short human-readable summary of a remote `error` payload, used in logs
/// and error messages.  The payload itself is always kept verbatim.
pub fn describe_remote_error(payload: &Value) -> String {
    let code = payload.get("code").and_then(Value::as_i64);
    let message = payload.get("message").and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => format!("{message} (code {code})"),
        (None, Some(message)) => message.to_string(),
        _ => payload.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
