//! Wire-level protocol: command frames, inbound frame decoding, argument
//! maps, and request ids.

pub mod args;
pub mod messages;
pub mod sequence;

pub use args::{CallArgs, Param};
pub use messages::{describe_remote_error, CommandRequest, InboundMessage, MessageError};
pub use sequence::RequestIdCounter;
