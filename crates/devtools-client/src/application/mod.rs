//! Application layer: message correlation and target selection.
//!
//! # Responsibilities
//!
//! - Matching each reply to the command that requested it
//! - Classifying everything else as an event and keeping it in arrival order
//! - Choosing the focused target from the discovered list
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or HTTP requests (infrastructure)
//! - Spawning reader tasks (infrastructure)

pub mod dispatcher;
pub mod events;
pub mod target_directory;

pub use dispatcher::{CallDispatcher, FrameSink};
pub use events::{Event, EventBacklog};
pub use target_directory::{DiscoverySource, FocusMiss, FocusOutcome, TargetDirectory};
