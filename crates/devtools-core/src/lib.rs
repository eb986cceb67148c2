//! # devtools-core
//!
//! Shared foundation for the DevTools protocol client and its binding
//! generator.  Nothing in this crate touches the network or spawns tasks.
//!
//! # Architecture overview (for beginners)
//!
//! A browser started with `--remote-debugging-port` exposes every tab as a
//! *target*.  A client talks to a target over a WebSocket by sending JSON
//! commands such as `Page.navigate` and reading back JSON replies and
//! events.  The set of available commands is published as a JSON *schema*
//! grouped into *domains* (`Page`, `DOM`, `Network`, ...).
//!
//! This crate defines:
//!
//! - **`schema`** – The in-memory protocol description the generator reads.
//!
//! - **`naming`** – How schema names become Rust identifiers
//!   (`DOMDebugger` → `domDebugger` → `dom_debugger`).
//!
//! - **`protocol`** – The JSON frames on the wire, the argument builder used
//!   by generated bindings, and the request id counter.
//!
//! - **`target`** – Target descriptors returned by the discovery endpoint and
//!   the focus-selection rule.

pub mod naming;
pub mod protocol;
pub mod schema;
pub mod target;

pub use naming::domain_to_attr_name;
pub use protocol::{CallArgs, CommandRequest, InboundMessage, MessageError, Param, RequestIdCounter};
pub use schema::{Command, Domain, ParamType, Parameter, Schema, SchemaError, Version};
pub use target::{find_focus_target, Target, PAGE_TARGET_TYPE};
