//! Infrastructure layer: sockets, HTTP, and the tasks that read from them.
//!
//! # Responsibilities
//!
//! - Querying the discovery endpoint over HTTP
//! - Opening one WebSocket per target
//! - Running a reader task per connection that feeds the dispatcher
//! - In-memory transports for tests and offline use

pub mod connection;
pub mod discovery;
pub mod memory_transport;
pub mod pool;
pub mod transport;

pub use connection::Connection;
pub use discovery::{HttpDiscovery, StaticDiscovery};
pub use memory_transport::{MemoryConnector, MemoryPeer};
pub use pool::{ConnectionPool, Slot};
pub use transport::{Connector, FrameSource, WebSocketConnector};
