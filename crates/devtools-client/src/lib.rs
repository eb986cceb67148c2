//! devtools-client library crate.
//!
//! An async client for the browser DevTools protocol.  A [`Session`]
//! discovers the browser's targets, opens one WebSocket per target, and
//! correlates every reply with the command that asked for it.  Typed domain
//! bindings (`session.page().navigate(..)`) are generated at build time from
//! the bundled protocol schema.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! caller
//!   ↕  session.page().navigate(..)        (generated bindings)
//! [devtools-client]
//!   ├── session          Facade: focus, id counter, call serialisation
//!   ├── domain/          ClientConfig (plain data + TOML loading)
//!   ├── application/     Reply correlation, event backlog, focus rule
//!   └── infrastructure/
//!         ├── discovery  GET /json (reqwest)
//!         ├── transport  WebSocket per target (tokio-tungstenite)
//!         └── pool       One reader task per connection
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no async code and no network I/O.
//! - `application` depends on `domain` and `devtools-core` only; transports
//!   reach it through the [`FrameSink`](application::FrameSink) and
//!   [`DiscoverySource`](application::DiscoverySource) traits.
//! - `infrastructure` depends on all other layers plus `tokio`,
//!   `tokio-tungstenite`, and `reqwest`.
//!
//! # Example
//!
//! ```no_run
//! use devtools_client::{ClientConfig, Domains, Session};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut session = Session::connect(ClientConfig::default()).await?;
//! session.focus("Example Domain")?;
//! session.page().navigate("https://example.com", None, None, None).await?;
//! let title = session
//!     .runtime()
//!     .evaluate("document.title", None, None, None, None)
//!     .await?;
//! println!("{}", title["result"]["value"]);
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration.
pub mod domain;

/// Application layer: correlation and target selection.
pub mod application;

/// Infrastructure layer: HTTP discovery, WebSocket connections, reader tasks.
pub mod infrastructure;

pub mod error;
pub mod session;

/// Typed bindings generated from `protocol/browser_protocol.json`.
#[allow(
    clippy::too_many_arguments,
    dead_code,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_html_tags,
    rustdoc::bare_urls
)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

pub use application::{Event, FocusMiss, FocusOutcome};
pub use bindings::{Domains, PROTOCOL_VERSION};
pub use devtools_core::{CallArgs, Param, Target};
pub use domain::ClientConfig;
pub use error::ClientError;
pub use session::Session;
