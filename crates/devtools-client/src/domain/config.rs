//! Client configuration.
//!
//! [`ClientConfig`] is a plain struct: build it from defaults, from a TOML
//! file, or field by field from CLI arguments.  Nothing in the library reads
//! environment variables; the `devtools` binary layers those on top.
//!
//! ```toml
//! discovery_url = "http://localhost:9222/json"
//! initial_focus = "Example Domain"
//! strict_focus = false
//! call_timeout_secs = 30.0
//! connect_timeout_secs = 10.0
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discovery endpoint of a browser started with `--remote-debugging-port=9222`.
pub const DEFAULT_DISCOVERY_URL: &str = "http://localhost:9222/json";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `discovery_url` is not an http(s) URL.
    #[error("invalid discovery URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    /// A timeout is negative, zero, or not a number.
    #[error("invalid {field}: {value}")]
    InvalidTimeout { field: &'static str, value: f64 },
}

/// All runtime settings of a [`Session`](crate::Session).
///
/// | Field             | Default                        |
/// |-------------------|--------------------------------|
/// | `discovery_url`   | `http://localhost:9222/json`   |
/// | `initial_focus`   | none (first target)            |
/// | `strict_focus`    | `false`                        |
/// | `call_timeout`    | none (wait indefinitely)       |
/// | `connect_timeout` | 10 seconds                     |
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// URL of the endpoint listing debuggable targets.
    pub discovery_url: String,
    /// Title substring of the page to focus once connected.
    pub initial_focus: Option<String>,
    /// Turn focus misses into [`ClientError::FocusMiss`](crate::ClientError)
    /// instead of falling back to the first target.
    pub strict_focus: bool,
    /// Upper bound on the wait for a single reply.
    pub call_timeout: Option<Duration>,
    /// Upper bound on discovery and on opening each connection.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            initial_focus: None,
            strict_focus: false,
            call_timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// On-disk shape.  Durations are written as (fractional) seconds.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    discovery_url: Option<String>,
    initial_focus: Option<String>,
    strict_focus: Option<bool>,
    call_timeout_secs: Option<f64>,
    connect_timeout_secs: Option<f64>,
}

impl ClientConfig {
    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise the errors
    /// of [`ClientConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys, and the
    /// errors of [`ClientConfig::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let defaults = Self::default();

        let config = Self {
            discovery_url: file.discovery_url.unwrap_or(defaults.discovery_url),
            initial_focus: file.initial_focus.or(defaults.initial_focus),
            strict_focus: file.strict_focus.unwrap_or(defaults.strict_focus),
            call_timeout: file
                .call_timeout_secs
                .map(|secs| seconds("call_timeout_secs", secs))
                .transpose()?,
            connect_timeout: file
                .connect_timeout_secs
                .map(|secs| seconds("connect_timeout_secs", secs))
                .transpose()?
                .unwrap_or(defaults.connect_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that `discovery_url` is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidUrl`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidUrl {
            url: self.discovery_url.clone(),
            reason,
        };
        let (scheme, rest) = self
            .discovery_url
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if rest.is_empty() || rest.starts_with('/') {
            return Err(invalid("missing host"));
        }
        Ok(())
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(value) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ConfigError::InvalidTimeout { field, value }),
    }
}
