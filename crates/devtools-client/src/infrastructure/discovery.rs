//! Target discovery over HTTP.
//!
//! A browser started with `--remote-debugging-port=9222` serves its target
//! list at `http://localhost:9222/json` as a JSON array of
//! [`Target`] descriptors.

use std::time::Duration;

use async_trait::async_trait;
use devtools_core::target::Target;
use tracing::debug;

use crate::application::DiscoverySource;
use crate::error::ClientError;

/// Production [`DiscoverySource`]: `GET <url>` with reqwest.
#[derive(Debug, Clone)]
pub struct HttpDiscovery {
    url: String,
    client: reqwest::Client,
}

impl HttpDiscovery {
    /// Builds a discovery client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Discovery`] if the HTTP client cannot be initialised
    /// (for example when no TLS backend is available).
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Discovery {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl DiscoverySource for HttpDiscovery {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn list_targets(&self) -> Result<Vec<Target>, String> {
        debug!("GET {}", self.url);
        self.client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| e.to_string())?
            .json::<Vec<Target>>()
            .await
            .map_err(|e| format!("invalid target list: {e}"))
    }
}

/// A fixed target list, for tests and for attaching to a known WebSocket URL
/// without an HTTP endpoint.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    targets: Vec<Target>,
}

impl StaticDiscovery {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl DiscoverySource for StaticDiscovery {
    fn endpoint(&self) -> String {
        "static target list".to_string()
    }

    async fn list_targets(&self) -> Result<Vec<Target>, String> {
        Ok(self.targets.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_discovery_returns_its_list() {
        let target: Target = serde_json::from_str(
            r#"{"id":"A","type":"page","title":"Example Domain","webSocketDebuggerUrl":"ws://x/A"}"#,
        )
        .unwrap();
        let source = StaticDiscovery::new(vec![target.clone()]);

        assert_eq!(source.list_targets().await.unwrap(), vec![target]);
    }

    #[tokio::test]
    async fn test_http_discovery_reports_unreachable_endpoint() {
        // Arrange: port 9 (discard) on localhost is never a DevTools endpoint
        let source =
            HttpDiscovery::new("http://127.0.0.1:9/json", Duration::from_millis(500)).unwrap();

        // Act
        let result = source.list_targets().await;

        // Assert
        assert!(result.is_err());
        assert_eq!(source.endpoint(), "http://127.0.0.1:9/json");
    }
}
