//! The list of debuggable targets and the focus rule.
//!
//! The list is fetched once per session.  Focus selects the first target, in
//! list order, that is a page (`type == "page"`) whose title contains the
//! query.  A miss is not fatal: the focus falls back to the first target and
//! the miss is reported so the caller can decide what to do with it.

use async_trait::async_trait;
use devtools_core::target::{find_focus_target, Target};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ClientError;

/// Source of the target list.
///
/// The production implementation queries the browser's `/json` endpoint;
/// tests use a fixed list or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Human-readable location, used in error messages.
    fn endpoint(&self) -> String;

    /// Returns every target the browser currently exposes.
    async fn list_targets(&self) -> Result<Vec<Target>, String>;
}

/// A focus query that matched no page target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no page target title contains {query:?}")]
pub struct FocusMiss {
    pub query: String,
}

/// Result of [`TargetDirectory::focus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// A page target matched.
    Matched(usize),
    /// Nothing matched; focus moved to `index` instead.
    FellBack { index: usize, miss: FocusMiss },
}

impl FocusOutcome {
    /// The target index focus ends up on.
    pub fn index(&self) -> usize {
        match self {
            Self::Matched(index) | Self::FellBack { index, .. } => *index,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Immutable snapshot of the discovered targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetDirectory {
    targets: Vec<Target>,
}

impl TargetDirectory {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Queries `source` once and keeps the result.
    ///
    /// # Errors
    ///
    /// [`ClientError::Discovery`] if the source fails or lists no targets.
    pub async fn discover(source: &dyn DiscoverySource) -> Result<Self, ClientError> {
        let url = source.endpoint();
        let targets = source
            .list_targets()
            .await
            .map_err(|reason| ClientError::Discovery {
                url: url.clone(),
                reason,
            })?;
        if targets.is_empty() {
            return Err(ClientError::Discovery {
                url,
                reason: "endpoint listed no targets".to_string(),
            });
        }

        for (index, target) in targets.iter().enumerate() {
            info!(
                index,
                kind = %target.kind,
                title = %target.title,
                url = %target.url,
                "discovered target"
            );
        }
        Ok(Self::new(targets))
    }

    pub fn list(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Finds the page target whose title contains `query`, falling back to
    /// index 0 with a warning.
    pub fn focus(&self, query: &str) -> FocusOutcome {
        match find_focus_target(&self.targets, query) {
            Some(index) => FocusOutcome::Matched(index),
            None => {
                warn!("no page target title contains {query:?}; focusing target 0");
                FocusOutcome::FellBack {
                    index: 0,
                    miss: FocusMiss {
                        query: query.to_string(),
                    },
                }
            }
        }
    }
}
