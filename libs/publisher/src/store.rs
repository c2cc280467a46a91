//! Backing record store boundary
//!
//! The orchestrator never talks to a transport directly; it sees a
//! `ContentStore` with exactly two operations, fetch and commit, both
//! mediated by opaque version tokens. The token protocol matches a
//! typical remote content API: fetch returns the current token, commit
//! requires the token you fetched (or `None` to create) and rejects a
//! mismatch instead of merging.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::RwLock;

/// Opaque version token for optimistic concurrency control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token derived from content. Identical content yields identical
    /// tokens, so a no-op overwrite still carries a valid token.
    pub fn of_content(content: &str) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(content.as_bytes());
        Self(format!("{:08x}", hasher.finalize()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Path has no content. Expected, not exceptional: this is what
    /// drives the create path.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Version token mismatch on commit: someone else wrote first.
    /// Surfaced to the caller, never auto-merged.
    #[error("version conflict on {path}")]
    Conflict { path: String },

    /// Transport-level failure; retrying is the caller's policy.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Remote content store. The publisher only ever sees this interface;
/// transports live behind it.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch content and its current version token.
    async fn fetch(&self, path: &str) -> Result<(String, VersionToken), StoreError>;

    /// Commit content. `expected = None` creates; otherwise the token
    /// must match the store's current one or the commit is rejected
    /// with `Conflict`.
    async fn commit(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError>;
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    rejecting: RwLock<HashSet<String>>,
    offline: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a path without going through the commit protocol.
    pub async fn seed(&self, path: &str, content: &str) {
        self.entries
            .write()
            .await
            .insert(path.to_string(), content.to_string());
    }

    /// Force every subsequent commit to `path` to fail with `Conflict`.
    /// Test hook for exercising the partial-failure window.
    pub async fn reject_commits(&self, path: &str) {
        self.rejecting.write().await.insert(path.to_string());
    }

    /// Make `path` unreachable: fetch and commit both fail with
    /// `Unavailable`. Test hook for transport-level failures.
    pub async fn set_offline(&self, path: &str) {
        self.offline.write().await.insert(path.to_string());
    }

    /// Current content of a path, if any.
    pub async fn content(&self, path: &str) -> Option<String> {
        self.entries.read().await.get(path).cloned()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<(String, VersionToken), StoreError> {
        if self.offline.read().await.contains(path) {
            return Err(StoreError::Unavailable(format!("{path} unreachable")));
        }

        let entries = self.entries.read().await;
        match entries.get(path) {
            Some(content) => Ok((content.clone(), VersionToken::of_content(content))),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn commit(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        if self.offline.read().await.contains(path) {
            return Err(StoreError::Unavailable(format!("{path} unreachable")));
        }

        if self.rejecting.read().await.contains(path) {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        let mut entries = self.entries.write().await;
        let current = entries.get(path).map(|c| VersionToken::of_content(c));

        if current.as_ref() != expected {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        entries.insert(path.to_string(), content.to_string());
        Ok(VersionToken::of_content(content))
    }
}

/// Filesystem-backed store rooted at a directory. Version tokens are
/// derived from current file content at fetch/commit time.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl ContentStore for FsStore {
    async fn fetch(&self, path: &str) -> Result<(String, VersionToken), StoreError> {
        match tokio::fs::read_to_string(self.resolve(path)).await {
            Ok(content) => {
                let token = VersionToken::of_content(&content);
                Ok((content, token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn commit(
        &self,
        path: &str,
        content: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let full = self.resolve(path);

        let current = match tokio::fs::read_to_string(&full).await {
            Ok(existing) => Some(VersionToken::of_content(&existing)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };

        if current.as_ref() != expected {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(VersionToken::of_content(content))
    }
}
