//! In-memory manifest store
//!
//! The store is the single synchronization point of the registry: one
//! exclusive lock guards the whole repository table, and every operation
//! holds it end to end, including any [`ChartPreparer`] call it makes. A
//! reader therefore never observes a half-populated repository, at the
//! price of serializing all traffic while a preparation is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{RegistryError, RegistryResult};
use crate::prepare::ChartPreparer;

/// A fully-formed manifest record.
///
/// Records are immutable once stored; an update replaces the whole record
/// under the store lock.
#[derive(Debug, Clone)]
pub struct StoredManifest {
    /// Media type served back in `Content-Type`.
    pub content_type: String,
    /// Exact bytes served to clients, and the digest input.
    pub blob: Bytes,
    /// Digests of blobs this manifest references, for dependency
    /// bookkeeping by collaborators.
    pub refs: Vec<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl StoredManifest {
    /// Create a record stamped with the current time.
    pub fn new(
        content_type: impl Into<String>,
        blob: impl Into<Bytes>,
        refs: Vec<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            blob: blob.into(),
            refs,
            created_at: Utc::now(),
        }
    }

    /// Content digest of the stored blob.
    ///
    /// Recomputed on every call so it can never disagree with the bytes
    /// actually served, even if the record was replaced in between.
    pub fn digest(&self) -> String {
        format!("sha256:{}", hex::encode(Sha256::digest(&self.blob)))
    }
}

/// The repository table: repository name to reference to manifest.
///
/// References are tags unless they contain `sha256:`, which marks them as
/// digests. A [`ChartPreparer`] receives this table as an exclusive view
/// while the store lock is held, so population writes land in the same
/// critical section as the lookup that triggered them.
#[derive(Debug, Default)]
pub struct Repositories {
    entries: HashMap<String, HashMap<String, StoredManifest>>,
}

impl Repositories {
    /// Whether the repository has any entry at all.
    pub fn contains(&self, repository: &str) -> bool {
        self.entries.contains_key(repository)
    }

    /// Look up a single reference.
    pub fn get(&self, repository: &str, reference: &str) -> Option<&StoredManifest> {
        self.entries.get(repository)?.get(reference)
    }

    /// Insert or replace a record.
    ///
    /// Replacement is whole-record; preparers that must keep an existing
    /// record (idempotence) check [`Repositories::get`] first.
    pub fn insert(
        &mut self,
        repository: impl Into<String>,
        reference: impl Into<String>,
        manifest: StoredManifest,
    ) {
        self.entries
            .entry(repository.into())
            .or_default()
            .insert(reference.into(), manifest);
    }

    /// Tags of a repository: reference keys that are not digests, sorted
    /// ascending. `None` when the repository itself is unknown.
    fn tags(&self, repository: &str) -> Option<Vec<String>> {
        let references = self.entries.get(repository)?;
        let mut tags: Vec<String> = references
            .keys()
            .filter(|reference| !reference.contains("sha256:"))
            .cloned()
            .collect();
        tags.sort();
        Some(tags)
    }

    /// Repository names in map order.
    fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// Shared, lock-disciplined manifest cache.
///
/// Cloning yields another handle to the same table. All access goes through
/// transactional operations; the raw table is reachable only through
/// [`ManifestStore::with_repositories`], which takes the same lock.
#[derive(Clone, Debug, Default)]
pub struct ManifestStore {
    repositories: Arc<Mutex<Repositories>>,
}

impl ManifestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a manifest, populating on demand.
    ///
    /// An absent repository triggers preparation, which requires the name
    /// to carry at least a namespace and a chart name. A present repository
    /// missing the reference gets one further preparation attempt before
    /// the lookup fails with [`RegistryError::ManifestNotFound`].
    pub async fn get_or_prepare(
        &self,
        preparer: &dyn ChartPreparer,
        repository: &str,
        reference: &str,
    ) -> RegistryResult<StoredManifest> {
        let mut repositories = self.repositories.lock().await;

        if !repositories.contains(repository) {
            let (namespace, name) = split_namespace(repository)?;
            tracing::debug!(repository, reference, "repository miss, preparing chart");
            preparer
                .prepare(&mut repositories, namespace, name, reference)
                .await?;
        }

        if let Some(manifest) = repositories.get(repository, reference) {
            return Ok(manifest.clone());
        }

        // The repository may exist without this reference; the preparer
        // gets one more chance before the lookup fails for good.
        let (namespace, name) = split_namespace(repository)?;
        tracing::debug!(repository, reference, "reference miss, preparing chart");
        preparer
            .prepare(&mut repositories, namespace, name, reference)
            .await?;

        repositories
            .get(repository, reference)
            .cloned()
            .ok_or(RegistryError::ManifestNotFound)
    }

    /// List the tags of a repository, refreshing it through the preparer
    /// first.
    ///
    /// Unlike manifest fetches, the preparer runs unconditionally; the
    /// empty reference asks it for every known reference of the
    /// repository.
    pub async fn list_tags(
        &self,
        preparer: &dyn ChartPreparer,
        repository: &str,
    ) -> RegistryResult<Vec<String>> {
        let mut repositories = self.repositories.lock().await;

        let (namespace, name) = split_namespace(repository)?;
        preparer
            .prepare(&mut repositories, namespace, name, "")
            .await?;

        repositories
            .tags(repository)
            .ok_or(RegistryError::ManifestNotFound)
    }

    /// Repository names known to the store, in map order, capped at
    /// `limit`. The order is whatever the underlying map yields.
    pub async fn list_repositories(&self, limit: usize) -> Vec<String> {
        let repositories = self.repositories.lock().await;
        repositories.names().take(limit).cloned().collect()
    }

    /// Run `f` with exclusive access to the repository table, outside of
    /// request handling. Meant for seeding and inspection.
    pub async fn with_repositories<R>(&self, f: impl FnOnce(&mut Repositories) -> R) -> R {
        let mut repositories = self.repositories.lock().await;
        f(&mut repositories)
    }
}

/// Split a repository name into the namespace and chart name handed to the
/// preparer. Anything shorter than two components cannot name a chart.
fn split_namespace(repository: &str) -> RegistryResult<(&str, &str)> {
    let parts: Vec<&str> = repository.split('/').collect();
    if parts.len() < 2 {
        return Err(RegistryError::InvalidParams);
    }
    Ok((parts[0], parts[1]))
}
