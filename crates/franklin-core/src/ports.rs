use async_trait::async_trait;

use crate::{domain::ArchivedMemento, Result};

/// Durable storage for the watched base-domain list.
///
/// Implementations keep no cache: every `list()` re-reads storage. Writes are
/// whole-list replacements, so two concurrent read-modify-write cycles race and
/// the later `save()` wins.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Current watched domains, ascending.
    async fn list(&self) -> Result<Vec<String>>;

    /// Replace the stored list. Implementations sort ascending and drop duplicates.
    async fn save(&self, domains: Vec<String>) -> Result<()>;
}

/// Hexagonal port for the external archival service.
#[async_trait]
pub trait ArchiveLookup: Send + Sync {
    /// All known snapshots of `url`, oldest first. An empty list means "never archived".
    async fn timemap(&self, url: &str) -> Result<Vec<ArchivedMemento>>;
}
