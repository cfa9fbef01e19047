//! Repository adapter between list pages and the backend.
//!
//! The backend is reached through the [`EntityStore`] trait, which reports
//! failures as ordinary `Result`s. [`RepositoryAdapter`] wraps a store and
//! turns every call into an [`Envelope`]: backend errors, and panics inside
//! the store future, become `success: false` and never escape.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::envelope::Envelope;
use crate::error::StoreError;
use crate::filter::FilterCriteria;

/// Backend operations for one entity type.
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Entity: Send;
    type Patch: Send + Sync;
    type NewFields: Send + Sync;

    /// Singular entity name used in messages ("contact").
    fn entity_name(&self) -> &'static str;

    /// Fetch records; the store may narrow by `criteria` server-side.
    async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Self::Entity>, StoreError>;

    /// Apply `patch` to a single record.
    async fn update(&self, id: &str, patch: &Self::Patch) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn create(&self, fields: &Self::NewFields) -> Result<Self::Entity, StoreError>;
}

/// A single failed item of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Result of a fanned-out bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCount {
    /// Ids the action was issued for.
    pub requested: usize,
    /// Ids that succeeded.
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<BulkFailure>,
}

/// Envelope-returning facade over an [`EntityStore`].
#[derive(Debug, Clone)]
pub struct RepositoryAdapter<S> {
    store: S,
}

impl<S: EntityStore> RepositoryAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list(&self, criteria: &FilterCriteria) -> Envelope<Vec<S::Entity>> {
        guarded(self.store.entity_name(), "list", self.store.list(criteria))
            .await
            .into()
    }

    pub async fn create(&self, fields: &S::NewFields) -> Envelope<S::Entity> {
        guarded(self.store.entity_name(), "create", self.store.create(fields))
            .await
            .into()
    }

    pub async fn delete(&self, id: &str) -> Envelope<()> {
        guarded(self.store.entity_name(), "delete", self.store.delete(id))
            .await
            .into()
    }

    /// Update every id concurrently and report how many succeeded.
    ///
    /// Not transactional: some ids may succeed while others fail. The
    /// envelope is successful when at least one id succeeded.
    pub async fn bulk_update(&self, ids: &[String], patch: &S::Patch) -> Envelope<BulkCount> {
        let entity = self.store.entity_name();
        let outcomes = join_all(
            ids.iter()
                .map(|id| guarded(entity, "update", self.store.update(id, patch))),
        )
        .await;
        tally(entity, "update", ids, outcomes)
    }

    /// Delete every id concurrently and report how many succeeded.
    pub async fn bulk_delete(&self, ids: &[String]) -> Envelope<BulkCount> {
        let entity = self.store.entity_name();
        let outcomes = join_all(
            ids.iter()
                .map(|id| guarded(entity, "delete", self.store.delete(id))),
        )
        .await;
        tally(entity, "delete", ids, outcomes)
    }
}

/// Run a store call, converting panics into errors.
async fn guarded<T, F>(entity: &str, operation: &str, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let result = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Backend(format!("{} {} panicked", entity, operation))),
    };
    if let Err(e) = &result {
        warn!(entity, operation, error = %e, "Backend call failed");
    }
    result
}

fn tally(
    entity: &str,
    operation: &str,
    ids: &[String],
    outcomes: Vec<Result<(), StoreError>>,
) -> Envelope<BulkCount> {
    if ids.is_empty() {
        return Envelope::err(format!("No {} records selected", entity));
    }

    let mut summary = BulkCount {
        requested: ids.len(),
        ..BulkCount::default()
    };
    for (id, outcome) in ids.iter().zip(outcomes) {
        match outcome {
            Ok(()) => summary.count += 1,
            Err(e) => summary.failed.push(BulkFailure {
                id: id.clone(),
                error: e.to_string(),
            }),
        }
    }

    if summary.count == 0 {
        let first = summary
            .failed
            .first()
            .map(|f| f.error.clone())
            .unwrap_or_default();
        return Envelope::failed_with(
            summary,
            format!("Failed to {} any {} records: {}", operation, entity, first),
        );
    }

    Envelope::ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory store where some ids always fail.
    struct FlakyStore {
        failing: HashSet<String>,
        updated: Mutex<Vec<String>>,
    }

    impl FlakyStore {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                updated: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EntityStore for FlakyStore {
        type Entity = String;
        type Patch = String;
        type NewFields = String;

        fn entity_name(&self) -> &'static str {
            "property"
        }

        async fn list(&self, _criteria: &FilterCriteria) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn update(&self, id: &str, _patch: &String) -> Result<(), StoreError> {
            if self.failing.contains(id) {
                return Err(StoreError::Backend(format!("row {} locked", id)));
            }
            self.updated.lock().unwrap().push(id.to_string());
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            if id == "boom" {
                panic!("driver crashed");
            }
            Err(StoreError::NotFound {
                entity: "property",
                id: id.to_string(),
            })
        }

        async fn create(&self, fields: &String) -> Result<String, StoreError> {
            Ok(fields.clone())
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_bulk_update_reports_count() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&["p2"]));
        let envelope = adapter
            .bulk_update(&ids(&["p1", "p2", "p3"]), &"Won".to_string())
            .await;

        assert!(envelope.success);
        let count = envelope.data.unwrap();
        assert_eq!(count.requested, 3);
        assert_eq!(count.count, 2);
        assert_eq!(count.failed[0].id, "p2");
        assert_eq!(adapter.store().updated.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_all_failed_bulk_update_is_failure() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&["p1", "p2"]));
        let envelope = adapter.bulk_update(&ids(&["p1", "p2"]), &"Won".to_string()).await;

        assert!(!envelope.success);
        assert_eq!(envelope.data.as_ref().unwrap().count, 0);
        assert!(envelope.error.unwrap().contains("row p1 locked"));
    }

    #[tokio::test]
    async fn test_empty_selection_is_failure() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&[]));
        let envelope = adapter.bulk_delete(&[]).await;
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_becomes_envelope() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&[]));
        let envelope = adapter.list(&FilterCriteria::new()).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("backend error: connection refused"));
    }

    #[tokio::test]
    async fn test_panicking_store_is_contained() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&[]));
        let envelope = adapter.delete("boom").await;
        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("backend error: property delete panicked")
        );
    }

    #[tokio::test]
    async fn test_create_passes_through() {
        let adapter = RepositoryAdapter::new(FlakyStore::failing(&[]));
        let envelope = adapter.create(&"Dock 7".to_string()).await;
        assert_eq!(envelope.into_result(), Ok("Dock 7".to_string()));
    }
}
