use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::{Issue, IssueDocument, IssueFilter, IssuePatch};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::issues::repository::{select, IssueRepository};
use crate::storage::json_map_store::JsonMapStore;

/// File-backed issue store: every document of every project in one JSON file,
/// keyed by `_id`.
#[derive(Clone)]
pub struct FileIssueStore {
    store: Arc<JsonMapStore<Uuid, IssueDocument>>,
}

impl FileIssueStore {
    /// Open the store, creating the file if it does not exist yet.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<Uuid, IssueDocument>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl IssueRepository for FileIssueStore {
    async fn insert(&self, doc: IssueDocument) -> Result<Issue, ServiceError> {
        if self.store.get(&doc.issue.id).await.is_some() {
            return Err(ServiceError::Validation(format!("duplicate _id {}", doc.issue.id)));
        }
        let issue = doc.issue.clone();
        self.store.insert(issue.id, doc).await?;
        Ok(issue)
    }

    async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let docs = self.store.values().await;
        let found = select(docs.iter(), project, filter);
        debug!(%project, scanned = docs.len(), matched = found.len(), "file store find");
        Ok(found)
    }

    async fn update_one(&self, project: &str, id: Uuid, patch: IssuePatch, now: DateTime<Utc>) -> Result<Option<Issue>, ServiceError> {
        let updated = self
            .store
            .modify(&id, |doc| {
                if doc.project != project {
                    return false;
                }
                doc.issue.apply(patch, now);
                true
            })
            .await?;
        Ok(updated.map(|doc| doc.issue))
    }

    async fn delete_one(&self, project: &str, id: Uuid) -> Result<bool, ServiceError> {
        let removed = self.store.remove_if(&id, |doc| doc.project == project).await?;
        Ok(removed.is_some())
    }
}
