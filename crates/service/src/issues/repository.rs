use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::{Issue, IssueDocument, IssueFilter, IssuePatch};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Document store collaborator for issues.
///
/// Every lookup is scoped to a project: an id that exists under another
/// project behaves exactly like an id that does not exist.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    async fn insert(&self, doc: IssueDocument) -> Result<Issue, ServiceError>;
    /// Issues of `project` matching every filter entry, oldest first.
    async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError>;
    /// Apply `patch` and return the updated issue, or `None` if not found.
    async fn update_one(&self, project: &str, id: Uuid, patch: IssuePatch, now: DateTime<Utc>) -> Result<Option<Issue>, ServiceError>;
    /// Returns whether a document was removed.
    async fn delete_one(&self, project: &str, id: Uuid) -> Result<bool, ServiceError>;
}

/// Select and order the issues of a project.
pub(crate) fn select<'a, I>(docs: I, project: &str, filter: &IssueFilter) -> Vec<Issue>
where
    I: IntoIterator<Item = &'a IssueDocument>,
{
    let mut out: Vec<Issue> = docs
        .into_iter()
        .filter(|d| d.project == project && d.issue.matches(filter))
        .map(|d| d.issue.clone())
        .collect();
    out.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
    out
}

/// In-memory repository for tests, doc examples and `storage.backend = "memory"`.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryIssueStore {
        docs: RwLock<HashMap<Uuid, IssueDocument>>,
    }

    impl InMemoryIssueStore {
        pub fn new() -> Self { Self::default() }

        pub async fn len(&self) -> usize { self.docs.read().await.len() }

        pub async fn is_empty(&self) -> bool { self.docs.read().await.is_empty() }
    }

    #[async_trait]
    impl IssueRepository for InMemoryIssueStore {
        async fn insert(&self, doc: IssueDocument) -> Result<Issue, ServiceError> {
            let mut docs = self.docs.write().await;
            if docs.contains_key(&doc.issue.id) {
                return Err(ServiceError::Validation(format!("duplicate _id {}", doc.issue.id)));
            }
            let issue = doc.issue.clone();
            docs.insert(issue.id, doc);
            Ok(issue)
        }

        async fn find(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
            let docs = self.docs.read().await;
            Ok(select(docs.values(), project, filter))
        }

        async fn update_one(&self, project: &str, id: Uuid, patch: IssuePatch, now: DateTime<Utc>) -> Result<Option<Issue>, ServiceError> {
            let mut docs = self.docs.write().await;
            Ok(match docs.get_mut(&id) {
                Some(doc) if doc.project == project => {
                    doc.issue.apply(patch, now);
                    Some(doc.issue.clone())
                }
                _ => None,
            })
        }

        async fn delete_one(&self, project: &str, id: Uuid) -> Result<bool, ServiceError> {
            let mut docs = self.docs.write().await;
            if docs.get(&id).is_some_and(|d| d.project == project) {
                docs.remove(&id);
                return Ok(true);
            }
            Ok(false)
        }
    }
}
