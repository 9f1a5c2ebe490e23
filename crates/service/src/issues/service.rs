use std::sync::Arc;

use chrono::Utc;
use models::{Issue, IssueDocument, IssueFilter, NewIssue};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{CreateIssueInput, DeleteIssueInput, UpdateIssueInput};
use super::errors::IssueError;
use super::repository::IssueRepository;

/// Issue business service independent of web framework.
#[derive(Clone)]
pub struct IssueService {
    repo: Arc<dyn IssueRepository>,
}

impl IssueService {
    pub fn new(repo: Arc<dyn IssueRepository>) -> Self { Self { repo } }

    /// Validate and persist a new issue under `project`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::issues::{IssueService, domain::CreateIssueInput, repository::memory::InMemoryIssueStore};
    /// let svc = IssueService::new(Arc::new(InMemoryIssueStore::new()));
    /// let input = CreateIssueInput {
    ///     issue_title: Some("Fix login".into()),
    ///     issue_text: Some("500 on submit".into()),
    ///     created_by: Some("joe".into()),
    ///     ..Default::default()
    /// };
    /// let issue = tokio_test::block_on(svc.create("apitest", input)).unwrap();
    /// assert_eq!(issue.assigned_to, "");
    /// assert!(issue.open);
    /// ```
    #[instrument(skip_all, fields(project = %project))]
    pub async fn create(&self, project: &str, input: CreateIssueInput) -> Result<Issue, IssueError> {
        let new = NewIssue::new(
            input.issue_title,
            input.issue_text,
            input.created_by,
            input.assigned_to,
            input.status_text,
        )
        .map_err(|e| {
            debug!(error = %e, "create rejected");
            IssueError::RequiredFieldsMissing
        })?;

        let doc = IssueDocument { project: project.to_string(), issue: new.into_issue(Utc::now()) };
        let issue = self.repo.insert(doc).await?;
        info!(issue_id = %issue.id, "issue_created");
        Ok(issue)
    }

    #[instrument(skip_all, fields(project = %project))]
    pub async fn list(&self, project: &str, filter: IssueFilter) -> Result<Vec<Issue>, IssueError> {
        let issues = self.repo.find(project, &filter).await?;
        debug!(count = issues.len(), "issues listed");
        Ok(issues)
    }

    /// Apply a partial update; returns the `_id` that was updated.
    ///
    /// Checks run in order: missing `_id`, nothing to update, unknown or
    /// malformed `_id`.
    #[instrument(skip_all, fields(project = %project))]
    pub async fn update(&self, project: &str, input: UpdateIssueInput) -> Result<String, IssueError> {
        let id = input.id().ok_or(IssueError::MissingId)?.to_string();
        let patch = input.patch();
        if patch.is_empty() {
            return Err(IssueError::NoUpdateFields { id });
        }
        let Ok(uuid) = Uuid::parse_str(&id) else {
            debug!(issue_id = %id, "malformed _id on update");
            return Err(IssueError::CouldNotUpdate { id });
        };
        match self.repo.update_one(project, uuid, patch, Utc::now()).await? {
            Some(_) => {
                info!(issue_id = %id, "issue_updated");
                Ok(id)
            }
            None => Err(IssueError::CouldNotUpdate { id }),
        }
    }

    /// Permanently remove an issue; returns the `_id` that was deleted.
    #[instrument(skip_all, fields(project = %project))]
    pub async fn delete(&self, project: &str, input: DeleteIssueInput) -> Result<String, IssueError> {
        let id = input.id().ok_or(IssueError::MissingId)?.to_string();
        let Ok(uuid) = Uuid::parse_str(&id) else {
            debug!(issue_id = %id, "malformed _id on delete");
            return Err(IssueError::CouldNotDelete { id });
        };
        if self.repo.delete_one(project, uuid).await? {
            info!(issue_id = %id, "issue_deleted");
            Ok(id)
        } else {
            Err(IssueError::CouldNotDelete { id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::issues::repository::memory::InMemoryIssueStore;
    use async_trait::async_trait;
    use chrono::DateTime;
    use models::IssuePatch;

    fn svc() -> (IssueService, Arc<InMemoryIssueStore>) {
        let store = Arc::new(InMemoryIssueStore::new());
        (IssueService::new(store.clone()), store)
    }

    fn full_input() -> CreateIssueInput {
        CreateIssueInput {
            issue_title: Some("Issue 1".into()),
            issue_text: Some("Functional Test".into()),
            created_by: Some("fCC".into()),
            assigned_to: Some("Dom".into()),
            status_text: Some("Not Done".into()),
        }
    }

    fn update(id: &str) -> UpdateIssueInput {
        UpdateIssueInput { id: Some(id.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn create_echoes_every_field() {
        let (svc, _) = svc();
        let issue = svc.create("testing123", full_input()).await.unwrap();
        assert_eq!(issue.issue_title, "Issue 1");
        assert_eq!(issue.issue_text, "Functional Test");
        assert_eq!(issue.created_by, "fCC");
        assert_eq!(issue.assigned_to, "Dom");
        assert_eq!(issue.status_text, "Not Done");
        assert!(issue.open);
    }

    #[tokio::test]
    async fn create_missing_required_persists_nothing() {
        let (svc, store) = svc();
        let input = CreateIssueInput { issue_title: Some("".into()), issue_text: Some("".into()), ..full_input() };
        let err = svc.create("testing123", input).await.unwrap_err();
        assert!(matches!(err, IssueError::RequiredFieldsMissing));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_filters_with_and() {
        let (svc, _) = svc();
        let a = svc.create("p", full_input()).await.unwrap();
        svc.create("p", CreateIssueInput { assigned_to: None, ..full_input() }).await.unwrap();

        assert_eq!(svc.list("p", IssueFilter::new()).await.unwrap().len(), 2);
        let by_id = svc.list("p", IssueFilter::new().with("_id", a.id.to_string())).await.unwrap();
        assert_eq!(by_id, vec![a.clone()]);
        let both = svc
            .list("p", IssueFilter::new().with("created_by", "fCC").with("assigned_to", "Dom"))
            .await
            .unwrap();
        assert_eq!(both, vec![a]);
    }

    #[tokio::test]
    async fn update_validation_order() {
        let (svc, _) = svc();
        let issue = svc.create("p", full_input()).await.unwrap();
        let id = issue.id.to_string();

        let err = svc.update("p", UpdateIssueInput::default()).await.unwrap_err();
        assert!(matches!(err, IssueError::MissingId));

        let err = svc.update("p", UpdateIssueInput { issue_text: Some("".into()), ..update(&id) }).await.unwrap_err();
        assert!(matches!(err, IssueError::NoUpdateFields { id: ref e } if *e == id));

        let err = svc.update("p", UpdateIssueInput { issue_title: Some("x".into()), ..update("not-an-id") }).await.unwrap_err();
        assert!(matches!(err, IssueError::CouldNotUpdate { id: ref e } if e == "not-an-id"));

        let missing = Uuid::new_v4().to_string();
        let err = svc.update("p", UpdateIssueInput { issue_title: Some("x".into()), ..update(&missing) }).await.unwrap_err();
        assert!(matches!(err, IssueError::CouldNotUpdate { .. }));

        let err = svc.update("other", UpdateIssueInput { issue_title: Some("x".into()), ..update(&id) }).await.unwrap_err();
        assert!(matches!(err, IssueError::CouldNotUpdate { .. }));
    }

    #[tokio::test]
    async fn update_changes_only_sent_fields() {
        let (svc, _) = svc();
        let issue = svc.create("p", full_input()).await.unwrap();
        let id = issue.id.to_string();

        let out = svc
            .update("p", UpdateIssueInput { issue_title: Some("different".into()), open: Some(false), ..update(&id) })
            .await
            .unwrap();
        assert_eq!(out, id);

        let after = svc.list("p", IssueFilter::new().with("_id", id)).await.unwrap().remove(0);
        assert_eq!(after.issue_title, "different");
        assert_eq!(after.issue_text, "Functional Test");
        assert!(!after.open);
        assert!(after.updated_on >= issue.updated_on);
        assert_eq!(after.created_on, issue.created_on);
    }

    #[tokio::test]
    async fn delete_outcomes() {
        let (svc, _) = svc();
        let issue = svc.create("p", full_input()).await.unwrap();
        let id = issue.id.to_string();

        assert!(matches!(svc.delete("p", DeleteIssueInput::default()).await, Err(IssueError::MissingId)));
        assert!(matches!(
            svc.delete("p", DeleteIssueInput { id: Some("bogus".into()) }).await,
            Err(IssueError::CouldNotDelete { .. })
        ));
        assert!(matches!(
            svc.delete("other", DeleteIssueInput { id: Some(id.clone()) }).await,
            Err(IssueError::CouldNotDelete { .. })
        ));
        assert_eq!(svc.delete("p", DeleteIssueInput { id: Some(id.clone()) }).await.unwrap(), id);
        assert!(svc.list("p", IssueFilter::new().with("_id", id)).await.unwrap().is_empty());
    }

    struct BrokenStore;

    #[async_trait]
    impl IssueRepository for BrokenStore {
        async fn insert(&self, _doc: IssueDocument) -> Result<Issue, ServiceError> { Err(ServiceError::Db("disk full".into())) }
        async fn find(&self, _project: &str, _filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> { Err(ServiceError::Db("io".into())) }
        async fn update_one(&self, _project: &str, _id: Uuid, _patch: IssuePatch, _now: DateTime<Utc>) -> Result<Option<Issue>, ServiceError> { Err(ServiceError::Db("io".into())) }
        async fn delete_one(&self, _project: &str, _id: Uuid) -> Result<bool, ServiceError> { Err(ServiceError::Db("io".into())) }
    }

    #[tokio::test]
    async fn store_failures_are_not_body_errors() {
        let svc = IssueService::new(Arc::new(BrokenStore));
        assert!(svc.create("p", full_input()).await.unwrap_err().is_store_failure());
        assert!(svc.list("p", IssueFilter::new()).await.unwrap_err().is_store_failure());
        let id = Uuid::new_v4().to_string();
        let err = svc.update("p", UpdateIssueInput { status_text: Some("x".into()), ..update(&id) }).await.unwrap_err();
        assert!(err.is_store_failure());
        // validation still wins over the store
        assert!(matches!(svc.delete("p", DeleteIssueInput::default()).await, Err(IssueError::MissingId)));
    }
}
