use std::collections::BTreeMap;

use axum::{extract::{Path, Query, State}, Json};
use models::{Issue, IssueFilter};
use serde::Serialize;
use service::issues::domain::{CreateIssueInput, DeleteIssueInput, UpdateIssueInput};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::routes::AppState;

/// Body of a successful update or delete.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ActionResult {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

#[utoipa::path(
    post, path = "/api/issues/{project}", tag = "issues",
    params(("project" = String, Path, description = "Project name")),
    request_body = crate::openapi::CreateIssueDoc,
    responses(
        (status = 200, description = "Created issue, or {error: \"required field(s) missing\"}", body = crate::openapi::IssueDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Option<Json<CreateIssueInput>>,
) -> Result<Json<Issue>, ApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let issue = state.issues.create(&project, input).await?;
    Ok(Json(issue))
}

#[utoipa::path(
    get, path = "/api/issues/{project}", tag = "issues",
    params(
        ("project" = String, Path, description = "Project name"),
        ("_id" = Option<String>, Query, description = "Exact issue id"),
        ("open" = Option<bool>, Query, description = "Open/closed state"),
        ("created_by" = Option<String>, Query, description = "Author"),
        ("assigned_to" = Option<String>, Query, description = "Assignee; any other issue field filters the same way")
    ),
    responses(
        (status = 200, description = "Matching issues, oldest first", body = [crate::openapi::IssueDoc]),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let filter = IssueFilter::from(params);
    let issues = state.issues.list(&project, filter).await?;
    debug!(%project, count = issues.len(), "list issues");
    Ok(Json(issues))
}

#[utoipa::path(
    put, path = "/api/issues/{project}", tag = "issues",
    params(("project" = String, Path, description = "Project name")),
    request_body = crate::openapi::UpdateIssueDoc,
    responses(
        (status = 200, description = "{result: \"successfully updated\", _id} or an {error, _id?} body", body = crate::openapi::ActionResultDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Option<Json<UpdateIssueInput>>,
) -> Result<Json<ActionResult>, ApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let id = state.issues.update(&project, input).await?;
    info!(%project, issue_id = %id, "update issue");
    Ok(Json(ActionResult { result: "successfully updated", id }))
}

#[utoipa::path(
    delete, path = "/api/issues/{project}", tag = "issues",
    params(("project" = String, Path, description = "Project name")),
    request_body = crate::openapi::DeleteIssueDoc,
    responses(
        (status = 200, description = "{result: \"successfully deleted\", _id} or an {error, _id?} body", body = crate::openapi::ActionResultDoc),
        (status = 500, description = "Store failure")
    )
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    body: Option<Json<DeleteIssueInput>>,
) -> Result<Json<ActionResult>, ApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let id = state.issues.delete(&project, input).await?;
    info!(%project, issue_id = %id, "delete issue");
    Ok(Json(ActionResult { result: "successfully deleted", id }))
}
