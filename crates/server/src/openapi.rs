use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct IssueDoc {
    pub _id: Uuid,
    pub issue_title: String,
    pub issue_text: String,
    /// RFC 3339 UTC
    pub created_on: String,
    /// RFC 3339 UTC
    pub updated_on: String,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

#[derive(ToSchema)]
pub struct CreateIssueDoc {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateIssueDoc {
    pub _id: String,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

#[derive(ToSchema)]
pub struct DeleteIssueDoc { pub _id: String }

#[derive(ToSchema)]
pub struct ActionResultDoc {
    /// `successfully updated` / `successfully deleted`; failures carry `error` instead
    pub result: String,
    pub _id: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::issues::create_issue,
        crate::routes::issues::list_issues,
        crate::routes::issues::update_issue,
        crate::routes::issues::delete_issue,
    ),
    components(
        schemas(
            HealthResponse,
            IssueDoc,
            CreateIssueDoc,
            UpdateIssueDoc,
            DeleteIssueDoc,
            ActionResultDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "issues")
    )
)]
pub struct ApiDoc;
