use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::issues::IssueError;
use thiserror::Error;
use tracing::error;

/// Body shape of every failed issue operation.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Handler error for the issue API.
///
/// Validation and not-found outcomes are answered with HTTP 200 and an
/// `error` key; clients tell success from failure by the body only. Store
/// failures are the exception and surface as 500.
#[derive(Debug)]
pub struct ApiError(pub IssueError);

impl From<IssueError> for ApiError {
    fn from(e: IssueError) -> Self { Self(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if let IssueError::Store(inner) = &err {
            error!(error = %inner, "issue store failure");
            let body = ErrorBody { error: inner.to_string(), id: None };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
        let body = ErrorBody { error: err.to_string(), id: err.id().map(str::to_string) };
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::errors::ServiceError;

    #[test]
    fn body_errors_are_200() {
        let res = ApiError(IssueError::MissingId).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        let res = ApiError(IssueError::CouldNotDelete { id: "x".into() }).into_response();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn store_errors_are_500() {
        let res = ApiError(IssueError::Store(ServiceError::Db("io".into()))).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_omits_absent_id() {
        let v = serde_json::to_value(ErrorBody { error: "missing _id".into(), id: None }).unwrap();
        assert_eq!(v, serde_json::json!({"error": "missing _id"}));
        let v = serde_json::to_value(ErrorBody { error: "could not update".into(), id: Some("a".into()) }).unwrap();
        assert_eq!(v, serde_json::json!({"error": "could not update", "_id": "a"}));
    }
}
