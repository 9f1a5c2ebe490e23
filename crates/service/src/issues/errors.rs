use thiserror::Error;

use crate::errors::ServiceError;

/// Outcomes of issue operations that are not a plain success.
///
/// All but `Store` are reported to clients in the response body; the
/// `Display` text is the exact client-facing message.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("required field(s) missing")]
    RequiredFieldsMissing,
    #[error("missing _id")]
    MissingId,
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },
    #[error("could not update")]
    CouldNotUpdate { id: String },
    #[error("could not delete")]
    CouldNotDelete { id: String },
    #[error(transparent)]
    Store(#[from] ServiceError),
}

impl IssueError {
    /// The `_id` echoed back alongside the error, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            IssueError::NoUpdateFields { id }
            | IssueError::CouldNotUpdate { id }
            | IssueError::CouldNotDelete { id } => Some(id),
            _ => None,
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, IssueError::Store(_))
    }
}
