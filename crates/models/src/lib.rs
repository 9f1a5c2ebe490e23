//! Issue document model shared by the store and HTTP layers.

pub mod errors;
pub mod issue;

pub use issue::{Issue, IssueDocument, IssueFilter, IssuePatch, NewIssue};
