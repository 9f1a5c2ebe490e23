//! Service layer providing issue CRUD on top of the `models` crate.
//! - Separates request validation from storage.
//! - Storage is a collaborator behind [`issues::IssueRepository`]; file-backed
//!   and in-memory implementations are provided.

pub mod errors;
pub mod issues;
pub mod runtime;
pub mod storage;

use std::sync::Arc;

use issues::{file_store::FileIssueStore, repository::memory::InMemoryIssueStore, IssueRepository};

/// Open the repository selected by configuration.
pub async fn open_repository(memory: bool, path: &str) -> anyhow::Result<Arc<dyn IssueRepository>> {
    if memory {
        return Ok(Arc::new(InMemoryIssueStore::new()));
    }
    runtime::ensure_data_dir(path).await?;
    let store = FileIssueStore::new(path).await?;
    Ok(store)
}
