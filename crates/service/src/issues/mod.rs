//! Issue module: domain inputs, repository collaborator, and the service that
//! validates requests before they reach the store.

pub mod domain;
pub mod errors;
pub mod file_store;
pub mod repository;
pub mod service;

pub use errors::IssueError;
pub use repository::IssueRepository;
pub use service::IssueService;
