use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn db(err: impl std::fmt::Display) -> Self { Self::Db(err.to_string()) }
}
