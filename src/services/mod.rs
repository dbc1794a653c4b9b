pub mod catalog;
pub mod content;
pub mod listing;
pub mod slug;
pub mod statistics;
pub mod users;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database unavailable")]
    Unavailable,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}
