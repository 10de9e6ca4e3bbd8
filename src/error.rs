use thiserror::Error;

/// Typed failures surfaced by the matching core. Store-level problems are
/// folded into `CollaboratorUnavailable`; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("only academic e-mail addresses are eligible")]
    IneligibleEmail,
    #[error("password rejected: {}", .0.join("; "))]
    InvalidPassword(Vec<String>),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store unavailable: {0}")]
    CollaboratorUnavailable(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
