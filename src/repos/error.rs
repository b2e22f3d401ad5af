/**
 * Responsibility
 * - What a repo reports upward (callers decide the HTTP meaning)
 */
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
