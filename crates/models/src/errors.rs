use sea_orm::sqlx;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Db(String),
}

/// Driver failures that mean the server or pool went away, not that the statement was wrong.
fn is_connection_loss(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
            return ModelError::UniqueViolation(msg);
        }
        match e {
            DbErr::Conn(inner) => ModelError::Unavailable(inner.to_string()),
            DbErr::ConnectionAcquire(inner) => ModelError::Unavailable(inner.to_string()),
            DbErr::Query(RuntimeErr::SqlxError(inner)) | DbErr::Exec(RuntimeErr::SqlxError(inner))
                if is_connection_loss(&inner) =>
            {
                ModelError::Unavailable(inner.to_string())
            }
            other => ModelError::Db(other.to_string()),
        }
    }
}
