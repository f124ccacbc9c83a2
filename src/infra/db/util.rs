use sqlx::error::ErrorKind;

use crate::application::repos::RepoError;

/// Postgres `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    let db = match err {
        sqlx::Error::RowNotFound => return RepoError::NotFound,
        sqlx::Error::PoolTimedOut => return RepoError::Timeout,
        sqlx::Error::Database(db) => db,
        other => return RepoError::from_persistence(other),
    };

    if db.code().as_deref() == Some(QUERY_CANCELED) {
        return RepoError::Timeout;
    }

    match db.kind() {
        ErrorKind::UniqueViolation => RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation => {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        ErrorKind::CheckViolation => RepoError::Integrity {
            message: db.message().to_string(),
        },
        _ => RepoError::from_persistence(db),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_a_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            RepoError::Persistence(_)
        ));
    }
}
