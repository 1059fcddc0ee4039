use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

pub(crate) type DbError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a store operation.
///
/// Only "no row matched the identifier" is told apart; everything else
/// (pool checkout, constraint violations, commit failures, an open circuit
/// breaker) is a store failure carrying the low-level message unchanged.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Failure(DbError),
}

impl StoreError {
    /// Whether the failure should count against the circuit breaker.
    ///
    /// Missing rows and constraint violations come from the request itself
    /// and say nothing about the database's health.
    pub(crate) fn trips_breaker(&self) -> bool {
        match self {
            StoreError::NotFound => false,
            StoreError::Failure(err) => !matches!(
                err.downcast_ref::<diesel::result::Error>(),
                Some(diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::UniqueViolation
                        | DatabaseErrorKind::ForeignKeyViolation
                        | DatabaseErrorKind::NotNullViolation
                        | DatabaseErrorKind::CheckViolation,
                    _,
                ))
            ),
        }
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => StoreError::NotFound,
            other => StoreError::Failure(Box::new(other)),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Failure(Box::new(err))
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Failure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}
