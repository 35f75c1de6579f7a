use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sportsync_core::error::CoreError;
use sportsync_engine::status::StatusError;
use sportsync_engine::EngineError;
use sportsync_provider::ProviderError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error types and implements [`IntoResponse`] to
/// produce consistent `{ "error", "code" }` JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sportsync_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A job status lookup error.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A batch/job orchestration error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// An upstream provider error.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A missing resource addressed by something other than a numeric id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Job status lookups ---
            // A distinct code: "does not exist" must never read as
            // "still running".
            AppError::Status(StatusError::NotFound(job_id)) => (
                StatusCode::NOT_FOUND,
                "JOB_NOT_FOUND",
                format!("job {job_id} not found"),
            ),
            AppError::Status(StatusError::Db(err)) => classify_sqlx_error(err),

            // --- Engine errors ---
            AppError::Engine(engine) => match engine {
                EngineError::Db(err) => classify_sqlx_error(err),
                EngineError::Provider(err) => provider_response(err),
                EngineError::UnknownJobKey(key) => (
                    StatusCode::BAD_REQUEST,
                    "UNKNOWN_JOB",
                    format!("unknown job key: {key}"),
                ),
                EngineError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal engine error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Provider errors ---
            AppError::Provider(err) => provider_response(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// The provider being down or misbehaving is an upstream failure, not an
/// internal one.
fn provider_response(err: &ProviderError) -> (StatusCode, &'static str, String) {
    tracing::warn!(error = %err, "Provider error");
    (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", err.to_string())
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_job_id_gets_a_distinct_code() {
        let (status, body) = body_json(AppError::Status(StatusError::NotFound(99))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "JOB_NOT_FOUND");
        assert_eq!(body["error"], "job 99 not found");
    }

    #[tokio::test]
    async fn bad_request_keeps_its_message() {
        let (status, body) =
            body_json(AppError::BadRequest("seasonExternalId is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["error"], "seasonExternalId is required");
    }

    #[tokio::test]
    async fn provider_errors_map_to_bad_gateway() {
        let err = ProviderError::Status {
            status: 503,
            body: "maintenance".into(),
        };
        let (status, body) = body_json(AppError::Provider(err)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "PROVIDER_ERROR");
    }

    #[tokio::test]
    async fn internal_errors_are_sanitized() {
        let (status, body) =
            body_json(AppError::InternalError("connection pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
