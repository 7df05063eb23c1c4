use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flock_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"error": message, "code": CODE}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `flock_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Core(core) = &self;

        if core.is_client_error() {
            tracing::warn!(error = %core, "Request rejected");
        } else {
            tracing::error!(error = %core, "Request failed");
        }

        let (status, code, message) = match core {
            CoreError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            CoreError::NotFoundBy { entity, key } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} {key} not found"),
            ),
            CoreError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            CoreError::DuplicateEntry(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone())
            }
            CoreError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                msg.clone(),
            ),
            CoreError::Query(_) | CoreError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    async fn render(err: CoreError) -> (StatusCode, Value) {
        let response = AppError::from(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn each_kind_gets_its_own_status_and_code() {
        let cases = [
            (CoreError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                CoreError::NotFound {
                    entity: "Household",
                    id: 3,
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                CoreError::Forbidden("Insufficient permissions".into()),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                CoreError::DuplicateEntry("uq_clients_email".into()),
                StatusCode::CONFLICT,
                "DUPLICATE_ENTRY",
            ),
            (
                CoreError::database("Household update affected no rows"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let (got_status, body) = render(err).await;
            assert_eq!(got_status, status);
            assert_eq!(body["code"], code);
        }
    }

    #[tokio::test]
    async fn query_failures_hide_engine_message() {
        let (status, body) =
            render(CoreError::Query("relation \"secrets\" does not exist".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn not_found_by_key_names_the_key() {
        let (status, body) = render(CoreError::NotFoundBy {
            entity: "Client",
            key: "nobody@example.org".into(),
        })
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Client nobody@example.org not found");
    }
}
