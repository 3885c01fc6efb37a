use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clipforge_core::CoreError;
use clipforge_vendor::{PollError, ProviderError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain, vendor, and polling errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input validation from `clipforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Job creation failed at the vendor.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The job was created but never produced a video.
    #[error(transparent)]
    Poll(#[from] PollError),

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
        let (status, body) = match self {
            AppError::Core(CoreError::Validation(msg)) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }

            // The vendor's own status and body are relayed to the client.
            AppError::Provider(ProviderError::Vendor {
                provider,
                status,
                details,
            }) => {
                tracing::warn!(provider, status, "Video job creation rejected by vendor");
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    code,
                    json!({
                        "error": format!("{provider} API error"),
                        "status_code": status,
                        "details": details,
                    }),
                )
            }
            AppError::Provider(err) => {
                tracing::error!(error = %err, "Video job creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }

            AppError::Poll(err) => {
                tracing::warn!(error = %err, "Video job did not produce a video");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal error occurred" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
