use ai_llm_service::AiLlmError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use knowledge_base::KbError;
use serde_json::json;
use thiserror::Error;

/// Message for uploads that carry no `files` part.
pub const MISSING_FILES_MSG: &str = "Send file(s) under 'files' form field.";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    /// Retrieval found nothing for `question`.
    #[error("No relevant documents found. Upload documents and sync first.")]
    NoContext { question: String },

    #[error("Job not found")]
    JobNotFound,

    /// Downstream or configuration failure surfaced at request time.
    #[error("{0}")]
    Upstream(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoContext { .. } | AppError::JobNotFound => StatusCode::NOT_FOUND,

            // custom mapped
            AppError::Http { status, .. } => *status,

            // 5xx
            AppError::Bind(_) | AppError::Server(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::NoContext { question } => json!({
                "question": question,
                "error": self.to_string(),
            }),
            AppError::JobNotFound => json!({
                "status": "not_found",
                "error": self.to_string(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<KbError> for AppError {
    fn from(err: KbError) -> Self {
        if err.is_invalid_input() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        if err.is_invalid_input() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::EmptyQuestion => AppError::BadRequest(err.to_string()),
            ContextorError::Kb(e) => e.into(),
            ContextorError::Llm(e) => e.into(),
            other if other.is_invalid_input() => AppError::BadRequest(other.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// A request that is not multipart at all has no `files` part either.
impl From<MultipartRejection> for AppError {
    fn from(_: MultipartRejection) -> Self {
        AppError::BadRequest(MISSING_FILES_MSG.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Http {
            status: err.status(),
            code: "MULTIPART_ERROR",
            message: err.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bodies_follow_each_error_shape() {
        let (s, b) = render(AppError::JobNotFound).await;
        assert_eq!(s, StatusCode::NOT_FOUND);
        assert_eq!(b, json!({"status": "not_found", "error": "Job not found"}));

        let (s, b) = render(AppError::NoContext { question: "q?".into() }).await;
        assert_eq!(s, StatusCode::NOT_FOUND);
        assert_eq!(b["question"], "q?");

        let (s, b) = render(AppError::Upstream("boom".into())).await;
        assert_eq!(s, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(b, json!({"error": "boom"}));
    }

    #[test]
    fn lower_layer_errors_pick_400_or_500() {
        let bad_filter: AppError = KbError::InvalidFilter("x".into()).into();
        assert!(matches!(bad_filter, AppError::BadRequest(_)));

        let unset: AppError = KbError::NotConfigured("KNOWLEDGE_BASE_ID").into();
        assert!(matches!(unset, AppError::Upstream(ref m) if m == "KNOWLEDGE_BASE_ID not configured"));

        let empty: AppError = ContextorError::EmptyQuestion.into();
        assert!(matches!(empty, AppError::BadRequest(ref m) if m == "Provide 'question' in JSON body."));
    }
}
