use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use aifeed_survey::AnswerError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    /// Several field-level problems reported together
    InvalidInput(Vec<String>),
    /// Exit-survey submission failed the question rules
    InvalidAnswers(Vec<AnswerError>),
    NotFoundError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::InvalidInput(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::InvalidAnswers(errors) => {
                let details: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "question_id": e.question_id(), "message": e.to_string() }))
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "Invalid survey answers", "details": details }),
                )
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
