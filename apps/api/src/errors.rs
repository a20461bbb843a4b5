use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::entries::editor::EditorError;
use crate::entries::models::UnknownEntryType;
use crate::validation::FieldErrors;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A submitted form failed its schema. Rendered with the field map.
    #[error("Invalid form: {0}")]
    InvalidForm(FieldErrors),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<UnknownEntryType> for AppError {
    fn from(e: UnknownEntryType) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidForm(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_FORM",
                "One or more fields are invalid".to_string(),
                Some(fields),
            ),
            AppError::Editor(e) => {
                let (status, code) = match e {
                    EditorError::NotComposing | EditorError::NotIdle => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION")
                    }
                    EditorError::ImproveInFlight => (StatusCode::CONFLICT, "IMPROVE_IN_FLIGHT"),
                    EditorError::IndexOutOfRange { .. } => {
                        (StatusCode::NOT_FOUND, "ENTRY_NOT_FOUND")
                    }
                    EditorError::EmptyDescription
                    | EditorError::FieldNotApplicable { .. }
                    | EditorError::NotTextField(_) => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                    }
                };
                tracing::debug!("Rejected editor transition: {e}");
                (status, code, e.to_string(), None)
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
