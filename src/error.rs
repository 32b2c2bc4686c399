use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::vision::OcrError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Ocr(OcrError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::Ocr(e) => write!(f, "{e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ocr(e) => provider_status(e),
        };

        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{message}");
        } else {
            tracing::warn!(status = status.as_u16(), "{message}");
        }

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// HTTP translation of the provider taxonomy.
fn provider_status(error: &OcrError) -> StatusCode {
    match error {
        OcrError::Auth(_) => StatusCode::FORBIDDEN,
        OcrError::Quota(_) => StatusCode::TOO_MANY_REQUESTS,
        OcrError::BadImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OcrError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        OcrError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<OcrError> for AppError {
    fn from(e: OcrError) -> Self {
        Self::Ocr(e)
    }
}
