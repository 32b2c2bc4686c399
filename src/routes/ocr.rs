use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;
use crate::error::AppError;
use crate::extract::ImagePayload;
use crate::ocr;

/// Vision rejects payloads above 20 MB, so there is no point accepting
/// more than that plus base64 overhead.
const MAX_UPLOAD_SIZE: usize = 28 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ocr", post(run_ocr))
        .route("/ocr/passport", post(run_passport_ocr))
        .route_layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
}

/// Plain text extraction from an image.
async fn run_ocr(
    State(state): State<AppState>,
    ImagePayload(image): ImagePayload,
) -> Result<Json<serde_json::Value>, AppError> {
    let (text, lines) = ocr::extract_text(&state.vision, &image).await?;
    Ok(Json(json!({
        "success": true,
        "text": text,
        "lines": lines,
    })))
}

/// Structured passport extraction. `data` is null when no MRZ was found,
/// which still counts as success: the image was processed, it just was
/// not a readable passport.
async fn run_passport_ocr(
    State(state): State<AppState>,
    ImagePayload(image): ImagePayload,
) -> Result<Json<serde_json::Value>, AppError> {
    let scan = ocr::analyze_passport(&state.vision, &image).await?;
    Ok(Json(json!({
        "success": true,
        "text": scan.text,
        "data": scan.record,
        "confidence": scan.confidence,
    })))
}
