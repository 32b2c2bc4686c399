//! Image extraction from incoming requests. Both OCR endpoints accept the
//! same two shapes: a JSON body with a base64 `image` field, or a
//! multipart form with an `image` file field.

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct JsonImageBody {
    image: Option<String>,
}

/// Raw image bytes pulled from either supported request shape.
pub struct ImagePayload(pub Vec<u8>);

impl<S> FromRequest<S> for ImagePayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<JsonImageBody>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
            let encoded = body.image.ok_or_else(|| {
                AppError::BadRequest("Missing 'image' field in JSON body.".to_string())
            })?;
            let bytes = BASE64.decode(encoded).map_err(|_| {
                AppError::BadRequest("Invalid base64 data in 'image' field.".to_string())
            })?;
            return Ok(Self(bytes));
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {e}")))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {e}")))?
            {
                if field.name() == Some("image") {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read image field: {e}"))
                    })?;
                    return Ok(Self(bytes.to_vec()));
                }
            }
        }

        Err(AppError::BadRequest(
            "No image provided. Send JSON {\"image\": \"<base64>\"} or a multipart form \
             with an 'image' file field."
                .to_string(),
        ))
    }
}
