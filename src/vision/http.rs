//! HTTP transport for the Vision REST API. This is the network boundary;
//! everything above it is testable with a scripted transport.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::vision::auth::TokenSource;
use crate::vision::error::OcrError;
use crate::vision::types::{AnnotateBatchResponse, AnnotateImageResponse, AnnotateRequest, ApiErrorBody};

/// Batch annotate endpoint of the public Vision API.
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// One annotate attempt against the provider.
///
/// Implementations classify their failures into the [`OcrError`] taxonomy;
/// retrying is the caller's concern.
#[async_trait]
pub trait VisionTransport: Send + Sync {
    async fn annotate(&self, request: &AnnotateRequest) -> Result<AnnotateImageResponse, OcrError>;
}

pub struct HttpVisionTransport {
    endpoint: String,
    http: reqwest::Client,
    tokens: TokenSource,
}

impl HttpVisionTransport {
    pub fn new(endpoint: String, http: reqwest::Client, tokens: TokenSource) -> Self {
        Self {
            endpoint,
            http,
            tokens,
        }
    }
}

#[async_trait]
impl VisionTransport for HttpVisionTransport {
    async fn annotate(&self, request: &AnnotateRequest) -> Result<AnnotateImageResponse, OcrError> {
        let token = self.tokens.token().await?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &body));
        }

        let batch: AnnotateBatchResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Other(format!("malformed annotate response: {e}")))?;

        batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| OcrError::Other("annotate response contained no results".to_string()))
    }
}

fn classify_send_error(e: reqwest::Error) -> OcrError {
    if e.is_timeout() {
        OcrError::Unavailable(format!("deadline exceeded: {e}"))
    } else if e.is_connect() {
        OcrError::Unavailable(format!("connection failed: {e}"))
    } else {
        OcrError::Other(e.to_string())
    }
}

/// Map a non-2xx annotate response onto the taxonomy, preferring the
/// structured status string in the body over the HTTP code.
fn classify_api_error(status: StatusCode, body: &str) -> OcrError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (rpc_status, message) = match &parsed {
        Some(api) => (api.error.status.as_str(), api.error.message.clone()),
        None if body.trim().is_empty() => ("", format!("HTTP {status}")),
        None => ("", body.trim().to_string()),
    };

    match rpc_status {
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => OcrError::Auth(message),
        "RESOURCE_EXHAUSTED" => OcrError::Quota(message),
        "INVALID_ARGUMENT" => OcrError::BadImage(message),
        "UNAVAILABLE" | "DEADLINE_EXCEEDED" => OcrError::Unavailable(message),
        _ => match status.as_u16() {
            401 | 403 => OcrError::Auth(message),
            429 => OcrError::Quota(message),
            400 => OcrError::BadImage(message),
            503 | 504 => OcrError::Unavailable(message),
            _ => OcrError::Other(message),
        },
    }
}
