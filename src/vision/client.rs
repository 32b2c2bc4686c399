//! Retrying Vision client. Owns the call contract with the provider:
//! per-call timeout, bounded retry with fixed backoff, and flattening of
//! the raw response.

use std::sync::Arc;
use std::time::Duration;

use crate::vision::auth::TokenSource;
use crate::vision::error::OcrError;
use crate::vision::http::{DEFAULT_ENDPOINT, HttpVisionTransport, VisionTransport};
use crate::vision::types::{AnnotateRequest, ImageContext, RecognitionResult};

const CALL_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_BACKOFF: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Configuration for [`VisionClient::new`].
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub credentials_path: String,
    pub endpoint: String,
    /// Per-call timeout, also applied to token grants.
    pub timeout: Duration,
    /// Sleeps between attempts. Total attempts are `backoff.len() + 1`.
    pub backoff: Vec<Duration>,
}

impl VisionConfig {
    pub fn new(credentials_path: String) -> Self {
        Self {
            credentials_path,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: CALL_TIMEOUT,
            backoff: RETRY_BACKOFF.to_vec(),
        }
    }
}

/// Document text detection with bounded retry.
///
/// Transient failures are retried on the backoff schedule; everything
/// else, including an error embedded in an otherwise successful response,
/// surfaces immediately.
pub struct VisionClient {
    transport: Arc<dyn VisionTransport>,
    backoff: Vec<Duration>,
}

impl VisionClient {
    /// Client backed by the real REST transport.
    pub fn new(config: &VisionConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let tokens = TokenSource::new(config.credentials_path.clone(), http.clone());
        let transport = HttpVisionTransport::new(config.endpoint.clone(), http, tokens);
        Ok(Self {
            transport: Arc::new(transport),
            backoff: config.backoff.clone(),
        })
    }

    /// Client with an injected transport, used to script provider
    /// behavior in tests.
    #[cfg(test)]
    pub(crate) fn with_transport(transport: Arc<dyn VisionTransport>, backoff: Vec<Duration>) -> Self {
        Self { transport, backoff }
    }

    /// Run document text detection on `image`.
    pub async fn recognize(
        &self,
        image: &[u8],
        context: Option<&ImageContext>,
    ) -> Result<RecognitionResult, OcrError> {
        let request = AnnotateRequest::document_text(image, context);
        let max_attempts = self.backoff.len() + 1;
        let mut last_transient = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff[attempt - 2]).await;
            }

            let response = match self.transport.annotate(&request).await {
                Ok(response) => response,
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, max_attempts, "Vision call failed, will retry: {e}");
                    last_transient = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            // An error embedded in a 200 payload is terminal, not transient.
            if let Some(status) = response.error {
                tracing::warn!(code = status.code, "Vision returned an error status: {}", status.message);
                return Err(OcrError::Other(status.message));
            }

            return Ok(RecognitionResult::from_response(response));
        }

        Err(last_transient
            .unwrap_or_else(|| OcrError::Unavailable("retry attempts exhausted".to_string())))
    }
}
