use thiserror::Error;

/// Failure taxonomy for Google Vision calls.
///
/// Only [`Unavailable`](OcrError::Unavailable) is transient; the client
/// retries it with backoff. Every other kind surfaces immediately.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// Invalid or missing service account credentials.
    #[error("Google Vision authentication failed. Check your service account credentials. ({0})")]
    Auth(String),

    /// The project's Vision API quota is exhausted.
    #[error("Google Vision API quota exceeded. Check your GCP quota limits. ({0})")]
    Quota(String),

    /// The provider rejected the image itself.
    #[error("Image could not be processed by Google Vision. Ensure it is a valid JPEG/PNG and at least 64×64 px. ({0})")]
    BadImage(String),

    /// The provider is temporarily down or the call timed out.
    #[error("Google Vision is temporarily unavailable. ({0})")]
    Unavailable(String),

    /// Anything else the provider reported.
    #[error("Google Vision API error: {0}")]
    Other(String),
}

impl OcrError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
