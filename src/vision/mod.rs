//! Google Cloud Vision boundary: wire types, service account auth, the
//! HTTP transport, and the retrying client on top.

mod auth;
mod client;
mod error;
mod http;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use client::{VisionClient, VisionConfig};
pub use error::OcrError;
pub use http::VisionTransport;
pub use types::{ImageContext, RecognitionResult, SymbolConfidence};
