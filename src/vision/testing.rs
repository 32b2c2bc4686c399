//! Scripted transport and response builders shared by tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::vision::error::OcrError;
use crate::vision::http::VisionTransport;
pub(crate) use crate::vision::types::AnnotateImageResponse;
use crate::vision::types::{
    AnnotateRequest, Block, Page, Paragraph, RpcStatus, Symbol, TextAnnotation, Word,
};

/// Transport double that pops scripted outcomes in order and records every
/// request as JSON for inspection.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<AnnotateImageResponse, OcrError>>>,
    pub(crate) requests: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<AnnotateImageResponse, OcrError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionTransport for ScriptedTransport {
    async fn annotate(&self, request: &AnnotateRequest) -> Result<AnnotateImageResponse, OcrError> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OcrError::Other("transport script exhausted".to_string())))
    }
}

/// Response whose text and symbol stream both come from `text`, with a
/// uniform confidence. Whitespace is dropped from the symbol stream, as
/// Vision reports only visible glyphs as symbols.
pub(crate) fn text_response(text: &str, confidence: f64) -> AnnotateImageResponse {
    let symbols = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Symbol {
            text: c.to_string(),
            confidence,
        })
        .collect();

    AnnotateImageResponse {
        full_text_annotation: Some(TextAnnotation {
            text: text.to_string(),
            pages: vec![Page {
                blocks: vec![Block {
                    paragraphs: vec![Paragraph {
                        words: vec![Word { symbols }],
                    }],
                }],
            }],
        }),
        error: None,
    }
}

/// Response carrying text but no page or symbol detail.
pub(crate) fn bare_text_response(text: &str) -> AnnotateImageResponse {
    AnnotateImageResponse {
        full_text_annotation: Some(TextAnnotation {
            text: text.to_string(),
            pages: Vec::new(),
        }),
        error: None,
    }
}

/// Response with an embedded provider error and no annotation.
pub(crate) fn error_response(message: &str) -> AnnotateImageResponse {
    AnnotateImageResponse {
        full_text_annotation: None,
        error: Some(RpcStatus {
            code: 13,
            message: message.to_string(),
        }),
    }
}
