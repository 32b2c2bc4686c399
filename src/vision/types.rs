//! Wire model for the Vision `images:annotate` REST endpoint, plus the
//! flattened recognition result the rest of the crate consumes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// The only feature this service requests: dense document text.
const DOCUMENT_TEXT_DETECTION: &str = "DOCUMENT_TEXT_DETECTION";

/// BCP-47 tag that tells Vision not to bias recognition toward any natural
/// language. MRZ text is OCR-B, so dictionary priors only hurt.
const UNDETERMINED_LANGUAGE: &str = "und";

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

/// Recognition hints attached to a single annotate call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContext {
    language_hints: Vec<String>,
}

impl ImageContext {
    /// Context that disables language-specific character priors.
    pub fn undetermined() -> Self {
        Self {
            language_hints: vec![UNDETERMINED_LANGUAGE.to_string()],
        }
    }
}

impl AnnotateRequest {
    /// Single-image document text detection request.
    pub fn document_text(image: &[u8], context: Option<&ImageContext>) -> Self {
        Self {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: BASE64.encode(image),
                },
                features: vec![Feature {
                    feature_type: DOCUMENT_TEXT_DETECTION.to_string(),
                }],
                image_context: context.cloned(),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnotateBatchResponse {
    pub responses: Vec<AnnotateImageResponse>,
}

/// Per-image slice of a batch annotate response. A `200 OK` payload can
/// still carry an `error` status for the image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateImageResponse {
    pub full_text_annotation: Option<TextAnnotation>,
    pub error: Option<RpcStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextAnnotation {
    pub text: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Block {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Word {
    pub symbols: Vec<Symbol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Symbol {
    pub text: String,
    pub confidence: f64,
}

/// `google.rpc.Status` embedded in a per-image response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcStatus {
    pub code: i32,
    pub message: String,
}

/// Error body returned with a non-2xx annotate response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub error: ApiErrorStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorStatus {
    pub message: String,
    pub status: String,
}

/// One recognized character paired with the confidence of the symbol it
/// came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolConfidence {
    pub ch: char,
    pub confidence: f64,
}

/// Flattened outcome of an annotate call: the full recognized text plus
/// the character stream in document reading order.
#[derive(Debug, Clone, Default)]
pub struct RecognitionResult {
    pub full_text: String,
    pub symbols: Vec<SymbolConfidence>,
}

impl RecognitionResult {
    pub(crate) fn from_response(response: AnnotateImageResponse) -> Self {
        let Some(annotation) = response.full_text_annotation else {
            return Self::default();
        };

        let mut symbols = Vec::new();
        for page in &annotation.pages {
            for block in &page.blocks {
                for paragraph in &block.paragraphs {
                    for word in &paragraph.words {
                        for symbol in &word.symbols {
                            // A symbol is a single glyph in practice; expand
                            // multi-character text so the stream stays
                            // indexable by character position.
                            for ch in symbol.text.chars() {
                                symbols.push(SymbolConfidence {
                                    ch,
                                    confidence: symbol.confidence,
                                });
                            }
                        }
                    }
                }
            }
        }

        Self {
            full_text: annotation.text,
            symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_to_vision_wire_shape() {
        let request = AnnotateRequest::document_text(b"img", Some(&ImageContext::undetermined()));
        let value = serde_json::to_value(&request).unwrap();

        let entry = &value["requests"][0];
        assert_eq!(entry["image"]["content"], BASE64.encode(b"img"));
        assert_eq!(entry["features"][0]["type"], "DOCUMENT_TEXT_DETECTION");
        assert_eq!(entry["imageContext"]["languageHints"][0], "und");
    }

    #[test]
    fn test_request_without_context_omits_the_key() {
        let request = AnnotateRequest::document_text(b"img", None);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["requests"][0].get("imageContext").is_none());
    }

    #[test]
    fn test_response_deserializes_from_rest_payload() {
        let raw = r#"{
            "responses": [{
                "fullTextAnnotation": {
                    "text": "AB\n",
                    "pages": [{
                        "blocks": [{
                            "paragraphs": [{
                                "words": [{
                                    "symbols": [
                                        {"text": "A", "confidence": 0.9},
                                        {"text": "B", "confidence": 0.8}
                                    ]
                                }]
                            }]
                        }]
                    }]
                }
            }]
        }"#;

        let batch: AnnotateBatchResponse = serde_json::from_str(raw).unwrap();
        let result = RecognitionResult::from_response(batch.responses[0].clone());
        assert_eq!(result.full_text, "AB\n");
        assert_eq!(result.symbols.len(), 2);
        assert_eq!(result.symbols[0].ch, 'A');
        assert_eq!(result.symbols[1].confidence, 0.8);
    }

    #[test]
    fn test_missing_confidence_defaults_to_zero() {
        let raw = r#"{"symbols": [{"text": "A"}]}"#;
        let word: Word = serde_json::from_str(raw).unwrap();
        assert_eq!(word.symbols[0].confidence, 0.0);
    }

    #[test]
    fn test_multi_character_symbol_expands_per_character() {
        let response = AnnotateImageResponse {
            full_text_annotation: Some(TextAnnotation {
                text: "XYZ".to_string(),
                pages: vec![Page {
                    blocks: vec![Block {
                        paragraphs: vec![Paragraph {
                            words: vec![Word {
                                symbols: vec![Symbol {
                                    text: "XYZ".to_string(),
                                    confidence: 0.5,
                                }],
                            }],
                        }],
                    }],
                }],
            }),
            error: None,
        };

        let result = RecognitionResult::from_response(response);
        let chars: String = result.symbols.iter().map(|s| s.ch).collect();
        assert_eq!(chars, "XYZ");
        assert!(result.symbols.iter().all(|s| s.confidence == 0.5));
    }

    #[test]
    fn test_response_without_annotation_flattens_to_empty() {
        let result = RecognitionResult::from_response(AnnotateImageResponse::default());
        assert_eq!(result.full_text, "");
        assert!(result.symbols.is_empty());
    }

    #[test]
    fn test_embedded_error_status_parses() {
        let raw = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        let batch: AnnotateBatchResponse = serde_json::from_str(raw).unwrap();
        let error = batch.responses[0].error.as_ref().unwrap();
        assert_eq!(error.code, 3);
        assert_eq!(error.message, "Bad image data.");
    }
}
