//! Passport analysis and plain text extraction on top of the Vision
//! client.
//!
//! Passport analysis runs up to two recognition passes. Pass 1 sends a
//! preprocessed crop of the MRZ band with the undetermined language hint,
//! which reads OCR-B far more reliably than a full-page scan. Pass 2
//! falls back to the unmodified image, so a readable document is never
//! lost to an unhelpful crop. Provider errors from either pass propagate;
//! the fallback never masks them.

use crate::confidence::{self, ConfidenceScore};
use crate::mrz::{self, MrzLines, PassportRecord};
use crate::preprocess;
use crate::vision::{ImageContext, OcrError, RecognitionResult, VisionClient};

/// Outcome of a passport analysis: the parsed record when an MRZ was
/// found, the raw text of the pass that produced it, and the line
/// confidence scores.
#[derive(Debug, Clone)]
pub struct PassportScan {
    pub record: Option<PassportRecord>,
    pub text: String,
    pub confidence: ConfidenceScore,
}

/// Recognize all text in the image, returning the full text and its
/// non-blank lines.
pub async fn extract_text(
    vision: &VisionClient,
    image: &[u8],
) -> Result<(String, Vec<String>), OcrError> {
    let result = vision.recognize(image, None).await?;
    let lines = result
        .full_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();
    Ok((result.full_text, lines))
}

/// Extract structured passport data and confidence scores from an image.
pub async fn analyze_passport(
    vision: &VisionClient,
    image: &[u8],
) -> Result<PassportScan, OcrError> {
    match preprocess::prepare_mrz_band(image) {
        Ok(band) => {
            let result = vision
                .recognize(&band, Some(&ImageContext::undetermined()))
                .await?;
            if let Some(lines) = mrz::locate(&result.full_text) {
                return Ok(finish_scan(result, &lines));
            }
            tracing::debug!("no MRZ in the preprocessed band, falling back to the full image");
        }
        Err(e) => {
            tracing::debug!("MRZ preprocessing failed, falling back to the full image: {e}");
        }
    }

    let result = vision.recognize(image, None).await?;
    match mrz::locate(&result.full_text) {
        Some(lines) => Ok(finish_scan(result, &lines)),
        None => Ok(PassportScan {
            record: None,
            text: result.full_text,
            confidence: ConfidenceScore::default(),
        }),
    }
}

fn finish_scan(result: RecognitionResult, lines: &MrzLines) -> PassportScan {
    let report = mrz::verify_check_digits(lines);
    if !report.all_valid() {
        tracing::debug!(?report, "MRZ check digit mismatch");
    }

    PassportScan {
        record: Some(mrz::parse(lines)),
        confidence: confidence::score(&result, lines),
        text: result.full_text,
    }
}
