//! Maps the provider's per-character confidence stream onto located MRZ
//! lines.

use serde::Serialize;

use crate::mrz::MrzLines;
use crate::vision::RecognitionResult;

/// Recognition confidence per MRZ line, rounded to four decimals.
///
/// `overall` is the minimum of the two line scores and is present only
/// when both are: the weaker line bounds how far the whole record can be
/// trusted. All fields are absent when the provider response carried no
/// character-level detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConfidenceScore {
    pub overall: Option<f64>,
    pub mrz_line1: Option<f64>,
    pub mrz_line2: Option<f64>,
}

/// Align each MRZ line with the character stream and average the matched
/// confidences.
pub fn score(result: &RecognitionResult, lines: &MrzLines) -> ConfidenceScore {
    if result.symbols.is_empty() {
        return ConfidenceScore::default();
    }

    let stream: String = result.symbols.iter().map(|s| s.ch).collect();
    let mrz_line1 = line_confidence(result, &stream, lines.line1());
    let mrz_line2 = line_confidence(result, &stream, lines.line2());

    let overall = match (mrz_line1, mrz_line2) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    };

    ConfidenceScore {
        overall,
        mrz_line1,
        mrz_line2,
    }
}

/// Average confidence over the span where `line` occurs in the stream, or
/// `None` when it cannot be aligned. `find` returns a byte offset, which
/// must become a character offset before indexing the symbol stream.
fn line_confidence(result: &RecognitionResult, stream: &str, line: &str) -> Option<f64> {
    let byte_offset = stream.find(line)?;
    let start = stream[..byte_offset].chars().count();
    let span = &result.symbols[start..start + line.len()];

    let sum: f64 = span.iter().map(|s| s.confidence).sum();
    Some(round4(sum / span.len() as f64))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
