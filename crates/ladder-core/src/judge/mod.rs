//! Layered, total classification of raw model responses.
//!
//! Priority order, first match wins: caller-supplied truncation hint,
//! final-answer marker, trailing-number fallback, empty text, malformed.
//! Every input yields exactly one `ParsedResult`; classification never
//! fails, so infrastructure artifacts stay separate from logical errors.

pub mod fallback;

use crate::errors::ConfigError;
use crate::model::{ArtifactHint, ExtractionSource, OutcomeKind, ParsedResult, RawResponse};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct Judge {
    marker: Regex,
    tolerance: f64,
}

impl Judge {
    /// Builds a judge for the configured final-answer tag. The tag is
    /// escaped before compilation, so any literal marker text is accepted.
    pub fn new(marker_tag: &str, tolerance: f64) -> Result<Self, ConfigError> {
        if marker_tag.trim().is_empty() {
            return Err(ConfigError("marker_tag must not be empty".into()));
        }
        let pattern = format!(
            r"{}\s*[:=]?\s*([-+]?\d+(?:\.\d+)?)",
            regex::escape(marker_tag)
        );
        let marker = Regex::new(&pattern)
            .map_err(|e| ConfigError(format!("invalid marker pattern: {}", e)))?;
        Ok(Self { marker, tolerance })
    }

    pub fn classify(&self, raw: &RawResponse, ground_truth: f64) -> ParsedResult {
        if matches!(raw.hint, Some(ArtifactHint::Truncated)) {
            return ParsedResult {
                problem_id: raw.problem_id.clone(),
                outcome: OutcomeKind::Truncated,
                value: None,
                source: None,
            };
        }

        if let Some(value) = self.extract_marker(&raw.text) {
            return self.verdict(raw, value, ExtractionSource::Marker, ground_truth);
        }

        if let Some(value) = fallback::last_standalone_number(&raw.text) {
            return self.verdict(raw, value, ExtractionSource::TrailingNumber, ground_truth);
        }

        let outcome = if raw.text.trim().is_empty() {
            OutcomeKind::Empty
        } else {
            OutcomeKind::Malformed
        };
        ParsedResult {
            problem_id: raw.problem_id.clone(),
            outcome,
            value: None,
            source: None,
        }
    }

    /// Last marker occurrence wins: models that restate their answer keep
    /// the final restatement.
    fn extract_marker(&self, text: &str) -> Option<f64> {
        self.marker
            .captures_iter(text)
            .last()
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn verdict(
        &self,
        raw: &RawResponse,
        value: f64,
        source: ExtractionSource,
        ground_truth: f64,
    ) -> ParsedResult {
        let outcome = if self.matches_truth(value, ground_truth) {
            OutcomeKind::ValidCorrect
        } else {
            OutcomeKind::ValidIncorrect
        };
        ParsedResult {
            problem_id: raw.problem_id.clone(),
            outcome,
            value: Some(value),
            source: Some(source),
        }
    }

    /// Integral ground truths require exact matches; the tolerance applies
    /// only to non-integral ones.
    fn matches_truth(&self, value: f64, ground_truth: f64) -> bool {
        if ground_truth.fract() == 0.0 {
            value == ground_truth
        } else {
            (value - ground_truth).abs() <= self.tolerance
        }
    }
}
