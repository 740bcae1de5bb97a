//! One JSON-lines record per problem attempt, the format the persistence
//! layer stores and downstream analysis re-reads.

use crate::model::{ArtifactHint, ExtractionSource, OutcomeKind, ParsedResult, Problem, RawResponse};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub problem_id: String,
    pub level: u32,
    pub expression: String,
    pub ground_truth: f64,
    pub response_text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub artifact_hint: Option<ArtifactHint>,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extracted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extraction_source: Option<ExtractionSource>,
}

impl AttemptRecord {
    pub fn from_attempt(problem: &Problem, raw: &RawResponse, parsed: &ParsedResult) -> Self {
        Self {
            problem_id: problem.id.clone(),
            level: problem.level,
            expression: problem.expr.render(),
            ground_truth: problem.answer as f64,
            response_text: raw.text.clone(),
            artifact_hint: raw.hint,
            outcome: parsed.outcome,
            extracted: parsed.value,
            extraction_source: parsed.source,
        }
    }
}

pub fn write_jsonl(records: &[AttemptRecord], out: &Path) -> anyhow::Result<()> {
    let mut buf = String::new();
    for r in records {
        buf.push_str(&serde_json::to_string(r)?);
        buf.push('\n');
    }
    std::fs::write(out, buf)?;
    Ok(())
}

pub fn read_jsonl(path: &Path) -> anyhow::Result<Vec<AttemptRecord>> {
    let raw = std::fs::read_to_string(path)?;
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expr, Op};

    fn record() -> AttemptRecord {
        let problem = Problem {
            id: "L02-001".into(),
            level: 2,
            expr: Expr {
                first: 7,
                steps: vec![(Op::Sub, 2), (Op::Mul, 3)],
            },
            answer: 15,
        };
        let raw = RawResponse {
            problem_id: problem.id.clone(),
            text: "FINAL_ANSWER: 15".into(),
            hint: None,
        };
        let parsed = ParsedResult {
            problem_id: problem.id.clone(),
            outcome: OutcomeKind::ValidCorrect,
            value: Some(15.0),
            source: Some(ExtractionSource::Marker),
        };
        AttemptRecord::from_attempt(&problem, &raw, &parsed)
    }

    #[test]
    fn record_captures_attempt_fields() {
        let r = record();
        assert_eq!(r.expression, "((7 - 2) * 3)");
        assert_eq!(r.ground_truth, 15.0);
        assert_eq!(r.outcome, OutcomeKind::ValidCorrect);
    }

    #[test]
    fn jsonl_round_trips_and_uses_wire_outcome_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempts.jsonl");
        let records = vec![record(), record()];
        write_jsonl(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"VALID_CORRECT\""));

        assert_eq!(read_jsonl(&path).unwrap(), records);
    }
}
