//! Core data model. Each entity is produced by exactly one component and
//! consumed read-only downstream; nothing here is shared-mutable.

use crate::errors::GenerationError;
use serde::{Deserialize, Serialize};

/// Evaluated answers are rejected beyond this magnitude so that ground truth
/// always fits an `i64` without precision questions.
pub const MAX_ABS_VALUE: i128 = 1_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub const ALL: [Op; 4] = [Op::Add, Op::Sub, Op::Mul, Op::Div];

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        }
    }
}

/// A flat operator/operand chain evaluated left to right. The complexity
/// unit is `op_count()`; nesting depth is deliberately not part of the
/// model (it scales effective difficulty non-linearly).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub first: i64,
    pub steps: Vec<(Op, i64)>,
}

impl Expr {
    pub fn op_count(&self) -> usize {
        self.steps.len()
    }

    /// Fully parenthesized, left-associated rendering, e.g. `((7 - 2) * 3)`.
    pub fn render(&self) -> String {
        let mut out = self.first.to_string();
        for (op, operand) in &self.steps {
            out = format!("({} {} {})", out, op.symbol(), operand);
        }
        out
    }

    /// Exact evaluation over `i128`. Division must be exact and non-zero;
    /// intermediate values must stay within [`MAX_ABS_VALUE`].
    pub fn eval(&self) -> Result<i64, GenerationError> {
        let mut acc = i128::from(self.first);
        for (op, operand) in &self.steps {
            let rhs = i128::from(*operand);
            acc = match op {
                Op::Add => acc.checked_add(rhs),
                Op::Sub => acc.checked_sub(rhs),
                Op::Mul => acc.checked_mul(rhs),
                Op::Div => {
                    if rhs == 0 {
                        return Err(GenerationError::DivisionByZero {
                            expr: self.render(),
                        });
                    }
                    if acc % rhs != 0 {
                        return Err(GenerationError::InexactDivision {
                            dividend: acc,
                            divisor: rhs,
                            expr: self.render(),
                        });
                    }
                    Some(acc / rhs)
                }
            }
            .ok_or_else(|| GenerationError::MagnitudeOverflow {
                expr: self.render(),
            })?;
            if acc.abs() > MAX_ABS_VALUE {
                return Err(GenerationError::MagnitudeOverflow {
                    expr: self.render(),
                });
            }
        }
        Ok(acc as i64)
    }
}

/// One generated problem with its ground truth, computed at generation time
/// by exact evaluation. Reproducible from (seed, level, slot index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub level: u32,
    pub expr: Expr,
    pub answer: i64,
}

/// Artifact flag supplied by the external caller alongside the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactHint {
    /// Output was cut off (e.g. token limit hit) before an answer could
    /// plausibly appear.
    Truncated,
}

/// Raw model output for one problem. Owned transiently by the orchestrator;
/// the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub problem_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hint: Option<ArtifactHint>,
}

/// Classification outcome. Artifact kinds are observed behavior, kept apart
/// from logical errors so infrastructure noise stays visible in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    ValidCorrect,
    ValidIncorrect,
    Malformed,
    Truncated,
    Empty,
}

impl OutcomeKind {
    pub fn is_artifact(&self) -> bool {
        matches!(
            self,
            OutcomeKind::Malformed | OutcomeKind::Truncated | OutcomeKind::Empty
        )
    }
}

/// Where an extracted value came from. `TrailingNumber` marks the legacy
/// last-number fallback so reports can distinguish it from marker hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Marker,
    TrailingNumber,
}

/// Judged response: exactly one outcome kind, with the extracted value when
/// one was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub problem_id: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<ExtractionSource>,
}

/// Whether artifact outcomes count toward the accuracy denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactPolicy {
    /// Artifacts are observed behavior under that complexity and count as
    /// failures.
    #[default]
    CountAsFailure,
    /// Artifacts are treated as sampling exclusions; the denominator is
    /// valid attempts only.
    ExcludeFromDenominator,
}

/// Per-level tallies, immutable once computed for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAggregate {
    pub level: u32,
    pub attempted: usize,
    pub valid_correct: usize,
    pub valid_incorrect: usize,
    pub malformed: usize,
    pub truncated: usize,
    pub empty: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAccuracy {
    pub level: u32,
    pub accuracy: f64,
    pub attempted: usize,
}

/// Final shape-aware score over the ordered accuracy curve. Produced once
/// per run, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayReport {
    pub levels: Vec<LevelAccuracy>,
    pub auc: f64,
    pub d_max: f64,
    pub rcds: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legacy_cds: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub caveats: Vec<String>,
}
