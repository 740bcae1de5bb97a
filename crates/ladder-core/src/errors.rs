use std::fmt::{Display, Formatter};

/// Ground truth for a problem slot could not be computed deterministically.
/// Fatal for that slot only; the surrounding run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("division by zero in `{expr}`")]
    DivisionByZero { expr: String },

    #[error("inexact division {dividend}/{divisor} in `{expr}`")]
    InexactDivision {
        dividend: i128,
        divisor: i128,
        expr: String,
    },

    #[error("magnitude overflow while evaluating `{expr}`")]
    MagnitudeOverflow { expr: String },

    #[error("operand range {min}..={max} is empty")]
    InvalidOperandRange { min: i64, max: i64 },

    #[error("no well-formed expression for level {level} slot {index} within {attempts} attempts")]
    SamplingExhausted { level: u32, index: u32, attempts: u32 },
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}
