//! Complexity-graded problem generation.
//!
//! Scaling is linear and monotonic in operation count: level L yields
//! expressions with exactly L operations (level 0 is a bare operand).
//! Operator distribution and operand bounds stay constant across levels, so
//! the accuracy curve is attributable to operation count alone.

use crate::config::{GeneratorSettings, LevelRange};
use crate::errors::GenerationError;
use crate::model::{Expr, Op, Problem, MAX_ABS_VALUE};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Rejection budget for a single operator/operand step.
const STEP_ATTEMPTS: u32 = 64;
/// Fresh expressions tried per slot before accepting a duplicate.
const EXPR_ATTEMPTS: u32 = 32;

/// Output of one generation pass. Failed slots are reported, not silently
/// dropped; the per-level count invariant holds whenever `failures` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSet {
    pub problems: Vec<Problem>,
    pub failures: Vec<GenerationError>,
}

/// Generates `problems_per_level` problems for every level in `levels`,
/// ordered by level. Purely a function of its inputs.
pub fn generate(
    settings: &GeneratorSettings,
    levels: &LevelRange,
    problems_per_level: u32,
    seed: u64,
) -> GeneratedSet {
    if settings.operand_min > settings.operand_max {
        return GeneratedSet {
            problems: Vec::new(),
            failures: vec![GenerationError::InvalidOperandRange {
                min: settings.operand_min,
                max: settings.operand_max,
            }],
        };
    }

    let mut problems = Vec::with_capacity(levels.count() * problems_per_level as usize);
    let mut failures = Vec::new();

    for level in levels.iter() {
        debug!(level, "generating problems");
        let mut seen: HashSet<String> = HashSet::new();
        for index in 0..problems_per_level {
            match sample_problem(settings, level, index, seed, &mut seen) {
                Ok(problem) => problems.push(problem),
                Err(e) => {
                    warn!(level, index, "generation failed: {}", e);
                    failures.push(e);
                }
            }
        }
    }

    info!(
        total = problems.len(),
        failed = failures.len(),
        seed,
        "problem set generated"
    );
    GeneratedSet { problems, failures }
}

/// Per-slot seed derived from (run seed, level, index), so a problem's
/// identity does not depend on generation order.
fn slot_seed(seed: u64, level: u32, index: u32) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(&mut hasher);
    level.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

fn sample_problem(
    settings: &GeneratorSettings,
    level: u32,
    index: u32,
    seed: u64,
    seen: &mut HashSet<String>,
) -> Result<Problem, GenerationError> {
    let mut rng = StdRng::seed_from_u64(slot_seed(seed, level, index));
    let mut duplicate: Option<Expr> = None;

    for _ in 0..EXPR_ATTEMPTS {
        if let Some(expr) = sample_expr(&mut rng, settings, level as usize) {
            let rendered = expr.render();
            if seen.insert(rendered) {
                return finish(expr, level, index);
            }
            duplicate = Some(expr);
        }
    }

    // The sample space at low levels can be smaller than the requested
    // count; a duplicate is then the best available outcome.
    if let Some(expr) = duplicate {
        return finish(expr, level, index);
    }
    Err(GenerationError::SamplingExhausted {
        level,
        index,
        attempts: EXPR_ATTEMPTS,
    })
}

fn finish(expr: Expr, level: u32, index: u32) -> Result<Problem, GenerationError> {
    let answer = expr.eval()?;
    Ok(Problem {
        id: format!("L{:02}-{:03}", level, index),
        level,
        expr,
        answer,
    })
}

fn sample_expr(rng: &mut StdRng, settings: &GeneratorSettings, op_count: usize) -> Option<Expr> {
    let first = rng.gen_range(settings.operand_min..=settings.operand_max);
    let mut running = i128::from(first);
    let mut steps = Vec::with_capacity(op_count);
    for _ in 0..op_count {
        let (op, operand, next) = sample_step(rng, settings, running)?;
        steps.push((op, operand));
        running = next;
    }
    Some(Expr { first, steps })
}

/// Draws operator and operand uniformly, rejecting steps that would divide
/// inexactly, divide by zero, or leave the magnitude bound.
fn sample_step(
    rng: &mut StdRng,
    settings: &GeneratorSettings,
    running: i128,
) -> Option<(Op, i64, i128)> {
    for _ in 0..STEP_ATTEMPTS {
        let op = *Op::ALL.choose(rng).unwrap_or(&Op::Add);
        let operand = rng.gen_range(settings.operand_min..=settings.operand_max);
        let rhs = i128::from(operand);
        let next = match op {
            Op::Add => running.checked_add(rhs),
            Op::Sub => running.checked_sub(rhs),
            Op::Mul => running.checked_mul(rhs),
            Op::Div => {
                if rhs == 0 || running % rhs != 0 {
                    continue;
                }
                Some(running / rhs)
            }
        };
        match next {
            Some(v) if v.abs() <= MAX_ABS_VALUE => return Some((op, operand, v)),
            _ => continue,
        }
    }
    None
}
