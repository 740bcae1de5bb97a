use crate::model::Problem;
use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Canonical digest of a generated problem set, recorded in run artifacts
/// so two reports can be audited for having measured the same problems.
/// Lines are sorted, so the digest is independent of generation order.
pub fn problem_set_digest(problems: &[Problem]) -> String {
    let mut lines: Vec<String> = problems
        .iter()
        .map(|p| format!("{}|{}|{}|{}", p.id, p.level, p.expr.render(), p.answer))
        .collect();
    lines.sort();
    sha256_hex(&lines.join("\n"))
}
