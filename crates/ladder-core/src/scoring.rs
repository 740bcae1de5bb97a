//! Accuracy aggregation and shape-aware decay scoring.
//!
//! Results are grouped by complexity level, never by arrival order, so
//! concurrent completion order can never change the curve. Scoring is a
//! pure function of the ordered aggregates.

use crate::model::{
    ArtifactPolicy, DecayReport, LevelAccuracy, LevelAggregate, OutcomeKind, ParsedResult, Problem,
};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Groups parsed results into per-level aggregates, ordered by level.
/// Results whose problem id is unknown are reported and skipped.
pub fn aggregate(
    problems: &[Problem],
    results: &[ParsedResult],
    policy: ArtifactPolicy,
) -> Vec<LevelAggregate> {
    let level_of: HashMap<&str, u32> = problems
        .iter()
        .map(|p| (p.id.as_str(), p.level))
        .collect();

    let mut by_level: BTreeMap<u32, Vec<&ParsedResult>> = BTreeMap::new();
    for r in results {
        match level_of.get(r.problem_id.as_str()) {
            Some(level) => by_level.entry(*level).or_default().push(r),
            None => warn!(problem = %r.problem_id, "result for unknown problem, skipping"),
        }
    }

    by_level
        .into_iter()
        .map(|(level, rs)| tally(level, &rs, policy))
        .collect()
}

fn tally(level: u32, results: &[&ParsedResult], policy: ArtifactPolicy) -> LevelAggregate {
    let mut agg = LevelAggregate {
        level,
        attempted: results.len(),
        valid_correct: 0,
        valid_incorrect: 0,
        malformed: 0,
        truncated: 0,
        empty: 0,
        accuracy: 0.0,
    };
    for r in results {
        match r.outcome {
            OutcomeKind::ValidCorrect => agg.valid_correct += 1,
            OutcomeKind::ValidIncorrect => agg.valid_incorrect += 1,
            OutcomeKind::Malformed => agg.malformed += 1,
            OutcomeKind::Truncated => agg.truncated += 1,
            OutcomeKind::Empty => agg.empty += 1,
        }
    }
    let denominator = match policy {
        ArtifactPolicy::CountAsFailure => agg.attempted,
        ArtifactPolicy::ExcludeFromDenominator => agg.valid_correct + agg.valid_incorrect,
    };
    if denominator > 0 {
        agg.accuracy = agg.valid_correct as f64 / denominator as f64;
    }
    agg
}

/// Computes the shape-aware decay report from ordered per-level aggregates.
///
/// Levels are normalized to [0, 1] preserving relative spacing; AUC is the
/// trapezoidal integral of accuracy over that axis; D_max is the largest
/// non-negative drop between consecutive levels; R-CDS = AUC * (1 - D_max).
/// Zero-attempt levels are excluded with a recorded caveat.
pub fn score(aggregates: &[LevelAggregate]) -> DecayReport {
    let mut caveats = Vec::new();
    let usable: Vec<&LevelAggregate> = aggregates
        .iter()
        .filter(|a| {
            if a.attempted == 0 {
                caveats.push(format!("level {} excluded from scoring: zero attempts", a.level));
                false
            } else {
                true
            }
        })
        .collect();

    let levels: Vec<LevelAccuracy> = usable
        .iter()
        .map(|a| LevelAccuracy {
            level: a.level,
            accuracy: a.accuracy,
            attempted: a.attempted,
        })
        .collect();

    if usable.is_empty() {
        caveats.push("no scorable levels".to_string());
        return DecayReport {
            levels,
            auc: 0.0,
            d_max: 0.0,
            rcds: 0.0,
            legacy_cds: None,
            caveats,
        };
    }

    let auc = if usable.len() == 1 {
        // Degenerate trapezoid: a single level is its own area.
        usable[0].accuracy
    } else {
        let min = f64::from(usable[0].level);
        let max = f64::from(usable[usable.len() - 1].level);
        let span = max - min;
        let xs: Vec<f64> = usable
            .iter()
            .map(|a| (f64::from(a.level) - min) / span)
            .collect();
        usable
            .windows(2)
            .zip(xs.windows(2))
            .map(|(a, x)| (x[1] - x[0]) * (a[0].accuracy + a[1].accuracy) / 2.0)
            .sum()
    };

    let d_max = usable
        .windows(2)
        .map(|w| (w[0].accuracy - w[1].accuracy).max(0.0))
        .fold(0.0, f64::max);

    DecayReport {
        levels,
        auc,
        d_max,
        rcds: auc * (1.0 - d_max),
        legacy_cds: None,
        caveats,
    }
}

/// Historical CDS baseline: one minus the mean absolute consecutive drop
/// over levels 2..=D, where D is the larger of `reference_max_level` and
/// the highest observed level. Levels past the observed maximum read as
/// zero accuracy; drops whose predecessor level was never observed are
/// skipped. Kept as a separate computation for comparability with old
/// reports; R-CDS never falls back to it.
pub fn legacy_cds(aggregates: &[LevelAggregate], reference_max_level: u32) -> f64 {
    let acc: BTreeMap<u32, f64> = aggregates
        .iter()
        .filter(|a| a.attempted > 0)
        .map(|a| (a.level, a.accuracy))
        .collect();

    let Some((&observed_max, _)) = acc.last_key_value() else {
        return 0.0;
    };
    let d = reference_max_level.max(observed_max);
    if d < 1 {
        return 0.0;
    }

    let mut total_drop = 0.0;
    let mut counted = 0u32;
    for level in 2..=d {
        let Some(prev) = acc.get(&(level - 1)) else {
            continue;
        };
        let cur = acc.get(&level).copied().unwrap_or(0.0);
        total_drop += (cur - prev).abs();
        counted += 1;
    }
    if counted == 0 {
        return 1.0;
    }

    (1.0 - total_drop / f64::from(d)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionSource;

    const EPS: f64 = 1e-9;

    fn agg(level: u32, correct: usize, attempted: usize) -> LevelAggregate {
        LevelAggregate {
            level,
            attempted,
            valid_correct: correct,
            valid_incorrect: attempted - correct,
            malformed: 0,
            truncated: 0,
            empty: 0,
            accuracy: if attempted == 0 {
                0.0
            } else {
                correct as f64 / attempted as f64
            },
        }
    }

    fn parsed(problem_id: &str, outcome: OutcomeKind) -> ParsedResult {
        ParsedResult {
            problem_id: problem_id.into(),
            outcome,
            value: None,
            source: Some(ExtractionSource::Marker),
        }
    }

    fn problem(id: &str, level: u32) -> Problem {
        Problem {
            id: id.into(),
            level,
            expr: crate::model::Expr {
                first: 1,
                steps: vec![],
            },
            answer: 1,
        }
    }

    #[test]
    fn constant_perfect_curve_scores_one() {
        let aggs: Vec<_> = (0..6).map(|l| agg(l, 10, 10)).collect();
        let report = score(&aggs);
        assert!((report.auc - 1.0).abs() < EPS);
        assert!(report.d_max.abs() < EPS);
        assert!((report.rcds - 1.0).abs() < EPS);
        assert!(report.caveats.is_empty());
    }

    #[test]
    fn documented_llama3_curve_reproduces_reported_scores() {
        // Per-level accuracies 1.0, 1.0, 1.0, 0.95, 0.55, 0.10 on levels 0..=5.
        let aggs = vec![
            agg(0, 20, 20),
            agg(1, 20, 20),
            agg(2, 20, 20),
            agg(3, 19, 20),
            agg(4, 11, 20),
            agg(5, 2, 20),
        ];
        let report = score(&aggs);

        assert!((report.d_max - 0.45).abs() < EPS, "d_max = {}", report.d_max);
        assert!((report.auc - 0.81).abs() < EPS, "auc = {}", report.auc);
        assert!(
            report.rcds < report.auc,
            "max-drop penalty must pull R-CDS below AUC"
        );
        assert!((report.rcds - 0.81 * 0.55).abs() < EPS);

        let cds = legacy_cds(&aggs, 10);
        assert!((cds - 0.90).abs() < EPS, "legacy cds = {}", cds);
    }

    #[test]
    fn single_level_auc_is_that_accuracy() {
        let report = score(&[agg(3, 3, 4)]);
        assert!((report.auc - 0.75).abs() < EPS);
        assert!(report.d_max.abs() < EPS);
        assert!((report.rcds - 0.75).abs() < EPS);
    }

    #[test]
    fn accuracy_increases_do_not_count_as_drops() {
        let report = score(&[agg(0, 5, 10), agg(1, 10, 10), agg(2, 8, 10)]);
        assert!((report.d_max - 0.2).abs() < EPS);
    }

    #[test]
    fn zero_attempt_levels_are_excluded_with_a_caveat() {
        let report = score(&[agg(0, 10, 10), agg(1, 0, 0), agg(2, 5, 10)]);
        assert_eq!(report.levels.len(), 2);
        assert_eq!(report.caveats.len(), 1);
        assert!(report.caveats[0].contains("level 1"));
        // The curve spans levels 0 and 2 only.
        assert!((report.auc - 0.75).abs() < EPS);
    }

    #[test]
    fn empty_input_yields_zero_scores_and_a_caveat() {
        let report = score(&[]);
        assert_eq!(report.auc, 0.0);
        assert_eq!(report.rcds, 0.0);
        assert!(report.caveats.iter().any(|c| c.contains("no scorable")));
    }

    #[test]
    fn scoring_is_idempotent() {
        let aggs = vec![agg(0, 9, 10), agg(1, 7, 10), agg(2, 2, 10)];
        assert_eq!(score(&aggs), score(&aggs));
    }

    #[test]
    fn aggregate_groups_by_level_not_arrival_order() {
        let problems = vec![
            problem("a", 0),
            problem("b", 0),
            problem("c", 1),
            problem("d", 1),
        ];
        let in_order = vec![
            parsed("a", OutcomeKind::ValidCorrect),
            parsed("b", OutcomeKind::ValidIncorrect),
            parsed("c", OutcomeKind::ValidCorrect),
            parsed("d", OutcomeKind::ValidCorrect),
        ];
        let mut scrambled = in_order.clone();
        scrambled.reverse();

        let a = aggregate(&problems, &in_order, ArtifactPolicy::CountAsFailure);
        let b = aggregate(&problems, &scrambled, ArtifactPolicy::CountAsFailure);
        assert_eq!(a, b);
        assert_eq!(a[0].level, 0);
        assert!((a[0].accuracy - 0.5).abs() < EPS);
        assert!((a[1].accuracy - 1.0).abs() < EPS);
    }

    #[test]
    fn artifacts_count_toward_denominator_by_default() {
        let problems = vec![problem("a", 2), problem("b", 2), problem("c", 2)];
        let results = vec![
            parsed("a", OutcomeKind::ValidCorrect),
            parsed("b", OutcomeKind::Malformed),
            parsed("c", OutcomeKind::Truncated),
        ];
        let aggs = aggregate(&problems, &results, ArtifactPolicy::CountAsFailure);
        assert_eq!(aggs[0].attempted, 3);
        assert_eq!(aggs[0].malformed, 1);
        assert_eq!(aggs[0].truncated, 1);
        assert!((aggs[0].accuracy - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn exclude_policy_drops_artifacts_from_denominator() {
        let problems = vec![problem("a", 2), problem("b", 2), problem("c", 2)];
        let results = vec![
            parsed("a", OutcomeKind::ValidCorrect),
            parsed("b", OutcomeKind::Malformed),
            parsed("c", OutcomeKind::Truncated),
        ];
        let aggs = aggregate(&problems, &results, ArtifactPolicy::ExcludeFromDenominator);
        assert_eq!(aggs[0].attempted, 3);
        assert!((aggs[0].accuracy - 1.0).abs() < EPS);
    }

    #[test]
    fn unknown_problem_ids_are_skipped() {
        let problems = vec![problem("a", 0)];
        let results = vec![
            parsed("a", OutcomeKind::ValidCorrect),
            parsed("ghost", OutcomeKind::ValidCorrect),
        ];
        let aggs = aggregate(&problems, &results, ArtifactPolicy::CountAsFailure);
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].attempted, 1);
    }

    #[test]
    fn legacy_cds_of_empty_data_is_zero() {
        assert_eq!(legacy_cds(&[], 10), 0.0);
    }

    #[test]
    fn legacy_cds_flat_curve_is_one() {
        let aggs: Vec<_> = (0..=10).map(|l| agg(l, 10, 10)).collect();
        assert!((legacy_cds(&aggs, 10) - 1.0).abs() < EPS);
    }
}
