use crate::report::RunArtifacts;

/// Per-level accuracy table plus the decay scores, on stderr.
pub fn print_report(artifacts: &RunArtifacts) {
    eprintln!(
        "suite={} model={} run={} seed={}",
        artifacts.suite, artifacts.model, artifacts.run_id, artifacts.seed
    );
    if artifacts.generation_failures > 0 {
        eprintln!("generation failures: {}", artifacts.generation_failures);
    }

    eprintln!("level  attempted  correct  wrong  malformed  truncated  empty  accuracy");
    for a in &artifacts.aggregates {
        eprintln!(
            "{:>5}  {:>9}  {:>7}  {:>5}  {:>9}  {:>9}  {:>5}  {:>7.2}%",
            a.level,
            a.attempted,
            a.valid_correct,
            a.valid_incorrect,
            a.malformed,
            a.truncated,
            a.empty,
            a.accuracy * 100.0
        );
    }

    let r = &artifacts.report;
    match r.legacy_cds {
        Some(cds) => eprintln!(
            "AUC={:.4} D_max={:.4} R-CDS={:.4} CDS(legacy)={:.4}",
            r.auc, r.d_max, r.rcds, cds
        ),
        None => eprintln!("AUC={:.4} D_max={:.4} R-CDS={:.4}", r.auc, r.d_max, r.rcds),
    }
    for caveat in &r.caveats {
        eprintln!("note: {}", caveat);
    }
}
