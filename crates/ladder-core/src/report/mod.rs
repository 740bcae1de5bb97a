pub mod console;
pub mod json;

use crate::model::{DecayReport, LevelAggregate};
use crate::records::AttemptRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything one run produced: per-attempt records, per-level aggregates
/// and the final decay report, plus provenance for replaying the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub run_id: Uuid,
    pub suite: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub seed: u64,
    pub problem_set_digest: String,
    pub generation_failures: usize,
    pub records: Vec<AttemptRecord>,
    pub aggregates: Vec<LevelAggregate>,
    pub report: DecayReport,
}
