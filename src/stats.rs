use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::ReadRun;

/// Summary of a read-run result set: total bases plus distinct samples, runs and studies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadRunStatistics {
    pub bases: u64,
    pub biosamples: usize,
    pub read_runs: usize,
    pub studies: usize,
}

impl ReadRunStatistics {
    pub fn from_runs(runs: &[ReadRun]) -> Self {
        let mut bases = 0u64;
        let mut biosamples = BTreeSet::new();
        let mut read_runs = BTreeSet::new();
        let mut studies = BTreeSet::new();
        for run in runs {
            // Unparseable or missing counts contribute nothing.
            let run_bases = run
                .base_count
                .as_deref()
                .and_then(|count| count.trim().parse::<u64>().ok())
                .unwrap_or(0);
            bases = bases.saturating_add(run_bases);
            if let Some(sample) = non_empty(&run.sample_accession) {
                biosamples.insert(sample);
            }
            if let Some(accession) = non_empty(&run.accession) {
                read_runs.insert(accession);
            }
            if let Some(study) = non_empty(&run.study_accession) {
                studies.insert(study);
            }
        }
        Self {
            bases,
            biosamples: biosamples.len(),
            read_runs: read_runs.len(),
            studies: studies.len(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
