//! Candidate scoring from per-hit weights.

use std::collections::BTreeMap;

use crate::config::ScoreOptions;
use crate::hit::ModelHit;
use crate::types::GeneStatus;

fn status_weight(status: GeneStatus, opts: &ScoreOptions) -> f64 {
    match status {
        GeneStatus::Mandatory => opts.mandatory_weight,
        GeneStatus::Accessory => opts.accessory_weight,
        GeneStatus::Neutral => opts.neutral_weight,
        // forbidden hits never reach the scorer
        GeneStatus::Forbidden => 0.0,
    }
}

fn base_weight(hit: &ModelHit, out_of_cluster: bool, opts: &ScoreOptions) -> f64 {
    let source = if hit.via_exchangeable {
        opts.exchangeable_weight
    } else {
        1.0
    };
    let reference = if out_of_cluster {
        opts.out_of_cluster_weight
    } else {
        1.0
    };
    status_weight(hit.status, opts) * source * reference
}

/// Score a candidate from its in-cluster and out-of-cluster hits.
///
/// Per function the strongest contribution counts fully and every further
/// one is divided by the redundancy penalty. The result is a plain IEEE-754
/// sum; callers round for display only.
#[must_use]
pub fn score_candidate<'a>(
    in_cluster: impl Iterator<Item = &'a ModelHit>,
    out_of_cluster: impl Iterator<Item = &'a ModelHit>,
    opts: &ScoreOptions,
) -> f64 {
    let mut contributions: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for hit in in_cluster {
        contributions
            .entry(hit.function.as_str())
            .or_default()
            .push(base_weight(hit, false, opts));
    }
    for hit in out_of_cluster {
        contributions
            .entry(hit.function.as_str())
            .or_default()
            .push(base_weight(hit, true, opts));
    }

    let mut score = 0.0;
    for values in contributions.values_mut() {
        values.sort_by(|a, b| b.total_cmp(a));
        for (rank, value) in values.iter().enumerate() {
            if rank == 0 {
                score += value;
            } else {
                score += value / opts.redundancy_penalty;
            }
        }
    }
    score
}
