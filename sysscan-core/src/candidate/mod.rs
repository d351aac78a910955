//! Candidate systems: putative occurrences of a model assembled from
//! clusters and out-of-cluster hits, plus the rejected combinations with
//! their reasons.

use std::fmt;

use crate::cluster::Cluster;
use crate::constants::LONER_LOCUS;
use crate::hit::ModelHit;

pub mod builder;
pub mod score;

pub use builder::{build_candidates, BuilderOutcome, LonerWarning};
pub use score::score_candidate;

/// Why a combination was rejected.
///
/// The numbers in the quorum variants are `(required, observed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    ForbiddenPresent,
    MandatoryQuorumNotReached(usize, usize),
    GenesQuorumNotReached(usize, usize),
    NoCluster,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForbiddenPresent => write!(f, "FORBIDDEN_PRESENT"),
            Self::MandatoryQuorumNotReached(required, observed) => {
                write!(f, "MANDATORY_QUORUM_NOT_REACHED({required},{observed})")
            }
            Self::GenesQuorumNotReached(required, observed) => {
                write!(f, "GENES_QUORUM_NOT_REACHED({required},{observed})")
            }
            Self::NoCluster => write!(f, "NO_CLUSTER"),
        }
    }
}

/// A proposed occurrence of one model on one replicon.
///
/// Clusters are ordered by position and numbered 1..; loner and
/// multi-model hits contributed from outside carry the negative loner
/// locus and do not count toward `sys_loci`.
#[derive(Debug, Clone)]
pub struct CandidateSystem {
    /// Deterministic identifier, assigned once all candidates of the
    /// replicon are known
    pub id: String,
    pub model_fqn: String,
    pub model_name: String,
    pub replicon: String,
    pub clusters: Vec<Cluster>,
    /// Out-of-cluster loner and multi-model contributions
    pub out_hits: Vec<ModelHit>,
    /// Fraction of the model's mandatory and accessory genes observed
    pub wholeness: f64,
    /// Floor of the mean multiplicity of the satisfied required functions
    pub occ: usize,
    pub score: f64,
}

impl CandidateSystem {
    /// Number of loci; out-of-cluster hits do not count
    #[must_use]
    pub fn sys_loci(&self) -> usize {
        self.clusters.len()
    }

    /// Every hit with its locus number (clusters first, then the
    /// out-of-cluster pool)
    pub fn hits(&self) -> impl Iterator<Item = (&ModelHit, i32)> {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(index, cluster)| {
                cluster
                    .hits()
                    .iter()
                    .map(move |hit| (hit, index as i32 + 1))
            })
            .chain(self.out_hits.iter().map(|hit| (hit, LONER_LOCUS)))
    }

    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum::<usize>() + self.out_hits.len()
    }

    /// Lowest hit position, used for deterministic ordering
    #[must_use]
    pub fn min_position(&self) -> usize {
        self.hits()
            .map(|(hit, _)| hit.position())
            .min()
            .unwrap_or(usize::MAX)
    }

    /// Ascending positions of every hit
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.hits().map(|(hit, _)| hit.position()).collect();
        positions.sort_unstable();
        positions
    }
}

/// A combination that failed the model's rules, with its provenance.
#[derive(Debug, Clone)]
pub struct RejectedCandidate {
    pub id: String,
    pub model_fqn: String,
    pub replicon: String,
    pub clusters: Vec<Cluster>,
    pub out_hits: Vec<ModelHit>,
    /// Reason codes in check order
    pub reasons: Vec<RejectionReason>,
}

impl RejectedCandidate {
    /// Every hit with the index of its cluster (out-of-cluster hits get
    /// the loner locus)
    pub fn hits(&self) -> impl Iterator<Item = (&ModelHit, i32)> {
        self.clusters
            .iter()
            .enumerate()
            .flat_map(|(index, cluster)| {
                cluster
                    .hits()
                    .iter()
                    .map(move |hit| (hit, index as i32 + 1))
            })
            .chain(self.out_hits.iter().map(|hit| (hit, LONER_LOCUS)))
    }

    /// `/`-separated reason codes, as written in the rejection table
    #[must_use]
    pub fn reasons_label(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}
