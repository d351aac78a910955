//! Clustering engine: groups the hits of one model along a replicon under
//! the spacing rules, keeping loner, multi-model and forbidden hits in
//! separate pools.
//!
//! Clustering is pure: it cannot fail, and an empty outcome is a valid
//! result.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::db::RepliconInfo;
use crate::hit::{best_hit_for_function, CoreHit, ModelHit};
use crate::model::Model;
use crate::types::{GeneStatus, Topology};

/// A run of co-located hits of one model on one replicon.
///
/// Hits are ordered by position; a cluster merged across the origin of a
/// circular replicon keeps its tail segment first, head segment last, and
/// still counts as a single locus.
#[derive(Debug, Clone)]
pub struct Cluster {
    hits: Vec<ModelHit>,
    /// Merged across the replicon origin
    wrapped: bool,
}

impl Cluster {
    fn new(hits: Vec<ModelHit>) -> Self {
        Self {
            hits,
            wrapped: false,
        }
    }

    #[must_use]
    pub fn hits(&self) -> &[ModelHit] {
        &self.hits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    #[must_use]
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    /// Lowest protein position among the cluster's hits
    #[must_use]
    pub fn min_position(&self) -> usize {
        self.hits.iter().map(ModelHit::position).min().unwrap_or(0)
    }

    /// Distinct functions fulfilled by this cluster
    #[must_use]
    pub fn functions(&self) -> Vec<&str> {
        let mut functions: Vec<&str> = self.hits.iter().map(|h| h.function.as_str()).collect();
        functions.sort_unstable();
        functions.dedup();
        functions
    }

    /// Does the cluster already fulfil this function?
    #[must_use]
    pub fn fulfills(&self, function: &str) -> bool {
        self.hits.iter().any(|h| h.function == function)
    }
}

/// Clustering outcome for one (model, replicon) pair.
#[derive(Debug, Default)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,
    /// Best loner hit per function, counterparts attached
    pub loners: BTreeMap<String, ModelHit>,
    /// Best multi-model hit per function, counterparts attached
    pub multi_model: BTreeMap<String, ModelHit>,
    /// Hits of forbidden genes, kept aside for rejection reasoning
    pub forbidden: Vec<ModelHit>,
    /// Cluster-eligible hits whose scaffold did not survive the validity
    /// rules, kept for rejection reasoning
    pub unclustered: Vec<ModelHit>,
}

/// Effective spacing between two adjacent hits: the larger of the two
/// per-gene overrides, each falling back to the model default.
fn effective_max_space(model: &Model, left: &ModelHit, right: &ModelHit) -> usize {
    let left_space = left.inter_gene_max_space.unwrap_or(model.inter_gene_max_space);
    let right_space = right.inter_gene_max_space.unwrap_or(model.inter_gene_max_space);
    left_space.max(right_space)
}

/// Number of genes between two hits, following the replicon forward from
/// `left` to `right` and wrapping on circular replicons.
fn genes_between(left: usize, right: usize, replicon: &RepliconInfo) -> Option<usize> {
    if right > left {
        Some(right - left - 1)
    } else if replicon.topology == Topology::Circular {
        Some(replicon.len - left + right - 1)
    } else {
        None
    }
}

/// Do two hits co-locate under the model's spacing rules?
pub(crate) fn colocates(
    model: &Model,
    left: &ModelHit,
    right: &ModelHit,
    replicon: &RepliconInfo,
) -> bool {
    match genes_between(left.position(), right.position(), replicon) {
        Some(distance) => distance <= effective_max_space(model, left, right),
        None => false,
    }
}

/// A scaffold survives as a cluster when it holds at least two hits of at
/// least two distinct genes and is not made of neutral hits only.
fn scaffold_is_cluster(scaffold: &[ModelHit]) -> bool {
    if scaffold.len() < 2 {
        return false;
    }
    if scaffold.iter().all(|h| h.status == GeneStatus::Neutral) {
        debug!(
            "{} is composed of only neutral hits, not a cluster",
            scaffold_label(scaffold)
        );
        return false;
    }
    let first_gene = &scaffold[0].hit.gene_name;
    if scaffold.iter().all(|h| h.hit.gene_name == *first_gene) {
        debug!(
            "{} is composed of only gene {first_gene}, not a cluster",
            scaffold_label(scaffold)
        );
        return false;
    }
    true
}

fn scaffold_label(scaffold: &[ModelHit]) -> String {
    scaffold
        .iter()
        .map(|h| h.hit.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind the replicon's selected hits to `model` and split them into
/// cluster-eligible, loner, multi-model and forbidden streams.
pub fn materialize_hits(
    model: &Model,
    hits: &[Arc<CoreHit>],
) -> (Vec<ModelHit>, Vec<ModelHit>, Vec<ModelHit>, Vec<ModelHit>) {
    let mut eligible = Vec::new();
    let mut loners = Vec::new();
    let mut multi_model = Vec::new();
    let mut forbidden = Vec::new();
    for hit in hits {
        let Some(binding) = model.resolve(&hit.gene_name) else {
            continue;
        };
        let model_hit = ModelHit::new(Arc::clone(hit), &binding);
        if binding.status == GeneStatus::Forbidden {
            forbidden.push(model_hit);
        } else if binding.loner {
            loners.push(model_hit);
        } else if binding.multi_model {
            multi_model.push(model_hit);
        } else {
            eligible.push(model_hit);
        }
    }
    (eligible, loners, multi_model, forbidden)
}

/// Cluster the model's hits on one replicon.
///
/// The sweep walks the cluster-eligible hits by ascending position and cuts
/// whenever the gap exceeds the effective spacing. On circular replicons
/// the last scaffold is merged with the first one when the wrap distance
/// allows it, before the validity rules run. Loner and multi-model hits
/// never cluster: they are squashed to one best representative per function
/// with the rest attached as counterparts.
pub fn build_clusters(model: &Model, hits: &[Arc<CoreHit>], replicon: &RepliconInfo) -> ClusterSet {
    let (mut eligible, loners, multi_model, forbidden) = materialize_hits(model, hits);

    // ascending position, best score first on the same protein
    eligible.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then(b.hit.score.total_cmp(&a.hit.score))
    });
    eligible.dedup_by(|next, kept| next.position() == kept.position());

    let mut scaffolds: Vec<Vec<ModelHit>> = Vec::new();
    for hit in eligible {
        let extend = scaffolds
            .last()
            .and_then(|scaffold| scaffold.last())
            .is_some_and(|previous| colocates(model, previous, &hit, replicon));
        if extend {
            scaffolds.last_mut().unwrap().push(hit);
        } else {
            scaffolds.push(vec![hit]);
        }
    }

    // wrap the origin: the head scaffold may continue the tail scaffold
    let mut wrapped = false;
    if replicon.topology == Topology::Circular && scaffolds.len() >= 2 {
        let tail_last = scaffolds.last().unwrap().last().unwrap();
        let head_first = scaffolds.first().unwrap().first().unwrap();
        if colocates(model, tail_last, head_first, replicon) {
            let head = scaffolds.remove(0);
            scaffolds.last_mut().unwrap().extend(head);
            wrapped = true;
        }
    }

    let scaffold_count = scaffolds.len();
    let mut clusters = Vec::new();
    let mut unclustered = Vec::new();
    for (index, scaffold) in scaffolds.into_iter().enumerate() {
        if scaffold_is_cluster(&scaffold) {
            let mut cluster = Cluster::new(scaffold);
            cluster.wrapped = wrapped && index == scaffold_count - 1;
            clusters.push(cluster);
        } else {
            unclustered.extend(scaffold);
        }
    }
    clusters.sort_by_key(Cluster::min_position);

    ClusterSet {
        clusters,
        loners: squash_by_function(loners),
        multi_model: squash_by_function(multi_model),
        forbidden,
        unclustered,
    }
}

/// Group hits by fulfilled function and keep the best one per function.
fn squash_by_function(hits: Vec<ModelHit>) -> BTreeMap<String, ModelHit> {
    let mut by_function: BTreeMap<String, Vec<ModelHit>> = BTreeMap::new();
    for hit in hits {
        by_function.entry(hit.function.clone()).or_default().push(hit);
    }
    by_function
        .into_iter()
        .filter_map(|(function, hits)| {
            let count = hits.len();
            if count > 1 {
                debug!("squash {count} '{function}' hits to the best one");
            }
            best_hit_for_function(hits).map(|best| (function, best))
        })
        .collect()
}
