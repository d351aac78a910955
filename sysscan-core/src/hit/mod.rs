//! Hit records: raw HMM search matches filtered into a typed stream, and
//! their binding to model genes.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Binding, GeneKey};
use crate::types::GeneStatus;

pub mod report;

pub use report::{parse_report, HitFilter};

/// A selected match between one gene profile and one protein.
///
/// Immutable; exactly one `CoreHit` survives per (replicon, position) after
/// the stream is indexed. Model-independent.
#[derive(Debug, Clone)]
pub struct CoreHit {
    pub gene: GeneKey,
    pub gene_name: String,
    /// Protein identifier from the sequence database
    pub id: String,
    pub replicon: String,
    /// 1-based rank of the protein on its replicon
    pub position: usize,
    /// Protein length in residues
    pub seq_length: usize,
    /// Independent e-value of the best domain
    pub i_evalue: f64,
    /// Bit score of the best domain
    pub score: f64,
    pub profile_coverage: f64,
    pub sequence_coverage: f64,
    pub begin_match: usize,
    pub end_match: usize,
}

impl CoreHit {
    /// Two hits on the very same protein
    #[must_use]
    pub fn same_protein(&self, other: &Self) -> bool {
        self.replicon == other.replicon && self.position == other.position
    }
}

/// A [`CoreHit`] bound to a gene of one model.
///
/// Carries the fulfilled *function* (the reference gene name, which differs
/// from `hit.gene_name` when the match went through an exchangeable), the
/// role-derived status and the behaviour flags of the model gene.
#[derive(Debug, Clone)]
pub struct ModelHit {
    pub hit: Arc<CoreHit>,
    pub function: String,
    pub status: GeneStatus,
    pub loner: bool,
    pub multi_system: bool,
    pub multi_model: bool,
    pub inter_gene_max_space: Option<usize>,
    pub via_exchangeable: bool,
    /// Equivalent hits that could play the same function, kept for reporting
    pub counterparts: Vec<Arc<CoreHit>>,
}

impl ModelHit {
    #[must_use]
    pub fn new(hit: Arc<CoreHit>, binding: &Binding) -> Self {
        Self {
            hit,
            function: binding.function.clone(),
            status: binding.status,
            loner: binding.loner,
            multi_system: binding.multi_system,
            multi_model: binding.multi_model,
            inter_gene_max_space: binding.inter_gene_max_space,
            via_exchangeable: binding.via_exchangeable,
            counterparts: Vec::new(),
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.hit.position
    }

    /// Both hits sit on the same protein of the same replicon
    #[must_use]
    pub fn same_protein(&self, other: &Self) -> bool {
        self.hit.same_protein(&other.hit)
    }
}

/// Selected hits indexed by replicon, ascending position.
///
/// One protein keeps at most one hit: when several gene profiles match the
/// same protein the best score wins. Read-only after construction.
#[derive(Debug, Default)]
pub struct HitStore {
    by_replicon: BTreeMap<String, Vec<Arc<CoreHit>>>,
}

impl HitStore {
    /// Index a batch of selected hits.
    pub fn from_hits(hits: Vec<CoreHit>) -> Self {
        let mut by_replicon: BTreeMap<String, Vec<Arc<CoreHit>>> = BTreeMap::new();
        for hit in hits {
            by_replicon
                .entry(hit.replicon.clone())
                .or_default()
                .push(Arc::new(hit));
        }
        for hits in by_replicon.values_mut() {
            // best score first within a position, then one hit per position
            hits.sort_by(|a, b| {
                a.position
                    .cmp(&b.position)
                    .then(b.score.total_cmp(&a.score))
            });
            hits.dedup_by(|next, kept| next.position == kept.position);
        }
        Self { by_replicon }
    }

    /// Hits of one replicon, sorted by ascending position
    #[must_use]
    pub fn replicon_hits(&self, replicon: &str) -> &[Arc<CoreHit>] {
        self.by_replicon
            .get(replicon)
            .map_or(&[], |hits| hits.as_slice())
    }

    /// Replicon names that received at least one hit, in name order
    pub fn replicons(&self) -> impl Iterator<Item = &str> {
        self.by_replicon.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_replicon.is_empty()
    }
}

/// Pick the best hit among equivalents fulfilling one function.
///
/// Hits matching the function's own gene outrank exchangeables; the bit
/// score breaks the remaining ties, then the lowest position. The winner
/// absorbs the rest as counterparts.
#[must_use]
pub fn best_hit_for_function(mut hits: Vec<ModelHit>) -> Option<ModelHit> {
    if hits.is_empty() {
        return None;
    }
    hits.sort_by(|a, b| {
        a.via_exchangeable
            .cmp(&b.via_exchangeable)
            .then(b.hit.score.total_cmp(&a.hit.score))
            .then(a.position().cmp(&b.position()))
    });
    let mut best = hits.remove(0);
    best.counterparts = hits.into_iter().map(|h| h.hit).collect();
    Some(best)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::GeneKey;
    use crate::types::GeneStatus;

    /// Bare hit used across the clustering and candidate tests.
    pub(crate) fn core_hit(gene_name: &str, replicon: &str, position: usize, score: f64) -> CoreHit {
        CoreHit {
            gene: GeneKey(0),
            gene_name: gene_name.to_string(),
            id: format!("{replicon}_{position:05}"),
            replicon: replicon.to_string(),
            position,
            seq_length: 200,
            i_evalue: 1e-10,
            score,
            profile_coverage: 0.9,
            sequence_coverage: 0.8,
            begin_match: 1,
            end_match: 180,
        }
    }

    pub(crate) fn model_hit(
        function: &str,
        replicon: &str,
        position: usize,
        status: GeneStatus,
    ) -> ModelHit {
        ModelHit {
            hit: Arc::new(core_hit(function, replicon, position, 50.0)),
            function: function.to_string(),
            status,
            loner: false,
            multi_system: false,
            multi_model: false,
            inter_gene_max_space: None,
            via_exchangeable: false,
            counterparts: Vec::new(),
        }
    }

    #[test]
    fn store_keeps_best_hit_per_position() {
        let store = HitStore::from_hits(vec![
            core_hit("gspD", "chr", 4, 10.0),
            core_hit("sctC", "chr", 4, 80.0),
            core_hit("gspE", "chr", 2, 30.0),
        ]);
        let hits = store.replicon_hits("chr");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 2);
        assert_eq!(hits[1].gene_name, "sctC");
    }

    #[test]
    fn store_orders_replicons_by_name() {
        let store = HitStore::from_hits(vec![
            core_hit("a", "zeta", 1, 1.0),
            core_hit("b", "alpha", 1, 1.0),
        ]);
        let names: Vec<_> = store.replicons().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn best_hit_prefers_the_original_gene() {
        let mut exchangeable = model_hit("gspD", "chr", 10, GeneStatus::Mandatory);
        exchangeable.via_exchangeable = true;
        let mut weak_original = model_hit("gspD", "chr", 20, GeneStatus::Mandatory);
        weak_original.hit = Arc::new(core_hit("gspD", "chr", 20, 5.0));

        let best = best_hit_for_function(vec![exchangeable, weak_original]).unwrap();
        assert_eq!(best.position(), 20, "original outranks a better-scoring exchangeable");
        assert_eq!(best.counterparts.len(), 1);
    }
}
