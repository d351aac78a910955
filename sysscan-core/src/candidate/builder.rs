//! Assembly of candidate systems from cluster combinations and the loner
//! and multi-model pools, under the model's quorum and forbidden rules.

use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use crate::candidate::score::score_candidate;
use crate::candidate::{CandidateSystem, RejectedCandidate, RejectionReason};
use crate::cluster::{colocates, Cluster, ClusterSet};
use crate::config::ScoreOptions;
use crate::db::RepliconInfo;
use crate::hit::ModelHit;
use crate::model::Model;
use crate::types::GeneStatus;

/// Candidates and rejections produced for one (model, replicon) pair.
#[derive(Debug, Default)]
pub struct BuilderOutcome {
    pub candidates: Vec<CandidateSystem>,
    pub rejected: Vec<RejectedCandidate>,
}

/// A loner hit is relied on by more candidates than it has occurrences.
///
/// Surfaced by the reporter as a `#` comment; never a rejection.
#[derive(Debug, Clone)]
pub struct LonerWarning {
    pub function: String,
    pub occurrences: usize,
    pub systems: Vec<String>,
}

/// One enumerated combination before evaluation.
struct Combination<'a> {
    clusters: Vec<&'a Cluster>,
    out_hits: Vec<&'a ModelHit>,
    /// Hit positions, the identity of the combination on its replicon
    signature: BTreeSet<usize>,
}

impl Combination<'_> {
    fn hit_count(&self) -> usize {
        self.clusters.iter().map(|c| c.len()).sum::<usize>() + self.out_hits.len()
    }

    fn hits(&self) -> impl Iterator<Item = &ModelHit> {
        self.clusters
            .iter()
            .flat_map(|cluster| cluster.hits().iter())
            .chain(self.out_hits.iter().copied())
    }
}

/// Build every candidate of `model` on one replicon.
///
/// Cluster combinations follow the model's `multi_loci` flag; each one may
/// be augmented with any subset of the loner and multi-model pools whose
/// functions the clusters do not already fulfil. Oversized combinations
/// (above `max_nb_genes`) and combinations whose hits are contained in an
/// already-accepted candidate are discarded silently; the rest is judged
/// against the forbidden and quorum rules.
pub fn build_candidates(
    model: &Model,
    set: &ClusterSet,
    replicon: &RepliconInfo,
    score_opts: &ScoreOptions,
) -> BuilderOutcome {
    let mut outcome = BuilderOutcome::default();

    let pool: Vec<&ModelHit> = set
        .loners
        .values()
        .chain(set.multi_model.values())
        .collect();

    if set.clusters.is_empty() && pool.is_empty() {
        if !set.unclustered.is_empty() {
            outcome.rejected.push(RejectedCandidate {
                id: String::new(),
                model_fqn: model.fqn.clone(),
                replicon: replicon.name.clone(),
                clusters: Vec::new(),
                out_hits: set.unclustered.clone(),
                reasons: vec![RejectionReason::NoCluster],
            });
        }
        return outcome;
    }

    let mut combinations = enumerate_combinations(model, set, &pool);
    // bigger combinations first, so that sub-combinations of an accepted
    // candidate are recognised and dropped instead of re-evaluated
    combinations.sort_by(|a, b| {
        b.hit_count()
            .cmp(&a.hit_count())
            .then_with(|| a.signature.cmp(&b.signature))
    });

    let mut accepted_signatures: Vec<BTreeSet<usize>> = Vec::new();
    for combination in combinations {
        if combination.hit_count() > model.max_nb_genes {
            debug!(
                "{}: combination of {} hits exceeds max_nb_genes ({})",
                model.fqn,
                combination.hit_count(),
                model.max_nb_genes
            );
            continue;
        }
        if accepted_signatures
            .iter()
            .any(|accepted| combination.signature.is_subset(accepted))
        {
            continue;
        }

        let reasons = evaluate(model, &combination, set, replicon);
        if reasons.is_empty() {
            accepted_signatures.push(combination.signature.clone());
            outcome.candidates.push(accept(model, replicon, &combination, score_opts));
        } else {
            outcome.rejected.push(RejectedCandidate {
                id: String::new(),
                model_fqn: model.fqn.clone(),
                replicon: replicon.name.clone(),
                clusters: combination.clusters.iter().map(|&c| c.clone()).collect(),
                out_hits: combination.out_hits.iter().map(|&h| h.clone()).collect(),
                reasons,
            });
        }
    }
    outcome
}

fn enumerate_combinations<'a>(
    model: &Model,
    set: &'a ClusterSet,
    pool: &[&'a ModelHit],
) -> Vec<Combination<'a>> {
    let cluster_choices: Vec<Vec<&Cluster>> = if model.multi_loci {
        (1..=set.clusters.len())
            .flat_map(|size| set.clusters.iter().combinations(size))
            .collect()
    } else {
        set.clusters.iter().map(|cluster| vec![cluster]).collect()
    };

    let mut combinations = Vec::new();
    for subset_size in 0..=pool.len() {
        for out_hits in pool.iter().copied().combinations(subset_size) {
            // clusters-only combination
            if subset_size == 0 {
                for clusters in &cluster_choices {
                    combinations.push(combine(clusters.clone(), Vec::new()));
                }
                continue;
            }
            // pool-only combination: a model may be satisfiable by loners alone
            combinations.push(combine(Vec::new(), out_hits.clone()));
            for clusters in &cluster_choices {
                let already_fulfilled = out_hits.iter().any(|out_hit| {
                    clusters
                        .iter()
                        .any(|cluster| cluster.fulfills(&out_hit.function))
                });
                if !already_fulfilled {
                    combinations.push(combine(clusters.clone(), out_hits.clone()));
                }
            }
        }
    }
    combinations
}

fn combine<'a>(clusters: Vec<&'a Cluster>, out_hits: Vec<&'a ModelHit>) -> Combination<'a> {
    let signature = clusters
        .iter()
        .flat_map(|cluster| cluster.hits().iter().map(ModelHit::position))
        .chain(out_hits.iter().map(|hit| hit.position()))
        .collect();
    Combination {
        clusters,
        out_hits,
        signature,
    }
}

/// Apply the forbidden and quorum rules; an empty result means acceptance.
fn evaluate(
    model: &Model,
    combination: &Combination<'_>,
    set: &ClusterSet,
    replicon: &RepliconInfo,
) -> Vec<RejectionReason> {
    let mut reasons = Vec::new();

    let forbidden_near = set.forbidden.iter().any(|forbidden| {
        combination.hits().any(|hit| {
            colocates(model, hit, forbidden, replicon) || colocates(model, forbidden, hit, replicon)
        })
    });
    if forbidden_near {
        reasons.push(RejectionReason::ForbiddenPresent);
    }

    let observed: BTreeSet<(&str, GeneStatus)> = combination
        .hits()
        .map(|hit| (hit.function.as_str(), hit.status))
        .collect();
    let mandatory_observed = observed
        .iter()
        .filter(|(_, status)| *status == GeneStatus::Mandatory)
        .count();
    if mandatory_observed < model.min_mandatory_genes_required {
        reasons.push(RejectionReason::MandatoryQuorumNotReached(
            model.min_mandatory_genes_required,
            mandatory_observed,
        ));
    }
    let required_observed = observed
        .iter()
        .filter(|(_, status)| {
            matches!(status, GeneStatus::Mandatory | GeneStatus::Accessory)
        })
        .count();
    if required_observed < model.min_genes_required {
        reasons.push(RejectionReason::GenesQuorumNotReached(
            model.min_genes_required,
            required_observed,
        ));
    }
    reasons
}

fn accept(
    model: &Model,
    replicon: &RepliconInfo,
    combination: &Combination<'_>,
    score_opts: &ScoreOptions,
) -> CandidateSystem {
    let mut clusters: Vec<Cluster> = combination.clusters.iter().map(|&c| c.clone()).collect();
    clusters.sort_by_key(Cluster::min_position);
    let out_hits: Vec<ModelHit> = combination.out_hits.iter().map(|&h| h.clone()).collect();

    let score = score_candidate(
        clusters.iter().flat_map(|cluster| cluster.hits().iter()),
        out_hits.iter(),
        score_opts,
    );

    let mut function_counts: std::collections::BTreeMap<&str, usize> =
        std::collections::BTreeMap::new();
    for hit in combination.hits() {
        if matches!(hit.status, GeneStatus::Mandatory | GeneStatus::Accessory) {
            *function_counts.entry(hit.function.as_str()).or_default() += 1;
        }
    }
    let satisfied = function_counts.len();
    let occ = if satisfied == 0 {
        0
    } else {
        (function_counts.values().sum::<usize>() as f64 / satisfied as f64).floor() as usize
    };
    let wholeness = satisfied as f64 / model.required_gene_count() as f64;

    CandidateSystem {
        id: String::new(),
        model_fqn: model.fqn.clone(),
        model_name: model.name.clone(),
        replicon: replicon.name.clone(),
        clusters,
        out_hits,
        wholeness,
        occ,
        score,
    }
}

/// Assign deterministic identifiers to accepted and rejected candidates.
///
/// Candidates are numbered per (replicon, model) in ascending minimum hit
/// position order; rejected combinations get their own counter.
pub fn assign_ids(candidates: &mut [CandidateSystem], rejected: &mut [RejectedCandidate]) {
    candidates.sort_by(|a, b| {
        a.model_fqn
            .cmp(&b.model_fqn)
            .then(a.min_position().cmp(&b.min_position()))
            .then_with(|| a.positions().cmp(&b.positions()))
    });
    let mut per_model = std::collections::HashMap::new();
    for candidate in candidates.iter_mut() {
        let counter = per_model
            .entry(candidate.model_fqn.clone())
            .or_insert(0usize);
        *counter += 1;
        candidate.id = format!("{}_{}_{}", candidate.replicon, candidate.model_name, counter);
    }

    rejected.sort_by(|a, b| {
        let a_min = a.hits().map(|(h, _)| h.position()).min().unwrap_or(usize::MAX);
        let b_min = b.hits().map(|(h, _)| h.position()).min().unwrap_or(usize::MAX);
        a.model_fqn.cmp(&b.model_fqn).then(a_min.cmp(&b_min))
    });
    let mut per_model = std::collections::HashMap::new();
    for rejection in rejected.iter_mut() {
        let counter = per_model
            .entry(rejection.model_fqn.clone())
            .or_insert(0usize);
        *counter += 1;
        let model_name = rejection
            .model_fqn
            .rsplit('/')
            .next()
            .unwrap_or(&rejection.model_fqn);
        rejection.id = format!("{}_{}_r{}", rejection.replicon, model_name, counter);
    }
}

/// Detect loner hits relied on by more candidates than they occur.
#[must_use]
pub fn loner_warnings(candidates: &[CandidateSystem]) -> Vec<LonerWarning> {
    let mut usage: std::collections::BTreeMap<(String, String, usize), (usize, Vec<String>)> =
        std::collections::BTreeMap::new();
    for candidate in candidates {
        for hit in &candidate.out_hits {
            if hit.loner && !hit.multi_system {
                let key = (
                    candidate.model_fqn.clone(),
                    hit.function.clone(),
                    hit.position(),
                );
                let entry = usage
                    .entry(key)
                    .or_insert_with(|| (hit.counterparts.len() + 1, Vec::new()));
                entry.1.push(candidate.id.clone());
            }
        }
    }
    usage
        .into_iter()
        .filter(|(_, (occurrences, systems))| systems.len() > *occurrences)
        .map(|((_, function, _), (occurrences, systems))| LonerWarning {
            function,
            occurrences,
            systems,
        })
        .collect()
}

/// Judge an unordered dataset: no clustering is possible, so a single
/// combination holding every bound hit is tested on quorum only.
pub fn build_unordered(
    model: &Model,
    hits: Vec<ModelHit>,
    forbidden: Vec<ModelHit>,
    replicon: &RepliconInfo,
    score_opts: &ScoreOptions,
) -> BuilderOutcome {
    let mut outcome = BuilderOutcome::default();
    if hits.is_empty() {
        return outcome;
    }

    let mut reasons = Vec::new();
    if !forbidden.is_empty() {
        reasons.push(RejectionReason::ForbiddenPresent);
    }
    let observed: BTreeSet<(&str, GeneStatus)> = hits
        .iter()
        .map(|hit| (hit.function.as_str(), hit.status))
        .collect();
    let mandatory_observed = observed
        .iter()
        .filter(|(_, status)| *status == GeneStatus::Mandatory)
        .count();
    if mandatory_observed < model.min_mandatory_genes_required {
        reasons.push(RejectionReason::MandatoryQuorumNotReached(
            model.min_mandatory_genes_required,
            mandatory_observed,
        ));
    }
    let required_observed = observed
        .iter()
        .filter(|(_, status)| matches!(status, GeneStatus::Mandatory | GeneStatus::Accessory))
        .count();
    if required_observed < model.min_genes_required {
        reasons.push(RejectionReason::GenesQuorumNotReached(
            model.min_genes_required,
            required_observed,
        ));
    }

    if reasons.is_empty() {
        let score = score_candidate(hits.iter(), std::iter::empty(), score_opts);
        let mut function_counts: std::collections::BTreeMap<&str, usize> =
            std::collections::BTreeMap::new();
        for hit in &hits {
            if matches!(hit.status, GeneStatus::Mandatory | GeneStatus::Accessory) {
                *function_counts.entry(hit.function.as_str()).or_default() += 1;
            }
        }
        let satisfied = function_counts.len();
        let occ =
            (function_counts.values().sum::<usize>() as f64 / satisfied as f64).floor() as usize;
        outcome.candidates.push(CandidateSystem {
            id: String::new(),
            model_fqn: model.fqn.clone(),
            model_name: model.name.clone(),
            replicon: replicon.name.clone(),
            clusters: Vec::new(),
            out_hits: hits,
            wholeness: satisfied as f64 / model.required_gene_count() as f64,
            occ,
            score,
        });
    } else {
        outcome.rejected.push(RejectedCandidate {
            id: String::new(),
            model_fqn: model.fqn.clone(),
            replicon: replicon.name.clone(),
            clusters: Vec::new(),
            out_hits: hits,
            reasons,
        });
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::cluster::build_clusters;
    use crate::hit::tests::core_hit;
    use crate::hit::CoreHit;
    use crate::model::{GeneBank, ModelGene};
    use crate::types::Topology;

    const OPTS: ScoreOptions = ScoreOptions {
        mandatory_weight: 1.0,
        accessory_weight: 0.5,
        neutral_weight: 0.0,
        exchangeable_weight: 0.8,
        out_of_cluster_weight: 0.7,
        redundancy_penalty: 1.5,
    };

    struct GeneSpec {
        name: &'static str,
        status: GeneStatus,
        loner: bool,
        multi_system: bool,
    }

    fn spec(name: &'static str, status: GeneStatus) -> GeneSpec {
        GeneSpec {
            name,
            status,
            loner: false,
            multi_system: false,
        }
    }

    fn build_model(
        fqn: &str,
        space: usize,
        min_mandatory: usize,
        min_genes: usize,
        max_nb_genes: usize,
        multi_loci: bool,
        specs: Vec<GeneSpec>,
    ) -> Model {
        let mut bank = GeneBank::new();
        let genes = specs
            .into_iter()
            .map(|spec| {
                let core = bank.intern("fam", spec.name, PathBuf::from(format!("{}.hmm", spec.name)));
                ModelGene {
                    core,
                    name: spec.name.to_string(),
                    status: spec.status,
                    loner: spec.loner,
                    multi_system: spec.multi_system,
                    multi_model: false,
                    inter_gene_max_space: None,
                    exchangeables: Vec::new(),
                }
            })
            .collect();
        Model::new(
            fqn.to_string(),
            space,
            min_mandatory,
            min_genes,
            max_nb_genes,
            multi_loci,
            genes,
        )
    }

    /// Mandatory A, B, C, accessory D; min_mandatory 2, min_genes 3, spacing 2.
    fn scenario_model(multi_loci: bool) -> Model {
        build_model(
            "fam/toy",
            2,
            2,
            3,
            8,
            multi_loci,
            vec![
                spec("geneA", GeneStatus::Mandatory),
                spec("geneB", GeneStatus::Mandatory),
                spec("geneC", GeneStatus::Mandatory),
                spec("geneD", GeneStatus::Accessory),
            ],
        )
    }

    fn replicon(len: usize) -> RepliconInfo {
        RepliconInfo {
            name: "chr".to_string(),
            topology: Topology::Linear,
            len,
        }
    }

    fn hits(spec: &[(&str, usize)]) -> Vec<Arc<CoreHit>> {
        spec.iter()
            .map(|&(gene, pos)| Arc::new(core_hit(gene, "chr", pos, 50.0)))
            .collect()
    }

    #[test]
    fn a_full_cluster_yields_one_candidate() {
        let model = scenario_model(false);
        let rep = replicon(10);
        let set = build_clusters(
            &model,
            &hits(&[("geneA", 1), ("geneB", 3), ("geneC", 4), ("geneD", 6)]),
            &rep,
        );
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert_eq!(outcome.candidates.len(), 1);
        assert!(outcome.rejected.is_empty());
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.sys_loci(), 1);
        assert!((candidate.wholeness - 1.0).abs() < 1e-12);
        assert_eq!(candidate.occ, 1);
        // 3 mandatory + 1 accessory, all in cluster
        assert!((candidate.score - 3.5).abs() < 1e-12);
    }

    #[test]
    fn split_clusters_fail_quorum_without_multi_loci() {
        let model = scenario_model(false);
        let rep = replicon(10);
        let set = build_clusters(
            &model,
            &hits(&[("geneA", 1), ("geneB", 3), ("geneC", 8), ("geneD", 9)]),
            &rep,
        );
        assert_eq!(set.clusters.len(), 2);
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejected.len(), 2);
        // [A,B]: 2 mandatory but only 2 required genes observed
        assert_eq!(
            outcome.rejected[0].reasons,
            vec![RejectionReason::GenesQuorumNotReached(3, 2)]
        );
        // [C,D]: a single mandatory gene
        assert!(outcome.rejected[1]
            .reasons
            .contains(&RejectionReason::MandatoryQuorumNotReached(2, 1)));
    }

    #[test]
    fn multi_loci_assembles_distant_clusters() {
        let model = scenario_model(true);
        let rep = replicon(10);
        let set = build_clusters(
            &model,
            &hits(&[("geneA", 1), ("geneB", 3), ("geneC", 8), ("geneD", 9)]),
            &rep,
        );
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert_eq!(outcome.candidates.len(), 1, "sub-combinations are absorbed");
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.sys_loci(), 2);
        assert!((candidate.wholeness - 1.0).abs() < 1e-12);
        // the lone clusters are neither accepted nor reported as rejections
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn forbidden_gene_next_to_a_cluster_rejects_it() {
        let model = build_model(
            "fam/toy",
            2,
            2,
            2,
            4,
            false,
            vec![
                spec("geneA", GeneStatus::Mandatory),
                spec("geneB", GeneStatus::Mandatory),
                spec("bad", GeneStatus::Forbidden),
            ],
        );
        let rep = replicon(20);
        let set = build_clusters(&model, &hits(&[("geneA", 1), ("geneB", 2), ("bad", 3)]), &rep);
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].reasons,
            vec![RejectionReason::ForbiddenPresent]
        );
    }

    #[test]
    fn a_distant_forbidden_gene_is_harmless() {
        let model = build_model(
            "fam/toy",
            2,
            2,
            2,
            4,
            false,
            vec![
                spec("geneA", GeneStatus::Mandatory),
                spec("geneB", GeneStatus::Mandatory),
                spec("bad", GeneStatus::Forbidden),
            ],
        );
        let rep = replicon(50);
        let set = build_clusters(&model, &hits(&[("geneA", 1), ("geneB", 2), ("bad", 30)]), &rep);
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[test]
    fn loners_complete_a_cluster() {
        let mut specs = vec![
            spec("geneA", GeneStatus::Mandatory),
            spec("geneB", GeneStatus::Mandatory),
            spec("geneL", GeneStatus::Mandatory),
        ];
        specs[2].loner = true;
        let model = build_model("fam/toy", 2, 3, 3, 4, false, specs);
        let rep = replicon(100);
        let set = build_clusters(
            &model,
            &hits(&[("geneA", 1), ("geneB", 2), ("geneL", 80)]),
            &rep,
        );
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert_eq!(outcome.candidates.len(), 1);
        let candidate = &outcome.candidates[0];
        assert_eq!(candidate.sys_loci(), 1, "the loner does not add a locus");
        assert_eq!(candidate.out_hits.len(), 1);
        // 2 in-cluster mandatory + 1 out-of-cluster mandatory
        assert!((candidate.score - 2.7).abs() < 1e-12);
    }

    #[test]
    fn no_cluster_rejection_when_everything_is_scattered() {
        let model = scenario_model(false);
        let rep = replicon(100);
        let set = build_clusters(&model, &hits(&[("geneA", 1), ("geneB", 50)]), &rep);
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reasons, vec![RejectionReason::NoCluster]);
        assert_eq!(outcome.rejected[0].out_hits.len(), 2);
    }

    #[test]
    fn oversized_combinations_are_discarded() {
        let model = build_model(
            "fam/toy",
            2,
            1,
            2,
            2, // max_nb_genes below the cluster size
            false,
            vec![
                spec("geneA", GeneStatus::Mandatory),
                spec("geneB", GeneStatus::Mandatory),
                spec("geneC", GeneStatus::Mandatory),
            ],
        );
        let rep = replicon(10);
        let set = build_clusters(&model, &hits(&[("geneA", 1), ("geneB", 2), ("geneC", 3)]), &rep);
        let outcome = build_candidates(&model, &set, &rep, &OPTS);
        assert!(outcome.candidates.is_empty());
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn ids_are_deterministic_and_position_ordered() {
        let model = scenario_model(false);
        let rep = replicon(30);
        let set = build_clusters(
            &model,
            &hits(&[
                ("geneA", 20),
                ("geneB", 21),
                ("geneC", 22),
                ("geneA", 1),
                ("geneB", 2),
                ("geneC", 3),
            ]),
            &rep,
        );
        let mut outcome = build_candidates(&model, &set, &rep, &OPTS);
        assign_ids(&mut outcome.candidates, &mut outcome.rejected);
        assert_eq!(outcome.candidates[0].id, "chr_toy_1");
        assert_eq!(outcome.candidates[0].min_position(), 1);
        assert_eq!(outcome.candidates[1].id, "chr_toy_2");
    }

    #[test]
    fn undersupplied_loner_triggers_a_warning() {
        let mut candidates = Vec::new();
        let mut loner = crate::hit::tests::model_hit("geneL", "chr", 50, GeneStatus::Mandatory);
        loner.loner = true;
        for id in ["chr_toy_1", "chr_toy_2"] {
            candidates.push(CandidateSystem {
                id: id.to_string(),
                model_fqn: "fam/toy".to_string(),
                model_name: "toy".to_string(),
                replicon: "chr".to_string(),
                clusters: Vec::new(),
                out_hits: vec![loner.clone()],
                wholeness: 1.0,
                occ: 1,
                score: 1.0,
            });
        }
        let warnings = loner_warnings(&candidates);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].function, "geneL");
        assert_eq!(warnings[0].occurrences, 1);
        assert_eq!(warnings[0].systems.len(), 2);
    }

    #[test]
    fn unordered_dataset_is_judged_on_quorum_only() {
        let model = scenario_model(false);
        let rep = RepliconInfo {
            name: "dataset".to_string(),
            topology: Topology::Linear,
            len: 4,
        };
        let bound: Vec<ModelHit> = hits(&[("geneA", 1), ("geneB", 2), ("geneC", 3)])
            .iter()
            .map(|hit| ModelHit::new(Arc::clone(hit), &model.resolve(&hit.gene_name).unwrap()))
            .collect();
        let outcome = build_unordered(&model, bound, Vec::new(), &rep, &OPTS);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].sys_loci(), 0);
    }
}
