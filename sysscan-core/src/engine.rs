//! Pipeline orchestration: model loading, HMM searches, per-replicon
//! clustering, candidate building and solution resolution.
//!
//! Data flows strictly forward: catalog and hit stream feed the clustering
//! engine, candidates feed the scorer and resolver, and the reporter only
//! projects the results gathered here. Replicons are independent, so the
//! resolution phase runs them in parallel on the rayon pool.

use std::collections::BTreeSet;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::candidate::builder::{assign_ids, build_unordered, loner_warnings};
use crate::candidate::{build_candidates, CandidateSystem, LonerWarning, RejectedCandidate};
use crate::cluster::{build_clusters, materialize_hits};
use crate::config::Config;
use crate::db::{RepliconInfo, SequenceIndex};
use crate::hit::HitStore;
use crate::model::{GeneBank, GeneKey, Model, ModelPackage};
use crate::search::search_genes;
use crate::solution::{resolve, Resolution, SearchStatus};
use crate::types::{DbType, SysscanError};

/// Everything detected on one replicon.
#[derive(Debug)]
pub struct RepliconResult {
    pub replicon: RepliconInfo,
    /// Accepted candidates, deterministic ids assigned
    pub candidates: Vec<CandidateSystem>,
    pub rejected: Vec<RejectedCandidate>,
    pub resolution: Resolution,
    pub warnings: Vec<LonerWarning>,
}

/// Results of a whole run, the reporter's only input.
#[derive(Debug)]
pub struct RunResults {
    pub replicons: Vec<RepliconResult>,
    pub package_name: String,
    pub package_version: String,
    /// Command line echoed into output headers
    pub command_line: String,
}

impl RunResults {
    /// Did the resolver time out on at least one replicon?
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.replicons
            .iter()
            .any(|result| result.resolution.status == SearchStatus::Timeout)
    }
}

/// Main detection engine.
///
/// Owns the validated configuration; [`Sysscan::run`] executes the whole
/// pipeline and returns the per-replicon results.
#[derive(Debug)]
pub struct Sysscan {
    config: Config,
}

impl Sysscan {
    /// Validate the configuration and size the worker pool.
    ///
    /// # Errors
    ///
    /// Configuration violations surface as [`SysscanError::Config`].
    pub fn new(config: Config) -> Result<Self, SysscanError> {
        config.validate()?;
        if let Some(workers) = config.general.workers {
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build_global()
                .map_err(|err| {
                    SysscanError::Config(format!("failed to configure the worker pool: {err}"))
                })?;
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline.
    ///
    /// `command_line` is only echoed into the output file headers.
    pub fn run(&self, command_line: &str) -> Result<RunResults, SysscanError> {
        let package_path = self
            .config
            .models
            .models_dir
            .join(&self.config.models.package);
        let package = ModelPackage::open(&package_path)?;
        let mut gene_bank = GeneBank::new();
        let model_bank = package.load_models(&self.config.models_opt, &mut gene_bank)?;
        let models = model_bank.models_to_detect(&self.config.models.names)?;
        info!(
            "package '{}' v{}: {} model(s) to detect",
            package.name,
            package.metadata.vers,
            models.len()
        );

        let index = SequenceIndex::build(self.config.base())?;

        let genes: Vec<GeneKey> = genes_to_search(&models);
        let hits = search_genes(&self.config, &gene_bank, &genes, &index)?;
        let store = HitStore::from_hits(hits);

        let replicon_names: Vec<&str> = store.replicons().collect();
        let replicons: Vec<RepliconResult> = replicon_names
            .par_iter()
            .map(|name| self.process_replicon(name, &store, &models, &index))
            .collect();

        Ok(RunResults {
            replicons,
            package_name: package.name.clone(),
            package_version: package.metadata.vers.clone(),
            command_line: command_line.to_string(),
        })
    }

    /// Cluster, assemble and resolve one replicon.
    ///
    /// The resolution deadline starts here: each replicon owns its full
    /// time budget.
    fn process_replicon(
        &self,
        name: &str,
        store: &HitStore,
        models: &[&Model],
        index: &SequenceIndex,
    ) -> RepliconResult {
        let replicon = index
            .replicon_by_name(name)
            .cloned()
            .unwrap_or_else(|| RepliconInfo {
                name: name.to_string(),
                topology: crate::types::Topology::Linear,
                len: 0,
            });
        let hits = store.replicon_hits(name);
        debug!("replicon '{name}': {} selected hit(s)", hits.len());

        let mut candidates = Vec::new();
        let mut rejected = Vec::new();
        for model in models {
            let outcome = if self.config.base().db_type == DbType::Unordered {
                let (eligible, loners, multi_model, forbidden) = materialize_hits(model, hits);
                let bound = eligible
                    .into_iter()
                    .chain(loners)
                    .chain(multi_model)
                    .collect();
                build_unordered(model, bound, forbidden, &replicon, &self.config.score_opt)
            } else {
                let set = build_clusters(model, hits, &replicon);
                build_candidates(model, &set, &replicon, &self.config.score_opt)
            };
            candidates.extend(outcome.candidates);
            rejected.extend(outcome.rejected);
        }
        assign_ids(&mut candidates, &mut rejected);
        let warnings = loner_warnings(&candidates);

        let deadline = self.config.general.timeout.map(|budget| Instant::now() + budget);
        let resolution = resolve(&candidates, deadline);
        info!(
            "replicon '{name}': {} candidate(s), {} rejected, best score {:.3}",
            candidates.len(),
            rejected.len(),
            resolution.score
        );

        RepliconResult {
            replicon,
            candidates,
            rejected,
            resolution,
            warnings,
        }
    }
}

/// Distinct genes referenced by the selected models, exchangeables
/// included, in a stable order.
fn genes_to_search(models: &[&Model]) -> Vec<GeneKey> {
    let mut keys = BTreeSet::new();
    for model in models {
        for gene in model.genes() {
            keys.insert(gene.core);
            for exchangeable in &gene.exchangeables {
                keys.insert(exchangeable.core);
            }
        }
    }
    keys.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{Exchangeable, GeneBank, ModelGene};
    use crate::types::GeneStatus;

    #[test]
    fn genes_to_search_dedups_across_models() {
        let mut bank = GeneBank::new();
        let shared = bank.intern("fam", "shared", PathBuf::from("shared.hmm"));
        let other = bank.intern("fam", "other", PathBuf::from("other.hmm"));
        let substitute = bank.intern("fam", "substitute", PathBuf::from("substitute.hmm"));

        let gene = |core, name: &str, exchangeables: Vec<Exchangeable>| ModelGene {
            core,
            name: name.to_string(),
            status: GeneStatus::Mandatory,
            loner: false,
            multi_system: false,
            multi_model: false,
            inter_gene_max_space: None,
            exchangeables,
        };
        let model_a = Model::new(
            "fam/a".to_string(),
            2,
            1,
            1,
            2,
            false,
            vec![gene(
                shared,
                "shared",
                vec![Exchangeable {
                    core: substitute,
                    name: "substitute".to_string(),
                    loner: false,
                    multi_system: false,
                    multi_model: false,
                    inter_gene_max_space: None,
                }],
            )],
        );
        let model_b = Model::new(
            "fam/b".to_string(),
            2,
            1,
            1,
            2,
            false,
            vec![gene(shared, "shared", Vec::new()), gene(other, "other", Vec::new())],
        );
        let keys = genes_to_search(&[&model_a, &model_b]);
        assert_eq!(keys.len(), 3);
    }
}
