use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::constants::{DEFAULT_COVERAGE_PROFILE, DEFAULT_E_VALUE_SEARCH, DEFAULT_I_EVALUE_SEL};
use crate::types::{DbType, SysscanError, Topology};

/// Input dataset options (`base` group).
#[derive(Debug, Clone)]
pub struct BaseOptions {
    /// Path to the FASTA protein database, optionally gzip-compressed
    pub sequence_db: PathBuf,
    /// Layout of the database
    pub db_type: DbType,
    /// Optional topology file with `<replicon>\t<linear|circular>` lines
    pub topology_file: Option<PathBuf>,
    /// Topology assumed for replicons absent from the topology file
    pub default_topology: Topology,
}

/// Model selection options (`models` group).
#[derive(Debug, Clone, Default)]
pub struct ModelSelection {
    /// Directory containing model packages
    pub models_dir: PathBuf,
    /// Name of the model package to search with
    pub package: String,
    /// Definitions to detect; empty means every definition of the package
    pub names: Vec<String>,
}

/// Per-model threshold overrides (`models_opt` group), keyed by
/// fully-qualified model name.
///
/// Overrides supersede the values read from the XML definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelOverride {
    pub inter_gene_max_space: Option<usize>,
    pub min_mandatory_genes_required: Option<usize>,
    pub min_genes_required: Option<usize>,
    pub max_nb_genes: Option<usize>,
    pub multi_loci: Option<bool>,
}

/// HMMER invocation and hit selection options (`hmmer` group).
#[derive(Debug, Clone)]
pub struct HmmerOptions {
    /// Name or path of the hmmsearch executable
    pub binary: String,
    /// E-value passed to hmmsearch when GA thresholds are not in use
    pub e_value_search: f64,
    /// Use the profile GA bit threshold instead of an e-value cutoff
    pub cut_ga: bool,
    /// Independent-evalue cutoff applied when selecting hits
    pub i_evalue_sel: f64,
    /// Minimal profile coverage applied when selecting hits
    pub coverage_profile: f64,
    /// Reuse raw reports found in the working directory instead of
    /// launching hmmsearch again
    pub previous_run: bool,
}

impl Default for HmmerOptions {
    fn default() -> Self {
        Self {
            binary: "hmmsearch".to_string(),
            e_value_search: DEFAULT_E_VALUE_SEARCH,
            cut_ga: true,
            i_evalue_sel: DEFAULT_I_EVALUE_SEL,
            coverage_profile: DEFAULT_COVERAGE_PROFILE,
            previous_run: false,
        }
    }
}

/// Hit weights and penalties used by the scorer (`score_opt` group).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreOptions {
    pub mandatory_weight: f64,
    pub accessory_weight: f64,
    pub neutral_weight: f64,
    /// Weight applied when a hit fulfils a function through an exchangeable
    pub exchangeable_weight: f64,
    /// Weight applied to loner or multi-model hits contributed from outside
    /// the candidate's clusters
    pub out_of_cluster_weight: f64,
    /// Divisor applied to every contribution after the first one per function
    pub redundancy_penalty: f64,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            mandatory_weight: 1.0,
            accessory_weight: 0.5,
            neutral_weight: 0.0,
            exchangeable_weight: 0.8,
            out_of_cluster_weight: 0.7,
            redundancy_penalty: 1.5,
        }
    }
}

/// Filesystem layout options (`directories` group).
#[derive(Debug, Clone, Default)]
pub struct Directories {
    /// Directory owned by the run; raw HMM outputs and result tables land here
    pub working_dir: PathBuf,
}

/// Run-wide options (`general` group).
#[derive(Debug, Clone, Default)]
pub struct GeneralOptions {
    /// Size of the rayon worker pool; `None` uses all available cores
    pub workers: Option<usize>,
    /// Per-replicon budget for the solution search; `None` is unbounded
    pub timeout: Option<Duration>,
    /// Suppress informational logging
    pub quiet: bool,
}

/// Full run configuration.
///
/// Built from defaults, then an optional YAML configuration file, then the
/// command line; each layer only overrides what it sets. [`Config::validate`]
/// must pass before any work starts.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base: Option<BaseOptions>,
    pub models: ModelSelection,
    pub models_opt: BTreeMap<String, ModelOverride>,
    pub hmmer: HmmerOptions,
    pub score_opt: ScoreOptions,
    pub directories: Directories,
    pub general: GeneralOptions,
}

/// Partial configuration as read from a `--cfg-file` YAML document.
///
/// Every field is optional so a file may override any subset of options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub sequence_db: Option<PathBuf>,
    pub db_type: Option<DbType>,
    pub topology_file: Option<PathBuf>,
    pub default_topology: Option<Topology>,
    pub models_dir: Option<PathBuf>,
    pub package: Option<String>,
    pub models: Option<Vec<String>>,
    pub models_opt: Option<BTreeMap<String, ModelOverride>>,
    pub hmmer_binary: Option<String>,
    pub e_value_search: Option<f64>,
    pub cut_ga: Option<bool>,
    pub i_evalue_sel: Option<f64>,
    pub coverage_profile: Option<f64>,
    pub score_opt: Option<ScoreOptions>,
    pub working_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Parse a YAML configuration file
    pub fn load(path: &Path) -> Result<Self, SysscanError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|err| SysscanError::parse(path.display().to_string(), err.to_string()))
    }
}

impl Config {
    /// Fold a configuration file layer into this configuration.
    ///
    /// File values override current values; unset file fields are ignored.
    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(db) = file.sequence_db {
            let db_type = file.db_type.unwrap_or_else(|| {
                self.base
                    .as_ref()
                    .map_or(DbType::OrderedReplicon, |b| b.db_type)
            });
            let base = self.base.get_or_insert_with(|| BaseOptions {
                sequence_db: db.clone(),
                db_type,
                topology_file: None,
                default_topology: Topology::Linear,
            });
            base.sequence_db = db;
        }
        if let Some(base) = self.base.as_mut() {
            if let Some(db_type) = file.db_type {
                base.db_type = db_type;
            }
            if let Some(topo) = file.topology_file {
                base.topology_file = Some(topo);
            }
            if let Some(topo) = file.default_topology {
                base.default_topology = topo;
            }
        }
        if let Some(dir) = file.models_dir {
            self.models.models_dir = dir;
        }
        if let Some(package) = file.package {
            self.models.package = package;
        }
        if let Some(names) = file.models {
            self.models.names = names;
        }
        if let Some(overrides) = file.models_opt {
            self.models_opt.extend(overrides);
        }
        if let Some(binary) = file.hmmer_binary {
            self.hmmer.binary = binary;
        }
        if let Some(e_value) = file.e_value_search {
            self.hmmer.e_value_search = e_value;
        }
        if let Some(cut_ga) = file.cut_ga {
            self.hmmer.cut_ga = cut_ga;
        }
        if let Some(i_evalue) = file.i_evalue_sel {
            self.hmmer.i_evalue_sel = i_evalue;
        }
        if let Some(coverage) = file.coverage_profile {
            self.hmmer.coverage_profile = coverage;
        }
        if let Some(score_opt) = file.score_opt {
            self.score_opt = score_opt;
        }
        if let Some(dir) = file.working_dir {
            self.directories.working_dir = dir;
        }
        if let Some(workers) = file.workers {
            self.general.workers = Some(workers);
        }
        if let Some(secs) = file.timeout_secs {
            self.general.timeout = Some(Duration::from_secs(secs));
        }
    }

    /// Check the configuration before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`SysscanError::Config`] naming the first violated
    /// requirement: missing sequence database, missing package name or
    /// unusable threshold values.
    pub fn validate(&self) -> Result<(), SysscanError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| SysscanError::Config("no sequence database given".to_string()))?;
        if !base.sequence_db.exists() {
            return Err(SysscanError::Config(format!(
                "sequence database '{}' does not exist",
                base.sequence_db.display()
            )));
        }
        if self.models.package.is_empty() {
            return Err(SysscanError::Config("no model package selected".to_string()));
        }
        if !self.models.models_dir.exists() {
            return Err(SysscanError::Config(format!(
                "models directory '{}' does not exist",
                self.models.models_dir.display()
            )));
        }
        if !(0.0..=1.0).contains(&self.hmmer.coverage_profile) {
            return Err(SysscanError::Config(format!(
                "coverage_profile must lie in [0, 1], got {}",
                self.hmmer.coverage_profile
            )));
        }
        if self.score_opt.redundancy_penalty < 1.0 {
            return Err(SysscanError::Config(format!(
                "redundancy_penalty must be >= 1, got {}",
                self.score_opt.redundancy_penalty
            )));
        }
        Ok(())
    }

    /// Base options, panicking if validation has not run.
    ///
    /// Only call after [`Config::validate`] succeeded.
    #[must_use]
    pub fn base(&self) -> &BaseOptions {
        self.base.as_ref().expect("configuration not validated")
    }
}
