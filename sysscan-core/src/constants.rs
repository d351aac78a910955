/// Version string reported in output file headers
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the tool reported in output file headers
pub const TOOL_NAME: &str = "sysscan";

/// Default independent-evalue cutoff for hit selection
pub const DEFAULT_I_EVALUE_SEL: f64 = 0.001;

/// Default fraction of the profile that must be covered by the alignment
pub const DEFAULT_COVERAGE_PROFILE: f64 = 0.5;

/// Default e-value passed to hmmsearch when GA thresholds are not used
pub const DEFAULT_E_VALUE_SEARCH: f64 = 0.1;

/// File suffix of HMM profiles inside a model package
pub const PROFILE_SUFFIX: &str = ".hmm";

/// Suffix appended to per-gene raw HMM search outputs
pub const RES_SEARCH_SUFFIX: &str = ".search_hmm.out";

/// Sub-directory of the working dir holding raw HMM search outputs
pub const HMMER_RESULTS_DIR: &str = "hmmer_results";

/// Name of the model definitions directory inside a package
pub const DEFINITIONS_DIR: &str = "definitions";

/// Name of the profiles directory inside a package
pub const PROFILES_DIR: &str = "profiles";

/// Supported version of the model definition grammar
pub const MODEL_VERS: &str = "2.0";

/// Locus number assigned to out-of-cluster loner hits
pub const LONER_LOCUS: i32 = -1;
