//! # Sysscan Core - Macromolecular System Detection
//!
//! Detection of macromolecular systems (secretion apparatus, pili, ...) in
//! prokaryotic protein datasets, from profile HMM searches and declarative
//! system models.
//!
//! ## Overview
//!
//! A *model* declares component genes with roles (mandatory, accessory,
//! neutral, forbidden), allowed substitutes, spacing constraints between
//! co-localized genes and quorum thresholds. Proteins are scanned with one
//! HMM profile per gene via the external `hmmsearch` binary; this library
//! then answers which set of system occurrences best explains the hits
//! observed on each replicon.
//!
//! ## Pipeline
//!
//! Data flows strictly forward through the stages:
//!
//! 1. **Model catalog** ([`model`]): parsed packages, genes and thresholds,
//!    immutable after load.
//! 2. **Hit stream** ([`hit`], [`search`]): raw HMM reports filtered into a
//!    typed, position-indexed stream.
//! 3. **Clustering** ([`cluster`]): co-localized runs of hits per model and
//!    replicon, with loner and multi-model pools kept aside.
//! 4. **Candidate building** ([`candidate`]): cluster combinations judged
//!    against quorum and forbidden rules, scored from per-hit weights.
//! 5. **Resolution** ([`solution`]): a maximum-score set of compatible
//!    candidates per replicon, under an optional time budget.
//! 6. **Reporting** ([`output`]): projection into the result tables.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sysscan_core::config::Config;
//! use sysscan_core::engine::Sysscan;
//! use sysscan_core::output::write_run;
//!
//! let config = Config::default();
//! // ... fill in database, package and thresholds ...
//! let engine = Sysscan::new(config)?;
//! let results = engine.run("sysscan --db genome.fasta")?;
//! write_run(std::path::Path::new("results"), &results)?;
//! # Ok::<(), sysscan_core::types::SysscanError>(())
//! ```
//!
//! ## Concurrency
//!
//! HMM searches run one (gene, profile) pair per rayon task; replicons are
//! resolved in parallel since they share no mutable state. The catalog, the
//! hit index and the configuration are read-only once built.
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, SysscanError>`](types::SysscanError).
//! Configuration, model and data errors abort the run; candidate rejections
//! are results, not errors, and end up in `rejected_candidates.tsv`.

pub mod candidate;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod hit;
pub mod model;
pub mod output;
pub mod search;
pub mod solution;
pub mod types;

pub use engine::Sysscan;
