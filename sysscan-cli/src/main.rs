//! # Sysscan CLI - Macromolecular System Finder
//!
//! Command-line interface for the sysscan detection pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Detect every model of a package on a gembase dataset
//! sysscan --db proteins.fasta --db-type gembase \
//!         --models-dir ~/models --models TXSS all --out-dir results
//!
//! # Restrict to two definitions, eight workers, 60 s per replicon
//! sysscan --db genome.fasta --db-type ordered_replicon \
//!         --models-dir ~/models --models TXSS T2SS T4P \
//!         --workers 8 --timeout 60 --out-dir results
//!
//! # Validate a model package without running anything
//! sysscan --check ~/models/TXSS
//! ```
//!
//! ## Exit codes
//!
//! - `0` success
//! - `1` user error (bad configuration, unknown model)
//! - `2` data error (malformed model package or HMM report)
//! - `3` runtime error (hmmsearch invocation failed)
//! - `4` the resolution timed out on at least one replicon

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, Command};
use log::{error, info, warn};
use sysscan_core::config::{BaseOptions, Config, ConfigFile};
use sysscan_core::model::ModelPackage;
use sysscan_core::output::write_run;
use sysscan_core::types::{DbType, SysscanError, Topology};
use sysscan_core::Sysscan;

fn cli() -> Command {
    Command::new("sysscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Detection of macromolecular systems in prokaryotic protein datasets")
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("FILE")
                .help("Protein sequence database in FASTA format, optionally gzipped"),
        )
        .arg(
            Arg::new("db-type")
                .long("db-type")
                .value_name("TYPE")
                .help("Database layout: gembase, ordered_replicon or unordered"),
        )
        .arg(
            Arg::new("topology-file")
                .long("topology-file")
                .value_name("FILE")
                .help("Per-replicon topology file (<replicon>\\t<linear|circular>)"),
        )
        .arg(
            Arg::new("circular")
                .long("circular")
                .action(ArgAction::SetTrue)
                .help("Assume circular replicons when the topology file is silent"),
        )
        .arg(
            Arg::new("models-dir")
                .long("models-dir")
                .value_name("DIR")
                .help("Directory containing model packages"),
        )
        .arg(
            Arg::new("models")
                .long("models")
                .value_name("PACKAGE [NAME...]")
                .num_args(1..)
                .help("Model package followed by definition names, or 'all'"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .value_name("DIR")
                .help("Directory receiving the result tables (default: sysscan-results)"),
        )
        .arg(
            Arg::new("cfg-file")
                .long("cfg-file")
                .value_name("FILE")
                .help("YAML configuration file, overridden by command-line options"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('w')
                .value_name("N")
                .help("Size of the worker pool (default: all cores)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-replicon budget for the solution search (default: unbounded)"),
        )
        .arg(
            Arg::new("i-evalue-sel")
                .long("i-evalue-sel")
                .value_name("FLOAT")
                .help("Independent-evalue cutoff for hit selection"),
        )
        .arg(
            Arg::new("coverage-profile")
                .long("coverage-profile")
                .value_name("FLOAT")
                .help("Minimal profile coverage for hit selection"),
        )
        .arg(
            Arg::new("e-value-search")
                .long("e-value-search")
                .value_name("FLOAT")
                .help("E-value passed to hmmsearch when GA thresholds are unused"),
        )
        .arg(
            Arg::new("no-cut-ga")
                .long("no-cut-ga")
                .action(ArgAction::SetTrue)
                .help("Never use profile GA thresholds, always the search e-value"),
        )
        .arg(
            Arg::new("hmmer")
                .long("hmmer")
                .value_name("BINARY")
                .help("Name or path of the hmmsearch executable"),
        )
        .arg(
            Arg::new("previous-run")
                .long("previous-run")
                .action(ArgAction::SetTrue)
                .help("Reuse raw HMM reports found in the working directory"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .value_name("PACKAGE_DIR")
                .help("Validate a model package and exit"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Only log warnings and errors"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Log debug details"),
        )
}

fn init_logger(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn parse_number<T: std::str::FromStr>(
    matches: &clap::ArgMatches,
    name: &str,
) -> Result<Option<T>> {
    match matches.get_one::<String>(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("invalid value '{raw}' for --{name}")),
        None => Ok(None),
    }
}

/// Assemble the configuration: defaults, then the file layer, then flags.
fn build_config(matches: &clap::ArgMatches) -> Result<Config> {
    let mut config = Config::default();
    config.directories.working_dir = PathBuf::from("sysscan-results");

    if let Some(cfg_file) = matches.get_one::<String>("cfg-file") {
        let file = ConfigFile::load(Path::new(cfg_file))?;
        config.merge_file(file);
    }

    if let Some(db) = matches.get_one::<String>("db") {
        let db_type = match matches.get_one::<String>("db-type") {
            Some(raw) => raw.parse::<DbType>().map_err(|msg| anyhow!(msg))?,
            None => config
                .base
                .as_ref()
                .map_or(DbType::OrderedReplicon, |base| base.db_type),
        };
        let previous = config.base.take();
        config.base = Some(BaseOptions {
            sequence_db: PathBuf::from(db),
            db_type,
            topology_file: previous.as_ref().and_then(|base| base.topology_file.clone()),
            default_topology: previous
                .map_or(Topology::Linear, |base| base.default_topology),
        });
    } else if let Some(raw) = matches.get_one::<String>("db-type") {
        let db_type = raw.parse::<DbType>().map_err(|msg| anyhow!(msg))?;
        if let Some(base) = config.base.as_mut() {
            base.db_type = db_type;
        }
    }
    if let Some(base) = config.base.as_mut() {
        if let Some(topology_file) = matches.get_one::<String>("topology-file") {
            base.topology_file = Some(PathBuf::from(topology_file));
        }
        if matches.get_flag("circular") {
            base.default_topology = Topology::Circular;
        }
    }

    if let Some(models_dir) = matches.get_one::<String>("models-dir") {
        config.models.models_dir = PathBuf::from(models_dir);
    }
    if let Some(mut values) = matches.get_many::<String>("models") {
        config.models.package = values
            .next()
            .expect("clap enforces at least one value")
            .clone();
        config.models.names = values
            .filter(|name| name.as_str() != "all")
            .cloned()
            .collect();
    }

    if let Some(out_dir) = matches.get_one::<String>("out-dir") {
        config.directories.working_dir = PathBuf::from(out_dir);
    }
    if let Some(binary) = matches.get_one::<String>("hmmer") {
        config.hmmer.binary = binary.clone();
    }
    if let Some(i_evalue) = parse_number::<f64>(matches, "i-evalue-sel")? {
        config.hmmer.i_evalue_sel = i_evalue;
    }
    if let Some(coverage) = parse_number::<f64>(matches, "coverage-profile")? {
        config.hmmer.coverage_profile = coverage;
    }
    if let Some(e_value) = parse_number::<f64>(matches, "e-value-search")? {
        config.hmmer.e_value_search = e_value;
    }
    if matches.get_flag("no-cut-ga") {
        config.hmmer.cut_ga = false;
    }
    if matches.get_flag("previous-run") {
        config.hmmer.previous_run = true;
    }
    if let Some(workers) = parse_number::<usize>(matches, "workers")? {
        config.general.workers = Some(workers);
    }
    if let Some(seconds) = parse_number::<u64>(matches, "timeout")? {
        config.general.timeout = Some(Duration::from_secs(seconds));
    }
    config.general.quiet = matches.get_flag("quiet");

    Ok(config)
}

/// Validate a model package and print its warnings and errors.
fn check_package(path: &Path) -> i32 {
    let (warnings, errors) = ModelPackage::check(path);
    for warning in &warnings {
        warn!("{warning}");
    }
    for err in &errors {
        error!("{err}");
    }
    if errors.is_empty() {
        info!(
            "package '{}' is consistent ({} warning(s))",
            path.display(),
            warnings.len()
        );
        0
    } else {
        2
    }
}

fn run() -> Result<i32> {
    // a usage error is a user error (exit 1), not clap's default 2
    let matches = cli().try_get_matches().unwrap_or_else(|err| {
        let is_help = matches!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
        );
        let _ = err.print();
        std::process::exit(if is_help { 0 } else { 1 });
    });
    init_logger(matches.get_flag("quiet"), matches.get_flag("verbose"));

    if let Some(package_dir) = matches.get_one::<String>("check") {
        return Ok(check_package(Path::new(package_dir)));
    }

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let config = build_config(&matches)?;
    let out_dir = config.directories.working_dir.clone();

    let engine = Sysscan::new(config).context("invalid configuration")?;
    let results = engine.run(&command_line)?;
    let written = write_run(&out_dir, &results)?;
    info!("{} result file(s) written to '{}'", written.len(), out_dir.display());

    if results.timed_out() {
        warn!("the solution search timed out on at least one replicon");
        return Ok(4);
    }
    Ok(0)
}

/// Map pipeline errors onto the documented exit codes.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SysscanError>() {
        Some(SysscanError::Config(_)) => 1,
        Some(SysscanError::Model { .. } | SysscanError::Parse { .. } | SysscanError::Io(_)) => 2,
        Some(SysscanError::Search { .. }) => 3,
        None => 1,
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}
