//! External hmmsearch driver: one search per (gene, profile), executed on
//! the rayon worker pool, plus the profile-header scan deciding between GA
//! and e-value thresholds.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::Config;
use crate::constants::{HMMER_RESULTS_DIR, RES_SEARCH_SUFFIX};
use crate::db::{open_compressed, SequenceIndex};
use crate::hit::{parse_report, CoreHit, HitFilter};
use crate::model::{CoreGene, GeneBank, GeneKey};
use crate::types::SysscanError;

/// Features read from an HMM profile header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFeatures {
    /// Profile length (`LENG` line)
    pub length: Option<usize>,
    /// The profile advertises GA bit thresholds
    pub ga_threshold: bool,
}

/// Scan a profile header for its `LENG` and `GA` lines.
///
/// The scan stops at the first `STATS LOCAL` line; a malformed GA line is
/// only a warning and disables the GA threshold for this gene.
pub fn profile_features(path: &Path, gene_name: &str) -> Result<ProfileFeatures, SysscanError> {
    let mut features = ProfileFeatures::default();
    let reader = BufReader::new(open_compressed(path)?);
    for line in reader.lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix("LENG") {
            features.length = rest.trim().parse().ok();
        } else if line.starts_with("GA") {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let well_formed = fields.len() == 3
                && fields[1].parse::<f64>().is_ok()
                && fields[2].trim_end_matches(';').parse::<f64>().is_ok();
            if well_formed {
                features.ga_threshold = true;
            } else {
                warn!(
                    "{gene_name}: GA score is not well formatted, expected 'GA float float' \
                     got '{}'; GA threshold will not be used",
                    line.trim_end()
                );
            }
        } else if line.starts_with("STATS LOCAL") {
            break;
        }
    }
    Ok(features)
}

/// Where the raw report of one gene lands.
fn report_path(working_dir: &Path, gene_name: &str) -> PathBuf {
    working_dir
        .join(HMMER_RESULTS_DIR)
        .join(format!("{gene_name}{RES_SEARCH_SUFFIX}"))
}

/// Launch hmmsearch for one gene and return the report path.
fn run_hmmsearch(config: &Config, gene: &CoreGene, output: &Path) -> Result<(), SysscanError> {
    let features = profile_features(&gene.profile, &gene.name)?;
    let mut command = Command::new(&config.hmmer.binary);
    command
        .arg("--cpu")
        .arg("1")
        .arg("--domtblout")
        .arg(output);
    if config.hmmer.cut_ga && features.ga_threshold {
        command.arg("--cut_ga");
    } else {
        if config.hmmer.cut_ga {
            warn!(
                "GA bit thresholds unavailable on profile {}, switching to e-value \
                 threshold (-E {})",
                gene.name, config.hmmer.e_value_search
            );
        }
        command.arg("-E").arg(format!("{}", config.hmmer.e_value_search));
    }
    command
        .arg(&gene.profile)
        .arg(&config.base().sequence_db)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    debug!("{}: {:?}", gene.name, command);
    let result = command.output().map_err(|err| SysscanError::Search {
        gene: gene.name.clone(),
        msg: format!("cannot spawn '{}': {err}", config.hmmer.binary),
    })?;
    if !result.status.success() {
        return Err(SysscanError::Search {
            gene: gene.name.clone(),
            msg: format!(
                "exit status {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            ),
        });
    }
    Ok(())
}

/// Run (or reuse) the HMM searches for every gene and collect the selected
/// hits.
///
/// Unit of work is one (gene, profile) pair, spread over the rayon pool.
/// With `previous_run` set, an existing report short-circuits the search
/// for its gene.
pub fn search_genes(
    config: &Config,
    gene_bank: &GeneBank,
    genes: &[GeneKey],
    index: &SequenceIndex,
) -> Result<Vec<CoreHit>, SysscanError> {
    let hmmer_dir = config.directories.working_dir.join(HMMER_RESULTS_DIR);
    std::fs::create_dir_all(&hmmer_dir)?;

    let filter = HitFilter {
        i_evalue_sel: config.hmmer.i_evalue_sel,
        coverage_profile: config.hmmer.coverage_profile,
    };
    info!("searching {} gene profile(s)", genes.len());

    let per_gene: Vec<Vec<CoreHit>> = genes
        .par_iter()
        .map(|&key| {
            let gene = gene_bank.get(key);
            let output = report_path(&config.directories.working_dir, &gene.name);
            if config.hmmer.previous_run && output.exists() {
                debug!("{}: reusing report '{}'", gene.name, output.display());
            } else {
                run_hmmsearch(config, gene, &output)?;
            }
            parse_report(
                open_compressed(&output)?,
                key,
                &gene.name,
                index,
                &filter,
                &output.display().to_string(),
            )
        })
        .collect::<Result<_, _>>()?;

    Ok(per_gene.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_features_reads_leng_and_ga() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gspD.hmm");
        std::fs::write(
            &path,
            "HMMER3/f [3.1b2]\nNAME  gspD\nLENG  534\nGA    22.00 22.00;\nSTATS LOCAL MSV\n",
        )
        .unwrap();
        let features = profile_features(&path, "gspD").unwrap();
        assert_eq!(features.length, Some(534));
        assert!(features.ga_threshold);
    }

    #[test]
    fn malformed_ga_line_is_only_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gspD.hmm");
        std::fs::write(&path, "NAME  gspD\nLENG  534\nGA    garbage\n").unwrap();
        let features = profile_features(&path, "gspD").unwrap();
        assert_eq!(features.length, Some(534));
        assert!(!features.ga_threshold);
    }

    #[test]
    fn report_path_appends_the_search_suffix() {
        let path = report_path(Path::new("/tmp/run"), "gspD");
        assert_eq!(
            path,
            PathBuf::from("/tmp/run/hmmer_results/gspD.search_hmm.out")
        );
    }
}
