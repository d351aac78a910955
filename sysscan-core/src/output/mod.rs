//! Result reporting: projection of [`RunResults`] into the tabular and
//! human-readable output files.
//!
//! The reporter never recomputes scores or reorders hits; it only projects
//! what the engine gathered. Every file starts with `#`-comments listing
//! the tool version, the command line, the model package version and the
//! run's warnings.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::engine::RunResults;
use crate::types::SysscanError;

mod formats {
    pub mod tsv;
    pub mod txt;
}

use formats::tsv::{
    write_all_best_solutions, write_all_systems, write_best_solution,
    write_best_solution_loners, write_best_solution_multisystems, write_rejected_candidates,
};
use formats::txt::{
    write_all_systems_txt, write_best_solution_txt, write_rejected_candidates_txt,
};

/// One of the result files produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    BestSolution,
    BestSolutionTxt,
    AllBestSolutions,
    AllSystems,
    AllSystemsTxt,
    BestSolutionLoners,
    BestSolutionMultisystems,
    RejectedCandidates,
    RejectedCandidatesTxt,
}

impl OutputKind {
    /// Every file of a run, in writing order
    pub const ALL: [Self; 9] = [
        Self::BestSolution,
        Self::BestSolutionTxt,
        Self::AllBestSolutions,
        Self::AllSystems,
        Self::AllSystemsTxt,
        Self::BestSolutionLoners,
        Self::BestSolutionMultisystems,
        Self::RejectedCandidates,
        Self::RejectedCandidatesTxt,
    ];

    /// File name inside the output directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::BestSolution => "best_solution.tsv",
            Self::BestSolutionTxt => "best_solution.txt",
            Self::AllBestSolutions => "all_best_solutions.tsv",
            Self::AllSystems => "all_systems.tsv",
            Self::AllSystemsTxt => "all_systems.txt",
            Self::BestSolutionLoners => "best_solution_loners.tsv",
            Self::BestSolutionMultisystems => "best_solution_multisystems.tsv",
            Self::RejectedCandidates => "rejected_candidates.tsv",
            Self::RejectedCandidatesTxt => "rejected_candidates.txt",
        }
    }
}

/// Write one result file to any writer.
///
/// # Errors
///
/// Returns [`SysscanError`] on I/O failure.
pub fn write_results<W: Write>(
    writer: &mut W,
    results: &RunResults,
    kind: OutputKind,
) -> Result<(), SysscanError> {
    match kind {
        OutputKind::BestSolution => write_best_solution(writer, results),
        OutputKind::BestSolutionTxt => write_best_solution_txt(writer, results),
        OutputKind::AllBestSolutions => write_all_best_solutions(writer, results),
        OutputKind::AllSystems => write_all_systems(writer, results),
        OutputKind::AllSystemsTxt => write_all_systems_txt(writer, results),
        OutputKind::BestSolutionLoners => write_best_solution_loners(writer, results),
        OutputKind::BestSolutionMultisystems => write_best_solution_multisystems(writer, results),
        OutputKind::RejectedCandidates => write_rejected_candidates(writer, results),
        OutputKind::RejectedCandidatesTxt => write_rejected_candidates_txt(writer, results),
    }
}

/// Write every result file into `out_dir`, creating it when needed.
///
/// Returns the written paths in writing order.
pub fn write_run(out_dir: &Path, results: &RunResults) -> Result<Vec<PathBuf>, SysscanError> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(OutputKind::ALL.len());
    for kind in OutputKind::ALL {
        let path = out_dir.join(kind.file_name());
        let mut writer = BufWriter::new(File::create(&path)?);
        write_results(&mut writer, results, kind)?;
        writer.flush()?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::candidate::builder::{assign_ids, loner_warnings};
    use crate::candidate::{build_candidates, CandidateSystem};
    use crate::cluster::build_clusters;
    use crate::config::ScoreOptions;
    use crate::db::RepliconInfo;
    use crate::engine::{RepliconResult, RunResults};
    use crate::hit::tests::{core_hit, model_hit};
    use crate::hit::CoreHit;
    use crate::model::{GeneBank, Model, ModelGene};
    use crate::solution::resolve;
    use crate::types::{GeneStatus, Topology};

    fn toy_model(min_mandatory: usize) -> Model {
        let mut bank = GeneBank::new();
        let gene = |bank: &mut GeneBank, name: &str, status| {
            let core = bank.intern("pkg", name, PathBuf::from(format!("{name}.hmm")));
            ModelGene {
                core,
                name: name.to_string(),
                status,
                loner: false,
                multi_system: false,
                multi_model: false,
                inter_gene_max_space: None,
                exchangeables: Vec::new(),
            }
        };
        Model::new(
            "pkg/toy".to_string(),
            2,
            min_mandatory,
            2,
            4,
            false,
            vec![
                gene(&mut bank, "geneA", GeneStatus::Mandatory),
                gene(&mut bank, "geneB", GeneStatus::Mandatory),
                gene(&mut bank, "geneD", GeneStatus::Accessory),
            ],
        )
    }

    fn replicon() -> RepliconInfo {
        RepliconInfo {
            name: "chr".to_string(),
            topology: Topology::Linear,
            len: 50,
        }
    }

    fn run_results(replicons: Vec<RepliconResult>) -> RunResults {
        RunResults {
            replicons,
            package_name: "pkg".to_string(),
            package_version: "1.2.0".to_string(),
            command_line: "sysscan --db test.fasta --models-dir models --models pkg".to_string(),
        }
    }

    fn replicon_result(hits: &[(&str, usize)], min_mandatory: usize) -> RepliconResult {
        let model = toy_model(min_mandatory);
        let rep = replicon();
        let hits: Vec<Arc<CoreHit>> = hits
            .iter()
            .map(|&(gene, pos)| Arc::new(core_hit(gene, "chr", pos, 50.0)))
            .collect();
        let set = build_clusters(&model, &hits, &rep);
        let mut outcome = build_candidates(&model, &set, &rep, &ScoreOptions::default());
        assign_ids(&mut outcome.candidates, &mut outcome.rejected);
        let warnings = loner_warnings(&outcome.candidates);
        let resolution = resolve(&outcome.candidates, None);
        RepliconResult {
            replicon: rep,
            candidates: outcome.candidates,
            rejected: outcome.rejected,
            resolution,
            warnings,
        }
    }

    pub(crate) fn empty_results() -> RunResults {
        run_results(Vec::new())
    }

    /// One accepted system `chr_toy_1` holding geneA@1 and geneB@3.
    pub(crate) fn results_with_one_system() -> RunResults {
        run_results(vec![replicon_result(&[("geneA", 1), ("geneB", 3)], 2)])
    }

    /// One rejected combination `chr_toy_r1` failing the mandatory quorum.
    pub(crate) fn results_with_rejection() -> RunResults {
        run_results(vec![replicon_result(&[("geneA", 8), ("geneD", 9)], 2)])
    }

    /// Two candidates relying on the same single loner hit.
    pub(crate) fn results_with_loner_warning() -> RunResults {
        let mut loner = model_hit("geneL", "chr", 40, GeneStatus::Mandatory);
        loner.loner = true;
        let candidate = |id: &str, anchor: usize| CandidateSystem {
            id: id.to_string(),
            model_fqn: "pkg/toy".to_string(),
            model_name: "toy".to_string(),
            replicon: "chr".to_string(),
            clusters: Vec::new(),
            out_hits: vec![model_hit("geneA", "chr", anchor, GeneStatus::Mandatory), loner.clone()],
            wholeness: 1.0,
            occ: 1,
            score: 2.0,
        };
        let candidates = vec![candidate("chr_toy_1", 1), candidate("chr_toy_2", 20)];
        let warnings = loner_warnings(&candidates);
        let resolution = resolve(&candidates, None);
        run_results(vec![RepliconResult {
            replicon: replicon(),
            candidates,
            rejected: Vec::new(),
            resolution,
            warnings,
        }])
    }

    #[test]
    fn write_run_produces_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let results = results_with_one_system();
        let written = write_run(dir.path(), &results).unwrap();
        assert_eq!(written.len(), OutputKind::ALL.len());
        for path in &written {
            assert!(path.exists(), "missing {}", path.display());
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.starts_with("# sysscan"));
        }
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let first = {
            let mut buffer = Vec::new();
            write_results(&mut buffer, &results_with_one_system(), OutputKind::BestSolution)
                .unwrap();
            buffer
        };
        let second = {
            let mut buffer = Vec::new();
            write_results(&mut buffer, &results_with_one_system(), OutputKind::BestSolution)
                .unwrap();
            buffer
        };
        assert_eq!(first, second);
    }

    #[test]
    fn every_kind_writes_without_content() {
        let results = empty_results();
        for kind in OutputKind::ALL {
            let mut buffer = Vec::new();
            write_results(&mut buffer, &results, kind).unwrap();
            assert!(!buffer.is_empty(), "empty output for {kind:?}");
        }
    }
}
