//! Tab-separated result tables. Column order is normative.

use std::io::Write;

use crate::candidate::CandidateSystem;
use crate::constants::{TOOL_NAME, VERSION};
use crate::engine::{RepliconResult, RunResults};
use crate::hit::ModelHit;
use crate::solution::SearchStatus;
use crate::types::SysscanError;

/// Column order shared by every system table.
pub const SYSTEM_COLUMNS: [&str; 22] = [
    "replicon",
    "hit_id",
    "gene_name",
    "hit_pos",
    "model_fqn",
    "sys_id",
    "sys_loci",
    "locus_num",
    "sys_wholeness",
    "sys_score",
    "sys_occ",
    "hit_gene_ref",
    "hit_status",
    "hit_seq_len",
    "hit_i_eval",
    "hit_score",
    "hit_profile_cov",
    "hit_seq_cov",
    "hit_begin_match",
    "hit_end_match",
    "counterpart",
    "used_in",
];

/// `#`-comment preamble: tool version, command line, package version, and
/// the run's warnings.
pub fn write_comments<W: Write>(
    writer: &mut W,
    results: &RunResults,
    with_loner_warnings: bool,
) -> Result<(), SysscanError> {
    writeln!(writer, "# {TOOL_NAME} {VERSION}")?;
    writeln!(writer, "# {}", results.command_line)?;
    writeln!(
        writer,
        "# model package {} {}",
        results.package_name, results.package_version
    )?;
    for result in &results.replicons {
        if result.resolution.status == SearchStatus::Timeout {
            writeln!(
                writer,
                "# WARNING: resolution timed out on replicon '{}'; \
                 reported solutions may be sub-optimal",
                result.replicon.name
            )?;
        }
        if with_loner_warnings {
            for warning in &result.warnings {
                writeln!(
                    writer,
                    "# WARNING Loner: there is only {} occurrence(s) of loner '{}' and {} \
                     potential systems [{}]",
                    warning.occurrences,
                    warning.function,
                    warning.systems.len(),
                    warning.systems.join(", ")
                )?;
            }
        }
    }
    Ok(())
}

fn write_system_header<W: Write>(writer: &mut W, prefix: Option<&str>) -> Result<(), SysscanError> {
    if let Some(prefix) = prefix {
        write!(writer, "{prefix}\t")?;
    }
    writeln!(writer, "{}", SYSTEM_COLUMNS.join("\t"))?;
    Ok(())
}

fn counterpart_label(hit: &ModelHit) -> String {
    hit.counterparts
        .iter()
        .map(|counterpart| counterpart.id.clone())
        .collect::<Vec<_>>()
        .join(",")
}

fn write_hit_row<W: Write>(
    writer: &mut W,
    candidate: &CandidateSystem,
    hit: &ModelHit,
    locus: i32,
    used_in: &str,
) -> Result<(), SysscanError> {
    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.3}\t{:.3}\t{}\t{}\t{}\t{}\t{:.3e}\t{:.3}\t{:.3}\t{:.3}\t{}\t{}\t{}\t{}",
        candidate.replicon,
        hit.hit.id,
        hit.hit.gene_name,
        hit.position(),
        candidate.model_fqn,
        candidate.id,
        candidate.sys_loci(),
        locus,
        candidate.wholeness,
        candidate.score,
        candidate.occ,
        hit.function,
        hit.status,
        hit.hit.seq_length,
        hit.hit.i_evalue,
        hit.hit.score,
        hit.hit.profile_coverage,
        hit.hit.sequence_coverage,
        hit.hit.begin_match,
        hit.hit.end_match,
        counterpart_label(hit),
        used_in,
    )?;
    Ok(())
}

/// Candidates of the rank-1 solution of one replicon, in solution order.
fn best_candidates(result: &RepliconResult) -> Vec<&CandidateSystem> {
    result
        .resolution
        .best()
        .map(|solution| {
            solution
                .systems
                .iter()
                .map(|&index| &result.candidates[index])
                .collect()
        })
        .unwrap_or_default()
}

/// `best_solution.tsv`: every hit of the rank-1 solution per replicon.
pub fn write_best_solution<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    write_system_header(writer, None)?;
    for result in &results.replicons {
        for candidate in best_candidates(result) {
            for (hit, locus) in candidate.hits() {
                write_hit_row(writer, candidate, hit, locus, "")?;
            }
        }
    }
    Ok(())
}

/// `all_best_solutions.tsv`: every tied solution, `sol_id` first.
pub fn write_all_best_solutions<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    write_system_header(writer, Some("sol_id"))?;
    for result in &results.replicons {
        for (rank, solution) in result.resolution.solutions.iter().enumerate() {
            for &index in &solution.systems {
                let candidate = &result.candidates[index];
                for (hit, locus) in candidate.hits() {
                    write!(writer, "{}\t", rank + 1)?;
                    write_hit_row(writer, candidate, hit, locus, "")?;
                }
            }
        }
    }
    Ok(())
}

/// `all_systems.tsv`: every accepted candidate, selected or not.
pub fn write_all_systems<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    write_system_header(writer, None)?;
    for result in &results.replicons {
        for candidate in &result.candidates {
            for (hit, locus) in candidate.hits() {
                write_hit_row(writer, candidate, hit, locus, "")?;
            }
        }
    }
    Ok(())
}

/// Which best-solution systems use the hit at each position.
fn usage_of<'a>(
    result: &'a RepliconResult,
    predicate: impl Fn(&ModelHit) -> bool,
) -> Vec<(&'a CandidateSystem, &'a ModelHit, i32, String)> {
    let best = best_candidates(result);
    let mut rows = Vec::new();
    for candidate in &best {
        for (hit, locus) in candidate.hits() {
            if !predicate(hit) {
                continue;
            }
            let used_in: Vec<&str> = best
                .iter()
                .filter(|other| {
                    other
                        .hits()
                        .any(|(other_hit, _)| other_hit.same_protein(hit))
                })
                .map(|other| other.id.as_str())
                .collect();
            rows.push((*candidate, hit, locus, used_in.join(",")));
        }
    }
    rows
}

/// `best_solution_loners.tsv`: out-of-cluster loner hits of the best
/// solution, with the systems relying on each.
pub fn write_best_solution_loners<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    write_system_header(writer, None)?;
    for result in &results.replicons {
        for (candidate, hit, locus, used_in) in usage_of(result, |hit| hit.loner) {
            write_hit_row(writer, candidate, hit, locus, &used_in)?;
        }
    }
    Ok(())
}

/// `best_solution_multisystems.tsv`: multi-system hits of the best solution.
pub fn write_best_solution_multisystems<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    write_system_header(writer, None)?;
    for result in &results.replicons {
        for (candidate, hit, locus, used_in) in usage_of(result, |hit| hit.multi_system) {
            write_hit_row(writer, candidate, hit, locus, &used_in)?;
        }
    }
    Ok(())
}

/// `rejected_candidates.tsv`: one row per hit of each rejected combination,
/// reasons `/`-separated.
pub fn write_rejected_candidates<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, false)?;
    writeln!(
        writer,
        "candidate_id\treplicon\tmodel_fqn\tcluster_id\thit_id\thit_pos\tgene_name\tfunction\treasons"
    )?;
    for result in &results.replicons {
        for rejection in &result.rejected {
            let reasons = rejection.reasons_label();
            for (hit, locus) in rejection.hits() {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    rejection.id,
                    rejection.replicon,
                    rejection.model_fqn,
                    locus,
                    hit.hit.id,
                    hit.position(),
                    hit.hit.gene_name,
                    hit.function,
                    reasons,
                )?;
            }
        }
    }
    Ok(())
}
