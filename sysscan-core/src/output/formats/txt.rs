//! Human-readable counterparts of the tabular files: one block per system,
//! a blank line between blocks.

use std::io::Write;

use crate::candidate::{CandidateSystem, RejectedCandidate};
use crate::engine::RunResults;
use crate::output::formats::tsv::write_comments;
use crate::types::SysscanError;

fn write_system_block<W: Write>(
    writer: &mut W,
    candidate: &CandidateSystem,
) -> Result<(), SysscanError> {
    writeln!(writer, "system id = {}", candidate.id)?;
    writeln!(writer, "model = {}", candidate.model_fqn)?;
    writeln!(writer, "replicon = {}", candidate.replicon)?;
    writeln!(writer, "loci nb = {}", candidate.sys_loci())?;
    writeln!(writer, "occurrence nb = {}", candidate.occ)?;
    writeln!(writer, "wholeness = {:.3}", candidate.wholeness)?;
    writeln!(writer, "score = {:.3}", candidate.score)?;
    for (hit, locus) in candidate.hits() {
        writeln!(
            writer,
            "  {}\t{}\t{}\t{}\tlocus {}",
            hit.hit.id,
            hit.hit.gene_name,
            hit.position(),
            hit.status,
            locus,
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_rejection_block<W: Write>(
    writer: &mut W,
    rejection: &RejectedCandidate,
) -> Result<(), SysscanError> {
    writeln!(writer, "candidate id = {}", rejection.id)?;
    writeln!(writer, "model = {}", rejection.model_fqn)?;
    writeln!(writer, "replicon = {}", rejection.replicon)?;
    writeln!(writer, "reasons = {}", rejection.reasons_label())?;
    for (hit, locus) in rejection.hits() {
        writeln!(
            writer,
            "  {}\t{}\t{}\tlocus {}",
            hit.hit.id,
            hit.hit.gene_name,
            hit.position(),
            locus,
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

/// `best_solution.txt`: the rank-1 solution, grouped by system.
pub fn write_best_solution_txt<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    writeln!(writer)?;
    for result in &results.replicons {
        if let Some(solution) = result.resolution.best() {
            for &index in &solution.systems {
                write_system_block(writer, &result.candidates[index])?;
            }
        }
    }
    Ok(())
}

/// `all_systems.txt`: every accepted candidate, grouped by system.
pub fn write_all_systems_txt<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, true)?;
    writeln!(writer)?;
    for result in &results.replicons {
        for candidate in &result.candidates {
            write_system_block(writer, candidate)?;
        }
    }
    Ok(())
}

/// `rejected_candidates.txt`: every rejected combination with its reasons.
pub fn write_rejected_candidates_txt<W: Write>(
    writer: &mut W,
    results: &RunResults,
) -> Result<(), SysscanError> {
    write_comments(writer, results, false)?;
    writeln!(writer)?;
    for result in &results.replicons {
        for rejection in &result.rejected {
            write_rejection_block(writer, rejection)?;
        }
    }
    Ok(())
}
