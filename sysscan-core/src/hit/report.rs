//! Parsing of raw HMM search reports (HMMER3 `--domtblout` tables) into
//! selected [`CoreHit`]s.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use log::debug;

use crate::db::SequenceIndex;
use crate::hit::CoreHit;
use crate::model::GeneKey;
use crate::types::SysscanError;

/// Selection thresholds applied while extracting hits from a report.
#[derive(Debug, Clone, Copy)]
pub struct HitFilter {
    pub i_evalue_sel: f64,
    pub coverage_profile: f64,
}

impl HitFilter {
    /// A hit is selected iff its i-evalue and profile coverage both pass
    #[must_use]
    pub fn selects(&self, i_evalue: f64, profile_coverage: f64) -> bool {
        i_evalue <= self.i_evalue_sel && profile_coverage >= self.coverage_profile
    }
}

/// One domain row of a `--domtblout` table; only the fields the pipeline
/// consumes.
#[derive(Debug)]
struct DomainRow {
    target: String,
    target_len: usize,
    query_len: usize,
    i_evalue: f64,
    score: f64,
    hmm_from: usize,
    hmm_to: usize,
    ali_from: usize,
    ali_to: usize,
}

fn parse_row(line: &str, path: &str, line_no: usize) -> Result<DomainRow, SysscanError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 22 {
        return Err(SysscanError::parse(
            path,
            format!("line {line_no}: expected at least 22 columns, got {}", fields.len()),
        ));
    }
    let field = |index: usize| fields[index];
    let number = |index: usize| -> Result<usize, SysscanError> {
        field(index).parse().map_err(|_| {
            SysscanError::parse(
                path,
                format!("line {line_no}: column {} is not an integer", index + 1),
            )
        })
    };
    let float = |index: usize| -> Result<f64, SysscanError> {
        field(index).parse().map_err(|_| {
            SysscanError::parse(
                path,
                format!("line {line_no}: column {} is not a number", index + 1),
            )
        })
    };
    Ok(DomainRow {
        target: field(0).to_string(),
        target_len: number(2)?,
        query_len: number(5)?,
        i_evalue: float(12)?,
        score: float(13)?,
        hmm_from: number(15)?,
        hmm_to: number(16)?,
        ali_from: number(17)?,
        ali_to: number(18)?,
    })
}

/// Extract the selected hits of one gene from its raw report.
///
/// Several domains on one protein collapse to the best-scoring one. Each
/// surviving record is located on its replicon through the sequence index,
/// filtered, and returned sorted by (replicon, position).
///
/// # Errors
///
/// Malformed rows and protein ids absent from the sequence database are
/// data errors naming the report path.
pub fn parse_report<R: Read>(
    reader: R,
    gene: GeneKey,
    gene_name: &str,
    index: &SequenceIndex,
    filter: &HitFilter,
    path: &str,
) -> Result<Vec<CoreHit>, SysscanError> {
    let mut best_rows: HashMap<String, DomainRow> = HashMap::new();
    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row = parse_row(trimmed, path, line_no + 1)?;
        match best_rows.get(&row.target) {
            Some(kept) if kept.score >= row.score => {}
            _ => {
                best_rows.insert(row.target.clone(), row);
            }
        }
    }

    let mut hits = Vec::with_capacity(best_rows.len());
    for row in best_rows.into_values() {
        if row.query_len == 0 || row.target_len == 0 {
            return Err(SysscanError::parse(path, "zero-length profile or target"));
        }
        let profile_coverage = (row.hmm_to - row.hmm_from + 1) as f64 / row.query_len as f64;
        if !filter.selects(row.i_evalue, profile_coverage) {
            continue;
        }
        let location = index.resolve(&row.target).ok_or_else(|| {
            SysscanError::parse(
                path,
                format!("protein '{}' is not in the sequence database", row.target),
            )
        })?;
        hits.push(CoreHit {
            gene,
            gene_name: gene_name.to_string(),
            id: row.target,
            replicon: index.replicon(location.replicon).name.clone(),
            position: location.position,
            seq_length: row.target_len,
            i_evalue: row.i_evalue,
            score: row.score,
            profile_coverage,
            sequence_coverage: (row.ali_to - row.ali_from + 1) as f64 / row.target_len as f64,
            begin_match: row.ali_from,
            end_match: row.ali_to,
        });
    }
    hits.sort_by(|a, b| a.replicon.cmp(&b.replicon).then(a.position.cmp(&b.position)));
    debug!("{gene_name}: {} hit(s) selected from '{path}'", hits.len());
    Ok(hits)
}
