//! Sequence database index: replicon names, topologies and protein
//! positions, resolved according to the database layout.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use log::debug;

use crate::config::BaseOptions;
use crate::types::{DbType, SysscanError, Topology};

/// Open a file, transparently decoding gzip when the name ends in `.gz`
pub fn open_compressed(path: &Path) -> Result<Box<dyn Read + Send>, SysscanError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// One replicon of the dataset: an ordered run of proteins 1..=len with a
/// topology.
#[derive(Debug, Clone)]
pub struct RepliconInfo {
    pub name: String,
    pub topology: Topology,
    /// Number of proteins on the replicon
    pub len: usize,
}

/// Where a protein sits in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProteinLocation {
    /// Index into [`SequenceIndex::replicons`]
    pub replicon: usize,
    /// 1-based rank on the replicon
    pub position: usize,
}

/// Index over the FASTA sequence database.
///
/// Built once before the searches start; read-only afterwards.
#[derive(Debug)]
pub struct SequenceIndex {
    db_type: DbType,
    replicons: Vec<RepliconInfo>,
    proteins: HashMap<String, ProteinLocation>,
}

impl SequenceIndex {
    /// Scan the database and build the index.
    ///
    /// For `gembase` layouts the replicon name is the protein-id prefix up
    /// to the last `_`; `ordered_replicon` and `unordered` treat the whole
    /// file as one replicon named after the database file stem. Topologies
    /// come from the topology file, falling back to the configured default;
    /// an unordered database is always handled as linear.
    pub fn build(base: &BaseOptions) -> Result<Self, SysscanError> {
        let topologies = match &base.topology_file {
            Some(path) => parse_topology_file(path)?,
            None => HashMap::new(),
        };
        let db_path = &base.sequence_db;
        let reader = fasta::Reader::new(open_compressed(db_path)?);

        let mut replicons: Vec<RepliconInfo> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut proteins = HashMap::new();

        let single_name = db_path
            .file_stem()
            .map(|stem| {
                let stem = stem.to_string_lossy();
                stem.strip_suffix(".fasta")
                    .or_else(|| stem.strip_suffix(".fa"))
                    .unwrap_or(&stem)
                    .to_string()
            })
            .unwrap_or_else(|| "replicon".to_string());

        for record in reader.records() {
            let record = record.map_err(|err| {
                SysscanError::parse(db_path.display().to_string(), err.to_string())
            })?;
            let id = record.id().to_string();
            let replicon_name = match base.db_type {
                DbType::Gembase => match id.rsplit_once('_') {
                    Some((prefix, _)) => prefix.to_string(),
                    None => {
                        return Err(SysscanError::parse(
                            db_path.display().to_string(),
                            format!("protein id '{id}' does not follow the gembase <replicon>_<n> naming"),
                        ))
                    }
                },
                DbType::OrderedReplicon | DbType::Unordered => single_name.clone(),
            };
            let replicon_index = match by_name.get(&replicon_name) {
                Some(&index) => index,
                None => {
                    let index = replicons.len();
                    let topology = if base.db_type == DbType::Unordered {
                        Topology::Linear
                    } else {
                        topologies
                            .get(&replicon_name)
                            .copied()
                            .unwrap_or(base.default_topology)
                    };
                    replicons.push(RepliconInfo {
                        name: replicon_name.clone(),
                        topology,
                        len: 0,
                    });
                    by_name.insert(replicon_name, index);
                    index
                }
            };
            replicons[replicon_index].len += 1;
            let position = replicons[replicon_index].len;
            if proteins
                .insert(id.clone(), ProteinLocation { replicon: replicon_index, position })
                .is_some()
            {
                return Err(SysscanError::parse(
                    db_path.display().to_string(),
                    format!("duplicate protein id '{id}'"),
                ));
            }
        }
        debug!(
            "indexed {} proteins on {} replicon(s) from '{}'",
            proteins.len(),
            replicons.len(),
            db_path.display()
        );
        Ok(Self {
            db_type: base.db_type,
            replicons,
            proteins,
        })
    }

    #[must_use]
    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    #[must_use]
    pub fn replicons(&self) -> &[RepliconInfo] {
        &self.replicons
    }

    #[must_use]
    pub fn replicon(&self, index: usize) -> &RepliconInfo {
        &self.replicons[index]
    }

    /// Locate a protein by id
    #[must_use]
    pub fn resolve(&self, protein_id: &str) -> Option<ProteinLocation> {
        self.proteins.get(protein_id).copied()
    }

    #[must_use]
    pub fn replicon_by_name(&self, name: &str) -> Option<&RepliconInfo> {
        self.replicons.iter().find(|replicon| replicon.name == name)
    }
}

/// Parse a `<replicon>\t<linear|circular>` topology file.
///
/// Blank lines and `#` comments are skipped.
pub fn parse_topology_file(path: &Path) -> Result<HashMap<String, Topology>, SysscanError> {
    let mut topologies = HashMap::new();
    let reader = BufReader::new(open_compressed(path)?);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (name, topology) = trimmed.split_once('\t').ok_or_else(|| {
            SysscanError::parse(
                path.display().to_string(),
                format!("line {}: expected '<replicon>\\t<topology>'", line_no + 1),
            )
        })?;
        let topology: Topology = topology.trim().parse().map_err(|msg: String| {
            SysscanError::parse(path.display().to_string(), format!("line {}: {msg}", line_no + 1))
        })?;
        topologies.insert(name.trim().to_string(), topology);
    }
    Ok(topologies)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn base_for(db: PathBuf, db_type: DbType, topology_file: Option<PathBuf>) -> BaseOptions {
        BaseOptions {
            sequence_db: db,
            db_type,
            topology_file,
            default_topology: Topology::Linear,
        }
    }

    #[test]
    fn gembase_groups_by_id_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("genome.fasta");
        std::fs::write(
            &db,
            ">VICH001.B_00001 desc\nMA\n>VICH001.B_00002\nMK\n>PLAS01_00001\nML\n",
        )
        .unwrap();
        let index = SequenceIndex::build(&base_for(db, DbType::Gembase, None)).unwrap();
        assert_eq!(index.replicons().len(), 2);
        assert_eq!(index.replicon(0).name, "VICH001.B");
        assert_eq!(index.replicon(0).len, 2);
        let loc = index.resolve("VICH001.B_00002").unwrap();
        assert_eq!(loc.position, 2);
        let loc = index.resolve("PLAS01_00001").unwrap();
        assert_eq!((loc.replicon, loc.position), (1, 1));
    }

    #[test]
    fn ordered_replicon_uses_the_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("chromosome.fasta");
        std::fs::write(&db, ">p1\nMA\n>p2\nMK\n>p3\nML\n").unwrap();
        let index = SequenceIndex::build(&base_for(db, DbType::OrderedReplicon, None)).unwrap();
        assert_eq!(index.replicons().len(), 1);
        assert_eq!(index.replicon(0).name, "chromosome");
        assert_eq!(index.resolve("p3").unwrap().position, 3);
    }

    #[test]
    fn topology_file_marks_circular_replicons() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("genome.fasta");
        std::fs::write(&db, ">CHR_00001\nMA\n>PLAS_00001\nMK\n").unwrap();
        let topo = dir.path().join("topology.txt");
        std::fs::write(&topo, "# comment\nCHR\tcircular\n").unwrap();
        let index =
            SequenceIndex::build(&base_for(db, DbType::Gembase, Some(topo))).unwrap();
        assert_eq!(index.replicon(0).topology, Topology::Circular);
        assert_eq!(index.replicon(1).topology, Topology::Linear);
    }

    #[test]
    fn gzipped_database_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("genome.fasta.gz");
        let file = File::create(&db).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b">p1\nMA\n>p2\nMK\n").unwrap();
        encoder.finish().unwrap();
        let index = SequenceIndex::build(&base_for(db, DbType::OrderedReplicon, None)).unwrap();
        assert_eq!(index.replicon(0).len, 2);
        assert_eq!(index.replicon(0).name, "genome");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("genome.fasta");
        std::fs::write(&db, ">p1\nMA\n>p1\nMK\n").unwrap();
        let err = SequenceIndex::build(&base_for(db, DbType::OrderedReplicon, None)).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn malformed_gembase_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("genome.fasta");
        std::fs::write(&db, ">nounderscore\nMA\n").unwrap();
        let err = SequenceIndex::build(&base_for(db, DbType::Gembase, None)).unwrap_err();
        assert!(err.to_string().contains("gembase"));
    }
}
