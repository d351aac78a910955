use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Role a gene plays inside a model.
///
/// The role drives quorum accounting and scoring: `Mandatory` and
/// `Accessory` genes count toward the quorums, `Neutral` genes may sit in
/// clusters but weigh nothing, and a `Forbidden` gene rejects every
/// candidate it co-locates with. Forbidden genes are still searched for:
/// the role forbids inclusion in an occurrence, not detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneStatus {
    Mandatory,
    Accessory,
    Neutral,
    Forbidden,
}

impl GeneStatus {
    /// Lowercase name used in model definitions and output tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Accessory => "accessory",
            Self::Neutral => "neutral",
            Self::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for GeneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mandatory" => Ok(Self::Mandatory),
            "accessory" => Ok(Self::Accessory),
            "neutral" => Ok(Self::Neutral),
            "forbidden" => Ok(Self::Forbidden),
            other => Err(format!("unknown gene presence '{other}'")),
        }
    }
}

/// Shape of a replicon.
///
/// Positions on a circular replicon wrap when computing inter-gene
/// distances; the position order itself stays linear 1..=N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "circular" => Ok(Self::Circular),
            other => Err(format!("unknown topology '{other}'")),
        }
    }
}

/// Layout of the sequence database.
///
/// - `Gembase`: replicon names are the protein-id prefix up to the last `_`
/// - `OrderedReplicon`: one replicon, positions are FASTA ranks
/// - `Unordered`: positions carry no co-localization meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbType {
    Gembase,
    OrderedReplicon,
    Unordered,
}

impl FromStr for DbType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gembase" => Ok(Self::Gembase),
            "ordered_replicon" => Ok(Self::OrderedReplicon),
            "unordered" => Ok(Self::Unordered),
            other => Err(format!("unknown db_type '{other}'")),
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gembase => "gembase",
            Self::OrderedReplicon => "ordered_replicon",
            Self::Unordered => "unordered",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading inputs or running the detection pipeline.
///
/// The CLI maps the variants onto exit codes: configuration problems are
/// user errors (1), malformed packages or reports are data errors (2) and
/// failed external searches are runtime errors (3). Candidate rejections
/// are *not* errors; they travel through the result tables.
#[derive(Error, Debug)]
pub enum SysscanError {
    /// Invalid or inconsistent configuration, detected before any work starts
    #[error("configuration error: {0}")]
    Config(String),
    /// Model package or definition cannot be loaded
    #[error("model error in '{location}': {msg}")]
    Model { location: String, msg: String },
    /// File I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed input data (HMM report, FASTA database, metadata, topology file)
    #[error("parse error in '{path}': {msg}")]
    Parse { path: String, msg: String },
    /// External hmmsearch invocation failed
    #[error("hmmsearch failed for gene '{gene}': {msg}")]
    Search { gene: String, msg: String },
}

impl SysscanError {
    /// Build a model error from its originating file or element
    pub fn model(location: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Model {
            location: location.into(),
            msg: msg.into(),
        }
    }

    /// Build a parse error carrying the offending path
    pub fn parse(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            msg: msg.into(),
        }
    }
}
