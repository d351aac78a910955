//! Model package: a directory carrying `metadata.yml`, `definitions/*.xml`
//! and `profiles/*.hmm`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::config::ModelOverride;
use crate::constants::{DEFINITIONS_DIR, PROFILES_DIR, PROFILE_SUFFIX};
use crate::model::definition::parse_definition;
use crate::model::gene::GeneBank;
use crate::model::ModelBank;
use crate::types::SysscanError;

/// Package metadata parsed from `metadata.yml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub maintainer: Maintainer,
    pub short_desc: String,
    pub vers: String,
    #[serde(default)]
    pub cite: Option<Vec<String>>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Maintainer {
    pub name: String,
    pub email: String,
}

/// Location of one model definition inside a package.
#[derive(Debug, Clone)]
pub struct DefinitionEntry {
    /// Fully-qualified name derived from the path below `definitions/`
    pub fqn: String,
    pub path: PathBuf,
}

/// An opened model package.
#[derive(Debug)]
pub struct ModelPackage {
    pub root: PathBuf,
    pub name: String,
    pub metadata: Metadata,
    profiles: HashMap<String, PathBuf>,
    definitions: Vec<DefinitionEntry>,
}

impl ModelPackage {
    /// Open a package directory, reading metadata and scanning the
    /// definition and profile trees.
    ///
    /// # Errors
    ///
    /// A missing or unparseable `metadata.yml`, or a missing
    /// `definitions/` or `profiles/` directory, is a model error.
    pub fn open(path: &Path) -> Result<Self, SysscanError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SysscanError::model(path.display().to_string(), "not a directory"))?;

        let metadata_path = path.join("metadata.yml");
        let metadata_raw = std::fs::read_to_string(&metadata_path).map_err(|_| {
            SysscanError::model(path.display().to_string(), "missing metadata.yml")
        })?;
        let metadata: Metadata = serde_yaml::from_str(&metadata_raw).map_err(|err| {
            SysscanError::parse(metadata_path.display().to_string(), err.to_string())
        })?;

        let profiles_dir = path.join(PROFILES_DIR);
        if !profiles_dir.is_dir() {
            return Err(SysscanError::model(
                path.display().to_string(),
                format!("missing '{PROFILES_DIR}' directory"),
            ));
        }
        let profiles = scan_profiles(&profiles_dir)?;

        let definitions_dir = path.join(DEFINITIONS_DIR);
        if !definitions_dir.is_dir() {
            return Err(SysscanError::model(
                path.display().to_string(),
                format!("missing '{DEFINITIONS_DIR}' directory"),
            ));
        }
        let mut definitions = Vec::new();
        scan_definitions(&definitions_dir, &name, &mut definitions)?;
        definitions.sort_by(|a, b| a.fqn.cmp(&b.fqn));

        Ok(Self {
            root: path.to_path_buf(),
            name,
            metadata,
            profiles,
            definitions,
        })
    }

    /// Path of the HMM profile for a gene, if the package ships one
    #[must_use]
    pub fn profile(&self, gene_name: &str) -> Option<&PathBuf> {
        self.profiles.get(gene_name)
    }

    #[must_use]
    pub fn definitions(&self) -> &[DefinitionEntry] {
        &self.definitions
    }

    /// Load every definition into a [`ModelBank`], interning genes in the
    /// `gene_bank` and applying `models_opt` overrides by fqn.
    pub fn load_models(
        &self,
        overrides: &BTreeMap<String, ModelOverride>,
        gene_bank: &mut GeneBank,
    ) -> Result<ModelBank, SysscanError> {
        let mut bank = ModelBank::new();
        for entry in &self.definitions {
            let model = parse_definition(
                &entry.path,
                &entry.fqn,
                self,
                gene_bank,
                overrides.get(&entry.fqn),
            )?;
            bank.add(model)?;
        }
        Ok(bank)
    }

    /// Validate a package directory without committing to a run.
    ///
    /// Returns `(warnings, errors)`: errors follow the fatal model-error
    /// taxonomy; warnings flag suspicious but workable content such as
    /// profiles no definition references.
    pub fn check(path: &Path) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let package = match Self::open(path) {
            Ok(package) => package,
            Err(err) => {
                errors.push(err.to_string());
                return (warnings, errors);
            }
        };
        if package.metadata.license.is_none() {
            warnings.push("metadata.yml: no license field".to_string());
        }
        if package.definitions.is_empty() {
            errors.push(format!("{}: package declares no definition", package.name));
        }

        let mut gene_bank = GeneBank::new();
        let mut referenced = std::collections::HashSet::new();
        for entry in &package.definitions {
            match parse_definition(&entry.path, &entry.fqn, &package, &mut gene_bank, None) {
                Ok(model) => {
                    for gene in model.genes() {
                        referenced.insert(gene.name.clone());
                        for exchangeable in &gene.exchangeables {
                            referenced.insert(exchangeable.name.clone());
                        }
                    }
                }
                Err(err) => errors.push(err.to_string()),
            }
        }
        for profile_name in package.profiles.keys() {
            if !referenced.contains(profile_name) {
                warnings.push(format!(
                    "profile '{profile_name}' is not referenced by any definition"
                ));
            }
        }
        (warnings, errors)
    }
}

fn scan_profiles(dir: &Path) -> Result<HashMap<String, PathBuf>, SysscanError> {
    let mut profiles = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        let stem = file_name
            .strip_suffix(".gz")
            .unwrap_or(&file_name)
            .strip_suffix(PROFILE_SUFFIX)
            .map(str::to_string);
        match stem {
            Some(stem) => {
                profiles.insert(stem, path);
            }
            None => warn!("ignoring non-profile file '{}'", path.display()),
        }
    }
    Ok(profiles)
}

fn scan_definitions(
    dir: &Path,
    fqn_prefix: &str,
    out: &mut Vec<DefinitionEntry>,
) -> Result<(), SysscanError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let file_name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
        if path.is_dir() {
            scan_definitions(&path, &format!("{fqn_prefix}/{file_name}"), out)?;
        } else if let Some(stem) = file_name.strip_suffix(".xml") {
            out.push(DefinitionEntry {
                fqn: format!("{fqn_prefix}/{stem}"),
                path,
            });
        }
    }
    Ok(())
}
