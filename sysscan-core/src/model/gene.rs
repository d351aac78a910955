use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::GeneStatus;

/// Stable index of a [`CoreGene`] inside the [`GeneBank`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneKey(pub(crate) usize);

/// A gene identified by (package family, name), owning its HMM profile path.
///
/// Exactly one instance exists per (family, name) for the whole run; every
/// model gene refers to it through a [`GeneKey`].
#[derive(Debug, Clone)]
pub struct CoreGene {
    pub family: String,
    pub name: String,
    pub profile: PathBuf,
}

/// Interning arena for [`CoreGene`]s.
///
/// Populated once while the model catalog loads; read-only afterwards, so
/// concurrent readers need no synchronisation.
#[derive(Debug, Default)]
pub struct GeneBank {
    genes: Vec<CoreGene>,
    index: HashMap<(String, String), GeneKey>,
}

impl GeneBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a gene, returning the existing key when (family, name) is
    /// already known.
    pub fn intern(&mut self, family: &str, name: &str, profile: PathBuf) -> GeneKey {
        let index_key = (family.to_string(), name.to_string());
        if let Some(&key) = self.index.get(&index_key) {
            return key;
        }
        let key = GeneKey(self.genes.len());
        self.genes.push(CoreGene {
            family: family.to_string(),
            name: name.to_string(),
            profile,
        });
        self.index.insert(index_key, key);
        key
    }

    #[must_use]
    pub fn get(&self, key: GeneKey) -> &CoreGene {
        &self.genes[key.0]
    }

    #[must_use]
    pub fn lookup(&self, family: &str, name: &str) -> Option<GeneKey> {
        self.index
            .get(&(family.to_string(), name.to_string()))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeneKey, &CoreGene)> {
        self.genes
            .iter()
            .enumerate()
            .map(|(i, gene)| (GeneKey(i), gene))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// A gene that may substitute for another one in a specific model.
///
/// Exchangeables are one level deep; they cannot carry exchangeables of
/// their own, so reference cycles cannot be expressed.
#[derive(Debug, Clone)]
pub struct Exchangeable {
    pub core: GeneKey,
    pub name: String,
    pub loner: bool,
    pub multi_system: bool,
    pub multi_model: bool,
    pub inter_gene_max_space: Option<usize>,
}

/// A [`CoreGene`] as used by one model: role, co-localization behaviour and
/// allowed substitutes.
#[derive(Debug, Clone)]
pub struct ModelGene {
    pub core: GeneKey,
    pub name: String,
    pub status: GeneStatus,
    /// The gene need not cluster with the rest of the system
    pub loner: bool,
    /// One hit may serve several occurrences of the same model
    pub multi_system: bool,
    /// One hit may serve occurrences of different models
    pub multi_model: bool,
    /// Per-gene spacing override; `None` inherits the model default
    pub inter_gene_max_space: Option<usize>,
    pub exchangeables: Vec<Exchangeable>,
}

/// How a detected core gene maps onto a model: the function it fulfils and
/// the effective flags, resolved through exchangeables when needed.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Name of the reference model gene (the *function*)
    pub function: String,
    /// Name of the core gene that actually matched
    pub gene_name: String,
    pub status: GeneStatus,
    pub loner: bool,
    pub multi_system: bool,
    pub multi_model: bool,
    pub inter_gene_max_space: Option<usize>,
    pub via_exchangeable: bool,
}
