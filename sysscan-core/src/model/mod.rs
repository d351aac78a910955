//! Model catalog: parsed macromolecular system models, their genes and the
//! package they come from.
//!
//! The catalog is immutable once loaded. [`GeneBank`] interns one
//! [`gene::CoreGene`] per (family, name); models reference genes through
//! [`gene::GeneKey`] indices, so no reference cycles exist even though
//! exchangeables point back at model genes.

use std::collections::HashMap;

use crate::types::{GeneStatus, SysscanError};

pub mod definition;
pub mod gene;
pub mod package;

pub use gene::{Binding, CoreGene, Exchangeable, GeneBank, GeneKey, ModelGene};
pub use package::{Metadata, ModelPackage};

/// A macromolecular system model: component genes with roles, spacing
/// constraints and quorum thresholds.
///
/// Invariant (checked at load time):
/// `min_mandatory_genes_required <= min_genes_required <= mandatory + accessory`.
#[derive(Debug, Clone)]
pub struct Model {
    /// Fully-qualified name, e.g. `TXSS/bacterial/T2SS`
    pub fqn: String,
    /// Last segment of the fqn
    pub name: String,
    /// First segment of the fqn (the package family)
    pub family: String,
    /// Default maximal number of genes between two co-localized components
    pub inter_gene_max_space: usize,
    pub min_mandatory_genes_required: usize,
    pub min_genes_required: usize,
    /// Upper bound on the hits of one occurrence, guards pathological inputs
    pub max_nb_genes: usize,
    /// Occurrences may span several clusters
    pub multi_loci: bool,
    genes: Vec<ModelGene>,
}

impl Model {
    pub(crate) fn new(
        fqn: String,
        inter_gene_max_space: usize,
        min_mandatory_genes_required: usize,
        min_genes_required: usize,
        max_nb_genes: usize,
        multi_loci: bool,
        genes: Vec<ModelGene>,
    ) -> Self {
        let mut segments = fqn.split('/');
        let family = segments.next().unwrap_or_default().to_string();
        let name = fqn.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            fqn,
            name,
            family,
            inter_gene_max_space,
            min_mandatory_genes_required,
            min_genes_required,
            max_nb_genes,
            multi_loci,
            genes,
        }
    }

    #[must_use]
    pub fn genes(&self) -> &[ModelGene] {
        &self.genes
    }

    pub fn genes_with_status(&self, status: GeneStatus) -> impl Iterator<Item = &ModelGene> {
        self.genes.iter().filter(move |g| g.status == status)
    }

    /// Number of distinct mandatory plus accessory genes
    #[must_use]
    pub fn required_gene_count(&self) -> usize {
        self.genes
            .iter()
            .filter(|g| matches!(g.status, GeneStatus::Mandatory | GeneStatus::Accessory))
            .count()
    }

    #[must_use]
    pub fn gene(&self, name: &str) -> Option<&ModelGene> {
        self.genes.iter().find(|g| g.name == name)
    }

    /// Resolve a detected core gene name against this model.
    ///
    /// The gene may match a model gene directly or stand in for one as an
    /// exchangeable; the returned [`Binding`] carries the fulfilled function
    /// and the effective flags. `None` when the gene plays no role here.
    #[must_use]
    pub fn resolve(&self, core_gene_name: &str) -> Option<Binding> {
        for model_gene in &self.genes {
            if model_gene.name == core_gene_name {
                return Some(Binding {
                    function: model_gene.name.clone(),
                    gene_name: model_gene.name.clone(),
                    status: model_gene.status,
                    loner: model_gene.loner,
                    multi_system: model_gene.multi_system,
                    multi_model: model_gene.multi_model,
                    inter_gene_max_space: model_gene.inter_gene_max_space,
                    via_exchangeable: false,
                });
            }
            for exchangeable in &model_gene.exchangeables {
                if exchangeable.name == core_gene_name {
                    return Some(Binding {
                        function: model_gene.name.clone(),
                        gene_name: exchangeable.name.clone(),
                        status: model_gene.status,
                        loner: exchangeable.loner,
                        multi_system: exchangeable.multi_system,
                        multi_model: exchangeable.multi_model,
                        inter_gene_max_space: exchangeable.inter_gene_max_space,
                        via_exchangeable: true,
                    });
                }
            }
        }
        None
    }
}

/// Ordered, indexed store of loaded models.
#[derive(Debug, Default)]
pub struct ModelBank {
    models: Vec<Model>,
    by_fqn: HashMap<String, usize>,
}

impl ModelBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model.
    ///
    /// # Errors
    ///
    /// A second model with the same fqn is a load error.
    pub fn add(&mut self, model: Model) -> Result<(), SysscanError> {
        if self.by_fqn.contains_key(&model.fqn) {
            return Err(SysscanError::model(
                model.fqn.clone(),
                "a model with this name is already registered",
            ));
        }
        self.by_fqn.insert(model.fqn.clone(), self.models.len());
        self.models.push(model);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, fqn: &str) -> Option<&Model> {
        self.by_fqn.get(fqn).map(|&i| &self.models[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models matching the selector, in registration order.
    ///
    /// An empty selector means every model. Names may be fully qualified or
    /// bare definition names.
    ///
    /// # Errors
    ///
    /// An unknown name in the selector is a configuration error.
    pub fn models_to_detect(&self, names: &[String]) -> Result<Vec<&Model>, SysscanError> {
        if names.is_empty() {
            return Ok(self.models.iter().collect());
        }
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let model = self.get(name).or_else(|| {
                self.models
                    .iter()
                    .find(|m| m.name == *name || m.fqn.ends_with(&format!("/{name}")))
            });
            match model {
                Some(model) => selected.push(model),
                None => {
                    return Err(SysscanError::Config(format!(
                        "unknown model '{name}' in selection"
                    )))
                }
            }
        }
        Ok(selected)
    }
}
