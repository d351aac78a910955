//! Parsing of model definition XML files into [`Model`] values.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::ModelOverride;
use crate::constants::MODEL_VERS;
use crate::model::gene::{Exchangeable, GeneBank, ModelGene};
use crate::model::package::ModelPackage;
use crate::model::Model;
use crate::types::{GeneStatus, SysscanError};

#[derive(Debug, Deserialize)]
struct XmlModel {
    #[serde(rename = "@vers")]
    vers: String,
    #[serde(rename = "@inter_gene_max_space")]
    inter_gene_max_space: usize,
    #[serde(rename = "@min_mandatory_genes_required")]
    min_mandatory_genes_required: Option<usize>,
    #[serde(rename = "@min_genes_required")]
    min_genes_required: Option<usize>,
    #[serde(rename = "@max_nb_genes")]
    max_nb_genes: Option<usize>,
    #[serde(rename = "@multi_loci")]
    multi_loci: Option<bool>,
    #[serde(rename = "gene", default)]
    genes: Vec<XmlGene>,
}

#[derive(Debug, Deserialize)]
struct XmlGene {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@presence")]
    presence: String,
    #[serde(rename = "@loner")]
    loner: Option<bool>,
    #[serde(rename = "@multi_system")]
    multi_system: Option<bool>,
    #[serde(rename = "@multi_model")]
    multi_model: Option<bool>,
    #[serde(rename = "@inter_gene_max_space")]
    inter_gene_max_space: Option<usize>,
    exchangeables: Option<XmlExchangeables>,
}

#[derive(Debug, Deserialize)]
struct XmlExchangeables {
    #[serde(rename = "gene", default)]
    genes: Vec<XmlGeneRef>,
}

/// A gene reference inside `<exchangeables>`; attributes default to the
/// values of the gene it substitutes.
#[derive(Debug, Deserialize)]
struct XmlGeneRef {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@loner")]
    loner: Option<bool>,
    #[serde(rename = "@multi_system")]
    multi_system: Option<bool>,
    #[serde(rename = "@multi_model")]
    multi_model: Option<bool>,
    #[serde(rename = "@inter_gene_max_space")]
    inter_gene_max_space: Option<usize>,
}

/// Parse one definition file and assemble the [`Model`].
///
/// Genes are interned in the `gene_bank`; their profiles must exist in the
/// `package`. Thresholds left out of the XML take the usual defaults
/// (quorums default to the mandatory count, `max_nb_genes` to mandatory
/// plus accessory) before `models_opt` overrides apply.
///
/// # Errors
///
/// Unparseable XML, an unsupported grammar version, a duplicate or
/// profile-less gene, or a violated quorum invariant are fatal model
/// errors naming the originating file.
pub fn parse_definition(
    path: &Path,
    fqn: &str,
    package: &ModelPackage,
    gene_bank: &mut GeneBank,
    overrides: Option<&ModelOverride>,
) -> Result<Model, SysscanError> {
    let location = path.display().to_string();
    let content = std::fs::read_to_string(path)?;
    let xml: XmlModel = quick_xml::de::from_str(&content)
        .map_err(|err| SysscanError::model(&location, format!("malformed definition: {err}")))?;

    if xml.vers != MODEL_VERS {
        return Err(SysscanError::model(
            &location,
            format!("unsupported grammar version '{}', expected '{MODEL_VERS}'", xml.vers),
        ));
    }
    if xml.genes.is_empty() {
        return Err(SysscanError::model(&location, "definition declares no gene"));
    }

    let family = fqn.split('/').next().unwrap_or_default().to_string();
    let mut seen = HashSet::new();
    let mut genes = Vec::with_capacity(xml.genes.len());
    for xml_gene in &xml.genes {
        if !seen.insert(xml_gene.name.clone()) {
            return Err(SysscanError::model(
                &location,
                format!("gene '{}' is declared twice", xml_gene.name),
            ));
        }
        let status: GeneStatus = xml_gene
            .presence
            .parse()
            .map_err(|msg: String| SysscanError::model(&location, msg))?;
        let core = intern_checked(gene_bank, package, &family, &xml_gene.name, &location)?;

        let mut exchangeables = Vec::new();
        if let Some(xml_exchangeables) = &xml_gene.exchangeables {
            for gene_ref in &xml_exchangeables.genes {
                if !seen.insert(gene_ref.name.clone()) {
                    return Err(SysscanError::model(
                        &location,
                        format!("gene '{}' is declared twice", gene_ref.name),
                    ));
                }
                let ex_core =
                    intern_checked(gene_bank, package, &family, &gene_ref.name, &location)?;
                exchangeables.push(Exchangeable {
                    core: ex_core,
                    name: gene_ref.name.clone(),
                    loner: gene_ref.loner.or(xml_gene.loner).unwrap_or(false),
                    multi_system: gene_ref
                        .multi_system
                        .or(xml_gene.multi_system)
                        .unwrap_or(false),
                    multi_model: gene_ref.multi_model.or(xml_gene.multi_model).unwrap_or(false),
                    inter_gene_max_space: gene_ref
                        .inter_gene_max_space
                        .or(xml_gene.inter_gene_max_space),
                });
            }
        }

        genes.push(ModelGene {
            core,
            name: xml_gene.name.clone(),
            status,
            loner: xml_gene.loner.unwrap_or(false),
            multi_system: xml_gene.multi_system.unwrap_or(false),
            multi_model: xml_gene.multi_model.unwrap_or(false),
            inter_gene_max_space: xml_gene.inter_gene_max_space,
            exchangeables,
        });
    }

    let mandatory = genes
        .iter()
        .filter(|g| g.status == GeneStatus::Mandatory)
        .count();
    let accessory = genes
        .iter()
        .filter(|g| g.status == GeneStatus::Accessory)
        .count();

    let fallback = ModelOverride::default();
    let over = overrides.unwrap_or(&fallback);
    let inter_gene_max_space = over.inter_gene_max_space.unwrap_or(xml.inter_gene_max_space);
    let min_mandatory = over
        .min_mandatory_genes_required
        .or(xml.min_mandatory_genes_required)
        .unwrap_or(mandatory);
    let min_genes = over
        .min_genes_required
        .or(xml.min_genes_required)
        .unwrap_or(mandatory);
    let max_nb_genes = over
        .max_nb_genes
        .or(xml.max_nb_genes)
        .unwrap_or(mandatory + accessory);
    let multi_loci = over.multi_loci.or(xml.multi_loci).unwrap_or(false);

    if min_mandatory > min_genes {
        return Err(SysscanError::model(
            &location,
            format!(
                "min_genes_required ({min_genes}) must be greater or equal than \
                 min_mandatory_genes_required ({min_mandatory})"
            ),
        ));
    }
    if min_genes > mandatory + accessory {
        return Err(SysscanError::model(
            &location,
            format!(
                "min_genes_required ({min_genes}) exceeds the {} mandatory and accessory genes",
                mandatory + accessory
            ),
        ));
    }

    Ok(Model::new(
        fqn.to_string(),
        inter_gene_max_space,
        min_mandatory,
        min_genes,
        max_nb_genes,
        multi_loci,
        genes,
    ))
}

fn intern_checked(
    gene_bank: &mut GeneBank,
    package: &ModelPackage,
    family: &str,
    gene_name: &str,
    location: &str,
) -> Result<crate::model::gene::GeneKey, SysscanError> {
    let profile = package.profile(gene_name).ok_or_else(|| {
        SysscanError::model(
            location,
            format!("'{}/{gene_name}': no such profile", package.name),
        )
    })?;
    Ok(gene_bank.intern(family, gene_name, profile.to_path_buf()))
}
