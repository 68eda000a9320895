//! Validation of gene model tables.

use std::{collections::BTreeSet, io::Write, path::PathBuf};

use thousands::Separable;

use super::{
    index::GeneModelsIndex,
    load::{load_gene_models, GeneModelsFormat},
};

/// Command line arguments for `models check` sub command.
#[derive(clap::Parser, Debug)]
#[command(about = "Load and validate gene models", long_about = None)]
pub struct Args {
    /// Path to the gene models table, may be gzip compressed.
    #[arg(long)]
    pub path_gene_models: PathBuf,
    /// Layout of the gene models table.
    #[arg(long, value_enum, default_value_t = GeneModelsFormat::Default)]
    pub gene_models_format: GeneModelsFormat,
}

/// Summary of a loaded gene model index.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    pub transcripts: usize,
    pub coding_transcripts: usize,
    pub genes: usize,
    /// Number of transcripts per chromosome, in index order.
    pub chromosomes: indexmap::IndexMap<String, usize>,
    /// Messages of all rejected rows and models.
    pub rejected: Vec<String>,
}

impl Report {
    pub fn new(index: &GeneModelsIndex) -> Self {
        let mut chromosomes = indexmap::IndexMap::new();
        let mut genes = BTreeSet::new();
        let mut coding_transcripts = 0;
        for tx in index.transcripts() {
            *chromosomes.entry(tx.chromosome().to_string()).or_insert(0) += 1;
            genes.insert(tx.gene());
            if tx.is_coding() {
                coding_transcripts += 1;
            }
        }

        Self {
            transcripts: index.len(),
            coding_transcripts,
            genes: genes.len(),
            chromosomes,
            rejected: index.rejected().iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Run the check and write the report as YAML to `out`.
pub fn run_with_write<W: Write>(
    _common: &crate::common::Args,
    args: &Args,
    out: &mut W,
) -> Result<(), anyhow::Error> {
    let index = load_gene_models(&args.path_gene_models, args.gene_models_format).map_err(|e| {
        anyhow::anyhow!(
            "could not load gene models {:?}: {}",
            &args.path_gene_models,
            e
        )
    })?;
    let report = Report::new(&index);

    tracing::info!(
        "{} transcripts ({} coding) of {} genes on {} chromosomes",
        report.transcripts.separate_with_commas(),
        report.coding_transcripts.separate_with_commas(),
        report.genes.separate_with_commas(),
        report.chromosomes.len()
    );
    for message in &report.rejected {
        tracing::warn!("  rejected: {}", message);
    }

    serde_yaml::to_writer(&mut *out, &report)?;
    Ok(())
}

/// Main entry point for `models check` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args = {:#?}", &args);
    let mut stdout = std::io::stdout();
    run_with_write(common, args, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
