//! Annotation of variants with their effects on transcripts.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use thousands::Separable;

use crate::{
    common::{io::std::open_read_maybe_gz, io::std::open_write_maybe_gz, GenomeRelease},
    models::load::{load_gene_models, GeneModelsFormat},
};

use self::{
    aggregate::EffectAggregator,
    config::EngineConfig,
    effect::{Effect, EffectKind},
    reference::{InMemoryGenome, SequenceAccessor},
    variant::VariantDescriptor,
};

pub mod aggregate;
pub mod codon;
pub mod config;
pub mod csq;
pub mod effect;
pub mod mapper;
pub mod reference;
pub mod variant;

/// Number of variants annotated in parallel at a time.
const CHUNK_SIZE: usize = 10_000;

/// Output file formats.
#[derive(
    clap::ValueEnum,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Default,
    parse_display::Display,
    parse_display::FromStr,
)]
#[display(style = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated with compact effect strings.
    #[default]
    Tsv,
    /// One JSON object per line with all per-transcript records.
    Jsonl,
}

/// Command line arguments for `annotate variants` sub command.
#[derive(clap::Parser, Debug)]
#[command(about = "Annotate variants with their effects on transcripts", long_about = None)]
pub struct Args {
    /// Path to the reference genome FASTA file, may be gzip compressed.
    #[arg(long)]
    pub path_genome: PathBuf,
    /// Path to the gene models table, may be gzip compressed.
    #[arg(long)]
    pub path_gene_models: PathBuf,
    /// Layout of the gene models table.
    #[arg(long, value_enum, default_value_t = GeneModelsFormat::Default)]
    pub gene_models_format: GeneModelsFormat,
    /// Genome release whose engine preset to use.
    #[arg(long, value_enum, default_value_t = GenomeRelease::Grch37)]
    pub genome_release: GenomeRelease,
    /// Path to a YAML engine configuration, overrides `--genome-release`.
    #[arg(long)]
    pub path_config: Option<PathBuf>,

    /// Path to the input TSV file with columns `chrom pos ref alt` or `location variant`.
    #[arg(long)]
    pub path_input_tsv: PathBuf,
    /// Path to the output file.
    #[arg(long)]
    pub path_output_tsv: PathBuf,
    /// Format of the output file.
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub output_format: OutputFormat,

    /// Shift indels to their leftmost position before annotation.
    #[arg(long, default_value_t = false)]
    pub left_normalize: bool,
    /// For debug purposes, maximal number of variants to annotate.
    #[arg(long)]
    pub max_var_count: Option<usize>,
}

/// Input row in allele form.
#[derive(Debug, serde::Deserialize)]
struct AlleleRow {
    chrom: String,
    pos: u64,
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "alt")]
    alternative: String,
}

/// Input row in CSHL form.
#[derive(Debug, serde::Deserialize)]
struct CshlRow {
    location: String,
    variant: String,
}

/// Output row of the TSV format.
#[derive(Debug, serde::Serialize)]
struct TsvRow {
    location: String,
    variant: String,
    worst_effect: EffectKind,
    gene_effects: String,
    effect_details: String,
}

/// Output row of the JSONL format.
#[derive(Debug, serde::Serialize)]
struct JsonRow<'a> {
    location: String,
    variant: String,
    effect: &'a Effect,
}

/// Writes annotated variants in one of the output formats.
enum EffectWriter {
    Tsv(csv::Writer<Box<dyn Write>>),
    Jsonl(Box<dyn Write>),
}

impl EffectWriter {
    fn new(args: &Args) -> Result<Self, anyhow::Error> {
        let inner = open_write_maybe_gz(&args.path_output_tsv).map_err(|e| {
            anyhow::anyhow!("could not create {:?}: {}", &args.path_output_tsv, e)
        })?;
        Ok(match args.output_format {
            OutputFormat::Tsv => Self::Tsv(
                csv::WriterBuilder::new()
                    .delimiter(b'\t')
                    .from_writer(inner),
            ),
            OutputFormat::Jsonl => Self::Jsonl(inner),
        })
    }

    fn write(&mut self, var: &VariantDescriptor, effect: &Effect) -> Result<(), anyhow::Error> {
        let (location, variant) = var.to_cshl();
        match self {
            Self::Tsv(writer) => writer.serialize(TsvRow {
                location,
                variant,
                worst_effect: effect.worst(),
                gene_effects: effect.gene_effects(),
                effect_details: effect.effect_details(),
            })?,
            Self::Jsonl(writer) => {
                serde_json::to_writer(
                    &mut *writer,
                    &JsonRow {
                        location,
                        variant,
                        effect,
                    },
                )?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), anyhow::Error> {
        match self {
            Self::Tsv(writer) => writer.flush()?,
            Self::Jsonl(writer) => writer.flush()?,
        }
        Ok(())
    }
}

/// Reads input variants chunk by chunk, skipping rows that do not describe a valid variant.
struct VariantReader<'a, G>
where
    G: SequenceAccessor + ?Sized,
{
    reader: csv::Reader<Box<dyn BufRead>>,
    headers: csv::StringRecord,
    /// Whether the input has the columns `location variant`.
    is_cshl: bool,
    genome: &'a G,
    left_normalize: bool,
    max_var_count: Option<usize>,
    /// Number of data rows consumed so far.
    row_no: usize,
    /// Number of valid variants returned so far.
    var_count: usize,
    /// Number of skipped rows.
    skipped: usize,
    /// Whether the input is exhausted or `max_var_count` was reached.
    done: bool,
}

impl<'a, G> VariantReader<'a, G>
where
    G: SequenceAccessor + ?Sized,
{
    fn new(args: &Args, genome: &'a G) -> Result<Self, anyhow::Error> {
        let reader = open_read_maybe_gz(&args.path_input_tsv)
            .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", &args.path_input_tsv, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let is_cshl =
            headers.iter().any(|h| h == "location") && headers.iter().any(|h| h == "variant");

        Ok(Self {
            reader,
            headers,
            is_cshl,
            genome,
            left_normalize: args.left_normalize,
            max_var_count: args.max_var_count,
            row_no: 0,
            var_count: 0,
            skipped: 0,
            done: false,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<VariantDescriptor, String> {
        let var = if self.is_cshl {
            let row = record
                .deserialize::<CshlRow>(Some(&self.headers))
                .map_err(|e| e.to_string())?;
            VariantDescriptor::from_cshl(&row.location, &row.variant, self.genome)
        } else {
            let row = record
                .deserialize::<AlleleRow>(Some(&self.headers))
                .map_err(|e| e.to_string())?;
            VariantDescriptor::from_alleles(&row.chrom, row.pos, &row.reference, &row.alternative)
        };
        let var = match var {
            Ok(var) if self.left_normalize => var.left_normalized(self.genome),
            var => var,
        };
        var.map_err(|e| e.to_string())
    }

    /// Read up to `chunk_size` valid variants, an empty result marks the end of input.
    fn next_chunk(&mut self, chunk_size: usize) -> Result<Vec<VariantDescriptor>, anyhow::Error> {
        let mut result = Vec::new();
        let mut record = csv::StringRecord::new();
        while !self.done && result.len() < chunk_size {
            if let Some(max_var_count) = self.max_var_count {
                if self.var_count >= max_var_count {
                    tracing::warn!(
                        "Stopping after {} records as requested by --max-var-count",
                        self.var_count
                    );
                    self.done = true;
                    break;
                }
            }
            if !self.reader.read_record(&mut record)? {
                self.done = true;
                break;
            }
            self.row_no += 1;
            match self.parse(&record) {
                Ok(var) => {
                    result.push(var);
                    self.var_count += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping input row {}: {}", self.row_no, e);
                    self.skipped += 1;
                }
            }
        }
        Ok(result)
    }
}

/// Main entry point for `annotate variants` sub command.
pub fn run(_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args = {:#?}", &args);

    let config = match &args.path_config {
        Some(path_config) => EngineConfig::from_path(path_config)?,
        None => EngineConfig::for_release(args.genome_release),
    };
    tracing::info!("Using engine config {:?}", &config);

    let genome = Arc::new(
        InMemoryGenome::from_path(&args.path_genome)
            .map_err(|e| anyhow::anyhow!("could not load genome {:?}: {}", &args.path_genome, e))?,
    );
    let models = Arc::new(
        load_gene_models(&args.path_gene_models, args.gene_models_format).map_err(|e| {
            anyhow::anyhow!(
                "could not load gene models {:?}: {}",
                &args.path_gene_models,
                e
            )
        })?,
    );
    let aggregator = EffectAggregator::new(genome, models, config);

    tracing::info!("Annotating variants ...");
    let start = Instant::now();
    let mut reader = VariantReader::new(args, aggregator.genome())?;
    let mut writer = EffectWriter::new(args)?;
    let mut failed = 0usize;
    loop {
        let chunk = reader.next_chunk(CHUNK_SIZE)?;
        if chunk.is_empty() {
            break;
        }
        let effects = aggregator.annotate_batch(&chunk);
        for (var, effect) in chunk.iter().zip(effects.iter()) {
            if !effect.failed_transcripts().is_empty() {
                failed += 1;
            }
            writer.write(var, effect)?;
        }
        tracing::debug!(
            "  annotated {} variants",
            reader.var_count.separate_with_commas()
        );
    }
    writer.flush()?;

    if reader.skipped > 0 {
        tracing::warn!(
            "Skipped {} invalid input rows",
            reader.skipped.separate_with_commas()
        );
    }
    if failed > 0 {
        tracing::warn!(
            "{} variants had transcripts that could not be classified",
            failed.separate_with_commas()
        );
    }
    tracing::info!(
        "... annotated {} variants in {:?}",
        reader.var_count.separate_with_commas(),
        start.elapsed()
    );
    Ok(())
}
