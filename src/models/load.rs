//! Loading of transcript models from tab-separated gene model tables.

use std::path::Path;

use thousands::Separable;

use crate::{common::io::std::open_read_maybe_gz, error::Error};

use super::{index::GeneModelsIndex, Exon, Strand, TranscriptModel};

/// Supported layouts of gene model tables.
#[derive(
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    parse_display::Display,
    parse_display::FromStr,
)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GeneModelsFormat {
    /// Headered table with 1-based closed coordinates.
    #[default]
    Default,
    /// UCSC refFlat table with 0-based half-open starts.
    #[value(name = "refflat")]
    RefFlat,
}

/// One row of a table in the default format.
#[derive(Debug, serde::Deserialize)]
struct DefaultRecord {
    chr: String,
    #[serde(rename = "trID")]
    tr_id: String,
    gene: String,
    strand: String,
    #[serde(rename = "cdsStart")]
    cds_start: u64,
    #[serde(rename = "cdsEnd")]
    cds_end: u64,
    #[serde(rename = "exonStarts")]
    exon_starts: String,
    #[serde(rename = "exonEnds")]
    exon_ends: String,
}

/// One row of a UCSC refFlat table.
#[derive(Debug, serde::Deserialize)]
struct RefFlatRecord {
    gene_name: String,
    name: String,
    chrom: String,
    strand: String,
    _tx_start: u64,
    _tx_end: u64,
    cds_start: u64,
    cds_end: u64,
    _exon_count: u64,
    exon_starts: String,
    exon_ends: String,
}

/// Parse a comma-separated coordinate list, ignoring a trailing comma.
fn parse_coordinates(value: &str) -> Result<Vec<u64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| format!("invalid coordinate {:?}: {}", s, e))
        })
        .collect()
}

/// Zip exon start and end lists into exons, converting starts by `start_offset`.
fn build_exons(starts: &str, ends: &str, start_offset: u64) -> Result<Vec<Exon>, String> {
    let starts = parse_coordinates(starts)?;
    let ends = parse_coordinates(ends)?;
    if starts.len() != ends.len() {
        return Err(format!(
            "{} exon starts but {} exon ends",
            starts.len(),
            ends.len()
        ));
    }
    Ok(starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| Exon::new(start + start_offset, end))
        .collect())
}

fn parse_strand(transcript_id: &str, value: &str) -> Result<Strand, Error> {
    value.parse::<Strand>().map_err(|_| Error::InvalidGeneModel {
        transcript_id: transcript_id.to_string(),
        reason: format!("invalid strand {:?}", value),
    })
}

impl TryFrom<DefaultRecord> for TranscriptModel {
    type Error = Error;

    fn try_from(record: DefaultRecord) -> Result<Self, Self::Error> {
        let exons = build_exons(&record.exon_starts, &record.exon_ends, 0).map_err(|reason| {
            Error::InvalidGeneModel {
                transcript_id: record.tr_id.clone(),
                reason,
            }
        })?;
        let cds = if record.cds_start > record.cds_end {
            None
        } else {
            Some((record.cds_start, record.cds_end))
        };
        TranscriptModel::new(
            &record.gene,
            &record.tr_id,
            &record.chr,
            parse_strand(&record.tr_id, &record.strand)?,
            exons,
            cds,
        )
    }
}

impl TryFrom<RefFlatRecord> for TranscriptModel {
    type Error = Error;

    fn try_from(record: RefFlatRecord) -> Result<Self, Self::Error> {
        let exons = build_exons(&record.exon_starts, &record.exon_ends, 1).map_err(|reason| {
            Error::InvalidGeneModel {
                transcript_id: record.name.clone(),
                reason,
            }
        })?;
        let cds = if record.cds_start >= record.cds_end {
            None
        } else {
            Some((record.cds_start + 1, record.cds_end))
        };
        TranscriptModel::new(
            &record.gene_name,
            &record.name,
            &record.chrom,
            parse_strand(&record.name, &record.strand)?,
            exons,
            cds,
        )
    }
}

/// Convert a per-row `csv` error into either a fatal or a rejection.
fn row_error(err: csv::Error) -> Result<Error, Error> {
    if err.is_io_error() {
        return Err(Error::Io(std::io::Error::other(err)));
    }
    let line = err
        .position()
        .map(|pos| pos.line().to_string())
        .unwrap_or_else(|| String::from("?"));
    Ok(Error::InvalidGeneModel {
        transcript_id: format!("<line {}>", line),
        reason: err.to_string(),
    })
}

/// Read transcript models from a reader, collecting rejected rows.
fn read_models<R, T>(
    reader: &mut csv::Reader<R>,
    models: &mut Vec<TranscriptModel>,
    rejected: &mut Vec<Error>,
) -> Result<(), Error>
where
    R: std::io::Read,
    T: serde::de::DeserializeOwned,
    TranscriptModel: TryFrom<T, Error = Error>,
{
    for result in reader.deserialize::<T>() {
        let outcome = match result {
            Ok(record) => TranscriptModel::try_from(record),
            Err(err) => Err(row_error(err)?),
        };
        match outcome {
            Ok(model) => models.push(model),
            Err(err) => {
                tracing::warn!("Skipping gene model: {}", &err);
                rejected.push(err);
            }
        }
    }
    Ok(())
}

/// Load gene models from `path` (optionally gzip compressed) and build the index.
///
/// Rows that cannot be turned into a valid model are logged, skipped and reported through
/// `GeneModelsIndex::rejected`.  I/O errors are fatal.
pub fn load_gene_models<P>(path: P, format: GeneModelsFormat) -> Result<GeneModelsIndex, Error>
where
    P: AsRef<Path>,
{
    tracing::info!(
        "Loading gene models from {:?} ({} format)",
        path.as_ref(),
        format
    );
    let before_loading = std::time::Instant::now();

    let input = open_read_maybe_gz(path.as_ref())?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true);

    let mut models = Vec::new();
    let mut rejected = Vec::new();
    match format {
        GeneModelsFormat::Default => {
            let mut reader = builder.has_headers(true).from_reader(input);
            read_models::<_, DefaultRecord>(&mut reader, &mut models, &mut rejected)?;
        }
        GeneModelsFormat::RefFlat => {
            let mut reader = builder.has_headers(false).from_reader(input);
            read_models::<_, RefFlatRecord>(&mut reader, &mut models, &mut rejected)?;
        }
    }

    tracing::info!(
        "... done loading {} gene models ({} rejected) in {:?}",
        models.len().separate_with_commas(),
        rejected.len().separate_with_commas(),
        before_loading.elapsed()
    );

    Ok(GeneModelsIndex::with_rejected(models, rejected))
}
