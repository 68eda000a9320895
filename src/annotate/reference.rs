//! Random access to the reference genome.

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use thousands::Separable;

use crate::{
    common::{contig, io::std::open_read_maybe_gz},
    error::Error,
};

/// Read-only random access to reference chromosome sequences.
///
/// Coordinates are 1-based and inclusive, returned bases are upper case.
pub trait SequenceAccessor: Send + Sync {
    /// Return the bases of `chromosome` from `start` to `end`.
    ///
    /// An empty range (`end == start - 1`) yields an empty string.
    fn sequence(&self, chromosome: &str, start: u64, end: u64) -> Result<String, Error>;

    /// Return the length of the chromosome, if known.
    fn chromosome_length(&self, chromosome: &str) -> Option<u64>;
}

/// Complement of one IUPAC nucleotide code, upper case.
pub fn complement(base: u8) -> u8 {
    bio::alphabets::dna::complement(base.to_ascii_uppercase())
}

/// Reverse complement of a nucleotide string, upper case.
pub fn reverse_complement(bases: &str) -> String {
    String::from_utf8_lossy(&bio::alphabets::dna::revcomp(
        bases.to_ascii_uppercase().into_bytes(),
    ))
    .into_owned()
}

/// Reference genome held completely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGenome {
    /// Upper case bases for each chromosome, in file order.
    contigs: IndexMap<String, Vec<u8>>,
    /// Mapping from primary contig name to index in `contigs`.
    name_to_idx: HashMap<String, usize>,
}

impl InMemoryGenome {
    /// Build a genome from `(name, bases)` pairs.
    pub fn from_sequences<I, N, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        Self::with_contigs(
            sequences
                .into_iter()
                .map(|(name, seq)| (name.into(), seq.as_ref().to_ascii_uppercase()))
                .collect(),
        )
    }

    fn with_contigs(contigs: IndexMap<String, Vec<u8>>) -> Self {
        let mut name_to_idx = HashMap::new();
        for (idx, name) in contigs.keys().enumerate() {
            name_to_idx
                .entry(contig::canonical_name(name).to_string())
                .or_insert(idx);
        }
        Self {
            contigs,
            name_to_idx,
        }
    }

    /// Load all records of a FASTA file that may be gzip or bgzip compressed.
    pub fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        tracing::info!("Loading reference genome from {:?}", path.as_ref());
        let before_loading = std::time::Instant::now();

        let mut reader = noodles::fasta::io::Reader::new(open_read_maybe_gz(path.as_ref())?);
        let mut contigs = IndexMap::new();
        for result in reader.records() {
            let record = result?;
            let name = String::from_utf8_lossy(record.name()).to_string();
            let bases = record.sequence().as_ref().to_ascii_uppercase();
            tracing::debug!(
                "  read {} with {} bases",
                &name,
                bases.len().separate_with_commas()
            );
            contigs.insert(name, bases);
        }

        tracing::info!(
            "... done loading {} chromosomes in {:?}",
            contigs.len(),
            before_loading.elapsed()
        );
        Ok(Self::with_contigs(contigs))
    }

    /// Names of the chromosomes, in file order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.contigs.keys().map(String::as_str)
    }

    fn contig(&self, chromosome: &str) -> Option<&[u8]> {
        let idx = self
            .contigs
            .get_index_of(chromosome)
            .or_else(|| self.name_to_idx.get(contig::canonical_name(chromosome)).copied())?;
        self.contigs.get_index(idx).map(|(_, bases)| bases.as_slice())
    }
}

impl SequenceAccessor for InMemoryGenome {
    fn sequence(&self, chromosome: &str, start: u64, end: u64) -> Result<String, Error> {
        let bases = self
            .contig(chromosome)
            .ok_or_else(|| Error::ChromosomeNotFound(chromosome.to_string()))?;
        let length = bases.len() as u64;
        if start == 0 || end > length || start > end + 1 {
            return Err(Error::PositionOutOfRange {
                chromosome: chromosome.to_string(),
                start,
                end,
                length,
            });
        }
        Ok(String::from_utf8_lossy(&bases[(start - 1) as usize..end as usize]).to_string())
    }

    fn chromosome_length(&self, chromosome: &str) -> Option<u64> {
        self.contig(chromosome).map(|bases| bases.len() as u64)
    }
}
