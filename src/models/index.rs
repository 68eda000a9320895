//! Interval tree based index of transcript models.

use std::collections::{HashMap, HashSet};

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;
use indexmap::IndexMap;

use crate::{common::contig, error::Error};

use super::TranscriptModel;

type IntervalTree = ArrayBackedIntervalTree<u64, u32>;

/// Read-only collection of transcript models with per-chromosome interval trees.
///
/// Transcripts are stored sorted by chromosome, transcript start and transcript id, so
/// that all query results come out in a deterministic order.
#[derive(Debug)]
pub struct GeneModelsIndex {
    /// Transcripts, sorted by chromosome, start and id.
    transcripts: Vec<TranscriptModel>,
    /// Mapping from primary chromosome name to index in `trees`.
    contig_to_idx: IndexMap<String, usize>,
    /// Interval tree to index in `transcripts`, for each chromosome.
    trees: Vec<IntervalTree>,
    /// Mapping from transcript id to index in `transcripts`.
    tx_map: HashMap<String, u32>,
    /// Problems found while building the index or loading its input.
    rejected: Vec<Error>,
}

impl GeneModelsIndex {
    /// Build the index from already validated models.
    ///
    /// Of several models with the same transcript id, only the first one is kept.
    pub fn new<I>(models: I) -> Self
    where
        I: IntoIterator<Item = TranscriptModel>,
    {
        Self::with_rejected(models, Vec::new())
    }

    /// Build the index and keep the given load-time rejections for later reporting.
    pub fn with_rejected<I>(models: I, mut rejected: Vec<Error>) -> Self
    where
        I: IntoIterator<Item = TranscriptModel>,
    {
        let mut seen = HashSet::new();
        let mut transcripts = Vec::new();
        for model in models {
            if seen.contains(model.transcript_id()) {
                tracing::warn!(
                    "Skipping duplicate transcript {} on {}",
                    model.transcript_id(),
                    model.chromosome()
                );
                rejected.push(Error::InvalidGeneModel {
                    transcript_id: model.transcript_id().to_string(),
                    reason: String::from("duplicate transcript id"),
                });
            } else {
                seen.insert(model.transcript_id().to_string());
                transcripts.push(model);
            }
        }
        transcripts.sort_by(|lhs, rhs| {
            (
                contig::canonical_name(lhs.chromosome()),
                lhs.tx_start(),
                lhs.transcript_id(),
            )
                .cmp(&(
                    contig::canonical_name(rhs.chromosome()),
                    rhs.tx_start(),
                    rhs.transcript_id(),
                ))
        });

        let mut contig_to_idx = IndexMap::new();
        let mut trees: Vec<IntervalTree> = Vec::new();
        let mut tx_map = HashMap::new();
        for (tx_idx, tx) in transcripts.iter().enumerate() {
            let contig_idx = *contig_to_idx
                .entry(contig::canonical_name(tx.chromosome()).to_string())
                .or_insert(trees.len());
            if contig_idx >= trees.len() {
                trees.push(IntervalTree::new());
            }
            trees[contig_idx].insert(tx.tx_start()..(tx.tx_end() + 1), tx_idx as u32);
            tx_map.insert(tx.transcript_id().to_string(), tx_idx as u32);
        }
        trees.iter_mut().for_each(|t| t.index());

        tracing::debug!(
            "Indexed {} transcripts on {} chromosomes",
            transcripts.len(),
            trees.len()
        );

        Self {
            transcripts,
            contig_to_idx,
            trees,
            tx_map,
            rejected,
        }
    }

    /// Return the index of the tree for the chromosome, given by any alias.
    fn contig_idx(&self, chromosome: &str) -> Option<usize> {
        self.contig_to_idx
            .get(contig::canonical_name(chromosome))
            .copied()
    }

    /// Return the transcripts overlapping the 1-based closed interval `[start, end]`.
    ///
    /// The result is ordered by transcript start, then transcript id.  Unknown chromosomes
    /// and empty intervals yield an empty result.
    pub fn overlapping(&self, chromosome: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        if start > end {
            return Vec::new();
        }
        let Some(contig_idx) = self.contig_idx(chromosome) else {
            return Vec::new();
        };

        let mut tx_idxs = self.trees[contig_idx]
            .find(start..(end + 1))
            .iter()
            .map(|entry| *entry.data() as usize)
            .collect::<Vec<_>>();
        tx_idxs.sort_unstable();

        tx_idxs
            .into_iter()
            .map(|tx_idx| &self.transcripts[tx_idx])
            .collect()
    }

    /// Look up a transcript by its identifier.
    pub fn by_id(&self, transcript_id: &str) -> Result<&TranscriptModel, Error> {
        self.tx_map
            .get(transcript_id)
            .map(|tx_idx| &self.transcripts[*tx_idx as usize])
            .ok_or_else(|| Error::TranscriptNotFound(transcript_id.to_string()))
    }

    /// Number of indexed transcripts.
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Primary chromosome names, in sorted order.
    pub fn chromosomes(&self) -> Vec<&str> {
        self.contig_to_idx.keys().map(String::as_str).collect()
    }

    /// All transcripts, sorted by chromosome, start and id.
    pub fn transcripts(&self) -> impl Iterator<Item = &TranscriptModel> {
        self.transcripts.iter()
    }

    /// Models that were rejected while loading or indexing.
    pub fn rejected(&self) -> &[Error] {
        &self.rejected
    }
}
