//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use vareffect::{
    annotate::{
        aggregate::EffectAggregator, config::EngineConfig, mapper::CodingPositionMapper,
        reference::complement, reference::SequenceAccessor,
    },
    common::contig::canonical_name,
    error::Error,
    models::{index::GeneModelsIndex, Exon, Strand, TranscriptModel},
};

/// Genome of constant background bases with painted exceptions.
///
/// Allows realistic coordinates without holding whole chromosomes in memory.
#[derive(Debug, Clone)]
pub struct PaintedGenome {
    background: u8,
    lengths: HashMap<String, u64>,
    painted: HashMap<String, BTreeMap<u64, u8>>,
}

impl PaintedGenome {
    pub fn new<'a, I>(background: u8, chromosomes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        Self {
            background,
            lengths: chromosomes
                .into_iter()
                .map(|(name, length)| (canonical_name(name).to_string(), length))
                .collect(),
            painted: HashMap::new(),
        }
    }

    /// Set forward strand bases starting at `pos`.
    pub fn paint(&mut self, chromosome: &str, pos: u64, bases: &[u8]) {
        let painted = self
            .painted
            .entry(canonical_name(chromosome).to_string())
            .or_default();
        for (i, base) in bases.iter().enumerate() {
            painted.insert(pos + i as u64, base.to_ascii_uppercase());
        }
    }

    /// Write `cds` in transcription orientation onto the coding exons of `tx`.
    pub fn paint_cds(&mut self, tx: &TranscriptModel, cds: &[u8]) {
        let mapper = CodingPositionMapper::new(tx, 0);
        for (offset, base) in cds.iter().enumerate() {
            let pos = mapper
                .genomic_position(offset as i64)
                .expect("CDS fits into exons");
            let base = match tx.strand() {
                Strand::Plus => *base,
                Strand::Minus => complement(*base),
            };
            self.paint(tx.chromosome(), pos, &[base]);
        }
    }
}

impl SequenceAccessor for PaintedGenome {
    fn sequence(&self, chromosome: &str, start: u64, end: u64) -> Result<String, Error> {
        let name = canonical_name(chromosome);
        let length = self
            .chromosome_length(name)
            .ok_or_else(|| Error::ChromosomeNotFound(chromosome.to_string()))?;
        if start == 0 || end > length || start > end + 1 {
            return Err(Error::PositionOutOfRange {
                chromosome: chromosome.to_string(),
                start,
                end,
                length,
            });
        }
        let painted = self.painted.get(name);
        Ok((start..=end)
            .map(|pos| {
                painted
                    .and_then(|painted| painted.get(&pos))
                    .copied()
                    .unwrap_or(self.background) as char
            })
            .collect())
    }

    fn chromosome_length(&self, chromosome: &str) -> Option<u64> {
        self.lengths.get(canonical_name(chromosome)).copied()
    }
}

pub fn exons(exons: &[(u64, u64)]) -> Vec<Exon> {
    exons
        .iter()
        .map(|&(start, end)| Exon::new(start, end))
        .collect()
}

/// `ATG`, then `GCT` repeated, then `TAA`, with `codons` replaced at the given indices.
pub fn cds_sequence(codon_count: usize, codons: &[(usize, &str)]) -> Vec<u8> {
    let mut result = Vec::with_capacity(codon_count * 3);
    for idx in 0..codon_count {
        let codon = codons
            .iter()
            .find(|(i, _)| *i == idx)
            .map(|(_, codon)| *codon)
            .unwrap_or(if idx == 0 {
                "ATG"
            } else if idx + 1 == codon_count {
                "TAA"
            } else {
                "GCT"
            });
        result.extend_from_slice(codon.as_bytes());
    }
    result
}

pub fn klhl17() -> TranscriptModel {
    TranscriptModel::new(
        "KLHL17",
        "NM_198317_1",
        "1",
        Strand::Plus,
        exons(&[
            (896_000, 896_299),
            (896_800, 897_099),
            (897_200, 897_999),
            (898_500, 899_499),
        ]),
        Some((896_119, 899_147)),
    )
    .expect("valid model")
}

pub fn ccnh() -> Vec<TranscriptModel> {
    vec![
        TranscriptModel::new(
            "CCNH",
            "NM_001239_1",
            "5",
            Strand::Minus,
            exons(&[
                (86_687_000, 86_687_500),
                (86_700_000, 86_700_200),
                (86_708_000, 86_708_300),
                (86_708_900, 86_709_200),
            ]),
            Some((86_687_300, 86_708_200)),
        )
        .expect("valid model"),
        TranscriptModel::new(
            "CCNH",
            "NM_001199189_1",
            "5",
            Strand::Minus,
            exons(&[
                (86_687_000, 86_687_500),
                (86_704_000, 86_704_100),
                (86_706_000, 86_706_150),
                (86_708_900, 86_709_200),
            ]),
            Some((86_687_300, 86_708_950)),
        )
        .expect("valid model"),
    ]
}

pub fn iqgap2() -> TranscriptModel {
    TranscriptModel::new(
        "IQGAP2",
        "NM_006633_1",
        "5",
        Strand::Plus,
        exons(&[(75_700_000, 75_700_300), (75_902_000, 75_902_300)]),
        Some((75_700_102, 75_902_199)),
    )
    .expect("valid model")
}

/// Genome and gene models of the three scenario genes.
///
/// KLHL17 has 643 codons with `GGC` (Gly) as codon 210, IQGAP2 has 133 codons with
/// `CGA` (Arg) as codon 109.
pub fn scenario_fixture() -> (PaintedGenome, GeneModelsIndex) {
    let mut genome = PaintedGenome::new(b'T', [("1", 249_250_621), ("5", 180_915_260)]);

    let klhl17 = klhl17();
    genome.paint_cds(&klhl17, &cds_sequence(643, &[(210, "GGC")]));
    let iqgap2 = iqgap2();
    genome.paint_cds(&iqgap2, &cds_sequence(133, &[(109, "CGA")]));

    let mut models = vec![klhl17, iqgap2];
    models.extend(ccnh());
    (genome, GeneModelsIndex::new(models))
}

pub fn scenario_aggregator() -> EffectAggregator<PaintedGenome> {
    let (genome, models) = scenario_fixture();
    EffectAggregator::new(Arc::new(genome), Arc::new(models), EngineConfig::default())
}
