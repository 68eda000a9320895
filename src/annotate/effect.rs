//! Effect kinds, per-transcript effect records and variant-level effects.

use std::{collections::BTreeMap, fmt, str::FromStr};

use itertools::Itertools;
use parse_display::{Display, FromStr};

use crate::{error::Error, models::Strand};

use super::codon::AminoAcid;

/// Closed set of effect kinds.
///
/// Variants are declared from most to least severe, so the derived `Ord` sorts the most
/// severe kind first.  [`EffectKind::severity`] gives the same order as a number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
pub enum EffectKind {
    #[display("splice-site")]
    #[serde(rename = "splice-site")]
    SpliceSite,
    #[display("frame-shift")]
    #[serde(rename = "frame-shift")]
    FrameShift,
    #[display("nonsense")]
    #[serde(rename = "nonsense")]
    Nonsense,
    #[display("no-frame-shift-newStop")]
    #[serde(rename = "no-frame-shift-newStop")]
    NoFrameShiftNewStop,
    #[display("noStart")]
    #[serde(rename = "noStart")]
    NoStart,
    #[display("noEnd")]
    #[serde(rename = "noEnd")]
    NoEnd,
    #[display("missense")]
    #[serde(rename = "missense")]
    Missense,
    #[display("no-frame-shift")]
    #[serde(rename = "no-frame-shift")]
    NoFrameShift,
    #[display("synonymous")]
    #[serde(rename = "synonymous")]
    Synonymous,
    #[display("coding_unknown")]
    #[serde(rename = "coding_unknown")]
    CodingUnknown,
    #[display("regulatory")]
    #[serde(rename = "regulatory")]
    Regulatory,
    #[display("3'UTR")]
    #[serde(rename = "3'UTR")]
    ThreePrimeUtr,
    #[display("5'UTR")]
    #[serde(rename = "5'UTR")]
    FivePrimeUtr,
    #[display("intron")]
    #[serde(rename = "intron")]
    Intron,
    #[display("non-coding")]
    #[serde(rename = "non-coding")]
    NonCoding,
    #[display("promoter")]
    #[serde(rename = "promoter")]
    Promoter,
    #[display("non-coding-intron")]
    #[serde(rename = "non-coding-intron")]
    NonCodingIntron,
    #[display("unknown")]
    #[serde(rename = "unknown")]
    Unknown,
    #[display("intergenic")]
    #[serde(rename = "intergenic")]
    Intergenic,
    #[display("CNV+")]
    #[serde(rename = "CNV+")]
    CnvPlus,
    #[display("CNV-")]
    #[serde(rename = "CNV-")]
    CnvMinus,
    #[display("no-mutation")]
    #[serde(rename = "no-mutation")]
    NoMutation,
}

impl EffectKind {
    /// Rank of the kind, 1 is the most severe.
    pub fn severity(&self) -> u8 {
        match self {
            EffectKind::SpliceSite => 1,
            EffectKind::FrameShift => 2,
            EffectKind::Nonsense => 3,
            EffectKind::NoFrameShiftNewStop => 4,
            EffectKind::NoStart => 5,
            EffectKind::NoEnd => 6,
            EffectKind::Missense => 7,
            EffectKind::NoFrameShift => 8,
            EffectKind::Synonymous => 9,
            EffectKind::CodingUnknown => 10,
            EffectKind::Regulatory => 11,
            EffectKind::ThreePrimeUtr => 12,
            EffectKind::FivePrimeUtr => 13,
            EffectKind::Intron => 14,
            EffectKind::NonCoding => 15,
            EffectKind::Promoter => 16,
            EffectKind::NonCodingIntron => 17,
            EffectKind::Unknown => 18,
            EffectKind::Intergenic => 19,
            EffectKind::CnvPlus => 20,
            EffectKind::CnvMinus => 21,
            EffectKind::NoMutation => 22,
        }
    }

    /// Return the more severe of the two kinds.
    pub fn worse(self, other: Self) -> Self {
        if other.severity() < self.severity() {
            other
        } else {
            self
        }
    }
}

/// Amino acid change of a coding variant, e.g., `Gly->Asn` or `LysGlu->Lys`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub struct AminoAcidChange {
    pub reference: Vec<AminoAcid>,
    pub alternative: Vec<AminoAcid>,
}

impl fmt::Display for AminoAcidChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}",
            self.reference.iter().join(""),
            self.alternative.iter().join("")
        )
    }
}

impl FromStr for AminoAcidChange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVariant(format!("invalid amino acid change {:?}", s));
        let parse_residues = |residues: &str| -> Result<Vec<AminoAcid>, Error> {
            if !residues.is_ascii() || residues.len() % 3 != 0 {
                return Err(invalid());
            }
            residues
                .as_bytes()
                .chunks(3)
                .map(|code| {
                    std::str::from_utf8(code)
                        .ok()
                        .and_then(|code| code.parse::<AminoAcid>().ok())
                        .ok_or_else(invalid)
                })
                .collect()
        };

        let (reference, alternative) = s.split_once("->").ok_or_else(invalid)?;
        Ok(Self {
            reference: parse_residues(reference)?,
            alternative: parse_residues(alternative)?,
        })
    }
}

/// Position of a variant within an intron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntronDetails {
    /// 1-based number of the intron, in transcription order.
    pub which_intron: u32,
    pub how_many_introns: u32,
    /// Intronic bases from the donor (5') boundary to the variant, inclusive.
    pub dist_from_donor: u64,
    /// Intronic bases from the variant to the acceptor (3') boundary, inclusive.
    pub dist_from_acceptor: u64,
    pub intron_length: u64,
}

/// Effect of a variant on one transcript.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EffectRecord {
    /// Gene symbol, `None` for the synthetic intergenic record.
    pub gene: Option<String>,
    pub transcript_id: Option<String>,
    pub strand: Option<Strand>,
    pub effect: EffectKind,
    /// 1-based number of the first affected codon.
    pub protein_position: Option<u64>,
    /// Length of the protein, stop codon not counted.
    pub protein_length: Option<u64>,
    pub aa_change: Option<AminoAcidChange>,
    pub intron: Option<IntronDetails>,
}

impl EffectRecord {
    /// The record used when no transcript is affected.
    pub fn intergenic() -> Self {
        Self {
            gene: None,
            transcript_id: None,
            strand: None,
            effect: EffectKind::Intergenic,
            protein_position: None,
            protein_length: None,
            aa_change: None,
            intron: None,
        }
    }

    /// Compact description of the effect, e.g., `211/642(Gly->Asn)` or `2/7` for introns.
    pub fn details(&self) -> String {
        match (self.protein_position, self.protein_length, &self.intron) {
            (Some(position), Some(length), _) => match &self.aa_change {
                Some(aa_change) => format!("{}/{}({})", position, length, aa_change),
                None => format!("{}/{}", position, length),
            },
            (_, _, Some(intron)) => format!("{}/{}", intron.which_intron, intron.how_many_introns),
            _ => String::new(),
        }
    }
}

/// Effect of a variant, summarized over all transcripts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Effect {
    worst: EffectKind,
    records: Vec<EffectRecord>,
    genes: BTreeMap<String, EffectKind>,
    failed_transcripts: Vec<String>,
}

impl Effect {
    /// Summarize per-transcript records.
    ///
    /// Records are sorted by transcript id.  Without records, the result consists of a
    /// single intergenic record.
    pub fn from_records(mut records: Vec<EffectRecord>, mut failed_transcripts: Vec<String>) -> Self {
        if records.is_empty() {
            records.push(EffectRecord::intergenic());
        }
        records.sort_by(|lhs, rhs| {
            (&lhs.transcript_id, &lhs.gene, lhs.effect).cmp(&(
                &rhs.transcript_id,
                &rhs.gene,
                rhs.effect,
            ))
        });
        failed_transcripts.sort();
        failed_transcripts.dedup();

        let worst = records
            .iter()
            .map(|record| record.effect)
            .reduce(EffectKind::worse)
            .unwrap_or(EffectKind::Intergenic);
        let mut genes = BTreeMap::new();
        for record in &records {
            if let Some(gene) = &record.gene {
                genes
                    .entry(gene.clone())
                    .and_modify(|kind: &mut EffectKind| *kind = kind.worse(record.effect))
                    .or_insert(record.effect);
            }
        }

        Self {
            worst,
            records,
            genes,
            failed_transcripts,
        }
    }

    /// The most severe effect over all transcripts.
    pub fn worst(&self) -> EffectKind {
        self.worst
    }

    /// Per-transcript records, sorted by transcript id.
    pub fn records(&self) -> &[EffectRecord] {
        &self.records
    }

    /// Most severe effect per gene symbol.
    pub fn genes(&self) -> &BTreeMap<String, EffectKind> {
        &self.genes
    }

    /// Transcripts for which classification failed.
    pub fn failed_transcripts(&self) -> &[String] {
        &self.failed_transcripts
    }

    /// Compact per-gene summary, e.g., `KLHL17:missense|SAMD11:intron`.
    pub fn gene_effects(&self) -> String {
        if self.genes.is_empty() {
            self.worst.to_string()
        } else {
            self.genes
                .iter()
                .map(|(gene, kind)| format!("{}:{}", gene, kind))
                .join("|")
        }
    }

    /// Compact per-transcript details, e.g., `NM_198317_1:KLHL17:missense:211/642(Gly->Asn)`.
    pub fn effect_details(&self) -> String {
        self.records
            .iter()
            .map(|record| match (&record.transcript_id, &record.gene) {
                (Some(transcript_id), Some(gene)) => format!(
                    "{}:{}:{}:{}",
                    transcript_id,
                    gene,
                    record.effect,
                    record.details()
                ),
                _ => record.effect.to_string(),
            })
            .join("|")
    }
}
