//! Transcript models that variants are annotated against.

pub mod check;
pub mod index;
pub mod load;

use crate::error::Error;

/// Strand of a transcript.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum Strand {
    #[display("+")]
    #[serde(rename = "+")]
    Plus,
    #[display("-")]
    #[serde(rename = "-")]
    Minus,
}

/// One exon, as a 1-based closed interval on the forward strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Exon {
    pub start: u64,
    pub end: u64,
}

impl Exon {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bases in the exon.
    pub fn len(&self) -> u64 {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// An immutable transcript model.
///
/// Use [`TranscriptModel::new`] for construction, it checks the structural invariants
/// (sorted and disjoint exons, CDS inside the exons) and precomputes the transcript span
/// and CDS length.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TranscriptModel {
    gene: String,
    transcript_id: String,
    chromosome: String,
    strand: Strand,
    exons: Vec<Exon>,
    cds: Option<(u64, u64)>,
    tx_start: u64,
    tx_end: u64,
    cds_length: u64,
}

impl TranscriptModel {
    /// Construct a new transcript model.
    ///
    /// # Arguments
    ///
    /// * `gene` - Gene symbol, e.g., `KLHL17`.
    /// * `transcript_id` - Transcript identifier, unique within an index.
    /// * `chromosome` - Name of the chromosome.
    /// * `strand` - Strand of the transcript.
    /// * `exons` - Exons, sorted by start and pairwise disjoint.
    /// * `cds` - 1-based closed CDS boundaries on the forward strand, `None` if non-coding.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGeneModel` if one of the invariants is violated.
    pub fn new(
        gene: &str,
        transcript_id: &str,
        chromosome: &str,
        strand: Strand,
        exons: Vec<Exon>,
        cds: Option<(u64, u64)>,
    ) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidGeneModel {
            transcript_id: transcript_id.to_string(),
            reason,
        };

        if transcript_id.is_empty() {
            return Err(invalid(String::from("empty transcript id")));
        }
        if chromosome.is_empty() {
            return Err(invalid(String::from("empty chromosome name")));
        }
        if exons.is_empty() {
            return Err(invalid(String::from("no exons")));
        }
        for exon in &exons {
            if exon.start == 0 || exon.start > exon.end {
                return Err(invalid(format!(
                    "exon {}-{} is not a valid 1-based interval",
                    exon.start, exon.end
                )));
            }
        }
        for (prev, next) in exons.iter().zip(exons.iter().skip(1)) {
            if next.start <= prev.end {
                return Err(invalid(format!(
                    "exons {}-{} and {}-{} are unsorted or overlapping",
                    prev.start, prev.end, next.start, next.end
                )));
            }
        }

        let mut cds_length = 0;
        if let Some((cds_start, cds_end)) = cds {
            if cds_start > cds_end {
                return Err(invalid(format!(
                    "CDS start {} is after CDS end {}",
                    cds_start, cds_end
                )));
            }
            for pos in [cds_start, cds_end] {
                if !exons.iter().any(|exon| exon.contains(pos)) {
                    return Err(invalid(format!("CDS boundary {} is not exonic", pos)));
                }
            }
            cds_length = exons
                .iter()
                .map(|exon| {
                    let start = exon.start.max(cds_start);
                    let end = exon.end.min(cds_end);
                    if start <= end {
                        end + 1 - start
                    } else {
                        0
                    }
                })
                .sum();
        }

        let tx_start = exons.first().map(|e| e.start).unwrap_or_default();
        let tx_end = exons.last().map(|e| e.end).unwrap_or_default();

        Ok(Self {
            gene: gene.to_string(),
            transcript_id: transcript_id.to_string(),
            chromosome: chromosome.to_string(),
            strand,
            exons,
            cds,
            tx_start,
            tx_end,
            cds_length,
        })
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Exons in ascending genomic order, independent of the strand.
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn cds_start(&self) -> Option<u64> {
        self.cds.map(|(start, _)| start)
    }

    pub fn cds_end(&self) -> Option<u64> {
        self.cds.map(|(_, end)| end)
    }

    /// First base of the first exon.
    pub fn tx_start(&self) -> u64 {
        self.tx_start
    }

    /// Last base of the last exon.
    pub fn tx_end(&self) -> u64 {
        self.tx_end
    }

    /// Number of exonic bases between CDS start and end, 0 for non-coding transcripts.
    pub fn cds_length(&self) -> u64 {
        self.cds_length
    }

    pub fn is_coding(&self) -> bool {
        self.cds.is_some()
    }

    /// Length of the protein in residues, the stop codon not counted.
    pub fn protein_length(&self) -> Option<u64> {
        self.cds.map(|_| (self.cds_length / 3).saturating_sub(1))
    }

    /// Number of bases in the spliced transcript.
    pub fn exonic_length(&self) -> u64 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// Introns as 1-based closed intervals, in ascending genomic order.
    ///
    /// Abutting exons yield no intron.
    pub fn introns(&self) -> Vec<(u64, u64)> {
        self.exons
            .iter()
            .zip(self.exons.iter().skip(1))
            .filter(|(prev, next)| prev.end + 1 < next.start)
            .map(|(prev, next)| (prev.end + 1, next.start - 1))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    use super::{Exon, Strand, TranscriptModel};
    use crate::error::Error;

    /// A small plus strand transcript with three exons and 15 coding bases.
    pub fn plus_tx() -> TranscriptModel {
        TranscriptModel::new(
            "GENE1",
            "NM_000001_1",
            "1",
            Strand::Plus,
            vec![
                Exon::new(101, 120),
                Exon::new(201, 210),
                Exon::new(301, 320),
            ],
            Some((111, 305)),
        )
        .expect("valid model")
    }

    #[test]
    fn derived_values() {
        let tx = plus_tx();

        assert_eq!(tx.tx_start(), 101);
        assert_eq!(tx.tx_end(), 320);
        assert_eq!(tx.cds_length(), 10 + 10 + 5);
        assert_eq!(tx.exonic_length(), 50);
        assert_eq!(tx.protein_length(), Some(7));
        assert_eq!(tx.introns(), vec![(121, 200), (211, 300)]);
        assert!(tx.is_coding());
    }

    #[test]
    fn strand_display() -> Result<(), anyhow::Error> {
        assert_eq!(Strand::Plus.to_string(), "+");
        assert_eq!("-".parse::<Strand>()?, Strand::Minus);
        assert_eq!(serde_json::to_string(&Strand::Minus)?, "\"-\"");

        Ok(())
    }

    #[rstest::rstest]
    #[case::no_exons(vec![], None, "no exons")]
    #[case::reversed_exon(vec![Exon::new(20, 10)], None, "exon 20-10 is not a valid 1-based interval")]
    #[case::zero_start(vec![Exon::new(0, 10)], None, "exon 0-10 is not a valid 1-based interval")]
    #[case::overlapping(
        vec![Exon::new(10, 20), Exon::new(15, 30)],
        None,
        "exons 10-20 and 15-30 are unsorted or overlapping"
    )]
    #[case::unsorted(
        vec![Exon::new(50, 60), Exon::new(10, 20)],
        None,
        "exons 50-60 and 10-20 are unsorted or overlapping"
    )]
    #[case::cds_reversed(vec![Exon::new(10, 60)], Some((40, 20)), "CDS start 40 is after CDS end 20")]
    #[case::cds_intronic(
        vec![Exon::new(10, 20), Exon::new(40, 60)],
        Some((25, 50)),
        "CDS boundary 25 is not exonic"
    )]
    fn invalid_models(
        #[case] exons: Vec<Exon>,
        #[case] cds: Option<(u64, u64)>,
        #[case] expected_reason: &str,
    ) {
        let result = TranscriptModel::new("G", "TX1", "1", Strand::Plus, exons, cds);

        match result {
            Err(Error::InvalidGeneModel {
                transcript_id,
                reason,
            }) => {
                assert_eq!(transcript_id, "TX1");
                assert_eq!(reason, expected_reason);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_coding() -> Result<(), anyhow::Error> {
        let tx = TranscriptModel::new(
            "LINC1",
            "NR_000001_1",
            "2",
            Strand::Minus,
            vec![Exon::new(10, 20), Exon::new(21, 40)],
            None,
        )?;

        assert!(!tx.is_coding());
        assert_eq!(tx.cds_length(), 0);
        assert_eq!(tx.protein_length(), None);
        assert!(tx.introns().is_empty());

        Ok(())
    }
}
