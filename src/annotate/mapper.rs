//! Mapping of genomic positions onto a transcript's structure.

use crate::{
    error::Error,
    models::{Exon, Strand, TranscriptModel},
};

use super::{
    effect::IntronDetails,
    reference::{reverse_complement, SequenceAccessor},
};

/// Kind of a structural segment of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, parse_display::Display)]
#[display(style = "snake_case")]
pub enum RegionKind {
    Upstream,
    FivePrimeUtr,
    Cds,
    ThreePrimeUtr,
    NonCodingExon,
    Intron,
    NonCodingIntron,
    Downstream,
    Outside,
}

/// Where a single genomic position falls relative to a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionClass {
    /// 0-based offset from the first CDS base, in transcription direction.
    Coding(u64),
    FivePrimeUtr,
    ThreePrimeUtr,
    Intron,
    NonCodingExon,
    NonCodingIntron,
    /// Within the promoter window before the transcript start.
    Upstream,
    /// Within the same distance after the transcript end.
    Downstream,
    Outside,
}

/// One segment of a transcript, a 1-based closed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxRegion {
    pub begin: u64,
    pub end: u64,
    pub kind: RegionKind,
}

/// Maps genomic positions onto one transcript.
///
/// The transcript is cut into consecutive segments covering the whole chromosome, so that
/// every position has exactly one region kind.
#[derive(Debug, Clone)]
pub struct CodingPositionMapper<'a> {
    tx: &'a TranscriptModel,
    promoter_length: u64,
    /// Exons in transcription order.
    tx_exons: Vec<Exon>,
    /// Segments in ascending genomic order.
    regions: Vec<TxRegion>,
    /// Spliced index of the first CDS base, 0 for non-coding transcripts.
    anchor: u64,
}

impl<'a> CodingPositionMapper<'a> {
    pub fn new(tx: &'a TranscriptModel, promoter_length: u64) -> Self {
        let tx_exons = match tx.strand() {
            Strand::Plus => tx.exons().to_vec(),
            Strand::Minus => tx.exons().iter().rev().copied().collect(),
        };
        let mut result = Self {
            tx,
            promoter_length,
            tx_exons,
            regions: Self::tx_regions(tx, promoter_length),
            anchor: 0,
        };
        let cds_first = match tx.strand() {
            Strand::Plus => tx.cds_start(),
            Strand::Minus => tx.cds_end(),
        };
        result.anchor = cds_first
            .and_then(|pos| result.spliced_index(pos))
            .unwrap_or_default();
        result
    }

    /// Build the list of segments of `tx` in ascending genomic order.
    fn tx_regions(tx: &TranscriptModel, promoter_length: u64) -> Vec<TxRegion> {
        let plus = tx.strand() == Strand::Plus;
        let (left_flank, right_flank) = if plus {
            (RegionKind::Upstream, RegionKind::Downstream)
        } else {
            (RegionKind::Downstream, RegionKind::Upstream)
        };
        let (left_utr, right_utr) = if plus {
            (RegionKind::FivePrimeUtr, RegionKind::ThreePrimeUtr)
        } else {
            (RegionKind::ThreePrimeUtr, RegionKind::FivePrimeUtr)
        };
        let intron_kind = if tx.is_coding() {
            RegionKind::Intron
        } else {
            RegionKind::NonCodingIntron
        };

        let mut result = Vec::new();
        let mut push = |begin: u64, end: u64, kind: RegionKind| {
            if begin <= end {
                result.push(TxRegion { begin, end, kind });
            }
        };

        let flank_start = tx.tx_start().saturating_sub(promoter_length).max(1);
        push(1, flank_start.saturating_sub(1), RegionKind::Outside);
        push(flank_start, tx.tx_start().saturating_sub(1), left_flank);

        let mut prev_end = None;
        for exon in tx.exons() {
            if let Some(prev_end) = prev_end {
                push(prev_end + 1, exon.start - 1, intron_kind);
            }
            prev_end = Some(exon.end);

            match (tx.cds_start(), tx.cds_end()) {
                (Some(cds_start), Some(cds_end)) => {
                    push(exon.start, exon.end.min(cds_start.saturating_sub(1)), left_utr);
                    push(
                        exon.start.max(cds_start),
                        exon.end.min(cds_end),
                        RegionKind::Cds,
                    );
                    push(exon.start.max(cds_end + 1), exon.end, right_utr);
                }
                _ => push(exon.start, exon.end, RegionKind::NonCodingExon),
            }
        }

        let flank_end = tx.tx_end().saturating_add(promoter_length);
        push(tx.tx_end() + 1, flank_end, right_flank);
        push(flank_end.saturating_add(1), u64::MAX, RegionKind::Outside);

        result
    }

    pub fn transcript(&self) -> &TranscriptModel {
        self.tx
    }

    /// Genomic interval of the transcript plus the promoter window on its 5' side.
    pub fn footprint(&self) -> (u64, u64) {
        match self.tx.strand() {
            Strand::Plus => (
                self.tx
                    .tx_start()
                    .saturating_sub(self.promoter_length)
                    .max(1),
                self.tx.tx_end(),
            ),
            Strand::Minus => (
                self.tx.tx_start(),
                self.tx.tx_end().saturating_add(self.promoter_length),
            ),
        }
    }

    /// 0-based index of `pos` in the spliced transcript, `None` if not exonic.
    pub fn spliced_index(&self, pos: u64) -> Option<u64> {
        let mut acc = 0;
        for exon in &self.tx_exons {
            if exon.contains(pos) {
                return Some(match self.tx.strand() {
                    Strand::Plus => acc + (pos - exon.start),
                    Strand::Minus => acc + (exon.end - pos),
                });
            }
            acc += exon.len();
        }
        None
    }

    /// Spliced offset of `pos` relative to the first CDS base.
    ///
    /// Negative in the 5' UTR, at least the CDS length in the 3' UTR, `None` if `pos`
    /// is not exonic.  For non-coding transcripts the offset is from the transcript start.
    pub fn cdna_offset(&self, pos: u64) -> Option<i64> {
        self.spliced_index(pos)
            .map(|idx| idx as i64 - self.anchor as i64)
    }

    /// Genomic position of a spliced offset, the inverse of [`Self::cdna_offset`].
    pub fn genomic_position(&self, offset: i64) -> Option<u64> {
        let idx = offset + self.anchor as i64;
        if idx < 0 {
            return None;
        }
        let idx = idx as u64;
        let mut acc = 0;
        for exon in &self.tx_exons {
            if idx < acc + exon.len() {
                return Some(match self.tx.strand() {
                    Strand::Plus => exon.start + (idx - acc),
                    Strand::Minus => exon.end - (idx - acc),
                });
            }
            acc += exon.len();
        }
        None
    }

    /// Bases of the spliced transcript for offsets `from..to`, in transcription orientation.
    ///
    /// The range is clipped to the transcript, so the result may be shorter than requested.
    pub fn spliced_sequence<G>(&self, genome: &G, from: i64, to: i64) -> Result<Vec<u8>, Error>
    where
        G: SequenceAccessor + ?Sized,
    {
        let exonic_length = self.tx.exonic_length() as i64;
        let lo = (from + self.anchor as i64).clamp(0, exonic_length) as u64;
        let hi = (to + self.anchor as i64).clamp(0, exonic_length) as u64;

        let mut result = Vec::with_capacity(hi.saturating_sub(lo) as usize);
        let mut acc = 0;
        for exon in &self.tx_exons {
            if acc >= hi {
                break;
            }
            let begin = lo.max(acc);
            let end = hi.min(acc + exon.len());
            if begin < end {
                let (local_begin, local_end) = (begin - acc, end - acc);
                let (start, stop) = match self.tx.strand() {
                    Strand::Plus => (exon.start + local_begin, exon.start + local_end - 1),
                    Strand::Minus => (exon.end - (local_end - 1), exon.end - local_begin),
                };
                let bases = genome.sequence(self.tx.chromosome(), start, stop)?;
                match self.tx.strand() {
                    Strand::Plus => result.extend(bases.bytes()),
                    Strand::Minus => result.extend(reverse_complement(&bases).bytes()),
                }
            }
            acc += exon.len();
        }
        Ok(result)
    }

    /// Segments intersecting `[start, end]`, clipped to that interval.
    pub fn regions(&self, start: u64, end: u64) -> Vec<TxRegion> {
        self.regions
            .iter()
            .filter(|r| r.begin <= end && start <= r.end)
            .map(|r| TxRegion {
                begin: r.begin.max(start),
                end: r.end.min(end),
                kind: r.kind,
            })
            .collect()
    }

    /// Region kind of a single position.
    pub fn region_kind(&self, pos: u64) -> RegionKind {
        let idx = self.regions.partition_point(|r| r.end < pos);
        self.regions
            .get(idx)
            .map(|r| r.kind)
            .unwrap_or(RegionKind::Outside)
    }

    /// Classify a single position.
    pub fn map(&self, pos: u64) -> PositionClass {
        match self.region_kind(pos) {
            RegionKind::Cds => match self.cdna_offset(pos) {
                Some(offset) if offset >= 0 => PositionClass::Coding(offset as u64),
                _ => PositionClass::Outside,
            },
            RegionKind::Upstream => PositionClass::Upstream,
            RegionKind::FivePrimeUtr => PositionClass::FivePrimeUtr,
            RegionKind::ThreePrimeUtr => PositionClass::ThreePrimeUtr,
            RegionKind::NonCodingExon => PositionClass::NonCodingExon,
            RegionKind::Intron => PositionClass::Intron,
            RegionKind::NonCodingIntron => PositionClass::NonCodingIntron,
            RegionKind::Downstream => PositionClass::Downstream,
            RegionKind::Outside => PositionClass::Outside,
        }
    }

    /// Whether `[start, end]` overlaps any exon.
    pub fn overlaps_exon(&self, start: u64, end: u64) -> bool {
        self.tx
            .exons()
            .iter()
            .any(|exon| exon.start <= end && start <= exon.end)
    }

    /// Genomic index of the intron whose splice window is hit, if any.
    ///
    /// The windows are the `length` intronic bases next to each exon.  An insertion hits a
    /// window when its insertion point lies inside it or on the exon/intron boundary.
    pub fn splice_site_intron(
        &self,
        start: u64,
        end: u64,
        is_insertion: bool,
        length: u64,
    ) -> Option<usize> {
        if length == 0 {
            return None;
        }
        self.tx
            .introns()
            .iter()
            .position(|&(intron_start, intron_end)| {
                let left = (intron_start, (intron_start + length - 1).min(intron_end));
                let right = (
                    intron_end.saturating_sub(length - 1).max(intron_start),
                    intron_end,
                );
                if is_insertion {
                    // `end` is the base preceding the insertion point.
                    let pos = end + 1;
                    (left.0 <= pos && pos <= left.1) || (right.0 < pos && pos <= right.1 + 1)
                } else {
                    (left.0 <= end && start <= left.1) || (right.0 <= end && start <= right.1)
                }
            })
    }

    /// Describe the position of `[start, end]` within the intron with genomic index `idx`.
    pub fn intron_details_at(&self, idx: usize, start: u64, end: u64) -> Option<IntronDetails> {
        let introns = self.tx.introns();
        let &(intron_start, intron_end) = introns.get(idx)?;
        let start = start.clamp(intron_start, intron_end);
        let end = end.clamp(intron_start, intron_end);
        let (from_left, from_right) = (start - intron_start + 1, intron_end - end + 1);
        let how_many_introns = introns.len() as u32;

        Some(match self.tx.strand() {
            Strand::Plus => IntronDetails {
                which_intron: idx as u32 + 1,
                how_many_introns,
                dist_from_donor: from_left,
                dist_from_acceptor: from_right,
                intron_length: intron_end - intron_start + 1,
            },
            Strand::Minus => IntronDetails {
                which_intron: how_many_introns - idx as u32,
                how_many_introns,
                dist_from_donor: from_right,
                dist_from_acceptor: from_left,
                intron_length: intron_end - intron_start + 1,
            },
        })
    }

    /// Describe the intron overlapped by `[start, end]`, if any.
    pub fn intron_details(&self, start: u64, end: u64) -> Option<IntronDetails> {
        let idx = self
            .tx
            .introns()
            .iter()
            .position(|&(intron_start, intron_end)| intron_start <= end && start <= intron_end)?;
        self.intron_details_at(idx, start, end)
    }
}
