//! Classification of the effect of one variant on one transcript.

use crate::{
    common::contig,
    error::Error,
    models::{Strand, TranscriptModel},
};

use super::{
    codon::{translate, AminoAcid},
    config::EngineConfig,
    effect::{AminoAcidChange, EffectKind, EffectRecord},
    mapper::{CodingPositionMapper, RegionKind},
    reference::{reverse_complement, SequenceAccessor},
    variant::{VariantDescriptor, VariantType},
};

/// Effect kind reported for a variant that only touches a non-coding segment.
fn region_effect(kind: RegionKind) -> EffectKind {
    match kind {
        RegionKind::Upstream => EffectKind::Promoter,
        RegionKind::FivePrimeUtr => EffectKind::FivePrimeUtr,
        RegionKind::ThreePrimeUtr => EffectKind::ThreePrimeUtr,
        RegionKind::Intron => EffectKind::Intron,
        RegionKind::NonCodingExon => EffectKind::NonCoding,
        RegionKind::NonCodingIntron => EffectKind::NonCodingIntron,
        RegionKind::Downstream | RegionKind::Outside => EffectKind::Intergenic,
        RegionKind::Cds => EffectKind::CodingUnknown,
    }
}

/// Index of the first stop in `residues`.
fn first_stop(residues: &[AminoAcid]) -> Option<usize> {
    residues.iter().position(AminoAcid::is_stop)
}

/// Classifies variants against transcripts with a fixed genome and configuration.
#[derive(Debug)]
pub struct EffectClassifier<'a, G>
where
    G: SequenceAccessor + ?Sized,
{
    genome: &'a G,
    config: &'a EngineConfig,
}

impl<'a, G> EffectClassifier<'a, G>
where
    G: SequenceAccessor + ?Sized,
{
    pub fn new(genome: &'a G, config: &'a EngineConfig) -> Self {
        Self { genome, config }
    }

    /// Classify the effect of `var` on `tx`.
    ///
    /// Returns `None` if the variant does not touch the transcript or its promoter.
    ///
    /// # Errors
    ///
    /// Failures, e.g., from sequence access, are wrapped into
    /// `Error::ClassificationFailure` for the transcript.
    pub fn classify(
        &self,
        var: &VariantDescriptor,
        tx: &TranscriptModel,
    ) -> Result<Option<EffectRecord>, Error> {
        self.classify_impl(var, tx)
            .map_err(|e| Error::ClassificationFailure {
                transcript_id: tx.transcript_id().to_string(),
                source: Box::new(e),
            })
    }

    fn record(&self, tx: &TranscriptModel, effect: EffectKind) -> EffectRecord {
        EffectRecord {
            gene: Some(tx.gene().to_string()),
            transcript_id: Some(tx.transcript_id().to_string()),
            strand: Some(tx.strand()),
            effect,
            ..EffectRecord::intergenic()
        }
    }

    fn classify_impl(
        &self,
        var: &VariantDescriptor,
        tx: &TranscriptModel,
    ) -> Result<Option<EffectRecord>, Error> {
        if !contig::same_contig(var.chromosome(), tx.chromosome()) {
            return Ok(None);
        }
        let mapper = CodingPositionMapper::new(tx, self.config.promoter_length);
        let (start, end) = var.affected_range();
        let (footprint_start, footprint_end) = mapper.footprint();
        if end < footprint_start || footprint_end < start {
            return Ok(None);
        }

        // Copy number changes that hit an exon take precedence over everything else.
        if var.variant_type().is_cnv() && mapper.overlaps_exon(start, end) {
            let effect = if var.variant_type() == VariantType::LargeDuplication {
                EffectKind::CnvPlus
            } else {
                EffectKind::CnvMinus
            };
            return Ok(Some(self.record(tx, effect)));
        }

        if let Some(intron_idx) = mapper.splice_site_intron(
            var.position(),
            var.end(),
            var.is_insertion(),
            self.config.splice_site_length,
        ) {
            let mut record = self.record(tx, EffectKind::SpliceSite);
            record.intron = mapper.intron_details_at(intron_idx, start, end);
            return Ok(Some(record));
        }

        // Region kinds touched by the variant.  Insertions are coding only if both flanks
        // are coding, otherwise the non-coding flanks decide.
        let kinds = if var.is_insertion() {
            let flanks = [mapper.region_kind(var.end()), mapper.region_kind(var.position())];
            if flanks.iter().all(|kind| *kind == RegionKind::Cds) {
                vec![RegionKind::Cds]
            } else {
                flanks
                    .into_iter()
                    .filter(|kind| *kind != RegionKind::Cds)
                    .collect()
            }
        } else {
            mapper
                .regions(start, end)
                .into_iter()
                .map(|region| region.kind)
                .collect::<Vec<_>>()
        };

        if !kinds.contains(&RegionKind::Cds) {
            let Some(effect) = kinds
                .iter()
                .copied()
                .map(region_effect)
                .reduce(EffectKind::worse)
            else {
                tracing::warn!(
                    "No region found for {:?} on {}",
                    var,
                    tx.transcript_id()
                );
                return Ok(Some(self.record(tx, EffectKind::Unknown)));
            };
            let mut record = self.record(tx, effect);
            if matches!(effect, EffectKind::Intron | EffectKind::NonCodingIntron) {
                record.intron = mapper.intron_details(start, end);
            }
            return Ok(Some(record));
        }

        if kinds
            .iter()
            .any(|kind| matches!(kind, RegionKind::Intron | RegionKind::NonCodingIntron))
        {
            // Only possible with an empty splice window.
            tracing::debug!(
                "{:?} crosses an exon boundary of {}",
                var,
                tx.transcript_id()
            );
            return Ok(Some(self.coding_record(tx, EffectKind::CodingUnknown, None, None)));
        }

        self.classify_coding(var, tx, &mapper).map(Some)
    }

    fn coding_record(
        &self,
        tx: &TranscriptModel,
        effect: EffectKind,
        protein_position: Option<u64>,
        aa_change: Option<AminoAcidChange>,
    ) -> EffectRecord {
        EffectRecord {
            protein_position,
            protein_length: tx.protein_length(),
            aa_change,
            ..self.record(tx, effect)
        }
    }

    /// Classify a variant that touches the CDS and no intron.
    fn classify_coding(
        &self,
        var: &VariantDescriptor,
        tx: &TranscriptModel,
        mapper: &CodingPositionMapper,
    ) -> Result<EffectRecord, Error> {
        let alternate = match tx.strand() {
            Strand::Plus => var.alternate().as_bytes().to_vec(),
            Strand::Minus => reverse_complement(var.alternate()).into_bytes(),
        };

        if var.is_insertion() {
            let after = match tx.strand() {
                Strand::Plus => var.position(),
                Strand::Minus => var.end(),
            };
            let Some(offset) = mapper.cdna_offset(after) else {
                return Ok(self.coding_record(tx, EffectKind::Unknown, None, None));
            };
            return self.classify_indel(tx, mapper, offset, offset - 1, 0, &alternate);
        }

        // The span lies within one exon, possibly extending beyond the transcript.
        let start = var.position().max(tx.tx_start());
        let end = var.end().min(tx.tx_end());
        let (Some(lhs), Some(rhs)) = (mapper.cdna_offset(start), mapper.cdna_offset(end)) else {
            tracing::warn!(
                "Could not map {:?} onto exons of {}",
                var,
                tx.transcript_id()
            );
            return Ok(self.coding_record(tx, EffectKind::Unknown, None, None));
        };
        let (first, last) = (lhs.min(rhs), lhs.max(rhs));

        if var.reference().len() == var.alternate().len() {
            // Bases clipped off at the transcript start in transcription orientation.
            let clipped = match tx.strand() {
                Strand::Plus => start - var.position(),
                Strand::Minus => var.end() - end,
            } as usize;
            let alternate = alternate.get(clipped..).unwrap_or_default();
            self.classify_substitution(tx, mapper, first, last, alternate)
        } else {
            let ref_len = var.reference().len();
            self.classify_indel(tx, mapper, first, last, ref_len, &alternate)
        }
    }

    /// Classify a same-length replacement of the spliced offsets `first..=last`.
    fn classify_substitution(
        &self,
        tx: &TranscriptModel,
        mapper: &CodingPositionMapper,
        first: i64,
        last: i64,
        alternate: &[u8],
    ) -> Result<EffectRecord, Error> {
        let cds_length = tx.cds_length() as i64;
        let (lo, hi) = (first.max(0), last.min(cds_length - 1));
        let window_start = lo / 3 * 3;
        let window_end = (hi / 3 + 1) * 3;

        let ref_window = mapper.spliced_sequence(self.genome, window_start, window_end)?;
        let mut alt_window = ref_window.clone();
        for offset in lo..=hi {
            if let (Some(slot), Some(base)) = (
                alt_window.get_mut((offset - window_start) as usize),
                alternate.get((offset - first) as usize),
            ) {
                *slot = *base;
            }
        }

        let reference = translate(&ref_window);
        let alternative = translate(&alt_window);
        let codon_index = (window_start / 3) as u64;
        let ref_stop = first_stop(&reference);
        let alt_stop = first_stop(&alternative);

        let effect = if reference.is_empty()
            || reference.contains(&AminoAcid::Xaa)
            || alternative.contains(&AminoAcid::Xaa)
        {
            EffectKind::CodingUnknown
        } else if reference == alternative {
            EffectKind::Synonymous
        } else if codon_index == 0 {
            EffectKind::NoStart
        } else if ref_stop.is_some() && alt_stop.map_or(true, |alt| Some(alt) > ref_stop) {
            EffectKind::NoEnd
        } else if alt_stop.is_some() {
            EffectKind::Nonsense
        } else {
            EffectKind::Missense
        };

        Ok(self.coding_record(
            tx,
            effect,
            Some(codon_index + 1),
            Some(AminoAcidChange {
                reference,
                alternative,
            }),
        ))
    }

    /// Classify an insertion or deletion of the spliced offsets `first..=last`.
    ///
    /// For insertions, `first` is the offset of the base following the insertion point,
    /// `last` is `first - 1` and `ref_len` is 0.
    fn classify_indel(
        &self,
        tx: &TranscriptModel,
        mapper: &CodingPositionMapper,
        first: i64,
        last: i64,
        ref_len: usize,
        alternate: &[u8],
    ) -> Result<EffectRecord, Error> {
        let is_insertion = ref_len == 0;
        let touches_start = if is_insertion {
            0 < first && first < 3
        } else {
            first <= 2 && last >= 0
        };
        if touches_start {
            return Ok(self.coding_record(tx, EffectKind::NoStart, Some(1), None));
        }

        let protein_position = Some((first / 3) as u64 + 1);
        let delta = alternate.len() as i64 - ref_len as i64;
        if delta % 3 != 0 {
            return Ok(self.coding_record(tx, EffectKind::FrameShift, protein_position, None));
        }

        let window_start = first / 3 * 3;
        let window_end = if is_insertion && first % 3 == 0 {
            window_start
        } else {
            (last.max(first) / 3 + 1) * 3
        };
        let ref_window = mapper.spliced_sequence(self.genome, window_start, window_end)?;
        let head = ((first - window_start) as usize).min(ref_window.len());
        let tail = ((last + 1 - window_start).max(0) as usize).clamp(head, ref_window.len());
        let alt_window = [&ref_window[..head], alternate, &ref_window[tail..]].concat();

        let reference = translate(&ref_window);
        let alternative = translate(&alt_window);
        let ref_stop = first_stop(&reference);
        let alt_stop = first_stop(&alternative);

        let effect = if reference.contains(&AminoAcid::Xaa) || alternative.contains(&AminoAcid::Xaa)
        {
            EffectKind::CodingUnknown
        } else if alt_stop.is_some() && ref_stop.map_or(true, |ref_stop| Some(ref_stop) > alt_stop) {
            EffectKind::NoFrameShiftNewStop
        } else if ref_stop.is_some() && alt_stop.is_none() {
            EffectKind::NoEnd
        } else {
            EffectKind::NoFrameShift
        };

        Ok(self.coding_record(
            tx,
            effect,
            protein_position,
            Some(AminoAcidChange {
                reference,
                alternative,
            }),
        ))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::EffectClassifier;
    use crate::{
        annotate::{
            codon::AminoAcid,
            config::{EngineConfig, EngineConfigBuilder},
            effect::{EffectKind, IntronDetails},
            mapper::CodingPositionMapper,
            reference::{complement, reverse_complement, InMemoryGenome},
            variant::{VariantDescriptor, VariantType},
        },
        error::Error,
        models::{Exon, Strand, TranscriptModel},
    };

    /// Coding sequence `ATG AAA GGC TGG CCC TAA` (Met Lys Gly Trp Pro End).
    const CDS: &[u8] = b"ATGAAAGGCTGGCCCTAA";

    fn config() -> EngineConfig {
        EngineConfigBuilder::default()
            .promoter_length(20)
            .build()
            .expect("valid config")
    }

    /// Exons 101-120, 201-210, 301-330 with the 18 CDS bases starting at 111 (plus) or
    /// 310 (minus), so that codon 3 is split by the first CDS exon boundary on both
    /// strands.  All other bases are `C`.
    fn fixture(strand: Strand) -> (TranscriptModel, InMemoryGenome) {
        let cds = match strand {
            Strand::Plus => (111, 208),
            Strand::Minus => (203, 310),
        };
        let tx = TranscriptModel::new(
            "GENE",
            "NM_000001_1",
            "1",
            strand,
            vec![
                Exon::new(101, 120),
                Exon::new(201, 210),
                Exon::new(301, 330),
            ],
            Some(cds),
        )
        .expect("valid model");
        let genome = painted_genome(&tx);
        (tx, genome)
    }

    /// Single exon 101-130 with the CDS starting at the transcript start.
    fn flush_fixture(strand: Strand) -> (TranscriptModel, InMemoryGenome) {
        let cds = match strand {
            Strand::Plus => (101, 118),
            Strand::Minus => (113, 130),
        };
        let tx = TranscriptModel::new(
            "GENE",
            "NM_000002_1",
            "1",
            strand,
            vec![Exon::new(101, 130)],
            Some(cds),
        )
        .expect("valid model");
        let genome = painted_genome(&tx);
        (tx, genome)
    }

    /// Genome of `C` bases with `CDS` written onto the coding exons of `tx`.
    fn painted_genome(tx: &TranscriptModel) -> InMemoryGenome {
        let mut bases = vec![b'C'; 400];
        let mapper = CodingPositionMapper::new(tx, 0);
        for (offset, base) in CDS.iter().enumerate() {
            let pos = mapper
                .genomic_position(offset as i64)
                .expect("CDS is exonic");
            bases[(pos - 1) as usize] = match tx.strand() {
                Strand::Plus => *base,
                Strand::Minus => complement(*base),
            };
        }
        InMemoryGenome::from_sequences([("1", bases)])
    }

    /// Genomic position of the given CDS offset.
    fn pos_of(tx: &TranscriptModel, offset: i64) -> u64 {
        CodingPositionMapper::new(tx, 0)
            .genomic_position(offset)
            .expect("exonic")
    }

    /// Forward strand base for a base given in transcript orientation.
    fn fwd(strand: Strand, base: u8) -> char {
        match strand {
            Strand::Plus => base as char,
            Strand::Minus => complement(base) as char,
        }
    }

    fn classify(
        tx: &TranscriptModel,
        genome: &InMemoryGenome,
        var: &VariantDescriptor,
    ) -> (EffectKind, Option<u64>, Option<String>) {
        let config = config();
        let classifier = EffectClassifier::new(genome, &config);
        let record = classifier
            .classify(var, tx)
            .expect("classification works")
            .expect("variant touches transcript");
        (
            record.effect,
            record.protein_position,
            record.aa_change.map(|c| c.to_string()),
        )
    }

    fn snv(tx: &TranscriptModel, offset: i64, alt_tx: u8) -> VariantDescriptor {
        let pos = pos_of(tx, offset);
        let strand = tx.strand();
        let ref_base = fwd(strand, CDS[offset as usize]).to_string();
        VariantDescriptor::from_alleles("1", pos, &ref_base, &fwd(strand, alt_tx).to_string())
            .expect("valid variant")
    }

    #[rstest::rstest]
    #[case::synonymous(5, b'G', EffectKind::Synonymous, 2, "Lys->Lys")]
    #[case::missense(6, b'C', EffectKind::Missense, 3, "Gly->Arg")]
    #[case::nonsense(11, b'A', EffectKind::Nonsense, 4, "Trp->End")]
    #[case::no_start(2, b'A', EffectKind::NoStart, 1, "Met->Ile")]
    #[case::no_end(15, b'C', EffectKind::NoEnd, 6, "End->Gln")]
    #[case::stop_retained(17, b'G', EffectKind::Synonymous, 6, "End->End")]
    fn substitution(
        #[values(Strand::Plus, Strand::Minus)] strand: Strand,
        #[case] offset: i64,
        #[case] alt_tx: u8,
        #[case] effect: EffectKind,
        #[case] protein_position: u64,
        #[case] aa_change: &str,
    ) {
        let (tx, genome) = fixture(strand);
        let var = snv(&tx, offset, alt_tx);

        assert_eq!(
            classify(&tx, &genome, &var),
            (effect, Some(protein_position), Some(aa_change.to_string()))
        );
    }

    /// Replacement of the CDS bases from `offset` on with `alt_tx`, in transcript orientation.
    fn mnv(tx: &TranscriptModel, offset: i64, alt_tx: &str) -> VariantDescriptor {
        let last = offset + alt_tx.len() as i64 - 1;
        let ref_tx = String::from_utf8_lossy(&CDS[offset as usize..=last as usize]).to_string();
        let (pos, reference, alternative) = match tx.strand() {
            Strand::Plus => (pos_of(tx, offset), ref_tx, alt_tx.to_string()),
            Strand::Minus => (
                pos_of(tx, last),
                reverse_complement(&ref_tx),
                reverse_complement(alt_tx),
            ),
        };
        VariantDescriptor::from_alleles("1", pos, &reference, &alternative)
            .expect("valid variant")
    }

    #[rstest::rstest]
    #[case::synonymous(5, "GGGT", EffectKind::Synonymous, 2, "LysGly->LysGly")]
    #[case::missense(5, "TT", EffectKind::Missense, 2, "LysGly->AsnCys")]
    #[case::nonsense(10, "AA", EffectKind::Nonsense, 4, "Trp->End")]
    #[case::no_start(1, "CA", EffectKind::NoStart, 1, "Met->Thr")]
    #[case::no_end(15, "CC", EffectKind::NoEnd, 6, "End->Pro")]
    fn complex(
        #[values(Strand::Plus, Strand::Minus)] strand: Strand,
        #[case] offset: i64,
        #[case] alt_tx: &str,
        #[case] effect: EffectKind,
        #[case] protein_position: u64,
        #[case] aa_change: &str,
    ) {
        let (tx, genome) = fixture(strand);
        let var = mnv(&tx, offset, alt_tx);

        assert_eq!(var.variant_type(), VariantType::Complex);
        assert_eq!(
            classify(&tx, &genome, &var),
            (effect, Some(protein_position), Some(aa_change.to_string()))
        );
    }

    #[rstest::rstest]
    #[case::plus(Strand::Plus, 100, "CA", "GC")]
    #[case::minus(Strand::Minus, 130, "TC", "GG")]
    fn complex_across_transcript_start(
        #[case] strand: Strand,
        #[case] pos: u64,
        #[case] reference: &str,
        #[case] alternative: &str,
    ) {
        let (tx, genome) = flush_fixture(strand);
        // The promoter base is clipped, ATG becomes CTG.
        let var = VariantDescriptor::from_alleles("1", pos, reference, alternative)
            .expect("valid variant");

        assert_eq!(
            classify(&tx, &genome, &var),
            (EffectKind::NoStart, Some(1), Some("Met->Leu".to_string()))
        );
    }

    #[rstest::rstest]
    fn codon_across_exon_boundary(#[values(Strand::Plus, Strand::Minus)] strand: Strand) {
        let (tx, genome) = fixture(strand);
        // TGG -> TTG
        let var = snv(&tx, 10, b'T');

        assert_eq!(
            classify(&tx, &genome, &var),
            (EffectKind::Missense, Some(4), Some("Trp->Leu".to_string()))
        );
    }

    #[rstest::rstest]
    #[case::one(1, EffectKind::FrameShift)]
    #[case::two(2, EffectKind::FrameShift)]
    #[case::three(3, EffectKind::NoFrameShift)]
    #[case::four(4, EffectKind::FrameShift)]
    #[case::six(6, EffectKind::NoFrameShift)]
    fn insertion_frame(
        #[values(Strand::Plus, Strand::Minus)] strand: Strand,
        #[case] length: usize,
        #[case] effect: EffectKind,
    ) {
        let (tx, genome) = fixture(strand);
        // Insert "GCG..." before CDS offset 6, between codons Lys and Gly.
        let inserted = "GCG".repeat(2)[..length].to_string();
        let var = match strand {
            Strand::Plus => VariantDescriptor::from_alleles("1", pos_of(&tx, 6), "", &inserted),
            Strand::Minus => VariantDescriptor::from_alleles(
                "1",
                pos_of(&tx, 5),
                "",
                &reverse_complement(&inserted),
            ),
        }
        .expect("valid variant");

        let (kind, protein_position, _) = classify(&tx, &genome, &var);
        assert_eq!(kind, effect);
        assert_eq!(protein_position, Some(3));
    }

    #[rstest::rstest]
    fn insertion_new_stop(#[values(Strand::Plus, Strand::Minus)] strand: Strand) {
        let (tx, genome) = fixture(strand);
        let inserted = "TAG";
        let var = match strand {
            Strand::Plus => VariantDescriptor::from_alleles("1", pos_of(&tx, 7), "", inserted),
            Strand::Minus => VariantDescriptor::from_alleles(
                "1",
                pos_of(&tx, 6),
                "",
                &reverse_complement(inserted),
            ),
        }
        .expect("valid variant");

        // G|GC becomes GTA GGC, no stop in frame.
        assert_eq!(
            classify(&tx, &genome, &var),
            (
                EffectKind::NoFrameShift,
                Some(3),
                Some("Gly->ValGly".to_string())
            )
        );

        let var = match strand {
            Strand::Plus => VariantDescriptor::from_alleles("1", pos_of(&tx, 6), "", inserted),
            Strand::Minus => VariantDescriptor::from_alleles(
                "1",
                pos_of(&tx, 5),
                "",
                &reverse_complement(inserted),
            ),
        }
        .expect("valid variant");
        assert_eq!(
            classify(&tx, &genome, &var),
            (
                EffectKind::NoFrameShiftNewStop,
                Some(3),
                Some("->End".to_string())
            )
        );
    }

    #[rstest::rstest]
    #[case::one_base(6, 6, EffectKind::FrameShift, 3, None)]
    #[case::codon(6, 8, EffectKind::NoFrameShift, 3, Some("Gly->"))]
    #[case::straddling(7, 9, EffectKind::NoFrameShift, 3, Some("GlyTrp->Gly"))]
    #[case::stop_lost(15, 17, EffectKind::NoEnd, 6, Some("End->"))]
    #[case::start(0, 2, EffectKind::NoStart, 1, None)]
    fn deletion(
        #[values(Strand::Plus, Strand::Minus)] strand: Strand,
        #[case] first: i64,
        #[case] last: i64,
        #[case] effect: EffectKind,
        #[case] protein_position: u64,
        #[case] aa_change: Option<&str>,
    ) {
        let (tx, genome) = fixture(strand);
        let (lhs, rhs) = (pos_of(&tx, first), pos_of(&tx, last));
        let (start, end) = (lhs.min(rhs), lhs.max(rhs));
        let reference = genome_bases(&genome, start, end);
        let var = VariantDescriptor::from_alleles("1", start, &reference, "").expect("valid");

        assert_eq!(
            classify(&tx, &genome, &var),
            (
                effect,
                Some(protein_position),
                aa_change.map(str::to_string)
            )
        );
    }

    fn genome_bases(genome: &InMemoryGenome, start: u64, end: u64) -> String {
        use crate::annotate::reference::SequenceAccessor;
        genome.sequence("1", start, end).expect("in range")
    }

    #[test]
    fn ambiguous_base_is_coding_unknown() {
        let (tx, genome) = fixture(Strand::Plus);
        let var = snv(&tx, 4, b'N');

        let (kind, position, _) = classify(&tx, &genome, &var);
        assert_eq!(kind, EffectKind::CodingUnknown);
        assert_eq!(position, Some(2));
        assert_eq!(AminoAcid::Xaa.to_string(), "Xaa");
    }

    #[rstest::rstest]
    #[case::five_prime_utr(105, EffectKind::FivePrimeUtr)]
    #[case::three_prime_utr(325, EffectKind::ThreePrimeUtr)]
    #[case::promoter(95, EffectKind::Promoter)]
    #[case::intron(150, EffectKind::Intron)]
    #[case::splice_donor(121, EffectKind::SpliceSite)]
    #[case::splice_acceptor(300, EffectKind::SpliceSite)]
    fn non_coding_regions(#[case] pos: u64, #[case] effect: EffectKind) {
        let (tx, genome) = fixture(Strand::Plus);
        let var = VariantDescriptor::from_alleles("1", pos, "C", "A").expect("valid");

        let (kind, protein_position, aa_change) = classify(&tx, &genome, &var);
        assert_eq!(kind, effect);
        assert_eq!(protein_position, None);
        assert_eq!(aa_change, None);
    }

    #[test]
    fn intron_details() {
        let (tx, genome) = fixture(Strand::Minus);
        let config = config();
        let classifier = EffectClassifier::new(&genome, &config);
        let var = VariantDescriptor::from_alleles("1", 150, "C", "A").expect("valid");

        let record = classifier
            .classify(&var, &tx)
            .expect("works")
            .expect("touches");

        assert_eq!(record.effect, EffectKind::Intron);
        assert_eq!(
            record.intron,
            Some(IntronDetails {
                which_intron: 2,
                how_many_introns: 2,
                dist_from_donor: 51,
                dist_from_acceptor: 30,
                intron_length: 80,
            })
        );
    }

    #[test]
    fn outside_footprint() {
        let (tx, genome) = fixture(Strand::Plus);
        let config = config();
        let classifier = EffectClassifier::new(&genome, &config);

        for pos in [50, 331, 360] {
            let var = VariantDescriptor::from_alleles("1", pos, "C", "A").expect("valid");
            assert_eq!(classifier.classify(&var, &tx).expect("works"), None);
        }
        let var = VariantDescriptor::from_alleles("2", 150, "C", "A").expect("valid");
        assert_eq!(classifier.classify(&var, &tx).expect("works"), None);
    }

    #[test]
    fn insertion_at_cds_start_is_utr() {
        let (tx, genome) = fixture(Strand::Plus);
        let var = VariantDescriptor::from_alleles("1", 111, "", "A").expect("valid");

        assert_eq!(classify(&tx, &genome, &var).0, EffectKind::FivePrimeUtr);

        let var = VariantDescriptor::from_alleles("1", 112, "", "A").expect("valid");
        assert_eq!(classify(&tx, &genome, &var).0, EffectKind::NoStart);
    }

    #[rstest::rstest]
    #[case::exonic(115, 130, VariantType::LargeDuplication, EffectKind::CnvPlus)]
    #[case::exonic_loss(90, 400, VariantType::LargeDeletion, EffectKind::CnvMinus)]
    #[case::intronic(130, 180, VariantType::LargeDeletion, EffectKind::Intron)]
    fn cnv(
        #[case] start: u64,
        #[case] end: u64,
        #[case] variant_type: VariantType,
        #[case] effect: EffectKind,
    ) {
        let (tx, genome) = fixture(Strand::Plus);
        let var = VariantDescriptor::cnv("1", start, end, variant_type).expect("valid");

        assert_eq!(classify(&tx, &genome, &var), (effect, None, None));
    }

    #[test]
    fn non_coding_transcript() -> Result<(), anyhow::Error> {
        let tx = TranscriptModel::new(
            "LINC",
            "NR_000001_1",
            "1",
            Strand::Plus,
            vec![Exon::new(101, 120), Exon::new(201, 210)],
            None,
        )?;
        let genome = InMemoryGenome::from_sequences([("1", vec![b'C'; 400])]);

        let exonic = VariantDescriptor::from_alleles("1", 110, "C", "A")?;
        let intronic = VariantDescriptor::from_alleles("1", 150, "C", "A")?;
        let splice = VariantDescriptor::from_alleles("1", 122, "C", "A")?;
        assert_eq!(classify(&tx, &genome, &exonic).0, EffectKind::NonCoding);
        assert_eq!(
            classify(&tx, &genome, &intronic).0,
            EffectKind::NonCodingIntron
        );
        assert_eq!(classify(&tx, &genome, &splice).0, EffectKind::SpliceSite);

        Ok(())
    }

    #[test]
    fn missing_sequence_is_classification_failure() {
        let (tx, _) = fixture(Strand::Plus);
        let genome = InMemoryGenome::from_sequences([("1", vec![b'C'; 150])]);
        let config = config();
        let classifier = EffectClassifier::new(&genome, &config);
        let var = VariantDescriptor::from_alleles("1", pos_of(&tx, 12), "C", "A").expect("valid");

        let result = classifier.classify(&var, &tx);

        assert!(matches!(
            result,
            Err(Error::ClassificationFailure { transcript_id, source })
                if transcript_id == "NM_000001_1"
                    && matches!(*source, Error::PositionOutOfRange { .. })
        ));
    }
}
