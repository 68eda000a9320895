//! The standard genetic code.

use hgvs::sequences::{translate_cds, TranslationTable};

/// Amino acids, with `End` for the stop codon and `Xaa` for untranslatable codons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    parse_display::Display,
    parse_display::FromStr,
    strum::EnumIter,
)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    End,
    Xaa,
}

impl AminoAcid {
    /// Map a one-letter code (`*` for stop) to the amino acid.
    pub fn from_one_letter(code: u8) -> Self {
        match code {
            b'A' => AminoAcid::Ala,
            b'R' => AminoAcid::Arg,
            b'N' => AminoAcid::Asn,
            b'D' => AminoAcid::Asp,
            b'C' => AminoAcid::Cys,
            b'Q' => AminoAcid::Gln,
            b'E' => AminoAcid::Glu,
            b'G' => AminoAcid::Gly,
            b'H' => AminoAcid::His,
            b'I' => AminoAcid::Ile,
            b'L' => AminoAcid::Leu,
            b'K' => AminoAcid::Lys,
            b'M' => AminoAcid::Met,
            b'F' => AminoAcid::Phe,
            b'P' => AminoAcid::Pro,
            b'S' => AminoAcid::Ser,
            b'T' => AminoAcid::Thr,
            b'W' => AminoAcid::Trp,
            b'Y' => AminoAcid::Tyr,
            b'V' => AminoAcid::Val,
            b'*' => AminoAcid::End,
            _ => AminoAcid::Xaa,
        }
    }

    pub fn is_stop(&self) -> bool {
        *self == AminoAcid::End
    }
}

/// Translate one codon, `Xaa` if it contains ambiguous bases or is incomplete.
pub fn translate_codon(codon: &[u8]) -> AminoAcid {
    if codon.len() != 3 {
        return AminoAcid::Xaa;
    }
    translate_cds_str(&codon.to_ascii_uppercase())
        .and_then(|aa| aa.bytes().next())
        .map_or(AminoAcid::Xaa, AminoAcid::from_one_letter)
}

/// Translate the complete codons of `seq`, a trailing partial codon is ignored.
pub fn translate(seq: &[u8]) -> Vec<AminoAcid> {
    let complete = &seq[..seq.len() / 3 * 3];
    match translate_cds_str(&complete.to_ascii_uppercase()) {
        Some(residues) if residues.len() * 3 == complete.len() => {
            residues.bytes().map(AminoAcid::from_one_letter).collect()
        }
        // Fall back to single codons so that one bad codon only spoils its residue.
        _ => complete.chunks_exact(3).map(translate_codon).collect(),
    }
}

/// One-letter translation with the standard code and `*` for stop codons.
fn translate_cds_str(seq: &[u8]) -> Option<String> {
    let seq = std::str::from_utf8(seq).ok()?;
    translate_cds(seq, true, "*", TranslationTable::Standard)
        .map_err(|e| tracing::trace!("could not translate {}: {}", seq, e))
        .ok()
}
