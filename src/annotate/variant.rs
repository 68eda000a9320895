//! Variant descriptors and their CSHL and VCF-style notations.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{all_consuming, map, value},
    IResult, Parser,
};
use parse_display::Display;

use crate::error::Error;

use super::reference::SequenceAccessor;

/// Kind of a sequence change.
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
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VariantType {
    Substitution,
    Insertion,
    Deletion,
    Complex,
    LargeDuplication,
    LargeDeletion,
}

impl VariantType {
    /// Whether this is a copy number change described by a region.
    pub fn is_cnv(&self) -> bool {
        matches!(self, VariantType::LargeDuplication | VariantType::LargeDeletion)
    }
}

/// A variant in CSHL notation, without its location.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CshlVariant {
    #[display("sub({reference}->{alternative})")]
    Substitution {
        reference: String,
        alternative: String,
    },
    #[display("ins({bases})")]
    Insertion { bases: String },
    #[display("del({length})")]
    Deletion { length: u64 },
    #[display("complex({reference}->{alternative})")]
    Complex {
        reference: String,
        alternative: String,
    },
    #[display("CNV+")]
    CnvPlus,
    #[display("CNV-")]
    CnvMinus,
}

mod parse {
    use nom::{
        bytes::complete::take_while1, character::complete::digit1, combinator::map_res, IResult,
        Parser,
    };

    pub static NA_IUPAC: &str = "ACGTURYMKWSBDHVNacgturymkwsbdhvn";

    pub fn na1(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| NA_IUPAC.contains(c)).parse(input)
    }

    pub fn count(input: &str) -> IResult<&str, u64> {
        map_res(digit1, |s: &str| s.parse::<u64>()).parse(input)
    }
}

impl CshlVariant {
    pub fn parse(input: &str) -> IResult<&str, Self> {
        all_consuming(alt((
            Self::parse_substitution,
            Self::parse_insertion,
            Self::parse_deletion,
            Self::parse_complex,
            Self::parse_cnv,
        )))
        .parse(input)
    }

    fn parse_substitution(input: &str) -> IResult<&str, Self> {
        map(
            (tag("sub("), parse::na1, tag("->"), parse::na1, tag(")")),
            |(_, reference, _, alternative, _)| CshlVariant::Substitution {
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            },
        )
        .parse(input)
    }

    fn parse_insertion(input: &str) -> IResult<&str, Self> {
        map((tag("ins("), parse::na1, tag(")")), |(_, bases, _)| {
            CshlVariant::Insertion {
                bases: bases.to_string(),
            }
        })
        .parse(input)
    }

    fn parse_deletion(input: &str) -> IResult<&str, Self> {
        map((tag("del("), parse::count, tag(")")), |(_, length, _)| {
            CshlVariant::Deletion { length }
        })
        .parse(input)
    }

    fn parse_complex(input: &str) -> IResult<&str, Self> {
        map(
            (
                tag("complex("),
                parse::na1,
                tag("->"),
                parse::na1,
                tag(")"),
            ),
            |(_, reference, _, alternative, _)| CshlVariant::Complex {
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            },
        )
        .parse(input)
    }

    fn parse_cnv(input: &str) -> IResult<&str, Self> {
        alt((
            value(CshlVariant::CnvPlus, tag("CNV+")),
            value(CshlVariant::CnvMinus, tag("CNV-")),
        ))
        .parse(input)
    }
}

impl FromStr for CshlVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .map(|(_, value)| value)
            .map_err(|e| Error::InvalidVariant(format!("cannot parse {:?}: {}", s, e)))
    }
}

/// Parse a CSHL location, `chrom:pos` or `chrom:start-end`.
fn parse_location(location: &str) -> Result<(String, u64, Option<u64>), Error> {
    let invalid = || Error::InvalidVariant(format!("invalid location {:?}", location));
    let (chromosome, range) = location.rsplit_once(':').ok_or_else(invalid)?;
    if chromosome.is_empty() {
        return Err(invalid());
    }
    let parse_pos = |s: &str| s.trim().parse::<u64>().map_err(|_| invalid());
    match range.split_once('-') {
        Some((start, end)) => Ok((chromosome.to_string(), parse_pos(start)?, Some(parse_pos(end)?))),
        None => Ok((chromosome.to_string(), parse_pos(range)?, None)),
    }
}

fn check_bases(bases: &str) -> Result<(), Error> {
    if bases.chars().all(|c| parse::NA_IUPAC.contains(c)) {
        Ok(())
    } else {
        Err(Error::InvalidVariant(format!(
            "invalid nucleotides in {:?}",
            bases
        )))
    }
}

/// Normalized description of one sequence change.
///
/// Positions are 1-based.  For insertions, `position` is the base following the insertion
/// point and `end` is the base preceding it.  Copy number changes carry their region in
/// `position` and `end` and have no bases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct VariantDescriptor {
    variant_type: VariantType,
    chromosome: String,
    position: u64,
    end: u64,
    reference: String,
    alternate: String,
}

impl VariantDescriptor {
    /// Construct from VCF-style alleles, trimming the shared prefix and suffix.
    ///
    /// Empty alleles are allowed, so `("1", 100, "", "T")` is an insertion before base 100.
    pub fn from_alleles(
        chromosome: &str,
        position: u64,
        reference: &str,
        alternate: &str,
    ) -> Result<Self, Error> {
        if chromosome.is_empty() {
            return Err(Error::InvalidVariant(String::from("empty chromosome name")));
        }
        if position == 0 {
            return Err(Error::InvalidVariant(format!(
                "position of {}:{} is not 1-based",
                chromosome, position
            )));
        }
        let reference = reference.to_ascii_uppercase();
        let alternate = alternate.to_ascii_uppercase();
        check_bases(&reference)?;
        check_bases(&alternate)?;

        let (ref_bytes, alt_bytes) = (reference.as_bytes(), alternate.as_bytes());
        let prefix = ref_bytes
            .iter()
            .zip(alt_bytes)
            .take_while(|(r, a)| r == a)
            .count();
        let (ref_bytes, alt_bytes) = (&ref_bytes[prefix..], &alt_bytes[prefix..]);
        let suffix = ref_bytes
            .iter()
            .rev()
            .zip(alt_bytes.iter().rev())
            .take_while(|(r, a)| r == a)
            .count();
        let ref_trimmed = &reference[prefix..reference.len() - suffix];
        let alt_trimmed = &alternate[prefix..alternate.len() - suffix];

        let variant_type = match (ref_trimmed.len(), alt_trimmed.len()) {
            (0, 0) => {
                return Err(Error::InvalidVariant(format!(
                    "{}:{} {}>{} does not change the sequence",
                    chromosome, position, reference, alternate
                )))
            }
            (0, _) => VariantType::Insertion,
            (_, 0) => VariantType::Deletion,
            (1, 1) => VariantType::Substitution,
            _ => VariantType::Complex,
        };
        let position = position + prefix as u64;

        Ok(Self {
            variant_type,
            chromosome: chromosome.to_string(),
            position,
            end: position + ref_trimmed.len() as u64 - 1,
            reference: ref_trimmed.to_string(),
            alternate: alt_trimmed.to_string(),
        })
    }

    /// Construct a copy number change covering `start..=end`.
    pub fn cnv(
        chromosome: &str,
        start: u64,
        end: u64,
        variant_type: VariantType,
    ) -> Result<Self, Error> {
        if !variant_type.is_cnv() {
            return Err(Error::InvalidVariant(format!(
                "{} is not a copy number change",
                variant_type
            )));
        }
        if chromosome.is_empty() || start == 0 || start > end {
            return Err(Error::InvalidVariant(format!(
                "invalid CNV region {}:{}-{}",
                chromosome, start, end
            )));
        }
        Ok(Self {
            variant_type,
            chromosome: chromosome.to_string(),
            position: start,
            end,
            reference: String::new(),
            alternate: String::new(),
        })
    }

    /// Construct from a CSHL location and variant.
    ///
    /// The deleted bases of `del(N)` are read from the genome.
    pub fn from_cshl<G>(location: &str, variant: &str, genome: &G) -> Result<Self, Error>
    where
        G: SequenceAccessor + ?Sized,
    {
        let (chromosome, position, end) = parse_location(location)?;
        let variant = variant.trim().parse::<CshlVariant>()?;

        match (&variant, end) {
            (CshlVariant::CnvPlus, Some(end)) => {
                Self::cnv(&chromosome, position, end, VariantType::LargeDuplication)
            }
            (CshlVariant::CnvMinus, Some(end)) => {
                Self::cnv(&chromosome, position, end, VariantType::LargeDeletion)
            }
            (CshlVariant::CnvPlus | CshlVariant::CnvMinus, None) => Err(Error::InvalidVariant(
                format!("{} requires a region, got {:?}", variant, location),
            )),
            (_, Some(_)) => Err(Error::InvalidVariant(format!(
                "{} requires a single position, got {:?}",
                variant, location
            ))),
            (
                CshlVariant::Substitution {
                    reference,
                    alternative,
                },
                None,
            ) => {
                if reference.len() != 1 || alternative.len() != 1 {
                    return Err(Error::InvalidVariant(format!(
                        "{} must replace one base",
                        variant
                    )));
                }
                Self::from_alleles(&chromosome, position, reference, alternative)
            }
            (
                CshlVariant::Complex {
                    reference,
                    alternative,
                },
                None,
            ) => Self::from_alleles(&chromosome, position, reference, alternative),
            (CshlVariant::Insertion { bases }, None) => {
                Self::from_alleles(&chromosome, position, "", bases)
            }
            (CshlVariant::Deletion { length }, None) => {
                if *length == 0 {
                    return Err(Error::InvalidVariant(String::from("del(0) deletes nothing")));
                }
                let end = position.checked_add(length - 1).ok_or_else(|| {
                    Error::InvalidVariant(format!("{} is too long for {}", variant, location))
                })?;
                let reference = genome.sequence(&chromosome, position, end)?;
                Self::from_alleles(&chromosome, position, &reference, "")
            }
        }
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Leftmost affected base, the base following the insertion point for insertions.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Rightmost affected base, the base preceding the insertion point for insertions.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn is_insertion(&self) -> bool {
        self.variant_type == VariantType::Insertion
    }

    /// Genomic interval touched by the variant, both flanking bases for insertions.
    pub fn affected_range(&self) -> (u64, u64) {
        if self.is_insertion() {
            (self.position.saturating_sub(1).max(1), self.position)
        } else {
            (self.position, self.end)
        }
    }

    /// Return the equivalent indel shifted to its leftmost position.
    ///
    /// Other variant types are returned unchanged.
    pub fn left_normalized<G>(&self, genome: &G) -> Result<Self, Error>
    where
        G: SequenceAccessor + ?Sized,
    {
        let mut bases = match self.variant_type {
            VariantType::Insertion => self.alternate.as_bytes().to_vec(),
            VariantType::Deletion => self.reference.as_bytes().to_vec(),
            _ => return Ok(self.clone()),
        };

        let mut position = self.position;
        while position > 1 {
            let prev = genome.sequence(&self.chromosome, position - 1, position - 1)?;
            if prev.as_bytes().first() != bases.last() {
                break;
            }
            bases.rotate_right(1);
            position -= 1;
        }
        if position == self.position {
            return Ok(self.clone());
        }

        let bases = String::from_utf8_lossy(&bases).to_string();
        let mut result = self.clone();
        result.position = position;
        if self.variant_type == VariantType::Insertion {
            result.end = position - 1;
            result.alternate = bases;
        } else {
            result.end = position + bases.len() as u64 - 1;
            result.reference = bases;
        }
        Ok(result)
    }

    /// Render as CSHL `(location, variant)`.
    pub fn to_cshl(&self) -> (String, String) {
        let variant = match self.variant_type {
            VariantType::Substitution => CshlVariant::Substitution {
                reference: self.reference.clone(),
                alternative: self.alternate.clone(),
            },
            VariantType::Insertion => CshlVariant::Insertion {
                bases: self.alternate.clone(),
            },
            VariantType::Deletion => CshlVariant::Deletion {
                length: self.reference.len() as u64,
            },
            VariantType::Complex => CshlVariant::Complex {
                reference: self.reference.clone(),
                alternative: self.alternate.clone(),
            },
            VariantType::LargeDuplication => CshlVariant::CnvPlus,
            VariantType::LargeDeletion => CshlVariant::CnvMinus,
        };
        let location = if self.variant_type.is_cnv() {
            format!("{}:{}-{}", self.chromosome, self.position, self.end)
        } else {
            format!("{}:{}", self.chromosome, self.position)
        };
        (location, variant.to_string())
    }
}
