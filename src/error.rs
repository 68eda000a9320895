//! Error type of the annotation library.
//!
//! The command line layer wraps these into `anyhow::Error` with context.

/// Errors raised by sequence access, transcript model handling and effect classification.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The chromosome is not known to the sequence accessor.
    #[error("chromosome not found: {0}")]
    ChromosomeNotFound(String),
    /// The requested range does not fit into the chromosome.
    #[error(
        "range {start}-{end} is out of range for chromosome {chromosome} of length {length}"
    )]
    PositionOutOfRange {
        chromosome: String,
        start: u64,
        end: u64,
        length: u64,
    },
    /// A transcript model violates one of its structural invariants.
    #[error("invalid gene model {transcript_id}: {reason}")]
    InvalidGeneModel {
        transcript_id: String,
        reason: String,
    },
    /// Lookup of a transcript by its identifier failed.
    #[error("transcript not found: {0}")]
    TranscriptNotFound(String),
    /// Classification of a variant against one transcript failed.
    #[error("classification failed for transcript {transcript_id}: {source}")]
    ClassificationFailure {
        transcript_id: String,
        #[source]
        source: Box<Error>,
    },
    /// Variant notation could not be parsed or normalized.
    #[error("invalid variant: {0}")]
    InvalidVariant(String),
    /// Problem reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Error;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::ChromosomeNotFound("chrUn".into()).to_string(),
            "chromosome not found: chrUn"
        );
        assert_eq!(
            Error::PositionOutOfRange {
                chromosome: "1".into(),
                start: 99,
                end: 120,
                length: 100,
            }
            .to_string(),
            "range 99-120 is out of range for chromosome 1 of length 100"
        );
    }

    #[test]
    fn classification_failure_keeps_source() {
        let err = Error::ClassificationFailure {
            transcript_id: "NM_000001_1".into(),
            source: Box::new(Error::ChromosomeNotFound("22".into())),
        };

        assert_eq!(
            err.to_string(),
            "classification failed for transcript NM_000001_1: chromosome not found: 22"
        );
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("chromosome not found: 22"));
    }
}
