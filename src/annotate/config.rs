//! Engine constants tied to a genome release.

use std::path::Path;

use crate::common::{io::std::open_read_maybe_gz, GenomeRelease};

/// Default number of intronic bases next to an exon that count as splice site.
pub const DEFAULT_SPLICE_SITE_LENGTH: u64 = 2;

/// Default number of bases before the transcript start that count as promoter.
pub const DEFAULT_PROMOTER_LENGTH: u64 = 5_000;

/// Constants of the effect classification.
///
/// These are data of an annotation run rather than options of individual calls, so that
/// all annotations of a run use the same values.
#[derive(
    Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_builder::Builder,
)]
#[builder(pattern = "immutable")]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Name of the configuration, e.g., the genome release it was made for.
    #[builder(default = "String::from(\"custom\")", setter(into))]
    pub name: String,
    /// Number of intronic bases at each exon/intron boundary that form the splice site.
    #[builder(default = "DEFAULT_SPLICE_SITE_LENGTH")]
    pub splice_site_length: u64,
    /// Number of bases before the transcript start that form the promoter.
    #[builder(default = "DEFAULT_PROMOTER_LENGTH")]
    pub promoter_length: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_release(GenomeRelease::default())
    }
}

impl EngineConfig {
    /// Preset for the given genome release.
    pub fn for_release(release: GenomeRelease) -> Self {
        match release {
            GenomeRelease::Grch37 | GenomeRelease::Grch38 => Self {
                name: release.name(),
                splice_site_length: DEFAULT_SPLICE_SITE_LENGTH,
                promoter_length: DEFAULT_PROMOTER_LENGTH,
            },
        }
    }

    /// Load from a YAML file.
    pub fn from_path<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not open config {:?}: {}", path.as_ref(), e)
        })?;
        let config: Self = serde_yaml::from_reader(reader).map_err(|e| {
            anyhow::anyhow!("could not parse config {:?}: {}", path.as_ref(), e)
        })?;
        tracing::debug!("Loaded engine config {:?}", &config);
        Ok(config)
    }
}
