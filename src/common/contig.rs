//! Contig name harmonization.
//!
//! Gene model tables and reference FASTA files do not always agree on how chromosomes
//! are called, e.g., `1`, `chr1` or `NC_000001.10`.  All names are resolved to the
//! primary name of the assembly (`1`, `X`, `MT`) before lookup.

use std::collections::HashMap;

use biocommons_bioutils::assemblies::{Assembly, ASSEMBLY_INFOS};
use once_cell::sync::Lazy;
use strum::IntoEnumIterator;

use super::GenomeRelease;

/// Resolves all known aliases of the primary assembly sequences to their primary names.
#[derive(Debug, Clone, Default)]
pub struct ContigManager {
    /// Mapping from any known alias (e.g., "chr1", "NC_000001.10") to the primary name.
    alias_to_name: HashMap<String, String>,
}

impl ContigManager {
    /// Create a manager for the given genome releases.
    ///
    /// RefSeq accessions carry the assembly version, so the aliases of several releases
    /// never collide.
    pub fn new<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = GenomeRelease>,
    {
        let mut alias_to_name = HashMap::new();
        for release in releases {
            for seq in &ASSEMBLY_INFOS[Assembly::from(release)].sequences {
                // Skip non-primary sequences, but keep chrMT.
                if !["Primary Assembly", "non-nuclear"].contains(&&*seq.assembly_unit)
                    || seq.sequence_role != "assembled-molecule"
                {
                    continue;
                }
                let name = seq.name.clone();
                alias_to_name.insert(seq.refseq_ac.clone(), name.clone());
                for alias in &seq.aliases {
                    alias_to_name.insert(alias.clone(), name.clone());
                }
                alias_to_name
                    .entry(format!("chr{}", name))
                    .or_insert_with(|| name.clone());
                alias_to_name.insert(name.clone(), name);
            }
        }

        if let Some(mt) = alias_to_name.get("chrMT").cloned() {
            alias_to_name.insert(String::from("M"), mt.clone());
            alias_to_name.insert(String::from("chrM"), mt);
        }

        tracing::trace!("Built contig manager with {} aliases", alias_to_name.len());
        Self { alias_to_name }
    }

    /// Return the primary name for `alias`.
    ///
    /// Contigs outside the primary assemblies lose their `chr` prefix.
    pub fn canonical_name<'a>(&'a self, alias: &'a str) -> &'a str {
        if let Some(name) = self.alias_to_name.get(alias) {
            return name;
        }
        match alias.strip_prefix("chr").unwrap_or(alias) {
            "M" => "MT",
            stripped => stripped,
        }
    }
}

/// Aliases of all supported genome releases.
static CONTIGS: Lazy<ContigManager> = Lazy::new(|| ContigManager::new(GenomeRelease::iter()));

/// Return the primary name of the contig, resolved with all supported releases.
pub fn canonical_name(name: &str) -> &str {
    CONTIGS.canonical_name(name)
}

/// Return whether the two names refer to the same contig.
pub fn same_contig(lhs: &str, rhs: &str) -> bool {
    lhs == rhs || canonical_name(lhs) == canonical_name(rhs)
}
