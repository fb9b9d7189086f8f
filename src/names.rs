//! Identifier normalisation shared by every report reader.
//!
//! bbtools reports file paths, CheckM reports file stems with dotted
//! accession versions, and dRep reports file names. All of them are mapped
//! onto the same underscore form before any join.

/// FASTA extensions stripped from identifiers, longest first.
const FASTA_EXTENSIONS: &[&str] = &[
    ".fasta.gz",
    ".fna.gz",
    ".fa.gz",
    ".fasta",
    ".fna",
    ".fa",
];

pub const DEFAULT_BIN_MARKER: &str = "_bin_";

/// Canonical identifier for a genome or bin label.
///
/// ```
/// use magician::names::normalize_id;
/// assert_eq!(normalize_id("sample13.bin.1"), "sample13_bin_1");
/// assert_eq!(normalize_id("bins/test_hiseq_2500.bin.6.fa"), "test_hiseq_2500_bin_6");
/// assert_eq!(normalize_id("test_hiseq_2500_bin_6"), "test_hiseq_2500_bin_6");
/// ```
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();
    let name = raw.rsplit('/').next().unwrap_or(raw);
    let stem = FASTA_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name);
    stem.trim().replace('.', "_")
}

/// Naming convention separating synthetic bins from source genomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinNaming {
    marker: String,
}

impl Default for BinNaming {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_MARKER)
    }
}

impl BinNaming {
    /// `marker` is matched against normalised identifiers, so dots in it
    /// are normalised too.
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.replace('.', "_"),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn is_bin(&self, id: &str) -> bool {
        id.contains(&self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize_id("sample13.bin.1"), "sample13_bin_1");
        assert_eq!(
            normalize_id("Streptomyces_coelicolor_A32_NC_003888.3.fa"),
            "Streptomyces_coelicolor_A32_NC_003888_3"
        );
        assert_eq!(
            normalize_id("/data/run1/metabat/test_hiseq_2500.bin.9.fa"),
            "test_hiseq_2500_bin_9"
        );
        assert_eq!(normalize_id("genome.fna.gz"), "genome");
        assert_eq!(normalize_id("bin_1"), "bin_1");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = [
            "sample13.bin.1",
            "x/y/Klebsiella_pneumoniae_subsp_pneumoniae_CP009208.1.fa",
            "plain",
            "a.b.c.fasta",
            "",
            "trailing.",
            "genome .fa",
            "bins/ spaced bin.1.fa ",
        ];
        for r in raw {
            let once = normalize_id(r);
            assert_eq!(normalize_id(&once), once, "{}", r);
        }
        assert_eq!(normalize_id("genome .fa"), "genome");
    }

    #[test]
    fn test_extension_only_stripped_at_end() {
        assert_eq!(normalize_id("my.fasta_collection.fa"), "my_fasta_collection");
    }

    #[test]
    fn test_bin_naming() {
        let naming = BinNaming::default();
        assert!(naming.is_bin("test_hiseq_2500_bin_2"));
        assert!(!naming.is_bin("Salinispora_tropica_CNB-440_NC_009380_1"));

        let custom = BinNaming::new(".mag.");
        assert_eq!(custom.marker(), "_mag_");
        assert!(custom.is_bin(&normalize_id("sample.mag.3.fa")));
    }
}
