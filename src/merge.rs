//! Union of bin and reference-genome statistics.

use crate::bbstats::GenomeRecord;
use crate::drep::SimilarityRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenomeType {
    #[serde(rename = "synthetic_MAG")]
    SyntheticMag,
    #[serde(rename = "reference")]
    Reference,
}

impl fmt::Display for GenomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GenomeType::SyntheticMag => "synthetic_MAG",
                GenomeType::Reference => "reference",
            }
        )
    }
}

/// A statistics row tagged with the kind of genome it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Typed<T> {
    pub genome_type: GenomeType,
    pub record: T,
}

impl<T> Typed<T> {
    pub fn is_bin(&self) -> bool {
        self.genome_type == GenomeType::SyntheticMag
    }
}

/// Bins first, then references; nothing is deduplicated.
pub fn merge_mag_and_ref_stats<T>(mag_stats: Vec<T>, ref_stats: Vec<T>) -> Vec<Typed<T>> {
    let mags = mag_stats.into_iter().map(|record| Typed {
        genome_type: GenomeType::SyntheticMag,
        record,
    });
    let refs = ref_stats.into_iter().map(|record| Typed {
        genome_type: GenomeType::Reference,
        record,
    });
    mags.chain(refs).collect()
}

/// dRep primary cluster of every statistics row, aligned with `stats`.
///
/// Bins are looked up as `reference`, source genomes as `query`; the first
/// matching similarity row wins.
pub fn attach_clusters(
    stats: &[Typed<GenomeRecord>],
    similarity: &[SimilarityRecord],
) -> Vec<Option<u64>> {
    let mut by_bin: HashMap<&str, Option<u64>> = HashMap::new();
    let mut by_genome: HashMap<&str, Option<u64>> = HashMap::new();
    for s in similarity {
        if let Some(reference) = &s.reference {
            by_bin.entry(reference).or_insert(s.primary_cluster);
        }
        if let Some(query) = &s.query {
            by_genome.entry(query).or_insert(s.primary_cluster);
        }
    }

    stats
        .iter()
        .map(|row| {
            let lookup = if row.is_bin() { &by_bin } else { &by_genome };
            lookup.get(row.record.name.as_str()).copied().flatten()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(name: &str) -> GenomeRecord {
        GenomeRecord {
            name: name.into(),
            sequence_length_bp: 1000,
            gc_content: 0.5,
            scaffold_count: 1,
            contig_count: 1,
            n50_length: 1000,
            l50_count: 1,
        }
    }

    #[test]
    fn test_merge_order_and_tags() {
        let merged = merge_mag_and_ref_stats(
            vec![genome("s_bin_1"), genome("s_bin_2")],
            vec![genome("ref_a"), genome("s_bin_1")],
        );
        let tags: Vec<_> = merged
            .iter()
            .map(|t| (t.genome_type, t.record.name.as_str()))
            .collect();
        assert_eq!(
            tags,
            vec![
                (GenomeType::SyntheticMag, "s_bin_1"),
                (GenomeType::SyntheticMag, "s_bin_2"),
                (GenomeType::Reference, "ref_a"),
                (GenomeType::Reference, "s_bin_1"),
            ]
        );
    }

    #[test]
    fn test_attach_clusters() {
        let merged = merge_mag_and_ref_stats(
            vec![genome("s_bin_1"), genome("s_bin_9")],
            vec![genome("ref_a"), genome("ref_b")],
        );
        let similarity = vec![
            SimilarityRecord {
                query: Some("ref_a".into()),
                reference: Some("s_bin_1".into()),
                ref_coverage: Some(0.9),
                query_coverage: Some(0.9),
                ani: Some(0.99),
                primary_cluster: Some(1),
            },
            SimilarityRecord {
                query: Some("ref_b".into()),
                reference: None,
                ref_coverage: None,
                query_coverage: None,
                ani: None,
                primary_cluster: Some(2),
            },
        ];
        assert_eq!(
            attach_clusters(&merged, &similarity),
            vec![Some(1), None, Some(1), Some(2)]
        );
    }

    #[test]
    fn test_genome_type_display() {
        assert_eq!(GenomeType::SyntheticMag.to_string(), "synthetic_MAG");
        assert_eq!(GenomeType::Reference.to_string(), "reference");
    }
}
