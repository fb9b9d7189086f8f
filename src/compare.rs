//! Bin-centric comparison against the closest source genome.

use crate::bbstats::GenomeRecord;
use crate::checkm::MarkerStats;
use crate::drep::SimilarityRecord;
use crate::merge::Typed;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row per synthetic bin. Differences are `bin - reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub bin_name: String,
    pub closest_genome: Option<String>,
    pub ani: Option<f64>,
    pub bin_coverage: Option<f64>,
    pub source_coverage: Option<f64>,
    pub scaffold_difference: Option<i64>,
    pub contig_difference: Option<i64>,
    pub length_difference: Option<i64>,
    pub gc_difference: Option<f64>,
    pub completeness_difference: Option<f64>,
    pub contamination_difference: Option<f64>,
    pub marker_difference: Option<i64>,
    pub marker_set_difference: Option<i64>,
}

fn ani_order(a: &SimilarityRecord, b: &SimilarityRecord) -> Ordering {
    // None sorts below every ANI; equal ANI prefers the smaller identifier
    a.ani
        .partial_cmp(&b.ani)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.query.cmp(&a.query))
}

/// Similarity row of the source genome closest to `bin_name`, if any.
pub fn closest_genome<'a>(
    bin_name: &str,
    similarity: &'a [SimilarityRecord],
) -> Option<&'a SimilarityRecord> {
    similarity
        .iter()
        .filter(|s| s.query.is_some() && s.reference.as_deref() == Some(bin_name))
        .max_by(|a, b| ani_order(a, b))
}

fn count_diff(bin: Option<u64>, reference: Option<u64>) -> Option<i64> {
    Some(bin? as i64 - reference? as i64)
}

fn float_diff(bin: Option<f64>, reference: Option<f64>) -> Option<f64> {
    Some(bin? - reference?)
}

fn index<'a, T, F>(rows: &'a [Typed<T>], bins: bool, key: F) -> HashMap<&'a str, &'a T>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut map = HashMap::new();
    for row in rows.iter().filter(|r| r.is_bin() == bins) {
        map.entry(key(&row.record)).or_insert(&row.record);
    }
    map
}

/// Pairs every synthetic bin of `stats` with its closest genome and computes
/// the metric differences. Bins without a match keep all fields but the name
/// null. Row order follows `stats`.
pub fn create_comparison_table(
    stats: &[Typed<GenomeRecord>],
    markers: &[Typed<MarkerStats>],
    similarity: &[SimilarityRecord],
) -> Vec<ComparisonRow> {
    let bin_markers = index(markers, true, |m| m.id.as_str());
    let ref_markers = index(markers, false, |m| m.id.as_str());
    let ref_stats = index(stats, false, |g| g.name.as_str());

    stats
        .iter()
        .filter(|row| row.is_bin())
        .map(|row| {
            let bin = &row.record;
            let closest = closest_genome(&bin.name, similarity);
            let closest_name = closest.and_then(|s| s.query.clone());

            let reference = closest_name
                .as_deref()
                .and_then(|name| ref_stats.get(name).copied());
            let bin_marker = bin_markers.get(bin.name.as_str()).copied();
            let ref_marker = closest_name
                .as_deref()
                .and_then(|name| ref_markers.get(name).copied());

            let r = |f: fn(&GenomeRecord) -> u64| reference.map(f);
            let m = |m: Option<&MarkerStats>, f: fn(&MarkerStats) -> f64| m.map(f);
            let mc = |m: Option<&MarkerStats>, f: fn(&MarkerStats) -> u64| m.map(f);

            ComparisonRow {
                bin_name: bin.name.clone(),
                closest_genome: closest_name.clone(),
                ani: closest.and_then(|s| s.ani),
                bin_coverage: closest.and_then(|s| s.ref_coverage),
                source_coverage: closest.and_then(|s| s.query_coverage),
                scaffold_difference: count_diff(Some(bin.scaffold_count), r(|g| g.scaffold_count)),
                contig_difference: count_diff(Some(bin.contig_count), r(|g| g.contig_count)),
                length_difference: count_diff(
                    Some(bin.sequence_length_bp),
                    r(|g| g.sequence_length_bp),
                ),
                gc_difference: float_diff(Some(bin.gc_content), reference.map(|g| g.gc_content)),
                completeness_difference: float_diff(
                    m(bin_marker, |s| s.completeness_pct),
                    m(ref_marker, |s| s.completeness_pct),
                ),
                contamination_difference: float_diff(
                    m(bin_marker, |s| s.contamination_pct),
                    m(ref_marker, |s| s.contamination_pct),
                ),
                marker_difference: count_diff(
                    mc(bin_marker, |s| s.marker_gene_count),
                    mc(ref_marker, |s| s.marker_gene_count),
                ),
                marker_set_difference: count_diff(
                    mc(bin_marker, |s| s.marker_set_count),
                    mc(ref_marker, |s| s.marker_set_count),
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_mag_and_ref_stats;

    fn genome(name: &str, len: u64, gc: f64, scaffolds: u64, contigs: u64) -> GenomeRecord {
        GenomeRecord {
            name: name.into(),
            sequence_length_bp: len,
            gc_content: gc,
            scaffold_count: scaffolds,
            contig_count: contigs,
            n50_length: len / 2,
            l50_count: 1,
        }
    }

    fn markers(id: &str, completeness: f64, contamination: f64, count: u64) -> MarkerStats {
        MarkerStats {
            id: id.into(),
            lineage: "k__Bacteria (UID203)".into(),
            genome_count_in_lineage: 100,
            marker_gene_count: count,
            marker_set_count: count / 2,
            marker_multiplicity_histogram: [0, count, 0, 0, 0, 0],
            completeness_pct: completeness,
            contamination_pct: contamination,
            strain_heterogeneity_pct: 0.0,
        }
    }

    fn pair(query: Option<&str>, reference: Option<&str>, ani: Option<f64>) -> SimilarityRecord {
        SimilarityRecord {
            query: query.map(String::from),
            reference: reference.map(String::from),
            ref_coverage: ani.map(|_| 0.95),
            query_coverage: ani.map(|_| 0.97),
            ani,
            primary_cluster: Some(1),
        }
    }

    fn fixture() -> (Vec<Typed<GenomeRecord>>, Vec<Typed<MarkerStats>>) {
        let stats = merge_mag_and_ref_stats(
            vec![
                genome("s_bin_2", 8_000_000, 0.7, 5, 7),
                genome("s_bin_4", 1_000_000, 0.4, 50, 60),
                genome("s_bin_6", 5_000_000, 0.69, 6, 7),
            ],
            vec![
                genome("Streptomyces", 7_000_000, 0.72, 1, 1),
                genome("Salinispora", 5_500_000, 0.69, 2, 2),
            ],
        );
        let markers = merge_mag_and_ref_stats(
            vec![
                markers("s_bin_2", 95.0, 2.0, 460),
                markers("s_bin_4", 10.0, 0.0, 100),
                markers("s_bin_6", 99.0, 1.5, 500),
            ],
            vec![
                markers("Streptomyces", 100.0, 0.5, 460),
                markers("Salinispora", 99.0, 0.0, 510),
            ],
        );
        (stats, markers)
    }

    #[test]
    fn test_comparison_table() {
        let (stats, markers) = fixture();
        let similarity = vec![
            pair(Some("Streptomyces"), Some("s_bin_2"), Some(0.9999)),
            pair(Some("Salinispora"), Some("s_bin_6"), Some(0.9998)),
            pair(None, Some("s_bin_4"), None),
        ];
        let table = create_comparison_table(&stats, &markers, &similarity);
        assert_eq!(table.len(), 3);

        let first = &table[0];
        assert_eq!(first.bin_name, "s_bin_2");
        assert_eq!(first.closest_genome.as_deref(), Some("Streptomyces"));
        assert_eq!(first.ani, Some(0.9999));
        assert_eq!(first.bin_coverage, Some(0.95));
        assert_eq!(first.source_coverage, Some(0.97));
        assert_eq!(first.scaffold_difference, Some(4));
        assert_eq!(first.contig_difference, Some(6));
        assert_eq!(first.length_difference, Some(1_000_000));
        assert!((first.gc_difference.unwrap() - (-0.02)).abs() < 1e-9);
        assert_eq!(first.completeness_difference, Some(-5.0));
        assert_eq!(first.contamination_difference, Some(1.5));
        assert_eq!(first.marker_difference, Some(0));
        assert_eq!(first.marker_set_difference, Some(0));

        assert_eq!(table[1].bin_name, "s_bin_4");
        assert_eq!(table[2].bin_name, "s_bin_6");
        assert_eq!(table[2].length_difference, Some(-500_000));
        assert_eq!(table[2].marker_difference, Some(-10));
    }

    #[test]
    fn test_unmatched_bin_has_only_nulls() {
        let (stats, markers) = fixture();
        let similarity = vec![pair(None, Some("s_bin_4"), None)];
        let table = create_comparison_table(&stats, &markers, &similarity);
        assert_eq!(table.len(), 3);
        for row in &table {
            assert_eq!(
                row,
                &ComparisonRow {
                    bin_name: row.bin_name.clone(),
                    closest_genome: None,
                    ani: None,
                    bin_coverage: None,
                    source_coverage: None,
                    scaffold_difference: None,
                    contig_difference: None,
                    length_difference: None,
                    gc_difference: None,
                    completeness_difference: None,
                    contamination_difference: None,
                    marker_difference: None,
                    marker_set_difference: None,
                }
            );
        }
    }

    #[test]
    fn test_closest_genome_picks_highest_ani() {
        let similarity = vec![
            pair(Some("b_genome"), Some("s_bin_1"), Some(0.97)),
            pair(Some("z_genome"), Some("s_bin_1"), Some(0.99)),
            pair(Some("a_genome"), Some("s_bin_1"), Some(0.99)),
            pair(Some("c_genome"), Some("s_bin_2"), Some(1.0)),
            pair(None, Some("s_bin_1"), None),
        ];
        let best = closest_genome("s_bin_1", &similarity).unwrap();
        assert_eq!(best.query.as_deref(), Some("a_genome"));
        assert!(closest_genome("s_bin_3", &similarity).is_none());
    }

    #[test]
    fn test_missing_reference_stats_propagate_null() {
        let (stats, markers) = fixture();
        let similarity = vec![pair(Some("Unknown_genome"), Some("s_bin_2"), Some(0.99))];
        let table = create_comparison_table(&stats, &markers, &similarity);
        assert_eq!(table[0].closest_genome.as_deref(), Some("Unknown_genome"));
        assert_eq!(table[0].scaffold_difference, None);
        assert_eq!(table[0].gc_difference, None);
        assert_eq!(table[0].completeness_difference, None);
    }
}
