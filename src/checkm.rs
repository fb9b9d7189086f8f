//! Marker-gene statistics from CheckM `qa` tab tables.

use crate::names::normalize_id;
use crate::table::{Table, TAB};
use crate::Result;
use serde::Deserialize;
use std::path::Path;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "Bin Id",
    "Marker lineage",
    "# genomes",
    "# markers",
    "# marker sets",
    "0",
    "1",
    "2",
    "3",
    "4",
    "5+",
    "Completeness",
    "Contamination",
    "Strain heterogeneity",
];

/// Readable labels for the marker multiplicity histogram, index = copy count.
pub const HISTOGRAM_LABELS: [&str; 6] = [
    "0_markers",
    "1_marker",
    "2_markers",
    "3_markers",
    "4_markers",
    "5_markers",
];

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStats {
    pub id: String,
    pub lineage: String,
    pub genome_count_in_lineage: u64,
    pub marker_gene_count: u64,
    pub marker_set_count: u64,
    /// Number of marker genes found 0, 1, 2, 3, 4 and 5 or more times.
    pub marker_multiplicity_histogram: [u64; 6],
    pub completeness_pct: f64,
    pub contamination_pct: f64,
    pub strain_heterogeneity_pct: f64,
}

#[derive(Debug, Deserialize)]
struct RawCheckm {
    #[serde(rename = "Bin Id")]
    bin_id: String,
    #[serde(rename = "Marker lineage")]
    lineage: String,
    #[serde(rename = "# genomes")]
    genomes: u64,
    #[serde(rename = "# markers")]
    markers: u64,
    #[serde(rename = "# marker sets")]
    marker_sets: u64,
    #[serde(rename = "0")]
    copies_0: u64,
    #[serde(rename = "1")]
    copies_1: u64,
    #[serde(rename = "2")]
    copies_2: u64,
    #[serde(rename = "3")]
    copies_3: u64,
    #[serde(rename = "4")]
    copies_4: u64,
    #[serde(rename = "5+")]
    copies_5_plus: u64,
    #[serde(rename = "Completeness")]
    completeness: f64,
    #[serde(rename = "Contamination")]
    contamination: f64,
    #[serde(rename = "Strain heterogeneity")]
    strain_heterogeneity: f64,
}

impl From<RawCheckm> for MarkerStats {
    fn from(raw: RawCheckm) -> Self {
        Self {
            id: normalize_id(&raw.bin_id),
            lineage: raw.lineage,
            genome_count_in_lineage: raw.genomes,
            marker_gene_count: raw.markers,
            marker_set_count: raw.marker_sets,
            marker_multiplicity_histogram: [
                raw.copies_0,
                raw.copies_1,
                raw.copies_2,
                raw.copies_3,
                raw.copies_4,
                raw.copies_5_plus,
            ],
            completeness_pct: raw.completeness,
            contamination_pct: raw.contamination,
            strain_heterogeneity_pct: raw.strain_heterogeneity,
        }
    }
}

/// Reads a CheckM tab table; every row is kept.
pub fn read_checkm_stats<P: AsRef<Path>>(checkm_file: P) -> Result<Vec<MarkerStats>> {
    let table = Table::read(checkm_file, TAB)?;
    table.require(REQUIRED_COLUMNS)?;
    let stats: Vec<MarkerStats> = table
        .deserialize::<RawCheckm>()?
        .into_iter()
        .map(MarkerStats::from)
        .collect();
    log::info!("{} CheckM rows from {:?}", stats.len(), table.path());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_CHECKM: &str = "Bin Id\tMarker lineage\t# genomes\t# markers\t# marker sets\t0\t1\t2\t3\t4\t5+\tCompleteness\tContamination\tStrain heterogeneity
sample13.bin.1\tf__Enterobacteriaceae (UID5124)\t134\t1173\t336\t79\t1068\t26\t0\t0\t0\t93.13\t3.11\t38.46
sample13.bin.2\tf__Streptomycetaceae (UID2048)\t60\t460\t233\t24\t429\t7\t0\t0\t0\t95.38\t1.37\t42.86
";

    #[test]
    fn test_get_checkm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake_checkm.txt");
        std::fs::write(&path, FAKE_CHECKM).unwrap();

        let stats = read_checkm_stats(&path).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(
            stats[0],
            MarkerStats {
                id: "sample13_bin_1".into(),
                lineage: "f__Enterobacteriaceae (UID5124)".into(),
                genome_count_in_lineage: 134,
                marker_gene_count: 1173,
                marker_set_count: 336,
                marker_multiplicity_histogram: [79, 1068, 26, 0, 0, 0],
                completeness_pct: 93.13,
                contamination_pct: 3.11,
                strain_heterogeneity_pct: 38.46,
            }
        );
        assert_eq!(stats[1].id, "sample13_bin_2");
        assert_eq!(stats[1].marker_multiplicity_histogram, [24, 429, 7, 0, 0, 0]);
    }
}
