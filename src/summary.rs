//! Summary and bin-summary workbooks.

use crate::bbstats::{read_bb_stats, GenomeRecord};
use crate::checkm::{read_checkm_stats, MarkerStats};
use crate::compare::{create_comparison_table, ComparisonRow};
use crate::drep::{read_cluster_members, read_comparisons, reconcile, SimilarityRecord};
use crate::merge::{attach_clusters, merge_mag_and_ref_stats, GenomeType, Typed};
use crate::names::BinNaming;
use crate::workbook::{read_sheet, Explanation, SheetRow, WorkbookWriter};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `BB_stats` sheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSheetRow {
    pub genome_type: GenomeType,
    pub bin_name: String,
    pub scaf_bp: u64,
    pub gc_avg: f64,
    pub n_scaffolds: u64,
    pub n_contigs: u64,
    #[serde(rename = "scaffold_L50")]
    pub scaffold_l50: u64,
    #[serde(rename = "scaffold_N50")]
    pub scaffold_n50: u64,
    pub primary_cluster: Option<u64>,
}

impl SheetRow for StatsSheetRow {
    const SHEET: &'static str = "BB_stats";
    const COLUMNS: &'static [&'static str] = &[
        "genome_type",
        "bin_name",
        "scaf_bp",
        "gc_avg",
        "n_scaffolds",
        "n_contigs",
        "scaffold_L50",
        "scaffold_N50",
        "primary_cluster",
    ];
}

impl StatsSheetRow {
    fn new(row: &Typed<GenomeRecord>, primary_cluster: Option<u64>) -> Self {
        let r = &row.record;
        Self {
            genome_type: row.genome_type,
            bin_name: r.name.clone(),
            scaf_bp: r.sequence_length_bp,
            gc_avg: r.gc_content,
            n_scaffolds: r.scaffold_count,
            n_contigs: r.contig_count,
            scaffold_l50: r.l50_count,
            scaffold_n50: r.n50_length,
            primary_cluster,
        }
    }

    fn into_typed(self) -> Typed<GenomeRecord> {
        Typed {
            genome_type: self.genome_type,
            record: GenomeRecord {
                name: self.bin_name,
                sequence_length_bp: self.scaf_bp,
                gc_content: self.gc_avg,
                scaffold_count: self.n_scaffolds,
                contig_count: self.n_contigs,
                n50_length: self.scaffold_n50,
                l50_count: self.scaffold_l50,
            },
        }
    }
}

/// `CheckM` sheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckmSheetRow {
    pub genome_type: GenomeType,
    #[serde(rename = "Bin Id")]
    pub bin_id: String,
    #[serde(rename = "Marker lineage")]
    pub marker_lineage: String,
    #[serde(rename = "# genomes")]
    pub genomes: u64,
    #[serde(rename = "# markers")]
    pub markers: u64,
    #[serde(rename = "# marker sets")]
    pub marker_sets: u64,
    #[serde(rename = "0_markers")]
    pub markers_0: u64,
    #[serde(rename = "1_marker")]
    pub markers_1: u64,
    #[serde(rename = "2_markers")]
    pub markers_2: u64,
    #[serde(rename = "3_markers")]
    pub markers_3: u64,
    #[serde(rename = "4_markers")]
    pub markers_4: u64,
    #[serde(rename = "5_markers")]
    pub markers_5: u64,
    #[serde(rename = "Completeness")]
    pub completeness: f64,
    #[serde(rename = "Contamination")]
    pub contamination: f64,
    #[serde(rename = "Strain heterogeneity")]
    pub strain_heterogeneity: f64,
}

impl SheetRow for CheckmSheetRow {
    const SHEET: &'static str = "CheckM";
    const COLUMNS: &'static [&'static str] = &[
        "genome_type",
        "Bin Id",
        "Marker lineage",
        "# genomes",
        "# markers",
        "# marker sets",
        "0_markers",
        "1_marker",
        "2_markers",
        "3_markers",
        "4_markers",
        "5_markers",
        "Completeness",
        "Contamination",
        "Strain heterogeneity",
    ];
}

impl From<&Typed<MarkerStats>> for CheckmSheetRow {
    fn from(row: &Typed<MarkerStats>) -> Self {
        let m = &row.record;
        let h = m.marker_multiplicity_histogram;
        Self {
            genome_type: row.genome_type,
            bin_id: m.id.clone(),
            marker_lineage: m.lineage.clone(),
            genomes: m.genome_count_in_lineage,
            markers: m.marker_gene_count,
            marker_sets: m.marker_set_count,
            markers_0: h[0],
            markers_1: h[1],
            markers_2: h[2],
            markers_3: h[3],
            markers_4: h[4],
            markers_5: h[5],
            completeness: m.completeness_pct,
            contamination: m.contamination_pct,
            strain_heterogeneity: m.strain_heterogeneity_pct,
        }
    }
}

impl From<CheckmSheetRow> for Typed<MarkerStats> {
    fn from(row: CheckmSheetRow) -> Self {
        Typed {
            genome_type: row.genome_type,
            record: MarkerStats {
                id: row.bin_id,
                lineage: row.marker_lineage,
                genome_count_in_lineage: row.genomes,
                marker_gene_count: row.markers,
                marker_set_count: row.marker_sets,
                marker_multiplicity_histogram: [
                    row.markers_0,
                    row.markers_1,
                    row.markers_2,
                    row.markers_3,
                    row.markers_4,
                    row.markers_5,
                ],
                completeness_pct: row.completeness,
                contamination_pct: row.contamination,
                strain_heterogeneity_pct: row.strain_heterogeneity,
            },
        }
    }
}

impl SheetRow for SimilarityRecord {
    const SHEET: &'static str = "dRep";
    const COLUMNS: &'static [&'static str] = &[
        "query",
        "reference",
        "ref_coverage",
        "query_coverage",
        "ani",
        "primary_cluster",
    ];
}

impl SheetRow for ComparisonRow {
    const SHEET: &'static str = "summary";
    const COLUMNS: &'static [&'static str] = &[
        "bin_name",
        "closest_genome",
        "ani",
        "bin_coverage",
        "source_coverage",
        "scaffold_difference",
        "contig_difference",
        "length_difference",
        "gc_difference",
        "completeness_difference",
        "contamination_difference",
        "marker_difference",
        "marker_set_difference",
    ];
}

const SUMMARY_EXPLANATIONS: &[(&str, &str)] = &[
    ("genome_type", "General information: type of genome (synthetic MAG or source genome)"),
    ("BB_stats: bin_name", "Name of MetaBAT-generated bin or genome"),
    ("BB_stats: scaf_bp", "Basepairs in scaffold(s)"),
    ("BB_stats: gc_avg", "Average GC content for bin/genome"),
    ("BB_stats: n_scaffolds", "Amount of scaffolds"),
    ("BB_stats: n_contigs", "Amount of contigs"),
    ("BB_stats: scaffold_L50", "scaffold L50: smallest number of scaffolds that cover half (or more) of the genome together"),
    ("BB_stats: scaffold_N50", "scaffold N50: length of the shortest scaffold from the smallest set of scaffolds that covers half (or more) of the genome."),
    ("BB_stats: primary_cluster", "dRep cluster based on estimate of average nucleotide identity; included here for ease of comparison."),
    ("BB_stats: NOTE", "In the raw BBstats output, N50 and L50 are reversed; here, the commonly used definitions are used instead."),
    ("CheckM: Bin Id", "Name of MetaBAT-generated bin or genome"),
    ("CheckM: Marker lineage", "Taxon for which specific marker genes could be found"),
    ("CheckM: # genomes", "Amount of genomes used to determine marker genes"),
    ("CheckM: # markers", "Amount of marker genes (single-copy genes occurring in more than 97 percent of the taxon's genomes) for the given taxon"),
    ("CheckM: # marker sets", "Amount of marker gene sets; marker genes are grouped into sets by combining all pairs of collocated marker genes - closer than 5 kb in 95 percent of genomes - which share a gene"),
    ("CheckM: x_markers", "Amount of markers occurring x times in the genome"),
    ("CheckM: Completeness", "Completeness of genome, estimated by number of marker genes that are present"),
    ("CheckM: Contamination", "Contamination of genome, estimated by number of marker genes occurring more than once"),
    ("CheckM: Strain heterogeneity", "Contamination specifically arising from closely related strains, identified via the amount of marker gene duplicates above a threshold of amino acid identity"),
    ("dRep: query", "Name of source genome"),
    ("dRep: reference", "Name of closest bin"),
    ("dRep: ref_coverage", "Fraction of bin covered by source genome"),
    ("dRep: query_coverage", "Fraction of source genome covered by bin"),
    ("dRep: ani", "Average nucleotide identity between source genome and bin, calculated by Nucmer alignment"),
    ("dRep: primary_cluster", "Cluster containing source genome and bin, determined by Mash-estimated ANI; source and bin need to have ANI of at least 90 percent to be in one cluster"),
    ("dRep: NOTE", "If a row contains only a source genome or only a bin, no bin/source genome had an estimated ANI of at least 90 percent."),
];

const BIN_SUMMARY_EXPLANATIONS: &[(&str, &str)] = &[
    ("bin_name", "Name of MetaBAT-assigned bin"),
    ("closest_genome", "Source genome with highest ANI for bin found by dRep"),
    ("ani", "Average nucleotide identity between bin and closest genome"),
    ("bin_coverage", "Fraction of bin covered by closest genome"),
    ("source_coverage", "Fraction of closest genome covered by bin"),
    ("scaffold_difference", "Difference of the amount of scaffolds in the bin and the closest genome (bin - reference)"),
    ("contig_difference", "Difference of the amount of contigs in the bin and the closest genome (bin - reference)"),
    ("length_difference", "Length difference in base pairs between bin and closest genome (bin - reference)"),
    ("gc_difference", "Difference in GC content between bin and closest genome (bin - reference)"),
    ("completeness_difference", "Difference in completeness between bin and closest genome as calculated by CheckM (bin - reference). Note that completeness in bin and reference may be calculated with different marker genes; when in doubt, check the CheckM summary."),
    ("contamination_difference", "Difference in contamination between bin and closest genome as calculated by CheckM (bin - reference)"),
    ("marker_difference", "Difference in the amount of CheckM marker genes (bin - reference)"),
    ("marker_set_difference", "Difference in the amount of CheckM marker sets (bin - reference)"),
];

fn explanations(texts: &[(&str, &str)]) -> Vec<Explanation> {
    texts
        .iter()
        .map(|(column, description)| Explanation::new(column, description))
        .collect()
}

/// Report files consumed by the statistics extractor.
#[derive(Debug, Clone)]
pub struct StatsInputs {
    pub bin_stats: PathBuf,
    pub genome_stats: PathBuf,
    pub bin_checkm: PathBuf,
    pub genome_checkm: PathBuf,
    /// dRep `Ndb.csv`.
    pub mummer: PathBuf,
    /// dRep `Mdb.csv`.
    pub mash: Option<PathBuf>,
}

/// Everything the summary workbook holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub stats: Vec<Typed<GenomeRecord>>,
    pub markers: Vec<Typed<MarkerStats>>,
    pub similarity: Vec<SimilarityRecord>,
}

pub fn extract_stats(inputs: &StatsInputs, naming: &BinNaming) -> Result<Summary> {
    let comparisons = read_comparisons(&inputs.mummer)?;
    let members = match &inputs.mash {
        Some(mash) => Some(read_cluster_members(mash)?),
        None => {
            log::warn!("no dRep membership report, singletons are taken from the ANI report");
            None
        }
    };
    let similarity = reconcile(&comparisons, members.as_deref(), naming);

    let stats = merge_mag_and_ref_stats(
        read_bb_stats(&inputs.bin_stats)?,
        read_bb_stats(&inputs.genome_stats)?,
    );
    let markers = merge_mag_and_ref_stats(
        read_checkm_stats(&inputs.bin_checkm)?,
        read_checkm_stats(&inputs.genome_checkm)?,
    );

    Ok(Summary {
        stats,
        markers,
        similarity,
    })
}

pub fn write_summary<P: AsRef<Path>>(summary: &Summary, outfile: P) -> Result<PathBuf> {
    let clusters = attach_clusters(&summary.stats, &summary.similarity);
    let stats: Vec<StatsSheetRow> = summary
        .stats
        .iter()
        .zip(clusters)
        .map(|(row, cluster)| StatsSheetRow::new(row, cluster))
        .collect();
    let markers: Vec<CheckmSheetRow> = summary.markers.iter().map(CheckmSheetRow::from).collect();

    let writer = WorkbookWriter::create(outfile)?;
    writer.write_sheet(&stats)?;
    writer.write_sheet(&markers)?;
    writer.write_sheet(&summary.similarity)?;
    writer.write_sheet(&explanations(SUMMARY_EXPLANATIONS))?;
    writer.finish()
}

/// Reads a summary workbook written by [`write_summary`].
pub fn read_summary<P: AsRef<Path>>(workbook: P) -> Result<Summary> {
    let workbook = workbook.as_ref();
    let stats = read_sheet::<StatsSheetRow, _>(workbook)?
        .into_iter()
        .map(StatsSheetRow::into_typed)
        .collect();
    let markers = read_sheet::<CheckmSheetRow, _>(workbook)?
        .into_iter()
        .map(Typed::from)
        .collect();
    let similarity = read_sheet::<SimilarityRecord, _>(workbook)?;
    Ok(Summary {
        stats,
        markers,
        similarity,
    })
}

pub fn write_bin_summary<P: AsRef<Path>>(rows: &[ComparisonRow], outfile: P) -> Result<PathBuf> {
    let writer = WorkbookWriter::create(outfile)?;
    writer.write_sheet(rows)?;
    writer.write_sheet(&explanations(BIN_SUMMARY_EXPLANATIONS))?;
    writer.finish()
}

/// Builds the bin-centric workbook from a summary workbook.
pub fn make_comparison<P: AsRef<Path>, Q: AsRef<Path>>(
    summary_workbook: P,
    outfile: Q,
) -> Result<Vec<ComparisonRow>> {
    let summary = read_summary(summary_workbook)?;
    let rows = create_comparison_table(&summary.stats, &summary.markers, &summary.similarity);
    log::info!("{} bins compared", rows.len());
    write_bin_summary(&rows, outfile)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn summary() -> Summary {
        Summary {
            stats: merge_mag_and_ref_stats(
                vec![GenomeRecord {
                    name: "s_bin_1".into(),
                    sequence_length_bp: 8667507,
                    gc_content: 0.6,
                    scaffold_count: 4,
                    contig_count: 5,
                    n50_length: 1667507,
                    l50_count: 2,
                }],
                vec![GenomeRecord {
                    name: "Streptomyces_coelicolor".into(),
                    sequence_length_bp: 8667507,
                    gc_content: 0.72,
                    scaffold_count: 1,
                    contig_count: 1,
                    n50_length: 8667507,
                    l50_count: 1,
                }],
            ),
            markers: merge_mag_and_ref_stats(
                vec![MarkerStats {
                    id: "s_bin_1".into(),
                    lineage: "f__Streptomycetaceae (UID2048)".into(),
                    genome_count_in_lineage: 60,
                    marker_gene_count: 460,
                    marker_set_count: 233,
                    marker_multiplicity_histogram: [24, 429, 7, 0, 0, 0],
                    completeness_pct: 95.38,
                    contamination_pct: 1.37,
                    strain_heterogeneity_pct: 42.86,
                }],
                vec![],
            ),
            similarity: vec![SimilarityRecord {
                query: Some("Streptomyces_coelicolor".into()),
                reference: Some("s_bin_1".into()),
                ref_coverage: Some(0.9987903),
                query_coverage: Some(0.95382077),
                ani: Some(0.9999186),
                primary_cluster: Some(1),
            }],
        }
    }

    #[test]
    fn test_summary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("samplestats");
        let original = summary();
        write_summary(&original, &out).unwrap();

        for sheet in ["BB_stats", "CheckM", "dRep", "explanations"] {
            assert!(out.join(format!("{}.tsv", sheet)).is_file(), "{}", sheet);
        }
        assert_eq!(read_summary(&out).unwrap(), original);
    }

    #[test]
    fn test_bb_stats_sheet_layout() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("samplestats");
        write_summary(&summary(), &out).unwrap();

        let text = fs::read_to_string(out.join("BB_stats.tsv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "genome_type\tbin_name\tscaf_bp\tgc_avg\tn_scaffolds\tn_contigs\tscaffold_L50\tscaffold_N50\tprimary_cluster"
        );
        assert_eq!(lines[1], "synthetic_MAG\ts_bin_1\t8667507\t0.6\t4\t5\t2\t1667507\t1");
        assert!(lines[2].starts_with("reference\tStreptomyces_coelicolor\t"));
        assert!(lines[2].ends_with("\t1"));
    }

    #[test]
    fn test_make_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let summary_dir = dir.path().join("samplestats");
        let out = dir.path().join("bin_summary");
        write_summary(&summary(), &summary_dir).unwrap();

        let rows = make_comparison(&summary_dir, &out).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].closest_genome.as_deref(), Some("Streptomyces_coelicolor"));
        assert_eq!(rows[0].scaffold_difference, Some(3));
        assert_eq!(rows[0].length_difference, Some(0));
        // the reference has no CheckM row
        assert_eq!(rows[0].completeness_difference, None);

        assert_eq!(read_sheet::<ComparisonRow, _>(&out).unwrap(), rows);
        let explained: Vec<String> = read_sheet::<Explanation, _>(&out)
            .unwrap()
            .into_iter()
            .map(|e| e.column)
            .collect();
        assert_eq!(explained, ComparisonRow::COLUMNS);
    }
}
