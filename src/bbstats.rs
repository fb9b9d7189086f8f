//! Assembly statistics from bbtools `statswrapper.sh` (`format=3`).

use crate::names::normalize_id;
use crate::table::{Table, TAB};
use crate::Result;
use serde::Deserialize;
use std::path::Path;

pub const REQUIRED_COLUMNS: &[&str] = &[
    "n_scaffolds",
    "n_contigs",
    "scaf_bp",
    "scaf_N50",
    "scaf_L50",
    "gc_avg",
    "filename",
];

/// Assembly statistics of one bin or reference genome.
///
/// `n50_length` is the length of the shortest scaffold in the smallest set
/// covering half of the assembly, `l50_count` the size of that set.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeRecord {
    pub name: String,
    pub sequence_length_bp: u64,
    pub gc_content: f64,
    pub scaffold_count: u64,
    pub contig_count: u64,
    pub n50_length: u64,
    pub l50_count: u64,
}

#[derive(Debug, Deserialize)]
struct RawStats {
    n_scaffolds: u64,
    n_contigs: u64,
    scaf_bp: u64,
    #[serde(rename = "scaf_N50")]
    scaf_n50: u64,
    #[serde(rename = "scaf_L50")]
    scaf_l50: u64,
    gc_avg: f64,
    filename: String,
}

impl From<RawStats> for GenomeRecord {
    fn from(raw: RawStats) -> Self {
        // statswrapper labels the two contiguity metrics the other way round
        Self {
            name: normalize_id(&raw.filename),
            sequence_length_bp: raw.scaf_bp,
            gc_content: raw.gc_avg,
            scaffold_count: raw.n_scaffolds,
            contig_count: raw.n_contigs,
            n50_length: raw.scaf_l50,
            l50_count: raw.scaf_n50,
        }
    }
}

/// Reads a tab-separated statswrapper report, one record per input row.
pub fn read_bb_stats<P: AsRef<Path>>(stats_file: P) -> Result<Vec<GenomeRecord>> {
    let table = Table::read(stats_file, TAB)?;
    table.require(REQUIRED_COLUMNS)?;
    let records: Vec<GenomeRecord> = table
        .deserialize::<RawStats>()?
        .into_iter()
        .map(GenomeRecord::from)
        .collect();
    log::info!(
        "{} assembly statistics rows from {:?}",
        records.len(),
        table.path()
    );
    Ok(records)
}
