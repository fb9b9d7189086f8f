use anyhow::Result;
use clap::Parser;
use magician::names::{BinNaming, DEFAULT_BIN_MARKER};
use magician::summary::{extract_stats, write_summary, StatsInputs};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Extract genome statistics from CheckM, dRep and bbstats output"
)]
pub struct Args {
    /// bbstats file giving stats of bins
    pub stats: PathBuf,

    /// bbstats file giving stats of reference genomes
    pub genome_stats: PathBuf,

    /// CheckM file for bins
    pub checkm: PathBuf,

    /// CheckM file for reference genomes
    pub genome_checkm: PathBuf,

    /// dRep Mummer file (Ndb.csv)
    pub drep_mummer: PathBuf,

    /// dRep Mash file (Mdb.csv); lists clusters without partner reliably
    #[arg(long)]
    pub drep_mash: Option<PathBuf>,

    /// Workbook directory to write
    #[arg(short, long, default_value = "samplestats")]
    pub outfile: PathBuf,

    /// Token that marks an identifier as a synthetic bin
    #[arg(long, default_value = DEFAULT_BIN_MARKER)]
    pub bin_marker: String,
}

pub fn run(args: Args) -> Result<()> {
    let inputs = StatsInputs {
        bin_stats: args.stats,
        genome_stats: args.genome_stats,
        bin_checkm: args.checkm,
        genome_checkm: args.genome_checkm,
        mummer: args.drep_mummer,
        mash: args.drep_mash,
    };
    let naming = BinNaming::new(&args.bin_marker);
    let summary = extract_stats(&inputs, &naming)?;
    write_summary(&summary, &args.outfile)?;
    Ok(())
}

#[allow(dead_code)]
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    run(Args::parse())
}
