use anyhow::Result;
use camisim::prepare_sample;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Prepare CAMISIM metadata and id to file mapping files and create FASTA files"
)]
pub struct Args {
    /// Tab-separated file with abundances for samples
    pub sample_file: PathBuf,

    /// Column name of sample to extract
    pub sample_column: String,

    /// Directory to write camisim_fasta_<sample> and camisim_configfiles to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    let files = prepare_sample(&args.sample_file, &args.sample_column, &args.out_dir)?;
    log::info!(
        "{} genomes for {}, metadata in {:?}",
        files.genomes.len(),
        args.sample_column,
        files.metadata
    );
    Ok(())
}

#[allow(dead_code)]
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    run(Args::parse())
}
