use anyhow::Result;
use clap::Parser;
use magician::summary::make_comparison;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Generate a bin-focused overview from the general MAGICIAN summary workbook"
)]
pub struct Args {
    /// Summary workbook written by extract-stats
    pub infile: PathBuf,

    /// Workbook directory to write
    #[arg(short, long, default_value = "bin_summary")]
    pub outfile: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    make_comparison(&args.infile, &args.outfile)?;
    Ok(())
}

#[allow(dead_code)]
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    run(Args::parse())
}
