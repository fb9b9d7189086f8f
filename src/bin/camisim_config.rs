use anyhow::{bail, Result};
use camisim::{check_coverage, community_size, ConfigParams, ReadSimulator, SampleType};
use clap::Parser;
use magician::utils::absolute_path;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(version, about = "Generate a config file for CAMISIM from parameters")]
pub struct Args {
    /// Directory containing CAMISIM
    pub camisim_dir: PathBuf,

    /// CAMISIM metadata file
    pub metadata: PathBuf,

    /// File mapping genome IDs to FASTA paths
    pub genome_file: PathBuf,

    /// Name for the config file
    #[arg(short, long, default_value = "camisim_config.ini")]
    pub filename: PathBuf,

    /// Output directory for CAMISIM
    #[arg(short, long, default_value = "camisim_out")]
    pub out_dir: String,

    /// File giving relative abundance of genomes
    #[arg(short, long)]
    pub abundance_file: Option<PathBuf>,

    /// Desired average coverage for the sample
    #[arg(short, long, default_value_t = 1.0)]
    pub coverage: f64,

    /// Read simulator to use
    #[arg(long, value_enum, default_value_t = ReadSimulator::Art)]
    pub read_sim: ReadSimulator,

    /// Read simulator executable (default: ART shipped with CAMISIM)
    #[arg(long)]
    pub read_sim_path: Option<PathBuf>,

    /// Type of different samples to be simulated
    #[arg(long, value_enum, default_value_t = SampleType::Replicates)]
    pub sample_type: SampleType,

    /// Error profile directory (default: ART error profiles shipped with CAMISIM)
    #[arg(long, conflicts_with = "errorfree")]
    pub error_profile: Option<PathBuf>,

    /// Don't use an error profile (only works with wgsim)
    #[arg(long)]
    pub errorfree: bool,
}

pub fn run(args: Args) -> Result<()> {
    check_coverage(args.coverage)?;
    if args.errorfree && args.read_sim != ReadSimulator::Wgsim {
        bail!("Omitting an error profile is only possible with wgsim.");
    }

    let camisim_dir = absolute_path(&args.camisim_dir)?;
    let metadata = absolute_path(&args.metadata)?;
    let genome_file = absolute_path(&args.genome_file)?;
    let mut params = ConfigParams::new(&camisim_dir, &metadata, &genome_file);

    params.output_dir = args.out_dir;
    params.read_simulator = args.read_sim;
    params.sample_type = args.sample_type;
    if let Some(path) = &args.read_sim_path {
        params.read_simulator_path = absolute_path(path)?;
    }
    if args.errorfree {
        params.error_profiles = None;
    } else if let Some(path) = &args.error_profile {
        params.error_profiles = Some(absolute_path(path)?);
    }
    if let Some(path) = &args.abundance_file {
        params.abundance_file = Some(absolute_path(path)?);
    }
    let (genome_count, sample_size) = community_size(&genome_file, args.coverage)?;
    params.genome_count = genome_count;
    params.sample_size = sample_size;

    std::fs::write(&args.filename, params.render()?)?;
    log::info!(
        "CAMISIM config for {} genomes ({} Gbp) written to {:?}",
        params.genome_count,
        params.sample_size,
        args.filename
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
