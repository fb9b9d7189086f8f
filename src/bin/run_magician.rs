use anyhow::Result;
use clap::Parser;
use magician::samples::absolutize_genomes;
use magician::snakemake::{
    default_config_file, default_snakefile, ProfileType, SnakemakeCommand, DEFAULT_CORES,
    DEFAULT_INSERT_SIZE, DEFAULT_TARGET,
};
use std::path::PathBuf;

pub const DEMO_FILE: &str = "tmp_demo_sample_distributions.tsv";

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Run MAGICIAN to simulate MAGs for a specified community or set of communities",
    long_about = "Run MAGICIAN to simulate MAGs for a specified community or set of communities.

The community file lists paths to source genomes, their sequence type (plasmid/chromosome) \
and their relative copy number in each community to simulate (one column per community)."
)]
pub struct Args {
    /// Sample distribution (community) file
    pub community_file: PathBuf,

    /// Desired output file or rule
    #[arg(long, default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Type of ART error profile to use for CAMISIM
    #[arg(long, value_enum, default_value_t = ProfileType::Mbarc)]
    pub profile_type: ProfileType,

    /// Base name of custom error profile (files without '[1/2].txt'); required with 'own'
    #[arg(long)]
    pub profile_name: Option<String>,

    /// Read length of custom error profile; required with 'own'
    #[arg(long)]
    pub profile_readlength: Option<String>,

    /// Mean insert size for read simulation
    #[arg(long, default_value_t = DEFAULT_INSERT_SIZE, allow_negative_numbers = true)]
    pub insert_size: i64,

    /// Command for submitting jobs in Snakemake's cluster mode
    #[arg(long)]
    pub cluster: Option<String>,

    /// Amount of cores Snakemake should use
    #[arg(long, default_value_t = DEFAULT_CORES, allow_negative_numbers = true)]
    pub cores: i64,

    /// Workflow configuration (JSON)
    #[arg(long)]
    pub configfile: Option<PathBuf>,

    /// Snakefile of the workflow
    #[arg(long)]
    pub snakefile: Option<PathBuf>,

    /// Flags passed on to snakemake, enclosed in quotes
    #[arg(long, allow_hyphen_values = true)]
    pub snake_flags: Option<String>,

    /// Copy the community file with absolute genome paths to the current
    /// directory and run on that copy
    #[arg(long)]
    pub demo: bool,

    /// Print the snakemake command instead of running it
    #[arg(long)]
    pub print: bool,
}

impl Args {
    fn command(&self) -> SnakemakeCommand {
        let mut cmd = SnakemakeCommand::new(&self.community_file);
        cmd.target = self.target.clone();
        cmd.profile_type = self.profile_type;
        cmd.profile_name = self.profile_name.clone();
        cmd.readlength = self.profile_readlength.clone();
        cmd.insert_size = self.insert_size;
        cmd.cluster = self.cluster.clone();
        cmd.cores = self.cores;
        cmd.snakefile = self.snakefile.clone().unwrap_or_else(default_snakefile);
        cmd.snake_flags = self
            .snake_flags
            .as_deref()
            .map(|flags| flags.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        cmd
    }
}

pub fn run(args: Args) -> Result<()> {
    let mut cmd = args.command();
    cmd.validate()?;

    let configfile = args.configfile.clone().unwrap_or_else(default_config_file);
    cmd = cmd.with_config(configfile)?;
    if args.demo {
        let demo = std::env::current_dir()?.join(DEMO_FILE);
        absolutize_genomes(&args.community_file, &demo)?;
        cmd.samples_file = demo;
    }
    if args.print {
        println!("{}", cmd.build_args()?.join(" "));
        return Ok(());
    }
    cmd.run()?;
    Ok(())
}

#[allow(dead_code)]
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    run(Args::parse())
}
