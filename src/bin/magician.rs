use clap::{Parser, Subcommand};
mod camisim_config;
mod camisim_data;
mod extract_stats;
mod has_plasmids;
mod make_comparison;
mod run_magician;

use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Snakemake workflow
    Run(run_magician::Args),
    /// Prepare CAMISIM input files for one sample
    CamisimData(camisim_data::Args),
    /// Write a CAMISIM config file
    CamisimConfig(camisim_config::Args),
    /// Build the summary workbook from bbtools, CheckM and dRep reports
    ExtractStats(extract_stats::Args),
    /// Build the bin-centric comparison workbook
    Compare(make_comparison::Args),
    /// Check whether a sample contains plasmids
    HasPlasmids(has_plasmids::Args),
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    match args.cmd {
        Commands::Run(cmd_args) => run_magician::run(cmd_args)?,
        Commands::CamisimData(cmd_args) => camisim_data::run(cmd_args)?,
        Commands::CamisimConfig(cmd_args) => camisim_config::run(cmd_args)?,
        Commands::ExtractStats(cmd_args) => extract_stats::run(cmd_args)?,
        Commands::Compare(cmd_args) => make_comparison::run(cmd_args)?,
        Commands::HasPlasmids(cmd_args) => {
            if !has_plasmids::run(cmd_args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
