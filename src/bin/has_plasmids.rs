use anyhow::Result;
use clap::Parser;
use magician::samples::has_plasmids;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about = "Check whether a sample contains plasmids (exit status 0 if so, 1 otherwise)"
)]
pub struct Args {
    /// Sample distribution file
    pub samples_file: PathBuf,

    /// Sample column to examine
    pub sample: String,
}

pub fn run(args: Args) -> Result<bool> {
    let found = has_plasmids(&args.samples_file, &args.sample)?;
    println!("{}", found);
    Ok(found)
}

#[allow(dead_code)]
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .init();
    if !run(Args::parse())? {
        std::process::exit(1);
    }
    Ok(())
}
