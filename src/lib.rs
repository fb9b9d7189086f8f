//! MAGICIAN: simulated metagenome-assembled genomes and their evaluation.
//!
//! The heavy lifting (read simulation, assembly, binning, CheckM, dRep) is
//! done by external tools driven through Snakemake. This crate normalises
//! and reconciles their reports into comparison workbooks and builds the
//! workflow command line.

pub mod bbstats;
pub mod checkm;
pub mod compare;
pub mod drep;
mod error;
pub mod merge;
pub mod names;
pub mod samples;
pub mod snakemake;
pub mod summary;
pub mod table;
pub mod utils;
pub mod workbook;

pub use error::{Error, Result};
pub use merge::GenomeType;
