//! Preparing inputs for CAMISIM: FASTA conversion, metadata, config files.

pub mod config;
pub mod genome;
pub mod inputs;
pub mod reader;

pub use config::{
    check_coverage, community_size, count_lines, sample_size, ConfigParams, ReadSimulator,
    SampleType,
};
pub use genome::{read_genome, Genome, GenomeFormat};
pub use inputs::{prepare_sample, SampleFiles};
