//! CAMISIM configuration (`.ini`) generation.

use crate::reader::{buf_reader, fasta_length};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};

pub const ART_DIR: &str = "tools/art_illumina-2.3.6";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadSimulator {
    #[default]
    Art,
    Wgsim,
    Nanosim,
    Pbsim,
}

impl fmt::Display for ReadSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadSimulator::Art => "art",
            ReadSimulator::Wgsim => "wgsim",
            ReadSimulator::Nanosim => "nanosim",
            ReadSimulator::Pbsim => "pbsim",
        };
        write!(f, "{}", name)
    }
}

/// How the simulated samples relate to each other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleType {
    #[default]
    Replicates,
    #[value(name = "timeseries_lognormal")]
    TimeseriesLognormal,
    #[value(name = "timeseries_normal")]
    TimeseriesNormal,
    Differential,
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::Replicates => "replicates",
            SampleType::TimeseriesLognormal => "timeseries_lognormal",
            SampleType::TimeseriesNormal => "timeseries_normal",
            SampleType::Differential => "differential",
        };
        write!(f, "{}", name)
    }
}

/// Number of non-blank lines in a file.
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<usize> {
    let mut count = 0;
    for line in buf_reader(&path)?.lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

pub fn check_coverage(coverage: f64) -> Result<()> {
    if coverage.is_nan() || coverage <= 0.0 {
        bail!("Coverage must be above 0");
    }
    Ok(())
}

/// Sample size in Gbp needed for `coverage`, given the genomes listed in an
/// `id_to_genome_file`. Rounded to two decimals.
pub fn sample_size<P: AsRef<Path>>(id_to_genome: P, coverage: f64) -> Result<f64> {
    check_coverage(coverage)?;
    let mut total = 0u64;
    for line in buf_reader(&id_to_genome)?.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fasta = line
            .split('\t')
            .nth(1)
            .with_context(|| format!("no FASTA path in line '{}'", line))?;
        total += fasta_length(fasta).with_context(|| format!("reading {}", fasta))?;
    }
    let size = coverage * (total as f64 / 1e9);
    Ok((size * 100.0).round() / 100.0)
}

/// Genome count and sample size of an `id_to_genome_file`. The coverage is
/// checked before the file is opened.
pub fn community_size<P: AsRef<Path>>(id_to_genome: P, coverage: f64) -> Result<(usize, f64)> {
    check_coverage(coverage)?;
    let count = count_lines(&id_to_genome)?;
    let size = sample_size(&id_to_genome, coverage)?;
    Ok((count, size))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParams {
    pub camisim_dir: PathBuf,
    pub metadata: PathBuf,
    pub id_to_genome: PathBuf,
    pub output_dir: String,
    pub read_simulator: ReadSimulator,
    pub read_simulator_path: PathBuf,
    pub sample_type: SampleType,
    pub genome_count: usize,
    pub sample_size: f64,
    /// `None` runs without error profile, which only wgsim supports.
    pub error_profiles: Option<PathBuf>,
    pub abundance_file: Option<PathBuf>,
}

impl ConfigParams {
    /// Parameters using the ART binary and profiles shipped with CAMISIM.
    pub fn new<P: AsRef<Path>>(camisim_dir: P, metadata: P, id_to_genome: P) -> Self {
        let camisim_dir = camisim_dir.as_ref().to_path_buf();
        Self {
            metadata: metadata.as_ref().to_path_buf(),
            id_to_genome: id_to_genome.as_ref().to_path_buf(),
            output_dir: "camisim_out".to_string(),
            read_simulator: ReadSimulator::default(),
            read_simulator_path: camisim_dir.join(ART_DIR).join("art_illumina"),
            sample_type: SampleType::default(),
            genome_count: 0,
            sample_size: 1.0,
            error_profiles: Some(camisim_dir.join(ART_DIR).join("profiles")),
            abundance_file: None,
            camisim_dir,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.error_profiles.is_none() && self.read_simulator != ReadSimulator::Wgsim {
            bail!("Error profile can only be omitted with wgsim");
        }
        Ok(())
    }

    /// The config file text.
    pub fn render(&self) -> Result<String> {
        self.validate()?;
        let opt = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let camidir = self.camisim_dir.display();
        Ok(format!(
            "[Main]
# maximum number of processes
max_processors=8

# 0: community design + read simulator,
# 1: read simulator only
phase=0

# ouput directory, where the output will be stored (will be overwritten if set in from_profile)
output_directory={outdir}

# temporary directory
temp_directory=/tmp

# gold standard assembly
gsa=True

# gold standard for all samples combined
pooled_gsa=True

# anonymize sequences?
anonymous=False

# compress data (levels 0-9, recommended is 1 the gain of higher levels is not too high)
compress=1

# id of dataset, used in foldernames and is prefix in anonymous sequences
dataset_id=RL

# Read Simulation settings, relevant also for from_profile
[ReadSimulator]
# which readsimulator to use:
#           Choice of 'art', 'wgsim', 'nanosim', 'pbsim'
type={readsim}

# Samtools (http://www.htslib.org/) takes care of sam/bam files. Version 1.0 or higher required!
# file path to executable
samtools={camidir}/tools/samtools-1.3/samtools

# file path to read simulation executable
readsim={simpath}

#error profiles:
#for ART:
#HiSeq 150bp: hi150
#MBARC-26 150bp: mbarc
#for wgsim:
#error rate as <float> (e.g. 0.05 for 5% error rate)
#blank for nanosim and wgsim
profile=mbarc

# Directory containing error profiles (can be blank for wgsim)
error_profiles={profile_path}

#paired end read, insert size (not applicable for nanosim)
fragments_size_mean=270
fragment_size_standard_deviation=27

# Only relevant if not from_profile is run:
[CommunityDesign]
# optional: give abundance of genomes
distribution_file_paths={dist_file}
# specify the samples size in Giga base pairs
size={samplesize}

# how many different samples?
number_of_samples=1

# how many communities
num_communities=1

# directory containing the taxdump of ncbi, version from 22.02.2017 is shipped
# \"nodes.dmp\"
# \"merged.dmp\"
# \"names.dmp\"
ncbi_taxdump={camidir}/tools/ncbi-taxonomy_20170222.tar.gz

# the strain simulator for de novo strain creation
strain_simulation_template={camidir}/scripts/StrainSimulationWrapper/sgEvolver/simulation_dir/

# define communities: [community<integer>]
[community0]
# information about all included genomes:
# can be used for multiple samples
metadata={metafile}
id_to_genome_file={genomefile}

# how many genomes do you want to sample over all?
genomes_total={amount}
num_real_genomes={amount}

# how many genomes per species taxon
#   (species taxon will be replaced by OTU-cluster later on)
max_strains_per_otu=1
ratio=1

# which kind of different samples do you need?
#   replicates / timeseries_lognormal / timeseries_normal / differential
mode={sampletype}

# Part: community design
# Set parameters of log-normal and normal distribution, number of samples
# sigma > 0; influences shape (higher sigma -> smaller peak and longer tail),
log_sigma=2

# mu (real number) is a parameter for the log-scale
log_mu=1

# do you want to see a distribution before you decide to use it? yes/no
view=no
",
            outdir = self.output_dir,
            readsim = self.read_simulator,
            camidir = camidir,
            simpath = self.read_simulator_path.display(),
            profile_path = opt(&self.error_profiles),
            dist_file = opt(&self.abundance_file),
            samplesize = self.sample_size,
            metafile = self.metadata.display(),
            genomefile = self.id_to_genome.display(),
            amount = self.genome_count,
            sampletype = self.sample_type,
        ))
    }
}
