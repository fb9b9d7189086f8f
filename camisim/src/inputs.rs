//! Per-sample CAMISIM input files built from the sample distribution table.

use crate::genome::{read_genome, Genome};
use crate::reader::dyn_reader;
use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const GENOMES_COLUMN: &str = "genomes";
pub const CONFIG_DIR: &str = "camisim_configfiles";
pub const METADATA_HEADER: &str = "genome_ID\tOTU\tNCBI_ID\tnovelty_category";
pub const NOVELTY_CATEGORY: &str = "known_strain";

/// Files written for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFiles {
    pub fasta_dir: PathBuf,
    pub metadata: PathBuf,
    pub id_to_genome: PathBuf,
    pub id_to_distributions: PathBuf,
    pub genomes: Vec<Genome>,
}

/// Genome paths and abundance cells of `sample`, rows with abundance 0 dropped.
fn present_genomes(samples_file: &Path, sample: &str) -> Result<Vec<(PathBuf, String)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(dyn_reader(samples_file)?);
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("column '{}' not found in {:?}", name, samples_file))
    };
    let genomes_idx = column(GENOMES_COLUMN)?;
    let sample_idx = column(sample)?;

    let mut present = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let genome = record.get(genomes_idx).unwrap_or("");
        let cell = record.get(sample_idx).unwrap_or("");
        let abundance: f64 = cell
            .parse()
            .with_context(|| format!("{:?} line {}: abundance '{}'", samples_file, row + 2, cell))?;
        if abundance != 0.0 {
            present.push((PathBuf::from(genome), cell.to_string()));
        }
    }
    Ok(present)
}

fn write_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the FASTA directory, metadata, genome and abundance files for one
/// sample column below `out_dir`.
pub fn prepare_sample<P: AsRef<Path>, Q: AsRef<Path>>(
    samples_file: P,
    sample: &str,
    out_dir: Q,
) -> Result<SampleFiles> {
    let samples_file = samples_file.as_ref();
    let out_dir = out_dir.as_ref();
    let out_dir = if out_dir.is_absolute() {
        out_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(out_dir)
    };

    let present = present_genomes(samples_file, sample)?;
    log::info!("{}: {} genomes with non-zero abundance", sample, present.len());

    let fasta_dir = out_dir.join(format!("camisim_fasta_{}", sample));
    let config_dir = out_dir.join(CONFIG_DIR);
    fs::create_dir_all(&fasta_dir)?;
    fs::create_dir_all(&config_dir)?;

    let mut genomes = Vec::with_capacity(present.len());
    let mut metadata = vec![METADATA_HEADER.to_string()];
    let mut id_to_genome = Vec::new();
    let mut id_to_distributions = Vec::new();
    for (otu, (path, abundance)) in present.iter().enumerate() {
        let genome = read_genome(path, &fasta_dir)?;
        metadata.push(format!(
            "{}\t{}\t{}\t{}",
            genome.id,
            otu + 1,
            genome.taxon_id,
            NOVELTY_CATEGORY
        ));
        id_to_genome.push(format!("{}\t{}", genome.id, genome.fasta.display()));
        id_to_distributions.push(format!("{}\t{}", genome.id, abundance));
        genomes.push(genome);
    }

    let files = SampleFiles {
        metadata: config_dir.join(format!("metadata_{}", sample)),
        id_to_genome: config_dir.join(format!("id_to_genome_file_{}", sample)),
        id_to_distributions: config_dir.join(format!("id_to_distributions_{}", sample)),
        fasta_dir,
        genomes,
    };
    write_lines(&files.metadata, &metadata)?;
    write_lines(&files.id_to_genome, &id_to_genome)?;
    write_lines(&files.id_to_distributions, &id_to_distributions)?;
    Ok(files)
}
