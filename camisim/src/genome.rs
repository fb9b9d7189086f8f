//! Source genomes given as GenBank or FASTA files.

use crate::reader::{buf_reader, dyn_reader};
use anyhow::{anyhow, bail, Context, Result};
use gb_io::reader::SeqReader;
use gb_io::seq::Seq;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Taxon assumed for FASTA input, which carries no taxonomy (Bacteria).
pub const FASTA_TAXON: &str = "2";
pub const FASTA_LINE_WIDTH: usize = 60;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_\-]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomeFormat {
    Genbank,
    Fasta,
}

/// A genome ready for CAMISIM: its identifier, NCBI taxon and FASTA copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub id: String,
    pub taxon_id: String,
    pub fasta: PathBuf,
}

/// Spaces become `_`, everything outside `[A-Za-z0-9_-]` is dropped.
pub fn sanitize(name: &str) -> String {
    UNSAFE_CHARS
        .replace_all(&name.replace(' ', "_"), "")
        .into_owned()
}

pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<GenomeFormat> {
    let mut first = String::new();
    buf_reader(&path)?.read_line(&mut first)?;
    if first.starts_with("LOCUS") {
        Ok(GenomeFormat::Genbank)
    } else if first.starts_with('>') {
        Ok(GenomeFormat::Fasta)
    } else {
        bail!("Incorrect file type, only Genbank and Fasta files can be used")
    }
}

/// Value of the first `/db_xref="taxon:..."` qualifier, if any.
pub fn first_taxon<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
    for line in buf_reader(path)?.lines() {
        let line = line?;
        if let Some(pos) = line.find("taxon:") {
            let taxon = line[pos + "taxon:".len()..].trim().replace('"', "");
            return Ok(Some(taxon));
        }
    }
    Ok(None)
}

fn write_fasta_record<W: Write>(writer: &mut W, header: &str, seq: &[u8]) -> Result<()> {
    writeln!(writer, ">{}", header)?;
    for line in seq.chunks(FASTA_LINE_WIDTH) {
        writer.write_all(&line.to_ascii_uppercase())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn record_name(seq: &Seq) -> Option<&str> {
    seq.version.as_deref().or(seq.name.as_deref())
}

fn read_genbank(path: &Path, fasta_dir: &Path) -> Result<Genome> {
    let records = SeqReader::new(dyn_reader(path)?)
        .collect::<std::result::Result<Vec<Seq>, _>>()
        .with_context(|| format!("parsing GenBank file {:?}", path))?;
    let first = records
        .first()
        .ok_or_else(|| anyhow!("no GenBank record in {:?}", path))?;

    let name = record_name(first).ok_or_else(|| anyhow!("record without name in {:?}", path))?;
    let source = first.source.as_ref().map(|s| s.source.as_str()).unwrap_or("");
    let id = format!("{}_{}", sanitize(source), name.replace('.', "_"));

    let taxon_id = match first_taxon(path)? {
        Some(taxon) => taxon,
        None => {
            log::warn!("{:?} has no taxon, leaving NCBI_ID empty", path);
            String::new()
        }
    };

    let fasta = fasta_dir.join(format!("{}.fa", id));
    let mut writer = BufWriter::new(File::create(&fasta)?);
    for record in &records {
        let header = match (record_name(record), record.definition.as_deref()) {
            (Some(name), Some(definition)) => format!("{} {}", name, definition),
            (Some(name), None) => name.to_string(),
            (None, _) => id.clone(),
        };
        write_fasta_record(&mut writer, &header, &record.seq)?;
    }
    writer.flush()?;

    Ok(Genome { id, taxon_id, fasta })
}

fn read_fasta(path: &Path, fasta_dir: &Path) -> Result<Genome> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = sanitize(&stem);
    let fasta = fasta_dir.join(format!("{}.fa", id));
    fs::copy(path, &fasta).with_context(|| format!("copying {:?}", path))?;
    Ok(Genome {
        id,
        taxon_id: FASTA_TAXON.to_string(),
        fasta,
    })
}

/// Converts or copies a source genome into `fasta_dir` as `<id>.fa`.
pub fn read_genome<P: AsRef<Path>, Q: AsRef<Path>>(path: P, fasta_dir: Q) -> Result<Genome> {
    let path = path.as_ref();
    let genome = match detect_format(path).with_context(|| format!("{:?}", path))? {
        GenomeFormat::Genbank => read_genbank(path, fasta_dir.as_ref())?,
        GenomeFormat::Fasta => read_fasta(path, fasta_dir.as_ref())?,
    };
    log::debug!("{:?} -> {} (taxon {})", path, genome.id, genome.taxon_id);
    Ok(genome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const GENBANK: &str = r#"LOCUS       TEST000001                70 bp    DNA     circular BCT 01-JAN-2020
DEFINITION  Testus bacterium strain T1 chromosome, complete genome.
ACCESSION   TEST000001
VERSION     TEST000001.1
SOURCE      Testus bacterium (strain T1)
  ORGANISM  Testus bacterium
            Bacteria; Testota.
FEATURES             Location/Qualifiers
     source          1..70
                     /organism="Testus bacterium"
                     /mol_type="genomic DNA"
                     /db_xref="taxon:12345"
ORIGIN
        1 acgtacgtac gtacgtacgt acgtacgtac gtacgtacgt acgtacgtac gtacgtacgt
       61 acgtacgtac
//
"#;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Testus bacterium (strain T1)"), "Testus_bacterium_strain_T1");
        assert_eq!(sanitize("E. coli K-12"), "E_coli_K-12");
    }

    #[test]
    fn test_genbank_to_fasta() {
        let dir = tempfile::tempdir().unwrap();
        let gb = dir.path().join("test.gb");
        fs::write(&gb, GENBANK).unwrap();
        let out = dir.path().join("fasta");
        fs::create_dir(&out).unwrap();

        let genome = read_genome(&gb, &out).unwrap();
        assert_eq!(genome.id, "Testus_bacterium_strain_T1_TEST000001_1");
        assert_eq!(genome.taxon_id, "12345");
        assert_eq!(genome.fasta, out.join("Testus_bacterium_strain_T1_TEST000001_1.fa"));

        let fasta = fs::read_to_string(&genome.fasta).unwrap();
        let lines: Vec<&str> = fasta.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(">TEST000001.1 "));
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2], "ACGTACGTAC");
    }

    #[test]
    fn test_fasta_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("My genome.v2.fasta");
        fs::write(&src, ">seq1\nACGT\n").unwrap();
        let out = dir.path().join("fasta");
        fs::create_dir(&out).unwrap();

        let genome = read_genome(&src, &out).unwrap();
        assert_eq!(genome.id, "My_genomev2");
        assert_eq!(genome.taxon_id, FASTA_TAXON);
        assert_eq!(fs::read_to_string(&genome.fasta).unwrap(), ">seq1\nACGT\n");
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.txt");
        fs::write(&src, "this is not a genome\n").unwrap();
        let err = read_genome(&src, dir.path()).unwrap_err();
        assert!(format!("{:#}", err)
            .contains("Incorrect file type, only Genbank and Fasta files can be used"));
    }
}
