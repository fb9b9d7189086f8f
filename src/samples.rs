//! Helpers around the sample distribution file.
//!
//! The file is tab-separated with a `genomes` column (paths to GenBank or
//! FASTA files), a `seq_type` column (`chromosome` or `plasmid`) and one
//! abundance column per sample.

use crate::table::{Table, TAB};
use crate::utils::absolute_path;
use crate::{Error, Result};
use csv::WriterBuilder;
use std::path::Path;

pub const GENOMES_COLUMN: &str = "genomes";
pub const SEQ_TYPE_COLUMN: &str = "seq_type";

/// Names of the sample columns, in file order.
pub fn sample_names<P: AsRef<Path>>(samples_file: P) -> Result<Vec<String>> {
    let table = Table::read(samples_file, TAB)?;
    table.require(&[GENOMES_COLUMN, SEQ_TYPE_COLUMN])?;
    Ok(table
        .headers()
        .iter()
        .filter(|h| *h != GENOMES_COLUMN && *h != SEQ_TYPE_COLUMN)
        .map(String::from)
        .collect())
}

fn abundance(table: &Table, row: usize, cell: &str) -> Result<f64> {
    cell.parse::<f64>().map_err(|e| Error::Parse {
        path: table.path().to_path_buf(),
        line: row as u64 + 2,
        message: format!("abundance '{}': {}", cell, e),
    })
}

/// Whether any sequence present in `sample` (abundance not 0) is a plasmid.
pub fn has_plasmids<P: AsRef<Path>>(samples_file: P, sample: &str) -> Result<bool> {
    let table = Table::read(samples_file, TAB)?;
    let abundances = table.column(sample)?;
    let seq_types = table.column(SEQ_TYPE_COLUMN)?;

    for (row, (cell, seq_type)) in abundances.iter().zip(seq_types).enumerate() {
        if abundance(&table, row, cell)? != 0.0 && seq_type.contains("plasmid") {
            log::debug!("{}: plasmid in row {}", sample, row + 1);
            return Ok(true);
        }
    }
    Ok(false)
}

/// Copies `samples_file` to `outfile` with every genome path made absolute.
pub fn absolutize_genomes<P: AsRef<Path>, Q: AsRef<Path>>(samples_file: P, outfile: Q) -> Result<()> {
    let table = Table::read(samples_file, TAB)?;
    let genomes = table.column_index(GENOMES_COLUMN)?;

    log::info!("Creating temporary input file {:?}", outfile.as_ref());
    let mut writer = WriterBuilder::new().delimiter(TAB).from_path(outfile)?;
    writer.write_record(table.headers())?;
    let mut cells: Vec<String> = Vec::new();
    for record in table.records() {
        cells.clear();
        for (idx, cell) in record.iter().enumerate() {
            if idx == genomes {
                cells.push(absolute_path(cell)?.display().to_string());
            } else {
                cells.push(cell.to_string());
            }
        }
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}
