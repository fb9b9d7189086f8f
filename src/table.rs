//! Delimited report tables with header-based column access.

use crate::utils::dyn_reader;
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const TAB: u8 = b'\t';
pub const COMMA: u8 = b',';

/// A fully materialised report: one header row plus its records.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Table {
    /// Reads a whole delimited file (plain or gzip) into memory.
    pub fn read<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(dyn_reader(&path)?);

        let headers = reader.headers()?.clone();
        let records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("read {} rows from {:?}", records.len(), &path);

        Ok(Self {
            path,
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renames header cells; used to repair upstream typos before lookup.
    pub fn rename_headers<F>(&mut self, rename: F)
    where
        F: Fn(&str) -> String,
    {
        self.headers = self.headers.iter().map(|h| rename(h)).collect();
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Fails with the first column of `columns` that the header lacks.
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            self.column_index(column)?;
        }
        Ok(())
    }

    /// All cells of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(idx).unwrap_or(""))
            .collect())
    }

    /// Deserialises every record by header name. Extra columns are ignored.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                record
                    .deserialize(Some(&self.headers))
                    .map_err(|e| Error::Parse {
                        path: self.path.clone(),
                        line: record
                            .position()
                            .map(|p| p.line())
                            .unwrap_or(i as u64 + 2),
                        message: e.to_string(),
                    })
            })
            .collect()
    }
}
