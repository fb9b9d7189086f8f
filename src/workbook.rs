//! Workbooks: a directory holding one tab-separated file per sheet.
//!
//! Sheets are written into a hidden sibling staging directory which only
//! replaces the target once [`WorkbookWriter::finish`] is called. Dropping an
//! unfinished writer removes the staging directory again.

use crate::table::{Table, TAB};
use crate::utils::create_dir;
use crate::{Error, Result};
use csv::WriterBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SHEET_EXTENSION: &str = "tsv";

/// A row type stored in a named sheet with a fixed column order.
///
/// The serialised field order must match `COLUMNS`.
pub trait SheetRow: Serialize + DeserializeOwned {
    const SHEET: &'static str;
    const COLUMNS: &'static [&'static str];
}

/// A column and its human-readable meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub column: String,
    pub description: String,
}

impl Explanation {
    pub fn new(column: &str, description: &str) -> Self {
        Self {
            column: column.to_string(),
            description: description.to_string(),
        }
    }
}

impl SheetRow for Explanation {
    const SHEET: &'static str = "explanations";
    const COLUMNS: &'static [&'static str] = &["column", "description"];
}

pub fn sheet_path(workbook: &Path, sheet: &str) -> PathBuf {
    workbook.join(format!("{}.{}", sheet, SHEET_EXTENSION))
}

fn staging_path(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| Error::invalid("workbook", target.display().to_string(), "a file name"))?;
    let parent = target.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!(".{}.staging", name.to_string_lossy())))
}

#[derive(Debug)]
pub struct WorkbookWriter {
    target: PathBuf,
    staging: PathBuf,
    finished: bool,
}

impl WorkbookWriter {
    pub fn create<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let staging = staging_path(&target)?;
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        if let Some(parent) = staging.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        create_dir(&staging)?;
        Ok(Self {
            target,
            staging,
            finished: false,
        })
    }

    /// Writes (or overwrites) the sheet of `T`. A header is written even when
    /// `rows` is empty.
    pub fn write_sheet<T: SheetRow>(&self, rows: &[T]) -> Result<()> {
        let path = sheet_path(&self.staging, T::SHEET);
        let mut writer = WriterBuilder::new()
            .delimiter(TAB)
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(T::COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        log::debug!("sheet {} with {} rows", T::SHEET, rows.len());
        Ok(())
    }

    /// Moves the staged sheets into place, replacing any previous workbook.
    pub fn finish(mut self) -> Result<PathBuf> {
        if self.target.is_dir() {
            fs::remove_dir_all(&self.target)?;
        } else if self.target.exists() {
            fs::remove_file(&self.target)?;
        }
        fs::rename(&self.staging, &self.target)?;
        self.finished = true;
        log::info!("workbook written to {:?}", &self.target);
        Ok(self.target.clone())
    }
}

impl Drop for WorkbookWriter {
    fn drop(&mut self) {
        if !self.finished && self.staging.exists() {
            if let Err(e) = fs::remove_dir_all(&self.staging) {
                log::warn!("could not remove {:?}: {}", &self.staging, e);
            }
        }
    }
}

/// Reads the sheet of `T` from a workbook directory.
pub fn read_sheet<T: SheetRow, P: AsRef<Path>>(workbook: P) -> Result<Vec<T>> {
    let table = Table::read(sheet_path(workbook.as_ref(), T::SHEET), TAB)?;
    table.require(T::COLUMNS)?;
    table.deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: Option<f64>,
    }

    impl SheetRow for Row {
        const SHEET: &'static str = "rows";
        const COLUMNS: &'static [&'static str] = &["name", "value"];
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book");
        let rows = vec![
            Row {
                name: "a".into(),
                value: Some(0.9999186),
            },
            Row {
                name: "b".into(),
                value: None,
            },
        ];

        let writer = WorkbookWriter::create(&target).unwrap();
        writer.write_sheet(&rows).unwrap();
        writer
            .write_sheet(&[Explanation::new("name", "row name")])
            .unwrap();
        writer.finish().unwrap();

        let text = fs::read_to_string(target.join("rows.tsv")).unwrap();
        assert_eq!(text, "name\tvalue\na\t0.9999186\nb\t\n");
        assert_eq!(read_sheet::<Row, _>(&target).unwrap(), rows);
        assert_eq!(
            read_sheet::<Explanation, _>(&target).unwrap(),
            vec![Explanation::new("name", "row name")]
        );
        assert!(!dir.path().join(".book.staging").exists());
    }

    #[test]
    fn test_empty_sheet_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book");
        let writer = WorkbookWriter::create(&target).unwrap();
        writer.write_sheet::<Row>(&[]).unwrap();
        writer.finish().unwrap();
        assert_eq!(
            fs::read_to_string(target.join("rows.tsv")).unwrap(),
            "name\tvalue\n"
        );
        assert!(read_sheet::<Row, _>(&target).unwrap().is_empty());
    }

    #[test]
    fn test_unfinished_writer_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book");
        {
            let writer = WorkbookWriter::create(&target).unwrap();
            writer.write_sheet::<Row>(&[]).unwrap();
        }
        assert!(!target.exists());
        assert!(!dir.path().join(".book.staging").exists());
    }

    #[test]
    fn test_existing_workbook_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("book");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("stale.tsv"), "x\n").unwrap();

        let writer = WorkbookWriter::create(&target).unwrap();
        writer.write_sheet::<Row>(&[]).unwrap();
        writer.finish().unwrap();
        assert!(!target.join("stale.tsv").exists());
        assert!(target.join("rows.tsv").exists());
    }

    #[test]
    fn test_missing_sheet_column() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rows.tsv"), "name\nx\n").unwrap();
        match read_sheet::<Row, _>(dir.path()) {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "value"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
