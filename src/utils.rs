use std::fs::{self, create_dir_all};
use std::io::Result;
use std::path::{Path, PathBuf};

pub use camisim::reader::{dyn_reader, open_file};

pub fn create_dir<P: AsRef<Path>>(dirname: P) -> Result<()> {
    let dirname = dirname.as_ref();
    if !dirname.exists() {
        create_dir_all(dirname)?;
    }
    Ok(())
}

/// Absolute form of `path`, resolved against the current directory when the
/// path does not exist yet.
pub fn absolute_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    match fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}
