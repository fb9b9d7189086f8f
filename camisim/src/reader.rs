use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Result, Seek};
use std::path::Path;

/// Opens a file, naming the path in the error when it does not exist.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<File> {
    File::open(&path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            io::Error::new(e.kind(), format!("File not found: {:?}", path.as_ref()))
        } else {
            e
        }
    })
}

/// Checks the gzip magic bytes and rewinds the file.
///
/// Files shorter than two bytes are reported as plain text.
pub fn is_gzipped(file: &mut File) -> Result<bool> {
    let mut buffer = [0; 2];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    file.rewind()?;
    Ok(filled == 2 && buffer == [0x1F, 0x8B])
}

/// Returns a reader over `path`, transparently decompressing gzip input.
pub fn dyn_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let mut file = open_file(path)?;
    if is_gzipped(&mut file)? {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

pub fn buf_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<Box<dyn Read>>> {
    Ok(BufReader::new(dyn_reader(path)?))
}

/// Total sequence length of a FASTA file, all records summed.
pub fn fasta_length<P: AsRef<Path>>(path: P) -> Result<u64> {
    let mut total = 0;
    for line in buf_reader(path)?.lines() {
        let line = line?;
        if !line.starts_with('>') {
            total += line.trim_end().len() as u64;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_fasta_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.fa");
        std::fs::write(&path, ">a first\nACGT\nAC\n>b\r\nGGGGG\r\n").unwrap();
        assert_eq!(fasta_length(&path).unwrap(), 11);
    }

    #[test]
    fn test_dyn_reader_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.tsv");
        std::fs::write(&plain, "a\tb\n1\t2\n").unwrap();

        let gz = dir.path().join("packed.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"a\tb\n1\t2\n").unwrap();
        encoder.finish().unwrap();

        for path in [&plain, &gz] {
            let mut content = String::new();
            dyn_reader(path).unwrap().read_to_string(&mut content).unwrap();
            assert_eq!(content, "a\tb\n1\t2\n");
        }
    }

    #[test]
    fn test_short_file_is_not_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank");
        std::fs::write(&path, "").unwrap();
        let mut file = File::open(&path).unwrap();
        assert!(!is_gzipped(&mut file).unwrap());
    }

    #[test]
    fn test_open_missing_file_names_path() {
        let err = open_file("/nonexistent/bb_stats.tsv").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("bb_stats.tsv"));
    }
}
