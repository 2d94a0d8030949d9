//! Opening corpus files, gzip-compressed or not.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Open `path` for buffered line reading, gunzipping `*.gz` files.
pub fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        log::debug!("reading {:?} through a gzip decoder", path);
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |extension| extension == "gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_reads_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.conll");
        std::fs::write(&path, "1\ta\n\n").unwrap();

        let lines: Vec<String> = open(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["1\ta", ""]);
    }

    #[test]
    fn test_reads_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.conll.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"1\tprvni\n2\tdruhy\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = open(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["1\tprvni", "2\tdruhy"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open(&dir.path().join("absent.conll")).is_err());
    }
}
