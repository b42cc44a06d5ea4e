// dataprofiler - core/byte_source.rs
//
// Byte Source & Gzip (spec §4.1). Wraps a seekable file handle and
// transparently decompresses gzip when the stream's leading two bytes
// are the gzip magic `1F 8B`. Yields bytes with a running compressed-byte
// offset suitable for progress reporting.

use crate::util::constants::GZIP_MAGIC;
use crate::util::error::ByteSourceError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Counts bytes actually pulled from the underlying file, regardless of
/// how many decompressed bytes that produced. Shared between the plain
/// and gzip branches via a `Read` wrapper around the file.
struct CountingReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }
    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.consumed += amt as u64;
    }
}

enum Inner {
    Plain(CountingReader<BufReader<File>>),
    Gzip(Box<MultiGzDecoder<CountingReader<BufReader<File>>>>),
}

/// Reads bytes from a file, transparently decompressing gzip.
///
/// `compressed_offset` tracks bytes actually consumed from the
/// underlying file, which is what progress reporting is denominated
/// against per spec §4.1 ("current compressed-byte offset").
pub struct ByteSource {
    inner: Inner,
    path: PathBuf,
    total_compressed_size: u64,
    is_gzip: bool,
}

impl ByteSource {
    /// Open `path`, sniffing for a gzip header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ByteSourceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ByteSourceError::Io {
            path: path.clone(),
            source,
        })?;
        let total_compressed_size = file
            .metadata()
            .map_err(|source| ByteSourceError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        let mut reader = CountingReader {
            inner: BufReader::new(file),
            consumed: 0,
        };
        let is_gzip = {
            let peeked = reader.fill_buf().map_err(|source| ByteSourceError::Io {
                path: path.clone(),
                source,
            })?;
            peeked.len() >= 2 && peeked[..2] == GZIP_MAGIC
        };

        let inner = if is_gzip {
            Inner::Gzip(Box::new(MultiGzDecoder::new(reader)))
        } else {
            Inner::Plain(reader)
        };

        Ok(Self {
            inner,
            path,
            total_compressed_size,
            is_gzip,
        })
    }

    /// Current compressed-byte offset, for progress numerators.
    pub fn compressed_offset(&self) -> u64 {
        match &self.inner {
            Inner::Plain(r) => r.consumed,
            Inner::Gzip(r) => r.get_ref().consumed,
        }
    }

    /// Total compressed size, for progress denominators.
    pub fn total_compressed_size(&self) -> u64 {
        self.total_compressed_size
    }

    pub fn is_gzip(&self) -> bool {
        self.is_gzip
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Plain(r) => r.read(buf),
            Inner::Gzip(r) => r.read(buf).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("gzip decode error in '{}': {e}", self.path.display()),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_file_passes_through_bytes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"id,name\n1,a\n").unwrap();
        let mut source = ByteSource::open(tmp.path()).unwrap();
        assert!(!source.is_gzip());
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"id,name\n1,a\n");
        assert_eq!(source.compressed_offset(), 12);
        assert_eq!(source.path(), tmp.path());
    }

    #[test]
    fn gzip_file_is_detected_and_decompressed() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        {
            let mut enc = GzEncoder::new(&mut tmp, Compression::default());
            enc.write_all(b"id,name\n1,a\n").unwrap();
            enc.finish().unwrap();
        }
        let mut source = ByteSource::open(tmp.path()).unwrap();
        assert!(source.is_gzip());
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"id,name\n1,a\n");
        assert!(source.compressed_offset() > 0);
        assert!(source.compressed_offset() <= source.total_compressed_size());
    }
}
