//! Chunked file reading module
//!
//! Streams a byte range of a file in fixed-size chunks so response bodies
//! never hold more than one chunk of a (possibly multi-gigabyte) file.

use futures::stream::{self, Stream};
use hyper::body::Bytes;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::range::ByteRange;

/// Maximum size of a single chunk
pub const CHUNK_SIZE: usize = 4096;

/// Reader over one byte range of an open file
///
/// Owns the file handle; dropping the reader (or the stream made from it)
/// closes the file.
#[derive(Debug)]
pub struct ChunkedReader {
    file: File,
    remaining: u64,
}

impl ChunkedReader {
    /// Open `path` and position it at the start of `range`
    pub async fn open(path: &Path, range: ByteRange) -> std::io::Result<Self> {
        let mut file = File::open(path).await?;
        file.seek(SeekFrom::Start(range.start)).await?;
        Ok(Self {
            file,
            remaining: range.len(),
        })
    }

    /// Read the next chunk, `None` once the range is exhausted
    ///
    /// A short file ends the sequence early instead of failing.
    pub async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = usize::try_from(self.remaining).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE));
        let mut buf = vec![0u8; want];
        let read = self.file.read(&mut buf).await?;
        if read == 0 {
            self.remaining = 0;
            return Ok(None);
        }

        buf.truncate(read);
        self.remaining -= read as u64;
        Ok(Some(Bytes::from(buf)))
    }

    /// Turn the reader into a single-pass stream of chunks
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        stream::try_unfold(self, |mut reader| async move {
            let chunk = reader.next_chunk().await?;
            Ok(chunk.map(|bytes| (bytes, reader)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Write;

    fn sample_file(len: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
        #[allow(clippy::cast_possible_truncation)]
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        (file, data)
    }

    #[tokio::test]
    async fn test_reads_exact_range_in_bounded_chunks() {
        let (file, data) = sample_file(10_000);
        let range = ByteRange { start: 1000, end: 9499 };
        let reader = ChunkedReader::open(file.path(), range).await.unwrap();

        let chunks: Vec<Bytes> = reader.into_stream().try_collect().await.unwrap();
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_SIZE));
        assert_eq!(chunks.len(), 3);

        let body: Vec<u8> = chunks.concat();
        assert_eq!(body, &data[1000..=9499]);
    }

    #[tokio::test]
    async fn test_single_byte_range() {
        let (file, data) = sample_file(100);
        let range = ByteRange { start: 42, end: 42 };
        let mut reader = ChunkedReader::open(file.path(), range).await.unwrap();
        let chunk = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!(chunk.as_ref(), &data[42..43]);
        assert!(reader.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_short_file_truncates() {
        let (file, data) = sample_file(5000);
        // Range reaches past the end of the file
        let range = ByteRange { start: 4000, end: 9999 };
        let reader = ChunkedReader::open(file.path(), range).await.unwrap();
        let chunks: Vec<Bytes> = reader.into_stream().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), &data[4000..]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let range = ByteRange { start: 0, end: 9 };
        let err = ChunkedReader::open(&dir.path().join("nope.mp4"), range)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
