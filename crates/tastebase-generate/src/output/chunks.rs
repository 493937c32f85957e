use std::path::{Path, PathBuf};

use serde::Serialize;
use tastebase_core::{chunk_file_name, list_chunk_files, write_json_atomic};
use tracing::{debug, info};

use crate::errors::GenerationError;

/// A chunk file that has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenChunk {
    pub index: u64,
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
}

/// Streams records into `<prefix>_<index>.json` files of at most
/// `chunk_size` records each, so peak memory stays at one chunk.
#[derive(Debug)]
pub struct ChunkWriter<T> {
    dir: PathBuf,
    prefix: String,
    chunk_size: usize,
    next_index: u64,
    buffer: Vec<T>,
}

impl<T: Serialize> ChunkWriter<T> {
    /// Prepare `dir` and drop chunk files a previous run left behind.
    pub fn create(dir: &Path, prefix: &str, chunk_size: usize) -> Result<Self, GenerationError> {
        if chunk_size == 0 {
            return Err(GenerationError::InvalidConfig(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        std::fs::create_dir_all(dir)?;
        remove_stale_chunks(dir, prefix)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            chunk_size,
            next_index: 1,
            buffer: Vec::with_capacity(chunk_size),
        })
    }

    /// Buffer one record; returns the chunk written when the buffer filled up.
    pub fn push(&mut self, record: T) -> Result<Option<WrittenChunk>, GenerationError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size {
            return self.flush().map(Some);
        }
        Ok(None)
    }

    /// Index the next flushed chunk will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Write whatever is buffered. An empty buffer writes nothing.
    pub fn finish(mut self) -> Result<Option<WrittenChunk>, GenerationError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.flush().map(Some)
    }

    fn flush(&mut self) -> Result<WrittenChunk, GenerationError> {
        let index = self.next_index;
        let chunk = write_chunk_at(&self.dir, &self.prefix, index, &self.buffer)?;
        self.buffer.clear();
        self.next_index += 1;
        Ok(chunk)
    }
}

/// Write one chunk with an explicit index (used for companion files).
pub fn write_chunk_at<T: Serialize>(
    dir: &Path,
    prefix: &str,
    index: u64,
    records: &[T],
) -> Result<WrittenChunk, GenerationError> {
    let path = dir.join(chunk_file_name(prefix, index));
    let bytes = write_json_atomic(&path, records)?;
    info!(file = %path.display(), rows = records.len(), "chunk written");
    Ok(WrittenChunk {
        index,
        path,
        rows: records.len(),
        bytes,
    })
}

/// Remove every `<prefix>_<digits>.json` in `dir`.
pub fn remove_stale_chunks(dir: &Path, prefix: &str) -> Result<usize, GenerationError> {
    let stale = list_chunk_files(dir, prefix)?;
    for chunk in &stale {
        std::fs::remove_file(&chunk.path)?;
        debug!(file = %chunk.path.display(), "removed stale chunk");
    }
    Ok(stale.len())
}

/// Write a whole sequence as chunks.
pub fn write_chunks<T, I>(
    dir: &Path,
    prefix: &str,
    records: I,
    chunk_size: usize,
) -> Result<Vec<WrittenChunk>, GenerationError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = ChunkWriter::create(dir, prefix, chunk_size)?;
    let mut written = Vec::new();
    for record in records {
        if let Some(chunk) = writer.push(record)? {
            written.push(chunk);
        }
    }
    written.extend(writer.finish()?);
    Ok(written)
}

/// Expected chunk sizes for `rows` records: `ceil(rows / chunk_size)` entries.
pub fn plan_chunk_sizes(rows: usize, chunk_size: usize) -> Vec<usize> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let mut sizes = vec![chunk_size; rows / chunk_size];
    if rows % chunk_size != 0 {
        sizes.push(rows % chunk_size);
    }
    sizes
}
