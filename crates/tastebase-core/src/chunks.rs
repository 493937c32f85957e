//! Chunk file naming: `<prefix>_<index>.json` with a 1-based, zero-padded index.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const INDEX_WIDTH: usize = 5;

/// A chunk artifact found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub index: u64,
    pub path: PathBuf,
}

impl ChunkFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn chunk_file_name(prefix: &str, index: u64) -> String {
    format!("{prefix}_{index:0width$}.json", width = INDEX_WIDTH)
}

/// Parse the index out of `<prefix>_<digits>.json`.
///
/// Only digits may follow the prefix, so `review` never matches
/// `review_photo_00001.json`.
pub fn parse_chunk_index(prefix: &str, file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// List chunk files for `prefix` in numeric index order.
pub fn list_chunk_files(dir: &Path, prefix: &str) -> Result<Vec<ChunkFile>> {
    let entries = std::fs::read_dir(dir).map_err(|err| Error::io(dir, err))?;
    let mut chunks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(dir, err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(index) = parse_chunk_index(prefix, name) {
            chunks.push(ChunkFile {
                index,
                path: entry.path(),
            });
        }
    }
    chunks.sort_by_key(|chunk| chunk.index);
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_sort_lexically_and_numerically() {
        assert_eq!(chunk_file_name("review", 1), "review_00001.json");
        assert!(chunk_file_name("review", 2) < chunk_file_name("review", 10));
    }

    #[test]
    fn parse_rejects_other_prefixes() {
        assert_eq!(parse_chunk_index("review", "review_00012.json"), Some(12));
        assert_eq!(parse_chunk_index("review", "review_7.json"), Some(7));
        assert_eq!(parse_chunk_index("review", "review_photo_00001.json"), None);
        assert_eq!(parse_chunk_index("review_photo", "review_photo_00003.json"), Some(3));
        assert_eq!(parse_chunk_index("review", "review_.json"), None);
        assert_eq!(parse_chunk_index("review", "review_00001.json.tmp"), None);
    }

    #[test]
    fn lists_in_numeric_order() {
        let dir = std::env::temp_dir().join(format!("tastebase_chunks_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        for name in ["review_10.json", "review_2.json", "review_photo_1.json", "notes.txt"] {
            std::fs::write(dir.join(name), "[]").expect("write fixture");
        }

        let chunks = list_chunk_files(&dir, "review").expect("list chunks");
        let indexes: Vec<u64> = chunks.iter().map(|chunk| chunk.index).collect();
        assert_eq!(indexes, vec![2, 10]);
        assert_eq!(chunks[0].file_name(), "review_2.json");
    }
}
