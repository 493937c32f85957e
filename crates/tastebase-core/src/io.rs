//! JSON artifact reading and atomic writing.

use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Read a file holding a JSON array of records.
///
/// A missing file is an error: callers ask for artifacts they expect to load.
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    serde_json::from_str(&content).map_err(|err| Error::json(path, err))
}

/// Write a value as pretty JSON through a temp file and rename.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<u64> {
    let data = serde_json::to_vec_pretty(value).map_err(|err| Error::json(path, err))?;
    write_bytes_atomic(path, &data).map_err(|err| Error::io(path, err))?;
    Ok(data.len() as u64)
}

fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = parent {
        sync_dir(parent)?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(path)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("tastebase_io_{label}_{}", uuid::Uuid::new_v4()));
        create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn writes_and_reads_back_array() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("numbers.json");
        write_json_atomic(&path, &[1_u32, 2, 3]).expect("write");

        let values: Vec<u32> = read_json_array(&path).expect("read");
        assert_eq!(values, vec![1, 2, 3]);
        assert!(!dir.join(".numbers.json.tmp").exists());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = temp_dir("missing");
        let path = dir.join("absent.json");
        let err = read_json_array::<u32>(&path).expect_err("missing file must fail");
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn non_array_is_rejected() {
        let dir = temp_dir("object");
        let path = dir.join("object.json");
        std::fs::write(&path, r#"{"a": 1}"#).expect("write object");
        assert!(matches!(
            read_json_array::<u32>(&path),
            Err(Error::Json { .. })
        ));
    }
}
