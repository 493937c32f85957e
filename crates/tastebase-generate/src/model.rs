use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tastebase_core::{files, write_json_atomic};

use crate::errors::GenerationError;

/// Rows written to one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub rows: u64,
    pub bytes: u64,
}

/// Report for a generator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub entity: String,
    pub seed: u64,
    pub files: Vec<FileReport>,
    pub rows_total: u64,
    pub text_service: Option<String>,
    pub text_requests: u64,
    pub text_failures: u64,
    pub fallback_count: u64,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
    #[serde(skip)]
    started: Option<Instant>,
}

impl GenerationReport {
    pub fn new(entity: &str, seed: u64, text_service: Option<&str>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            entity: entity.to_string(),
            seed,
            files: Vec::new(),
            rows_total: 0,
            text_service: text_service.map(str::to_string),
            text_requests: 0,
            text_failures: 0,
            fallback_count: 0,
            warnings: Vec::new(),
            duration_ms: 0,
            started: Some(Instant::now()),
        }
    }

    pub fn record_file(&mut self, path: &Path, rows: usize, bytes: u64) {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files.push(FileReport {
            file,
            rows: rows as u64,
            bytes,
        });
    }

    /// Count rows of the primary entity (users, restaurants, reviews).
    pub fn record_rows(&mut self, rows: usize) {
        self.rows_total += rows as u64;
    }

    pub fn record_request(&mut self) {
        self.text_requests += 1;
    }

    pub fn record_failure(&mut self, message: String) {
        self.text_failures += 1;
        self.warnings.push(message);
    }

    pub fn record_fallback(&mut self, count: usize) {
        self.fallback_count += count as u64;
    }

    pub fn rows_in(&self, file: &str) -> Option<u64> {
        self.files
            .iter()
            .find(|report| report.file == file)
            .map(|report| report.rows)
    }

    /// Stamp the duration and persist under `<data_dir>/reports/<entity>.report.json`.
    pub fn finish(&mut self, data_dir: &Path) -> Result<PathBuf, GenerationError> {
        if let Some(started) = self.started {
            self.duration_ms = started.elapsed().as_millis() as u64;
        }
        let path = data_dir
            .join(files::REPORTS_DIR)
            .join(format!("{}.report.json", self.entity));
        write_json_atomic(&path, self)?;
        Ok(path)
    }
}
