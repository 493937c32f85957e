pub mod chunks;

use std::path::Path;

use serde::Serialize;
use tastebase_core::write_json_atomic;
use tracing::info;

use crate::errors::GenerationError;
use crate::model::GenerationReport;

/// Write a whole-table artifact and record it in the report.
pub(crate) fn write_table<T: Serialize>(
    data_dir: &Path,
    file: &str,
    rows: &[T],
    report: &mut GenerationReport,
) -> Result<(), GenerationError> {
    let path = data_dir.join(file);
    let bytes = write_json_atomic(&path, rows)?;
    report.record_file(&path, rows.len(), bytes);
    info!(file = %path.display(), rows = rows.len(), "artifact written");
    Ok(())
}
