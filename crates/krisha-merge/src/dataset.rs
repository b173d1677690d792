// CSV persistence for datasets.
//
// Empty cells read as absent and absent cells write as empty, so a file
// round-trips without type coercion.

use std::fs;
use std::io;
use std::path::Path;

use krisha_model::{Dataset, Row, Value};

use crate::MergeError;

/// Load a dataset from a CSV file with a header row.
///
/// Rows shorter than the header are padded with absent cells; rows longer
/// than the header are rejected.
pub fn load(path: &Path) -> Result<Dataset, MergeError> {
    let file = fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MergeError::NotFound(path.to_path_buf()),
        _ => MergeError::Read {
            path: path.to_path_buf(),
            source: e.into(),
        },
    })?;

    let read_error = |source: csv::Error| MergeError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(read_error)?;
        let mut row: Row = record.iter().map(cell_from_csv).collect();
        if row.len() < columns.len() {
            row.resize(columns.len(), Value::Absent);
        }
        rows.push(row);
    }

    let dataset = Dataset::new(columns, rows)?;
    tracing::debug!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Write a dataset to `path`, replacing the file in one step.
///
/// The CSV is written to a temporary file in the target's directory and
/// renamed over the target; on error the original file is left as it was.
/// A symlinked `path` is resolved first so the link itself survives, and
/// the existing file's permissions carry over to the new one.
pub fn save(dataset: &Dataset, path: &Path) -> Result<(), MergeError> {
    let write_error = |source: csv::Error| MergeError::Write {
        path: path.to_path_buf(),
        source,
    };

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(e.into()))?;

    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(tmp.as_file_mut());
        writer.write_record(dataset.columns()).map_err(write_error)?;
        for row in dataset.rows() {
            writer
                .write_record(row.iter().map(|v| v.as_str().unwrap_or("")))
                .map_err(write_error)?;
        }
        writer.flush().map_err(|e| write_error(e.into()))?;
    }

    if let Ok(meta) = fs::metadata(&target) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| write_error(e.into()))?;
    }

    tmp.persist(&target).map_err(|e| write_error(e.error.into()))?;

    tracing::debug!(path = %path.display(), rows = dataset.len(), "Saved dataset");
    Ok(())
}

fn cell_from_csv(cell: &str) -> Value {
    if cell.is_empty() {
        Value::Absent
    } else {
        Value::Text(cell.to_string())
    }
}
