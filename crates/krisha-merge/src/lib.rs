use std::path::{Path, PathBuf};

use krisha_acquire::Fetcher;
use krisha_model::ModelError;
use thiserror::Error;

pub mod dataset;
pub mod join;

pub use join::{left_join, DuplicatePolicy};

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Options for a merge run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub duplicates: DuplicatePolicy,
}

/// Summary of a completed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows in the dataset before the join.
    pub rows_in: usize,
    /// Rows written back.
    pub rows_out: usize,
    /// URLs handed to the extractor, duplicates included.
    pub urls: usize,
    /// URLs whose page could not be fetched.
    pub fetch_failures: usize,
    /// Field values found across all fetched pages.
    pub fields_found: usize,
}

/// Enrich the CSV dataset at `path` with square-footage fields scraped
/// from each row's url, rewriting the file in place.
///
/// If the dataset cannot be loaded nothing is fetched and the file is not
/// touched. Per-url fetch failures do not fail the merge; they show up as
/// absent values and in [`MergeReport::fetch_failures`].
pub async fn merge<F>(
    path: &Path,
    fetcher: &F,
    options: &MergeOptions,
) -> Result<MergeReport, MergeError>
where
    F: Fetcher + ?Sized,
{
    let data = dataset::load(path)?;
    let rows_in = data.len();
    let urls = data.urls();
    tracing::info!(path = %path.display(), rows = rows_in, "Loaded dataset");

    let records = krisha_acquire::extract(fetcher, &urls).await;

    let joined = left_join(data, &records, options.duplicates)?;
    dataset::save(&joined, path)?;

    let report = MergeReport {
        rows_in,
        rows_out: joined.len(),
        urls: urls.len(),
        fetch_failures: records.iter().filter(|r| r.is_failure()).count(),
        fields_found: records.iter().map(|r| r.found_count()).sum(),
    };

    if report.rows_out != report.rows_in {
        tracing::warn!(
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            "Duplicate urls changed the row count"
        );
    }
    tracing::info!(
        path = %path.display(),
        rows = report.rows_out,
        failures = report.fetch_failures,
        fields = report.fields_found,
        "Dataset updated"
    );

    Ok(report)
}
