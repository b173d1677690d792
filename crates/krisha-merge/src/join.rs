// Left join of extracted records onto a dataset by url.

use std::collections::HashMap;

use krisha_model::{Dataset, FieldKey, ModelError, Record, Row, Value};

/// How rows join when a url appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Standard left join: each left row is repeated once per matching
    /// record, so a url appearing k times on both sides yields k*k rows.
    #[default]
    FanOut,
    /// Each left row takes only the first record for its url; the row
    /// count never changes.
    FirstMatch,
}

/// Attach the three field columns from `records` to every row of `dataset`.
///
/// All left rows are kept in order. Field columns that already exist are
/// overwritten in place; missing ones are appended. Rows with no matching
/// record get absent values.
pub fn left_join(
    mut dataset: Dataset,
    records: &[Record],
    policy: DuplicatePolicy,
) -> Result<Dataset, ModelError> {
    let mut by_url: HashMap<&str, Vec<&Record>> = HashMap::new();
    for record in records {
        by_url.entry(record.url.as_str()).or_default().push(record);
    }

    let field_columns: Vec<(FieldKey, usize)> = FieldKey::ALL
        .iter()
        .map(|&key| (key, dataset.ensure_column(key.as_str())))
        .collect();

    let mut joined: Vec<Row> = Vec::with_capacity(dataset.len());

    for row in dataset.rows() {
        let matches: &[&Record] = by_url
            .get(dataset.url_of(row))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let matches = match policy {
            DuplicatePolicy::FanOut => matches,
            DuplicatePolicy::FirstMatch => &matches[..matches.len().min(1)],
        };

        if matches.is_empty() {
            let mut out = row.clone();
            for &(_, col) in &field_columns {
                out[col] = Value::Absent;
            }
            joined.push(out);
            continue;
        }

        for record in matches {
            let mut out = row.clone();
            for &(key, col) in &field_columns {
                out[col] = Value::from(record.get(key));
            }
            joined.push(out);
        }
    }

    dataset.replace_rows(joined)?;
    Ok(dataset)
}
