// In-memory tabular dataset keyed by a mandatory `url` column.
//
// Cells are loosely typed text: either a string or absent. The url column
// is pinned to text so that join keys are always comparable strings.

use thiserror::Error;

/// Name of the join-key column.
pub const URL_COLUMN: &str = "url";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("dataset has no 'url' column")]
    MissingUrlColumn,

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    Text(String),
    #[default]
    Absent,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Absent)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// One dataset row; cells are positional and line up with `Dataset::columns`.
pub type Row = Vec<Value>;

/// An ordered table of rows with a `url` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
    url_index: usize,
}

impl Dataset {
    /// Build a dataset from a header and rows.
    ///
    /// Fails if the header has no `url` column or a row's width does not
    /// match the header. Absent url cells become empty text.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, ModelError> {
        let url_index = columns
            .iter()
            .position(|c| c == URL_COLUMN)
            .ok_or(ModelError::MissingUrlColumn)?;

        let mut rows = rows;
        for (i, row) in rows.iter_mut().enumerate() {
            if row.len() != columns.len() {
                return Err(ModelError::RowWidth {
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
            if row[url_index].is_absent() {
                row[url_index] = Value::Text(String::new());
            }
        }

        Ok(Self {
            columns,
            rows,
            url_index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn url_index(&self) -> usize {
        self.url_index
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The url of a row.
    pub fn url_of<'a>(&self, row: &'a Row) -> &'a str {
        row[self.url_index].as_str().unwrap_or("")
    }

    /// The url column in row order, duplicates included.
    pub fn urls(&self) -> Vec<String> {
        self.rows.iter().map(|r| self.url_of(r).to_string()).collect()
    }

    /// Index of `name`, appending it as an all-absent column if missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(i) = self.column_index(name) {
            return i;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Absent);
        }
        self.columns.len() - 1
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Replace all rows, keeping the header.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<(), ModelError> {
        *self = Dataset::new(self.columns.clone(), rows)?;
        Ok(())
    }
}
