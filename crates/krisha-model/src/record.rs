use serde::{Deserialize, Serialize};

/// One of the square-footage attributes scraped from a listing page.
///
/// The string form is both the `data-name` attribute value on the page and
/// the column name in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// Production floor area.
    ProdSquare,
    /// Storage area.
    StoreSquare,
    /// Office area.
    OfficeSquare,
}

impl FieldKey {
    /// All keys, in the order their columns are appended to a dataset.
    pub const ALL: [FieldKey; 3] = [
        FieldKey::ProdSquare,
        FieldKey::StoreSquare,
        FieldKey::OfficeSquare,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::ProdSquare => "indust.prod_square",
            FieldKey::StoreSquare => "indust.store_square",
            FieldKey::OfficeSquare => "indust.office_square",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The extraction result for a single listing URL.
///
/// Field values are the trimmed page text, kept as free-form strings.
/// `None` means the field was not on the page or the page could not be
/// fetched; `error` tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub url: String,
    #[serde(rename = "indust.prod_square")]
    pub prod_square: Option<String>,
    #[serde(rename = "indust.store_square")]
    pub store_square: Option<String>,
    #[serde(rename = "indust.office_square")]
    pub office_square: Option<String>,
    /// Fetch failure message, if the page could not be retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Record {
    /// A record for `url` with every field absent.
    pub fn absent(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prod_square: None,
            store_square: None,
            office_square: None,
            error: None,
        }
    }

    /// A record for a URL whose page could not be fetched.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::absent(url)
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::ProdSquare => self.prod_square.as_deref(),
            FieldKey::StoreSquare => self.store_square.as_deref(),
            FieldKey::OfficeSquare => self.office_square.as_deref(),
        }
    }

    pub fn set(&mut self, key: FieldKey, value: Option<String>) {
        match key {
            FieldKey::ProdSquare => self.prod_square = value,
            FieldKey::StoreSquare => self.store_square = value,
            FieldKey::OfficeSquare => self.office_square = value,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Number of fields that carry a value.
    pub fn found_count(&self) -> usize {
        FieldKey::ALL.iter().filter(|k| self.get(**k).is_some()).count()
    }
}
