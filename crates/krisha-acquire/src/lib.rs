pub mod fetch;
pub mod query;
pub mod extract;

pub use extract::{extract, parse_listing};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use query::{ElementMatch, FieldQuery};
