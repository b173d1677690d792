use crate::fetch::Fetcher;
use crate::query::FieldQuery;
use krisha_model::{FieldKey, Record};
use scraper::Html;

/// Fetch each URL and extract its square-footage fields.
///
/// Returns exactly one record per input URL, in input order. URLs are
/// fetched one at a time. A fetch failure is logged and yields an
/// all-absent record carrying the error; it never stops the batch.
pub async fn extract<F>(fetcher: &F, urls: &[String]) -> Vec<Record>
where
    F: Fetcher + ?Sized,
{
    let mut records = Vec::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        tracing::debug!(url = %url, index = i, total = urls.len(), "Fetching listing");

        let record = match fetcher.fetch(url).await {
            Ok(html) => {
                tracing::debug!(url = %url, bytes = html.len(), "Received HTML");
                parse_listing(url, &html)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Error fetching URL");
                Record::failed(url.as_str(), e.to_string())
            }
        };

        records.push(record);
    }

    let failures = records.iter().filter(|r| r.is_failure()).count();
    tracing::info!(urls = urls.len(), failures, "Extraction finished");

    records
}

/// Extract the fields of one listing page. Fields missing from the page
/// are left absent.
pub fn parse_listing(url: &str, html: &str) -> Record {
    let document = Html::parse_document(html);
    let mut record = Record::absent(url);

    for key in FieldKey::ALL {
        record.set(key, FieldQuery::for_key(key).run(&document));
    }

    record
}
