use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use krisha_acquire::{FetchError, Fetcher};
use krisha_merge::{merge, DuplicatePolicy, MergeError, MergeOptions, MergeReport};

/// Serves fixed pages by url; anything else is a 503.
struct MockFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, h)| (u.to_string(), h.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 503,
        })
    }
}

fn info_item(key: &str, value: &str) -> String {
    format!(
        r#"<div class="offer__info-item" data-name="{key}">
             <div class="offer__info-title">Area</div>
             <div class="offer__advert-short-info">{value}</div>
           </div>"#
    )
}

fn page(items: &[(&str, &str)]) -> String {
    let body: String = items.iter().map(|(k, v)| info_item(k, v)).collect();
    format!("<html><body><div class=\"offer__parameters\">{body}</div></body></html>")
}

#[tokio::test]
async fn test_single_row_prod_square_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");
    fs::write(&path, "url\nhttp://x/1\n").unwrap();

    let html = page(&[("indust.prod_square", "120 m²")]);
    let fetcher = MockFetcher::new(&[("http://x/1", html.as_str())]);

    let report = merge(&path, &fetcher, &MergeOptions::default()).await.unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "url,indust.prod_square,indust.store_square,indust.office_square\n\
         http://x/1,120 m²,,\n"
    );
    assert_eq!(
        report,
        MergeReport {
            rows_in: 1,
            rows_out: 1,
            urls: 1,
            fetch_failures: 0,
            fields_found: 1,
        }
    );
}

#[tokio::test]
async fn test_preserves_rows_and_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");
    fs::write(
        &path,
        "id,url,price\n\
         7,http://x/a,\"1,000\"\n\
         8,http://x/b,\n\
         9,http://x/c,300\n",
    )
    .unwrap();

    let page_a = page(&[
        ("indust.prod_square", "500"),
        ("indust.store_square", "250"),
        ("indust.office_square", "30"),
    ]);
    let page_c = page(&[("indust.prod_square", "90"), ("indust.store_square", "45")]);
    let fetcher = MockFetcher::new(&[
        ("http://x/a", page_a.as_str()),
        ("http://x/c", page_c.as_str()),
    ]);

    let report = merge(&path, &fetcher, &MergeOptions::default()).await.unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "id,url,price,indust.prod_square,indust.store_square,indust.office_square\n\
         7,http://x/a,\"1,000\",500,250,30\n\
         8,http://x/b,,,,\n\
         9,http://x/c,300,90,45,\n"
    );
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.fields_found, 5);
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn test_merge_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");
    fs::write(&path, "url,title\nhttp://x/1,Warehouse\nhttp://x/2,Depot\n").unwrap();

    let page_1 = page(&[("indust.office_square", "15 m²")]);
    let page_2 = page(&[("indust.store_square", "40 m²")]);
    let fetcher = MockFetcher::new(&[
        ("http://x/1", page_1.as_str()),
        ("http://x/2", page_2.as_str()),
    ]);

    merge(&path, &fetcher, &MergeOptions::default()).await.unwrap();
    let first = fs::read_to_string(&path).unwrap();

    merge(&path, &fetcher, &MergeOptions::default()).await.unwrap();
    let second = fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        second,
        "url,title,indust.prod_square,indust.store_square,indust.office_square\n\
         http://x/1,Warehouse,,,15 m²\n\
         http://x/2,Depot,,40 m²,\n"
    );
}

#[tokio::test]
async fn test_missing_dataset_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let fetcher = MockFetcher::new(&[]);

    let err = merge(&path, &fetcher, &MergeOptions::default()).await.unwrap_err();

    assert!(matches!(err, MergeError::NotFound(_)));
    assert!(err.to_string().contains("absent.csv"));
    assert!(!path.exists());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_missing_url_column_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");
    let original = "link\nhttp://x/1\n";
    fs::write(&path, original).unwrap();
    let fetcher = MockFetcher::new(&[]);

    let err = merge(&path, &fetcher, &MergeOptions::default()).await.unwrap_err();

    assert!(matches!(err, MergeError::Model(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_duplicate_urls_under_each_policy() {
    let html = page(&[("indust.prod_square", "100")]);
    let csv = "url,id\nhttp://x/1,a\nhttp://x/1,b\n";

    let dir = tempfile::tempdir().unwrap();
    let fan_out = dir.path().join("fan_out.csv");
    let first = dir.path().join("first.csv");
    fs::write(&fan_out, csv).unwrap();
    fs::write(&first, csv).unwrap();

    let fetcher = MockFetcher::new(&[("http://x/1", html.as_str())]);
    let report = merge(&fan_out, &fetcher, &MergeOptions::default()).await.unwrap();
    assert_eq!(report.urls, 2);
    assert_eq!(report.rows_out, 4);

    let options = MergeOptions {
        duplicates: DuplicatePolicy::FirstMatch,
    };
    let report = merge(&first, &fetcher, &options).await.unwrap();
    assert_eq!(report.rows_out, 2);
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        "url,id,indust.prod_square,indust.store_square,indust.office_square\n\
         http://x/1,a,100,,\n\
         http://x/1,b,100,,\n"
    );
}

#[tokio::test]
async fn test_short_rows_are_merged_with_empty_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listings.csv");
    fs::write(&path, "url,price,note\nhttp://x/1,10,a\nhttp://x/2,20\n").unwrap();

    let html = page(&[("indust.store_square", "40")]);
    let fetcher = MockFetcher::new(&[("http://x/2", html.as_str())]);

    let report = merge(&path, &fetcher, &MergeOptions::default()).await.unwrap();

    assert_eq!(report.rows_out, 2);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "url,price,note,indust.prod_square,indust.store_square,indust.office_square\n\
         http://x/1,10,a,,,\n\
         http://x/2,20,,,40,\n"
    );
}
