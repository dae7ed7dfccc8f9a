//! Integration tests for the crawl helpers.

use chrono::{Duration, TimeZone, Utc};
use unhtml::crawl::{
    index_path, object_key, CrawlIndex, FreshnessPolicy, StoreLocation, StorePlan,
};
use unhtml::{discover_links, parse_html, process_bytes, Error, LinkKind};

const PAGE: &str = r##"<html><head>
<link rel="stylesheet" href="/static/site.css">
<script src="/static/app.js"></script>
</head><body>
<a href="news/today.html">Today</a>
<a href="/files/annual.PDF">Annual report</a>
<img src="//cdn.example.com/logo.png">
<a href="#top">Top</a>
<a href="news/today.html">Today again</a>
</body></html>"##;

#[test]
fn test_page_links_in_order() {
    let tree = parse_html(PAGE);
    let links = discover_links(&tree, "https://example.com/en/index.html").unwrap();

    let found: Vec<_> = links
        .iter()
        .map(|l| (l.url.as_str(), l.kind))
        .collect();
    assert_eq!(
        found,
        vec![
            ("https://example.com/static/site.css", LinkKind::Unsupported),
            ("https://example.com/static/app.js", LinkKind::Unsupported),
            ("https://example.com/en/news/today.html", LinkKind::Webpage),
            ("https://example.com/files/annual.PDF", LinkKind::File),
            ("https://cdn.example.com/logo.png", LinkKind::Image),
            ("https://example.com/en/index.html#top", LinkKind::Webpage),
        ]
    );
}

#[test]
fn test_followed_links() {
    let tree = parse_html(PAGE);
    let followed = discover_links(&tree, "https://example.com/")
        .unwrap()
        .into_iter()
        .filter(|l| l.kind.is_followed())
        .count();
    assert_eq!(followed, 4);
}

#[test]
fn test_invalid_base_converts_to_error() {
    let tree = parse_html(PAGE);
    let err: Error = discover_links(&tree, "relative/path").unwrap_err().into();
    assert!(matches!(err, Error::Link(_)));
}

#[test]
fn test_converted_page_storage_plan() {
    let url = "https://example.com/en/index.html";
    let doc = process_bytes(url, PAGE.as_bytes()).unwrap();
    assert!(!doc.is_empty());

    let location = StoreLocation::parse("s3://crawl/webpages/").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let policy = FreshnessPolicy::default();

    let fresh = StorePlan::for_webpage(&doc.url, &location, "42", Some(now - Duration::days(30)), &policy, now);
    let stale = StorePlan::for_webpage(&doc.url, &location, "42", Some(now - Duration::days(120)), &policy, now);
    let new = StorePlan::for_webpage(&doc.url, &location, "42", None, &policy, now);

    assert!(!fresh.write);
    assert!(stale.write);
    assert!(new.write);
    assert_eq!(fresh.key, object_key("webpages/", url));
    assert_eq!(fresh.audit.queue, "webpage_audit_queue_42");
    assert_eq!(fresh.audit.score, now.timestamp() / 60);

    let mut index = CrawlIndex::new();
    index.push(fresh.index);
    assert_eq!(
        index.render(),
        format!("{}\tcrawl\t{}\n", url, object_key("webpages/", url))
    );
    assert_eq!(index_path("indexes/", "42"), "indexes/42/index.csv");
}
