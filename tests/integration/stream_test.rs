//! End-to-end stream behavior against the scripted listing client.

use std::sync::Arc;

use futures::StreamExt;
use gs_error::{ErrorCategory, GsError};
use gs_glob::{
    Entry, GlobOutput, GlobStream, GlobStreamOptions, ListPage, MockListingClient, OutputFormat,
    PatternSet,
};
use serde_json::json;

fn entries(keys: &[&str]) -> Vec<Entry> {
    keys.iter().map(|k| Entry::new(*k)).collect()
}

async fn collect(stream: &mut GlobStream) -> Vec<GlobOutput> {
    let mut outputs = Vec::new();
    while let Some(item) = stream.next().await {
        outputs.push(item.unwrap());
    }
    outputs
}

fn keys(outputs: &[GlobOutput]) -> Vec<String> {
    outputs
        .iter()
        .filter_map(|o| o.key().map(String::from))
        .collect()
}

#[tokio::test]
async fn test_locations_in_several_buckets() {
    let client = Arc::new(
        MockListingClient::new()
            .with_page("logs", ListPage::complete(entries(&["logs/a.json", "logs/b.txt"])))
            .with_page("data/2024", ListPage::complete(entries(&["data/2024/x.parquet"]))),
    );

    let mut stream = GlobStream::new(
        ["s3://bucket-a/logs/*.json", "s3://bucket-b/data/2024/*.parquet"],
        GlobStreamOptions::new(),
        client.clone(),
    )
    .unwrap();

    let outputs = collect(&mut stream).await;
    let located: Vec<(String, String)> = outputs
        .into_iter()
        .filter_map(GlobOutput::into_entry)
        .map(|e| (e.bucket, e.key))
        .collect();

    assert_eq!(
        located,
        vec![
            ("bucket-b".to_string(), "data/2024/x.parquet".to_string()),
            ("bucket-a".to_string(), "logs/a.json".to_string()),
        ]
    );

    let buckets: Vec<String> = client.requests().into_iter().map(|r| r.bucket).collect();
    assert_eq!(buckets, vec!["bucket-b", "bucket-a"]);
}

#[tokio::test]
async fn test_structured_patterns_from_json() {
    let client = Arc::new(
        MockListingClient::new()
            .with_page("a", ListPage::complete(entries(&["a/1", "a/2", "a/skip"]))),
    );

    let input = json!([
        {"Bucket": "test", "Key": "a/*", "RequestPayer": "requester"},
        "!a/skip"
    ]);
    let options = GlobStreamOptions::new().with_format(OutputFormat::Query);
    let set = PatternSet::from_value(&input, &options).unwrap();
    let mut stream = GlobStream::from_pattern_set(set, &options, client.clone()).unwrap();

    let outputs = collect(&mut stream).await;
    let queries: Vec<serde_json::Value> = outputs
        .into_iter()
        .filter_map(GlobOutput::into_query)
        .map(serde_json::Value::Object)
        .collect();

    assert_eq!(
        queries,
        vec![
            json!({"Bucket": "test", "RequestPayer": "requester", "Key": "a/1"}),
            json!({"Bucket": "test", "RequestPayer": "requester", "Key": "a/2"}),
        ]
    );
    assert_eq!(client.requests()[0].params["RequestPayer"], "requester");
}

#[tokio::test]
async fn test_alternation_lists_each_branch() {
    let client = Arc::new(
        MockListingClient::new()
            .with_page("a/b", ListPage::complete(entries(&["a/b/foo1", "a/b/bar"])))
            .with_page("c/b", ListPage::complete(entries(&["c/b/foo2"]))),
    );

    let mut stream = GlobStream::new(
        ["{a,c}/b/foo*"],
        GlobStreamOptions::new().with_bucket("test"),
        client.clone(),
    )
    .unwrap();

    assert_eq!(keys(&collect(&mut stream).await), vec!["c/b/foo2", "a/b/foo1"]);

    let prefixes: Vec<String> = client.requests().into_iter().map(|r| r.prefix).collect();
    assert_eq!(prefixes, vec!["c/b", "a/b"]);
}

#[tokio::test]
async fn test_negation_excludes_across_scopes() {
    let client = Arc::new(
        MockListingClient::new()
            .with_page("a", ListPage::complete(entries(&["a/keep", "a/tmp-1"])))
            .with_page("b", ListPage::complete(entries(&["b/tmp-2", "b/keep"]))),
    );

    let mut stream = GlobStream::new(
        ["a/*", "b/*", "!*/tmp-*"],
        GlobStreamOptions::new().with_bucket("test"),
        client,
    )
    .unwrap();

    let outputs = collect(&mut stream).await;
    assert_eq!(keys(&outputs), vec!["b/keep", "a/keep"]);
    assert_eq!(stream.stats().entries_filtered, 2);
}

#[tokio::test]
async fn test_large_listing_paginates_under_demand() {
    let mut client = MockListingClient::new();
    for page in 0..5 {
        let keys: Vec<String> = (0..10).map(|i| format!("p/{page:02}-{i:02}")).collect();
        let page_entries = keys.iter().map(|k| Entry::new(k.as_str())).collect();
        client = if page < 4 {
            client.with_page("p", ListPage::truncated(page_entries, None))
        } else {
            client.with_page("p", ListPage::complete(page_entries))
        };
    }
    let client = Arc::new(client);

    let mut stream = GlobStream::new(
        ["p/*"],
        GlobStreamOptions::new().with_bucket("test").with_high_water_mark(10),
        client.clone(),
    )
    .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.key(), Some("p/00-00"));
    assert_eq!(client.call_count(), 1);

    let rest = collect(&mut stream).await;
    assert_eq!(rest.len(), 49);
    assert_eq!(client.call_count(), 5);
    assert_eq!(client.max_in_flight(), 1);

    let markers: Vec<Option<String>> = client.requests().into_iter().map(|r| r.marker).collect();
    assert_eq!(markers[1].as_deref(), Some("p/00-09"));
    assert_eq!(markers[4].as_deref(), Some("p/03-09"));
    assert!(client.requests().iter().all(|r| r.max_keys == 10));
}

#[tokio::test]
async fn test_error_after_partial_output() {
    let client = Arc::new(
        MockListingClient::new()
            .with_page("b", ListPage::complete(entries(&["b/1", "b/2"])))
            .with_error("a", "NoSuchBucket"),
    );

    let mut stream = GlobStream::new(
        ["a/*", "b/*"],
        GlobStreamOptions::new().with_bucket("test"),
        client,
    )
    .unwrap();

    let mut seen = Vec::new();
    let mut errors = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(output) => seen.push(output),
            Err(e) => errors.push(e),
        }
    }

    assert_eq!(keys(&seen), vec!["b/1", "b/2"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].category(), ErrorCategory::Runtime);
    assert!(matches!(&errors[0], GsError::Listing(m) if m == "NoSuchBucket"));
}

#[tokio::test]
async fn test_construction_errors_are_validation() {
    let client = Arc::new(MockListingClient::new());

    let cases = [
        GlobStream::new(["a/*"], GlobStreamOptions::new(), client.clone()),
        GlobStream::new(["!a/*"], GlobStreamOptions::new().with_bucket("test"), client.clone()),
        GlobStream::new(["s3://bucket"], GlobStreamOptions::new(), client.clone()),
        GlobStream::new(["a/[*"], GlobStreamOptions::new().with_bucket("test"), client.clone()),
    ];

    for result in cases {
        let error = result.unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Construction);
    }
    assert_eq!(client.call_count(), 0);
}
