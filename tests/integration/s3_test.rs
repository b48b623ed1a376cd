//! S3 listing integration tests using LocalStack.
//!
//! These tests run real `ListObjects` calls through [`S3ListingClient`] and
//! check pagination, filtering and request parameter handling end to end.

use std::sync::Arc;

use futures::StreamExt;
use gs_glob::{
    GlobOutput, GlobStream, GlobStreamOptions, ListRequest, ListingClient, OutputFormat,
    S3Config, S3ListingClient, create_s3_client,
};

use crate::common::LocalStackTestContext;

async fn listing_client(ctx: &LocalStackTestContext) -> Arc<S3ListingClient> {
    let config = S3Config::new()
        .with_endpoint(&ctx.endpoint)
        .with_region(&ctx.region)
        .with_credentials("test", "test");
    let client = create_s3_client(&config).await.unwrap();
    Arc::new(S3ListingClient::new(client))
}

async fn collect_keys(stream: &mut GlobStream) -> Vec<String> {
    let mut keys = Vec::new();
    while let Some(item) = stream.next().await {
        keys.push(item.unwrap().key().unwrap().to_string());
    }
    keys.sort();
    keys
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_glob_lists_matching_objects() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "gs-glob-match";
    let keys = [
        "logs/2024/a.json",
        "logs/2024/b.txt",
        "logs/2025/c.json",
        "logs/2025/tmp-d.json",
        "other/e.json",
    ];
    ctx.create_bucket(bucket).await.unwrap();
    ctx.seed(bucket, &keys).await.unwrap();

    let mut stream = GlobStream::new(
        ["logs/{2024,2025}/*.json", "!**/tmp-*"],
        GlobStreamOptions::new().with_bucket(bucket),
        listing_client(&ctx).await,
    )
    .unwrap();

    assert_eq!(
        collect_keys(&mut stream).await,
        vec!["logs/2024/a.json", "logs/2025/c.json"]
    );
    assert_eq!(stream.stats().pages_fetched, 2);

    ctx.cleanup(bucket, &keys).await;
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_glob_paginates_small_pages() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "gs-glob-pages";
    let owned: Vec<String> = (0..7).map(|i| format!("data/part-{i:03}.csv")).collect();
    let keys: Vec<&str> = owned.iter().map(String::as_str).collect();
    ctx.create_bucket(bucket).await.unwrap();
    ctx.seed(bucket, &keys).await.unwrap();

    let mut stream = GlobStream::new(
        ["data/*.csv"],
        GlobStreamOptions::new()
            .with_bucket(bucket)
            .with_high_water_mark(3),
        listing_client(&ctx).await,
    )
    .unwrap();

    assert_eq!(collect_keys(&mut stream).await, owned);
    assert_eq!(stream.stats().pages_fetched, 3);
    assert_eq!(stream.stats().entries_listed, 7);

    ctx.cleanup(bucket, &keys).await;
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_query_format_with_location_pattern() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "gs-glob-query";
    let keys = ["q/one.bin", "q/two.bin"];
    ctx.create_bucket(bucket).await.unwrap();
    ctx.seed(bucket, &keys).await.unwrap();

    let mut stream = GlobStream::new(
        [format!("s3://{bucket}/q/*.bin")],
        GlobStreamOptions::new().with_format(OutputFormat::Query),
        listing_client(&ctx).await,
    )
    .unwrap();

    let mut queries = Vec::new();
    while let Some(item) = stream.next().await {
        queries.extend(item.unwrap().into_query());
    }

    assert_eq!(queries.len(), 2);
    for query in &queries {
        assert_eq!(query["Bucket"], bucket);
        assert!(query["Key"].as_str().unwrap().starts_with("q/"));
    }

    ctx.cleanup(bucket, &keys).await;
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_object_metadata_populated() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "gs-glob-meta";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put(bucket, "meta/file.txt", "hello").await.unwrap();

    let mut stream = GlobStream::new(
        ["meta/*"],
        GlobStreamOptions::new().with_bucket(bucket),
        listing_client(&ctx).await,
    )
    .unwrap();

    let output = stream.next().await.unwrap().unwrap();
    let GlobOutput::Object(entry) = output else {
        panic!("expected object output");
    };

    assert_eq!(entry.bucket, bucket);
    assert_eq!(entry.key, "meta/file.txt");
    assert_eq!(entry.size, Some(5));
    assert!(entry.last_modified.is_some());
    assert!(entry.e_tag.is_some());

    ctx.cleanup(bucket, &["meta/file.txt"]).await;
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_surfaces_listing_error() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let client = listing_client(&ctx).await;
    let result = client
        .list(ListRequest {
            bucket: "gs-glob-does-not-exist".to_string(),
            prefix: String::new(),
            marker: None,
            max_keys: 10,
            params: Default::default(),
        })
        .await;
    assert!(matches!(result, Err(gs_error::GsError::Listing(_))));

    let mut stream = GlobStream::new(
        ["s3://gs-glob-does-not-exist/*"],
        GlobStreamOptions::new(),
        client,
    )
    .unwrap();

    assert!(stream.next().await.unwrap().is_err());
    assert!(stream.next().await.is_none());
}
