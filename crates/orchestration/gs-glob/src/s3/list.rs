//! Single-page object listing.
//!
//! The stream drives pagination itself, so a [`ListingClient`] only ever
//! fetches one page per call and reports where the next one starts.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::list_objects::ListObjectsError;
use aws_sdk_s3::types::RequestPayer;
use chrono::{DateTime, Utc};
use gs_error::{GsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// Passthrough options merged into listing calls and `query` output.
///
/// Keys use the S3 API's own names (`Bucket`, `RequestPayer`, ...).
pub type RequestParams = Map<String, Value>;

/// Represents an S3 object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    /// The bucket the object was listed from
    pub bucket: String,

    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Last modified timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag as returned by S3 (quoted)
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,

    /// Storage class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl Entry {
    /// An entry with only a key; the bucket is filled in from the request.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            bucket: String::new(),
            key: key.into(),
            size: None,
            last_modified: None,
            e_tag: None,
            storage_class: None,
        }
    }

    /// Set the object size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Parameters for one listing call.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    /// Bucket to list
    pub bucket: String,

    /// Only keys starting with this prefix (empty lists the whole bucket)
    pub prefix: String,

    /// Resume after this key; `None` starts from the beginning
    pub marker: Option<String>,

    /// Maximum number of keys to return
    pub max_keys: usize,

    /// Extra options for the call
    pub params: RequestParams,
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    /// Objects in the order the store returned them
    pub entries: Vec<Entry>,

    /// Whether more results follow
    pub truncated: bool,

    /// Continuation token, when the store provides one
    pub next_marker: Option<String>,
}

impl ListPage {
    /// The final page of a prefix.
    pub fn complete(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            truncated: false,
            next_marker: None,
        }
    }

    /// A page with more results after it.
    pub fn truncated(entries: Vec<Entry>, next_marker: Option<String>) -> Self {
        Self {
            entries,
            truncated: true,
            next_marker,
        }
    }
}

/// Capability to fetch one page of an object listing.
///
/// Errors are surfaced to stream consumers exactly as returned.
#[async_trait]
pub trait ListingClient: Send + Sync {
    /// Fetch the page described by `request`.
    async fn list(&self, request: ListRequest) -> Result<ListPage>;
}

/// [`ListingClient`] backed by the S3 `ListObjects` API.
///
/// Uses the marker-based API so a page can be resumed from any key, which
/// is what the stream falls back to when S3 omits `NextMarker`.
#[derive(Debug, Clone)]
pub struct S3ListingClient {
    client: Client,
}

impl S3ListingClient {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying S3 client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ListingClient for S3ListingClient {
    async fn list(&self, request: ListRequest) -> Result<ListPage> {
        let max_keys = i32::try_from(request.max_keys).unwrap_or(i32::MAX);
        let mut req = self
            .client
            .list_objects()
            .bucket(&request.bucket)
            .max_keys(max_keys);

        if !request.prefix.is_empty() {
            req = req.prefix(&request.prefix);
        }

        if let Some(ref marker) = request.marker {
            req = req.marker(marker);
        }

        for (name, value) in &request.params {
            match (name.as_str(), value.as_str()) {
                ("Bucket" | "Key", _) => {}
                ("Delimiter", Some(v)) => req = req.delimiter(v),
                ("RequestPayer", Some(v)) => req = req.request_payer(RequestPayer::from(v)),
                ("ExpectedBucketOwner", Some(v)) => req = req.expected_bucket_owner(v),
                _ => trace!(param = %name, "Ignoring request parameter"),
            }
        }

        let resp = req
            .send()
            .await
            .map_err(|e| listing_error(&request.bucket, &e))?;

        let entries = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let key = obj.key?;
                let last_modified = obj
                    .last_modified
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

                Some(Entry {
                    bucket: request.bucket.clone(),
                    key,
                    size: obj.size.map(|s| s.max(0) as u64),
                    last_modified,
                    e_tag: obj.e_tag,
                    storage_class: obj.storage_class.map(|c| c.as_str().to_string()),
                })
            })
            .collect();

        Ok(ListPage {
            entries,
            truncated: resp.is_truncated == Some(true),
            next_marker: resp.next_marker,
        })
    }
}

/// Convert an SDK failure into a listing error.
///
/// The plain `Display` of an `SdkError` is only `service error`; the full
/// context carries the S3 error code and message.
fn listing_error<R: Debug + 'static>(
    bucket: &str,
    error: &SdkError<ListObjectsError, R>,
) -> GsError {
    GsError::listing(format!(
        "S3 list objects failed for bucket '{bucket}': {}",
        DisplayErrorContext(error)
    ))
}
