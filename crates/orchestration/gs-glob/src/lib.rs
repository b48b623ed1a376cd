//! gs-glob - streaming glob discovery over S3 listings.
//!
//! This crate lists the objects of one or more buckets whose keys match
//! shell-style glob patterns. It supports:
//!
//! - Brace alternation, `*`, `**`, `?` and character classes
//! - Negated patterns (`!pattern`) that exclude otherwise matching keys
//! - Literal-prefix extraction, so only the relevant key ranges are listed
//! - Sequential, demand-driven pagination with one call in flight at a time
//! - Deduplication across overlapping patterns and an alternate `query`
//!   output shape suitable for follow-up `GetObject` calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use gs_glob::{GlobStream, GlobStreamOptions, S3Config, S3ListingClient, create_s3_client};
//!
//! let client = create_s3_client(&S3Config::new().with_region("us-east-1")).await?;
//!
//! let options = GlobStreamOptions::new().with_bucket("my-bucket");
//! let mut stream = GlobStream::new(
//!     ["data/{2024,2025}/*.parquet", "!data/*/_tmp*"],
//!     options,
//!     Arc::new(S3ListingClient::new(client)),
//! )?;
//!
//! while let Some(output) = stream.next().await {
//!     let output = output?;
//!     println!("{}", output.key().unwrap_or_default());
//! }
//! eprintln!("Listed {} entries", stream.stats().entries_listed);
//! ```

pub mod config;
pub mod glob;
pub mod pattern;
pub mod prefix;
pub mod processor;
pub mod s3;
pub mod scan;
pub mod stats;
pub mod stream;

pub use config::{DEFAULT_HIGH_WATER_MARK, GlobStreamOptions, OutputFormat};
pub use self::glob::{CompiledGlob, Segment};
pub use pattern::{FilterSet, Pattern, PatternSet, SearchScope};
pub use processor::{DedupIndex, Disposition, EntryProcessor, GlobOutput};
pub use s3::{
    Entry, ListPage, ListRequest, ListingClient, RequestParams, S3Config, S3ListingClient,
    create_s3_client,
};
pub use scan::ScanState;
pub use stats::StreamStats;
pub use stream::{GlobStream, GlobStreamBuilder, Phase};

#[cfg(any(test, feature = "testing"))]
pub use s3::MockListingClient;
