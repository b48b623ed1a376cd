//! S3 client and listing functionality.
//!
//! This module provides the listing side of glob discovery:
//! - The [`ListingClient`] capability the stream drives, one page per call
//! - Client configuration with LocalStack support
//! - An in-memory scripted client for tests (`testing` feature)

mod client;
mod list;
#[cfg(any(test, feature = "testing"))]
mod mock;

pub use client::{S3Config, create_s3_client};
pub use list::{Entry, ListPage, ListRequest, ListingClient, RequestParams, S3ListingClient};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockListingClient;
