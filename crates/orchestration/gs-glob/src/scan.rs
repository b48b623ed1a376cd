//! Per-prefix pagination cursors.

use std::sync::Arc;

use tracing::warn;

use crate::glob::CompiledGlob;
use crate::s3::{ListPage, ListRequest, RequestParams};

/// Pagination state for one listing prefix.
///
/// Several cursors can share one glob when its alternation branches have
/// different literal prefixes.
#[derive(Debug, Clone)]
pub struct ScanState {
    bucket: String,
    prefix: String,
    marker: Option<String>,
    glob: Arc<CompiledGlob>,
    request_params: Arc<RequestParams>,
}

impl ScanState {
    /// A cursor positioned at the start of `prefix`.
    pub fn new(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        glob: Arc<CompiledGlob>,
        request_params: Arc<RequestParams>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            marker: None,
            glob,
            request_params,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Where the next page starts; `None` before the first page.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn glob(&self) -> &CompiledGlob {
        &self.glob
    }

    pub fn request_params(&self) -> &RequestParams {
        &self.request_params
    }

    /// Build the request for this cursor's next page.
    pub fn next_request(&self, max_keys: usize) -> ListRequest {
        ListRequest {
            bucket: self.bucket.clone(),
            prefix: self.prefix.clone(),
            marker: self.marker.clone(),
            max_keys,
            params: (*self.request_params).clone(),
        }
    }

    /// Move past `page`. Returns `false` once the prefix is exhausted.
    ///
    /// A truncated page resumes from `next_marker` when present, otherwise
    /// from its last key. A truncated page with neither cannot make
    /// progress and ends the prefix.
    pub fn advance(&mut self, page: &ListPage) -> bool {
        if !page.truncated {
            return false;
        }

        let next = page
            .next_marker
            .clone()
            .or_else(|| page.entries.last().map(|e| e.key.clone()));

        match next {
            Some(marker) => {
                self.marker = Some(marker);
                true
            }
            None => {
                warn!(
                    bucket = %self.bucket,
                    prefix = %self.prefix,
                    "Truncated page without a marker or entries, ending prefix"
                );
                false
            }
        }
    }
}
