//! Per-entry filtering, deduplication and formatting.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::config::OutputFormat;
use crate::pattern::FilterSet;
use crate::s3::{Entry, RequestParams};
use crate::scan::ScanState;

/// A value yielded by a glob stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GlobOutput {
    /// The listed object (`object` format)
    Object(Entry),

    /// Request parameters addressing the object (`query` format)
    Query(RequestParams),
}

impl GlobOutput {
    /// The object key this output refers to.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Object(entry) => Some(&entry.key),
            Self::Query(params) => params.get("Key").and_then(Value::as_str),
        }
    }

    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Object(entry) => Some(entry),
            Self::Query(_) => None,
        }
    }

    pub fn into_query(self) -> Option<RequestParams> {
        match self {
            Self::Query(params) => Some(params),
            Self::Object(_) => None,
        }
    }
}

/// What happened to one listed entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Passed every check and should be yielded
    Emit(GlobOutput),
    /// Already seen in this stream
    Duplicate,
    /// Rejected by a filter or the scope's glob
    Filtered,
}

/// Identity used for deduplication: `bucket/key`.
pub fn identity_key(entry: &Entry) -> String {
    format!("{}/{}", entry.bucket, entry.key)
}

/// Check an entry against the filters and the cursor's glob.
///
/// Any filter hit rejects the entry.
pub fn matches(state: &ScanState, filters: &FilterSet, entry: &Entry) -> bool {
    !filters.excludes(&entry.key) && state.glob().matches(&entry.key)
}

/// Identity keys already handed to the consumer. Only grows.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity`; returns `false` if it was already present.
    pub fn insert(&mut self, identity: String) -> bool {
        self.seen.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Applies dedup, filters, the scope glob and the output format, in that
/// order.
#[derive(Debug, Clone)]
pub struct EntryProcessor {
    filters: FilterSet,
    dedup: Option<DedupIndex>,
    format: OutputFormat,
}

impl EntryProcessor {
    /// Create a processor; `unique` enables the dedup index.
    pub fn new(filters: FilterSet, unique: bool, format: OutputFormat) -> Self {
        Self {
            filters,
            dedup: unique.then(DedupIndex::new),
            format,
        }
    }

    /// Decide what to do with `entry` listed under `state`.
    ///
    /// The identity key is recorded before matching, so an entry rejected
    /// here is not reconsidered if it shows up again under another scope.
    pub fn process(&mut self, state: &ScanState, entry: Entry) -> Disposition {
        if let Some(dedup) = self.dedup.as_mut() {
            if !dedup.insert(identity_key(&entry)) {
                return Disposition::Duplicate;
            }
        }

        if !matches(state, &self.filters, &entry) {
            return Disposition::Filtered;
        }

        Disposition::Emit(self.format_entry(state, entry))
    }

    fn format_entry(&self, state: &ScanState, entry: Entry) -> GlobOutput {
        match self.format {
            OutputFormat::Object => GlobOutput::Object(entry),
            OutputFormat::Query => {
                let mut params = state.request_params().clone();
                params.insert("Key".to_string(), Value::String(entry.key));
                GlobOutput::Query(params)
            }
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The dedup index, when deduplication is enabled.
    pub fn dedup_index(&self) -> Option<&DedupIndex> {
        self.dedup.as_ref()
    }
}
