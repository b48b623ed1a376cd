//! Configuration types for glob streams.

use std::fmt;
use std::str::FromStr;

use gs_error::{GsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::s3::RequestParams;

/// Default number of keys requested per listing call.
pub const DEFAULT_HIGH_WATER_MARK: usize = 200;

/// Shape of the values a stream yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The listed object as returned by the store (default)
    #[default]
    Object,

    /// The scope's request parameters plus the object's `Key`
    Query,
}

impl FromStr for OutputFormat {
    type Err = GsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(Self::Object),
            "query" => Ok(Self::Query),
            other => Err(GsError::validation(format!(
                "Unsupported output format '{other}' (expected 'object' or 'query')"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Configuration for a glob stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobStreamOptions {
    /// Maximum keys requested per listing call
    pub high_water_mark: usize,

    /// Output shape
    pub format: OutputFormat,

    /// Yield each bucket/key pair at most once
    pub unique: bool,

    /// Bucket for patterns that do not name one
    pub bucket: Option<String>,

    /// Parameters merged into every listing call
    pub request_params: RequestParams,
}

impl Default for GlobStreamOptions {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            format: OutputFormat::Object,
            unique: true,
            bucket: None,
            request_params: RequestParams::new(),
        }
    }
}

impl GlobStreamOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size requested per listing call.
    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable deduplication.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the default bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Add one request parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request_params.insert(name.into(), value.into());
        self
    }

    /// Check option values that the types alone do not rule out.
    pub fn validate(&self) -> Result<()> {
        if self.high_water_mark == 0 {
            return Err(GsError::validation("high_water_mark must be at least 1"));
        }
        Ok(())
    }
}
