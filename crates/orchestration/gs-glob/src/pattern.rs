//! Pattern parsing and classification.
//!
//! Turns caller input into positive search scopes and negative filters:
//!
//! - `data/*.json` is a key pattern in the default bucket
//! - `s3://bucket/data/*.json` names its own bucket
//! - `{"Bucket": "b", "Key": "data/*.json"}` is the structured form; any
//!   other fields become request parameters for that scope
//! - a leading `!` on a string form makes it an exclusion filter

use std::sync::Arc;

use gs_error::{GsError, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::GlobStreamOptions;
use crate::glob::{CompiledGlob, NEGATION_MARKER};
use crate::prefix::prefixes;
use crate::s3::RequestParams;
use crate::scan::ScanState;

const BUCKET_PARAM: &str = "Bucket";
const KEY_PARAM: &str = "Key";

/// One caller-supplied pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// A key pattern, a `scheme://bucket/key` location, or either with `!`
    Text(String),

    /// A structured bucket/key pair with optional extra request parameters
    Location {
        bucket: Option<String>,
        key: Option<String>,
        params: RequestParams,
    },
}

impl Pattern {
    /// A structured pattern with no extra parameters.
    pub fn location(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Location {
            bucket: Some(bucket.into()),
            key: Some(key.into()),
            params: RequestParams::new(),
        }
    }

    /// Normalize JSON input into a pattern list.
    ///
    /// Accepts a string, an object, or an array of strings and objects.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            other => Ok(vec![Self::from_value(other)?]),
        }
    }

    /// Parse a single JSON string or object.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Object(fields) => {
                let bucket = string_field(fields, BUCKET_PARAM)?;
                let key = string_field(fields, KEY_PARAM)?;
                let params = fields
                    .iter()
                    .filter(|(name, _)| *name != BUCKET_PARAM && *name != KEY_PARAM)
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                Ok(Self::Location {
                    bucket,
                    key,
                    params,
                })
            }
            other => Err(GsError::validation(format!(
                "Pattern must be a string, an object, or a list of those, got {other}"
            ))),
        }
    }

    /// Whether this is an exclusion filter.
    pub fn is_negated(&self) -> bool {
        matches!(self, Self::Text(text) if text.starts_with(NEGATION_MARKER))
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

fn string_field(fields: &RequestParams, name: &str) -> Result<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GsError::validation(format!(
            "Pattern field '{name}' must be a string, got {other}"
        ))),
    }
}

/// Split `scheme://bucket/key` into bucket and key.
///
/// Returns `None` for text without a scheme. A location without a key
/// yields an empty key.
pub fn parse_location(text: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = text.split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(rest.split_once('/').unwrap_or((rest, "")))
}

/// A positive pattern resolved to a bucket and compiled key glob.
#[derive(Debug, Clone)]
pub struct SearchScope {
    bucket: String,
    key_pattern: String,
    glob: Arc<CompiledGlob>,
    request_params: Arc<RequestParams>,
}

impl SearchScope {
    /// Build a scope; fails if either the bucket or key pattern is empty.
    ///
    /// `request_params` gets `Bucket` set to `bucket` and any `Key` removed.
    pub fn new(
        bucket: impl Into<String>,
        key_pattern: impl Into<String>,
        mut request_params: RequestParams,
    ) -> Result<Self> {
        let bucket = bucket.into();
        let key_pattern = key_pattern.into();

        if bucket.is_empty() {
            return Err(GsError::validation(format!(
                "No bucket for pattern '{key_pattern}'"
            )));
        }
        if key_pattern.is_empty() {
            return Err(GsError::validation(format!(
                "Empty key pattern for bucket '{bucket}'"
            )));
        }

        let glob = CompiledGlob::compile(&key_pattern)?;
        request_params.remove(KEY_PARAM);
        request_params.insert(BUCKET_PARAM.to_string(), Value::String(bucket.clone()));

        Ok(Self {
            bucket,
            key_pattern,
            glob: Arc::new(glob),
            request_params: Arc::new(request_params),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key_pattern(&self) -> &str {
        &self.key_pattern
    }

    pub fn glob(&self) -> &CompiledGlob {
        &self.glob
    }

    pub fn request_params(&self) -> &RequestParams {
        &self.request_params
    }

    /// One cursor per distinct prefix, in alternation order.
    pub fn scan_states(&self) -> Vec<ScanState> {
        let mut seen: Vec<String> = Vec::new();
        for prefix in prefixes(&self.glob) {
            if !seen.contains(&prefix) {
                seen.push(prefix);
            }
        }

        seen.into_iter()
            .map(|prefix| {
                ScanState::new(
                    self.bucket.clone(),
                    prefix,
                    Arc::clone(&self.glob),
                    Arc::clone(&self.request_params),
                )
            })
            .collect()
    }
}

/// Exclusion globs; an entry matching any of them is dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    globs: Vec<CompiledGlob>,
}

impl FilterSet {
    pub fn new(globs: Vec<CompiledGlob>) -> Self {
        Self { globs }
    }

    /// Check whether any filter matches `key`.
    pub fn excludes(&self, key: &str) -> bool {
        self.globs.iter().any(|g| g.matches(key))
    }

    pub fn len(&self) -> usize {
        self.globs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledGlob> {
        self.globs.iter()
    }
}

/// Classified and validated patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    scopes: Vec<SearchScope>,
    filters: FilterSet,
}

impl PatternSet {
    /// Classify `patterns` and resolve search scopes against `options`.
    ///
    /// Fails if a search pattern lacks a bucket or key pattern, if a glob is
    /// invalid, or if no search pattern remains after classification.
    pub fn new<I, P>(patterns: I, options: &GlobStreamOptions) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        let default_bucket = options.bucket.clone().or_else(|| {
            options
                .request_params
                .get(BUCKET_PARAM)
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let mut scopes = Vec::new();
        let mut filters = Vec::new();

        for pattern in patterns {
            match pattern.into() {
                Pattern::Text(text) => match text.strip_prefix(NEGATION_MARKER) {
                    Some(body) => {
                        let body = parse_location(body).map_or(body, |(_, key)| key);
                        filters.push(CompiledGlob::compile_negated(body)?);
                    }
                    None => {
                        let (bucket, key) = match parse_location(&text) {
                            Some((bucket, key)) => (Some(bucket.to_string()), key.to_string()),
                            None => (default_bucket.clone(), text.clone()),
                        };
                        scopes.push(SearchScope::new(
                            bucket.unwrap_or_default(),
                            key,
                            options.request_params.clone(),
                        )?);
                    }
                },
                Pattern::Location {
                    bucket,
                    key,
                    params,
                } => {
                    let mut request_params = options.request_params.clone();
                    request_params.extend(params);
                    scopes.push(SearchScope::new(
                        bucket.or_else(|| default_bucket.clone()).unwrap_or_default(),
                        key.unwrap_or_default(),
                        request_params,
                    )?);
                }
            }
        }

        if scopes.is_empty() {
            return Err(GsError::validation(
                "At least one non-negated pattern is required",
            ));
        }

        debug!(
            scopes = scopes.len(),
            filters = filters.len(),
            "Classified patterns"
        );

        Ok(Self {
            scopes,
            filters: FilterSet::new(filters),
        })
    }

    /// Parse JSON input (see [`Pattern::list_from_value`]) and classify it.
    pub fn from_value(value: &Value, options: &GlobStreamOptions) -> Result<Self> {
        Self::new(Pattern::list_from_value(value)?, options)
    }

    pub fn scopes(&self) -> &[SearchScope] {
        &self.scopes
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Cursors for every scope, in construction order.
    pub fn scan_states(&self) -> Vec<ScanState> {
        self.scopes.iter().flat_map(SearchScope::scan_states).collect()
    }

    /// Split into cursors and the filter set.
    pub fn into_parts(self) -> (Vec<ScanState>, FilterSet) {
        let states = self.scan_states();
        (states, self.filters)
    }
}
