//! Glob compilation for S3 keys.
//!
//! Wraps [`glob::Pattern`] with the two things the `glob` crate does not do
//! on its own: brace alternation (`{a,b}`) and a per-branch decomposition
//! into path segments, which prefix extraction needs.
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within one path segment
//! - `**` as a whole segment matches any number of segments
//! - `?` matches any single character
//! - `[abc]` / `[!abc]` match one character in / not in the set
//! - `{a,b}` expands into one branch per alternative (nesting allowed)
//! - a leading `!` is literal; exclusion filters use [`CompiledGlob::compile_negated`]

use glob::{MatchOptions, Pattern};
use gs_error::{GsError, Result};

/// Marker that turns a pattern into an exclusion filter.
pub const NEGATION_MARKER: char = '!';

/// Keys are matched as `/`-separated paths.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One `/`-separated component of a glob branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text that must appear verbatim.
    Literal(String),
    /// Anything containing glob metacharacters.
    Wildcard,
}

impl Segment {
    fn parse(text: &str) -> Self {
        if text.contains(['*', '?', '[']) {
            Segment::Wildcard
        } else {
            Segment::Literal(text.to_string())
        }
    }
}

/// One brace-free alternative of a compiled glob.
#[derive(Debug, Clone)]
pub struct Branch {
    pattern: Pattern,
    segments: Vec<Segment>,
}

impl Branch {
    /// The branch decomposed into path segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// A compiled glob pattern.
///
/// # Example
///
/// ```
/// use gs_glob::glob::CompiledGlob;
///
/// let glob = CompiledGlob::compile("{logs,metrics}/2024/*.json").unwrap();
///
/// assert_eq!(glob.branches().len(), 2);
/// assert!(glob.matches("logs/2024/a.json"));
/// assert!(glob.matches("metrics/2024/b.json"));
/// assert!(!glob.matches("logs/2024/nested/c.json"));
/// ```
#[derive(Debug, Clone)]
pub struct CompiledGlob {
    source: String,
    negated: bool,
    branches: Vec<Branch>,
}

impl CompiledGlob {
    /// Compile pattern text as written.
    ///
    /// A leading `!` is part of the pattern here, so `!x/*` matches keys
    /// that start with `!x/`. Returns a validation error if any branch is
    /// not valid glob syntax.
    pub fn compile(text: &str) -> Result<Self> {
        Self::build(text, false)
    }

    /// Compile the body of an exclusion filter written as `!body`.
    ///
    /// [`matches`](Self::matches) tests `body`; [`source`](Self::source)
    /// keeps the marker.
    pub fn compile_negated(body: &str) -> Result<Self> {
        Self::build(body, true)
    }

    fn build(body: &str, negated: bool) -> Result<Self> {
        let source = if negated {
            format!("{NEGATION_MARKER}{body}")
        } else {
            body.to_string()
        };

        let mut branches = Vec::new();
        for alternative in expand_braces(body) {
            let pattern = Pattern::new(&alternative).map_err(|e| {
                GsError::validation(format!("Invalid glob pattern '{source}': {e}"))
            })?;
            let segments = alternative.split('/').map(Segment::parse).collect();
            branches.push(Branch { pattern, segments });
        }

        Ok(Self {
            source,
            negated,
            branches,
        })
    }

    /// Check whether `key` matches any branch.
    pub fn matches(&self, key: &str) -> bool {
        self.branches
            .iter()
            .any(|b| b.pattern.matches_with(key, MATCH_OPTIONS))
    }

    /// Whether this was compiled as an exclusion filter.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Alternation branches, in the order they appear in the pattern.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Get the original pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Expand brace alternation into brace-free patterns.
///
/// Expansion is left to right, so `{a,b}/{x,y}` yields `a/x`, `a/y`, `b/x`,
/// `b/y`. Unbalanced braces are left as literal text.
pub(crate) fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close)) = find_outer_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let head = &pattern[..open];
    let tail = &pattern[close + 1..];

    split_alternatives(&pattern[open + 1..close])
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{head}{alt}{tail}")))
        .collect()
}

/// Byte offsets of the first balanced top-level `{...}` group.
fn find_outer_group(pattern: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut open = None;

    for (i, c) in pattern.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return open.map(|o| (o, i));
                }
            }
            _ => {}
        }
    }

    None
}

/// Split group content on top-level commas.
fn split_alternatives(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in content.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&content[start..]);

    parts
}
