//! Literal listing prefixes derived from compiled globs.
//!
//! S3 can only narrow a listing by key prefix, so each glob branch is reduced
//! to its leading run of literal segments. The glob itself still decides what
//! matches; the prefix only bounds what gets listed.

use crate::glob::{CompiledGlob, Segment};

/// Path separator used to join literal segments.
pub const SEPARATOR: &str = "/";

/// Join the leading literal segments, stopping at the first wildcard.
///
/// ```
/// use gs_glob::glob::Segment;
/// use gs_glob::prefix::prefix;
///
/// let segments = [
///     Segment::Literal("a".to_string()),
///     Segment::Literal("b".to_string()),
///     Segment::Wildcard,
/// ];
/// assert_eq!(prefix(&segments), "a/b");
/// ```
pub fn prefix(segments: &[Segment]) -> String {
    segments
        .iter()
        .map_while(|segment| match segment {
            Segment::Literal(text) => Some(text.as_str()),
            Segment::Wildcard => None,
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// One prefix per alternation branch, in branch order.
pub fn prefixes(glob: &CompiledGlob) -> Vec<String> {
    glob.branches()
        .iter()
        .map(|branch| prefix(branch.segments()))
        .collect()
}
