//! Shell-style glob patterns over slash-separated relative paths
//!
//! A pattern is split into segments on `/`. Each segment is one of:
//!
//! - a literal name (no metacharacters), compared byte-for-byte
//! - a wildcard segment using `*` (any run within the segment), `?` (one
//!   character) and `[...]` / `[!...]` character classes, compiled to an
//!   anchored regex
//! - `**`, which matches zero or more whole segments
//!
//! `*` never crosses a `/`. Matching is anchored and case-sensitive. As in
//! the shell, wildcards do not match names starting with `.` unless the
//! segment itself starts with a literal `.`.
//!
//! The same compiled segments drive both in-memory matching
//! ([`GlobPattern::matches`]) and directory-by-directory search over a
//! backend ([`crate::walk::find`]).

use crate::error::{Error, Result};
use crate::storage::path_segments;
use regex::Regex;
use std::fmt;

/// One compiled path segment.
#[derive(Debug, Clone)]
pub enum SegmentMatcher {
    /// Exact name
    Literal(String),
    /// Single-segment wildcard
    Wildcard { source: String, regex: Regex },
    /// `**`: zero or more segments
    Recursive,
}

impl SegmentMatcher {
    fn compile(segment: &str) -> Result<Self> {
        if segment == "**" {
            return Ok(SegmentMatcher::Recursive);
        }
        if !segment.contains(['*', '?', '[']) {
            return Ok(SegmentMatcher::Literal(segment.to_string()));
        }
        let regex = Regex::new(&segment_to_regex(segment))
            .map_err(|e| Error::invalid_pattern(format!("{}: {}", segment, e)))?;
        Ok(SegmentMatcher::Wildcard {
            source: segment.to_string(),
            regex,
        })
    }

    /// Match a single path segment (a directory or file name).
    pub fn matches(&self, name: &str) -> bool {
        match self {
            SegmentMatcher::Literal(lit) => lit == name,
            SegmentMatcher::Wildcard { source, regex } => {
                if name.starts_with('.') && !source.starts_with('.') {
                    return false;
                }
                regex.is_match(name)
            }
            SegmentMatcher::Recursive => !name.starts_with('.'),
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match self {
            SegmentMatcher::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_recursive(&self) -> bool {
        matches!(self, SegmentMatcher::Recursive)
    }
}

/// Convert one glob segment to an anchored regex source.
fn segment_to_regex(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if chars[j] == '!' || chars[j] == '^' {
                        out.push('^');
                        j += 1;
                    }
                    while j < end {
                        let c = chars[j];
                        if matches!(c, '\\' | '[' | ']' | '&' | '~' | '^') {
                            out.push('\\');
                        }
                        out.push(c);
                        j += 1;
                    }
                    out.push(']');
                    i = end;
                }
                // Unterminated class is a literal '['
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && (chars[j] == '!' || chars[j] == '^') {
        j += 1;
    }
    // A ']' right after the opening bracket is part of the class
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    segments: Vec<SegmentMatcher>,
}

impl GlobPattern {
    /// Compile a pattern such as `map/tas/*/tas_*_mean.csv` or `ts/**`.
    pub fn new(pattern: &str) -> Result<Self> {
        let segments = path_segments(pattern)
            .map(SegmentMatcher::compile)
            .collect::<Result<Vec<_>>>()?;
        if segments.is_empty() {
            return Err(Error::invalid_pattern(format!("empty pattern '{}'", pattern)));
        }
        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[SegmentMatcher] {
        &self.segments
    }

    /// Number of segments, counting `**` as one.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// True if the pattern contains a `**` segment.
    pub fn is_recursive(&self) -> bool {
        self.segments.iter().any(SegmentMatcher::is_recursive)
    }

    /// Full, anchored match of a relative path.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path_segments(path).collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(pattern: &[SegmentMatcher], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        Some((SegmentMatcher::Recursive, rest)) => {
            match_segments(rest, parts)
                || parts.split_first().is_some_and(|(head, tail)| {
                    SegmentMatcher::Recursive.matches(head) && match_segments(pattern, tail)
                })
        }
        Some((seg, rest)) => parts
            .split_first()
            .is_some_and(|(head, tail)| seg.matches(head) && match_segments(rest, tail)),
    }
}
