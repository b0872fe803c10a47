//! Flat, session-scoped index of artifact paths
//!
//! The index maps every indexed artifact's relative path to the backend
//! reference needed to read it. It is built once by walking one or more
//! roots through a [`StorageBackend`] and is immutable afterwards: artifacts
//! written after the build are not visible until a new index is built.

use crate::error::Result;
use crate::glob::{GlobPattern, SegmentMatcher};
use crate::storage::StorageBackend;
use crate::walk::{walk_roots, LIST_CONCURRENCY};
use std::collections::BTreeMap;
use std::time::Instant;

/// File extensions (without the dot) picked up by [`VirtualFileIndex::build`].
pub const INDEXED_EXTENSIONS: &[&str] = &["csv", "geojson", "ini"];

/// True if a file name carries one of the [`INDEXED_EXTENSIONS`].
pub fn is_indexed_name(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && INDEXED_EXTENSIONS.contains(&ext))
}

/// One tree to fold into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRoot {
    /// Path prefix given to every file found under this root (`""` for none)
    pub prefix: String,
    /// Backend reference of the root directory
    pub root_ref: String,
}

impl IndexRoot {
    pub fn new(prefix: impl Into<String>, root_ref: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            root_ref: root_ref.into(),
        }
    }
}

/// Immutable `(relative path -> backend reference)` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualFileIndex {
    entries: BTreeMap<String, String>,
}

impl VirtualFileIndex {
    /// Walk every root in one traversal and collect indexed artifacts.
    ///
    /// Unreachable roots contribute nothing; an index built over a backend
    /// that cannot list anything is simply empty.
    pub async fn build(backend: &dyn StorageBackend, roots: &[IndexRoot]) -> Self {
        let started = Instant::now();
        let walk: Vec<(&str, &str)> = roots
            .iter()
            .map(|root| (root.prefix.as_str(), root.root_ref.as_str()))
            .collect();
        let files = walk_roots(backend, &walk, is_indexed_name, LIST_CONCURRENCY).await;

        let mut entries = BTreeMap::new();
        for file in files {
            entries.insert(file.path, file.entry.id);
        }

        tracing::info!(
            method = backend.method(),
            roots = roots.len(),
            files = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built virtual file index"
        );
        Self { entries }
    }

    pub fn from_entries<I, P, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(p, r)| (p.into(), r.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Backend reference of an indexed path
    pub fn backend_ref(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// All `(path, backend reference)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Relative paths matching a glob pattern, sorted.
    pub fn files_matching(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self.files_matching_glob(&GlobPattern::new(pattern)?))
    }

    /// Relative paths matching a compiled pattern, sorted.
    pub fn files_matching_glob(&self, pattern: &GlobPattern) -> Vec<String> {
        let prefix = literal_prefix(pattern);
        self.entries
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| pattern.matches(path))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// Leading literal segments of a pattern, joined and `/`-terminated.
fn literal_prefix(pattern: &GlobPattern) -> String {
    let literals: Vec<&str> = pattern
        .segments()
        .iter()
        .map_while(SegmentMatcher::literal)
        .collect();
    if literals.len() == pattern.segment_count() || literals.is_empty() {
        // Fully literal patterns still need an exact match; no narrowing
        // beyond the first segment is safe without a trailing slash.
        return literals.first().map(|s| s.to_string()).unwrap_or_default();
    }
    format!("{}/", literals.join("/"))
}
