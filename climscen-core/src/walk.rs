//! Recursive traversal over [`StorageBackend::list`]
//!
//! No backend offers recursive listing natively (the remote drive API lists
//! one parent at a time), so recursion is done here, once, for every backend.
//! Traversal proceeds one directory level at a time; the listings of a level
//! run concurrently with at most [`LIST_CONCURRENCY`] requests in flight.
//!
//! Listing failures never abort a traversal: `NotFound` is treated as an
//! empty directory and any other error is logged and the branch skipped.

use crate::glob::{GlobPattern, SegmentMatcher};
use crate::storage::{join_relative, Entry, StorageBackend};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;

/// Maximum `list` calls in flight during one traversal.
pub const LIST_CONCURRENCY: usize = 8;

/// A path found by [`find`] or [`walk_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Path relative to the traversal root
    pub path: String,
    pub entry: Entry,
}

async fn list_or_empty(backend: &dyn StorageBackend, dir_ref: &str) -> Vec<Entry> {
    match backend.list(dir_ref).await {
        Ok(entries) => entries,
        Err(e) if e.is_not_found() => {
            tracing::debug!(dir = dir_ref, "directory not found during traversal");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(dir = dir_ref, error = %e, "listing failed, skipping branch");
            Vec::new()
        }
    }
}

/// List every directory of `level`, `concurrency` at a time, pairing each
/// listing with the state it was queued with.
async fn list_level<T: Send>(
    backend: &dyn StorageBackend,
    level: Vec<(String, T)>,
    concurrency: usize,
) -> Vec<(T, Vec<Entry>)> {
    stream::iter(level.into_iter().map(|(dir_ref, state)| async move {
        let entries = list_or_empty(backend, &dir_ref).await;
        (state, entries)
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await
}

/// Find every entry below `root_ref` whose relative path matches `pattern`.
///
/// Only directories whose name can match the corresponding pattern segment
/// are descended into, so literal leading segments prune the search to a
/// single branch. Results are sorted by path and unique.
pub async fn find(
    backend: &dyn StorageBackend,
    root_ref: &str,
    pattern: &GlobPattern,
) -> Vec<Match> {
    find_bounded(backend, root_ref, pattern, LIST_CONCURRENCY).await
}

/// [`find`] with an explicit bound on concurrent listings.
pub async fn find_bounded(
    backend: &dyn StorageBackend,
    root_ref: &str,
    pattern: &GlobPattern,
    concurrency: usize,
) -> Vec<Match> {
    let mut found = BTreeMap::new();
    if pattern.segments().is_empty() {
        return Vec::new();
    }
    let mut level = vec![(root_ref.to_string(), (String::new(), pattern.segments()))];
    while !level.is_empty() {
        let listings = list_level(backend, std::mem::take(&mut level), concurrency).await;
        for ((prefix, segments), entries) in listings {
            let mut matches = Vec::new();
            let mut descents = Vec::new();
            match_level(&entries, &prefix, segments, &mut matches, &mut descents);
            for m in matches {
                found.entry(m.path.clone()).or_insert(m);
            }
            level.extend(
                descents
                    .into_iter()
                    .map(|(entry, path, rest)| (entry.id, (path, rest))),
            );
        }
    }
    found.into_values().collect()
}

/// Match one directory listing against the head of `segments`, collecting
/// direct matches and the subdirectories still worth descending into.
fn match_level<'a>(
    entries: &[Entry],
    prefix: &str,
    segments: &'a [SegmentMatcher],
    matches: &mut Vec<Match>,
    descents: &mut Vec<(Entry, String, &'a [SegmentMatcher])>,
) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if head.is_recursive() {
        // `**` consuming nothing
        match_level(entries, prefix, rest, matches, descents);
    }

    for entry in entries.iter().filter(|e| head.matches(&e.name)) {
        let path = join_relative(prefix, &entry.name);
        if rest.is_empty() {
            matches.push(Match {
                path: path.clone(),
                entry: entry.clone(),
            });
        }
        if entry.is_dir() {
            if head.is_recursive() {
                // `**` consuming this directory and possibly more
                descents.push((entry.clone(), path, segments));
            } else if !rest.is_empty() {
                descents.push((entry.clone(), path, rest));
            }
        }
    }
}

/// List every file below `root_ref` whose name passes `accept`.
///
/// Hidden entries (leading `.`) are skipped. Results are sorted by path.
pub async fn walk_files<F>(backend: &dyn StorageBackend, root_ref: &str, accept: F) -> Vec<Match>
where
    F: Fn(&str) -> bool + Sync,
{
    walk_roots(backend, &[("", root_ref)], accept, LIST_CONCURRENCY).await
}

/// Walk several `(prefix, root_ref)` trees in one traversal.
///
/// Each file's path is its path below its root joined onto the root's
/// prefix. The `concurrency` bound applies across all roots together.
/// Results are sorted by path.
pub async fn walk_roots<F>(
    backend: &dyn StorageBackend,
    roots: &[(&str, &str)],
    accept: F,
    concurrency: usize,
) -> Vec<Match>
where
    F: Fn(&str) -> bool + Sync,
{
    let mut files = Vec::new();
    let mut level: Vec<(String, String)> = roots
        .iter()
        .map(|(prefix, root_ref)| (root_ref.to_string(), prefix.to_string()))
        .collect();
    while !level.is_empty() {
        let listings = list_level(backend, std::mem::take(&mut level), concurrency).await;
        for (prefix, entries) in listings {
            for entry in entries.into_iter().filter(|e| !e.name.starts_with('.')) {
                let path = join_relative(&prefix, &entry.name);
                if entry.is_dir() {
                    level.push((entry.id, path));
                } else if accept(&entry.name) {
                    files.push(Match { path, entry });
                }
            }
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
