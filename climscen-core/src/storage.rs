//! Storage backend contract for artifact trees
//!
//! Every backend exposes the same five operations over an opaque reference
//! space: listing a directory, reading an item as bytes or text, and
//! translating between slash-separated relative paths and backend references.
//! Resolvers never branch on backend type.
//!
//! ## Implementations
//!
//! - [`LocalDisk`]: native filesystem (`tokio::fs`); references are filesystem paths
//! - [`MemoryStorage`]: in-memory tree keyed by relative path (tests, fixtures)
//! - `RemoteDrive` (crate `climscen-storage-drive`): files-listing REST API;
//!   references are opaque object identifiers linked by parent ids
//!
//! Recursive operations (glob search, full-tree listing) are written once
//! against [`StorageBackend::list`] in [`crate::walk`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Storage method identifier for local disk backends.
pub const STORAGE_METHOD_FILE: &str = "file";
/// Storage method identifier for in-memory backends.
pub const STORAGE_METHOD_MEMORY: &str = "memory";

// ============================================================================
// Entries
// ============================================================================

/// Whether a listed entry is a leaf artifact or a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child returned by [`StorageBackend::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Display name (last path segment)
    pub name: String,
    /// Backend reference usable with `list` / `read_bytes`
    pub id: String,
    pub kind: EntryKind,
    /// Size in bytes, when the backend reports it
    pub size: Option<u64>,
    /// Last modification time, when the backend reports it
    pub modified: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn file(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            kind: EntryKind::File,
            size: None,
            modified: None,
        }
    }

    pub fn directory(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            kind: EntryKind::Directory,
            size: None,
            modified: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

// ============================================================================
// Core Trait
// ============================================================================

/// Read-only access to a tree of artifacts.
///
/// Absence is reported as `Error::NotFound` by the point operations and as an
/// empty listing by `list` implementations that cannot tell the difference
/// (remote backends after an authentication failure).
#[async_trait]
pub trait StorageBackend: Debug + Send + Sync {
    /// Short method name (`file`, `memory`, `drive`)
    fn method(&self) -> &str;

    /// Reference of the backend root directory
    fn root_ref(&self) -> String;

    /// List the direct children of a directory reference
    async fn list(&self, dir_ref: &str) -> Result<Vec<Entry>>;

    /// Read raw bytes of an item
    async fn read_bytes(&self, item_ref: &str) -> Result<Vec<u8>>;

    /// Read an item as UTF-8 text
    async fn read_text(&self, item_ref: &str) -> Result<String> {
        let bytes = self.read_bytes(item_ref).await?;
        String::from_utf8(bytes).map_err(|source| Error::Utf8 {
            path: item_ref.to_string(),
            source,
        })
    }

    /// Translate a slash-separated path (relative to the backend root) to a reference
    ///
    /// Returns `Ok(None)` if nothing exists at that path.
    async fn resolve_path_to_id(&self, path: &str) -> Result<Option<String>>;

    /// Translate a reference back to its path relative to the backend root
    ///
    /// Returns `Ok(None)` if the reference is unknown.
    async fn resolve_id_to_path(&self, id: &str) -> Result<Option<String>>;
}

/// Shared, type-erased backend handle.
pub type AnyStorage = Arc<dyn StorageBackend>;

/// Join a relative directory path and a child name with `/`.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

/// Split a relative path into non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

// ============================================================================
// MemoryStorage Implementation
// ============================================================================

/// A simple in-memory artifact tree for testing
///
/// Keys are relative paths; directories exist implicitly as prefixes of keys.
/// References and relative paths coincide.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert data at the given relative path
    ///
    /// Note: This method takes `&self` (not `&mut self`) due to interior mutability.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        let path: String = path.into();
        let key = path_segments(&path).collect::<Vec<_>>().join("/");
        self.data
            .write()
            .expect("RwLock poisoned")
            .insert(key, data.into());
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.data.read().expect("RwLock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn normalize(path: &str) -> String {
        path_segments(path).collect::<Vec<_>>().join("/")
    }

    fn is_directory(data: &BTreeMap<String, Vec<u8>>, dir: &str) -> bool {
        if dir.is_empty() {
            return true;
        }
        let prefix = format!("{}/", dir);
        data.range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix))
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn method(&self) -> &str {
        STORAGE_METHOD_MEMORY
    }

    fn root_ref(&self) -> String {
        String::new()
    }

    async fn list(&self, dir_ref: &str) -> Result<Vec<Entry>> {
        let dir = Self::normalize(dir_ref);
        let data = self.data.read().expect("RwLock poisoned");
        if !Self::is_directory(&data, &dir) {
            return Err(Error::not_found(format!("directory {}", dir_ref)));
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut files = Vec::new();
        let mut dirs = BTreeSet::new();
        for (key, bytes) in data.iter().filter(|(k, _)| k.starts_with(&prefix)) {
            let rest = &key[prefix.len()..];
            match rest.split_once('/') {
                Some((child, _)) => {
                    dirs.insert(child.to_string());
                }
                None => {
                    let mut entry = Entry::file(rest, key.clone());
                    entry.size = Some(bytes.len() as u64);
                    files.push(entry);
                }
            }
        }

        let mut entries: Vec<Entry> = dirs
            .into_iter()
            .map(|name| {
                let id = join_relative(&dir, &name);
                Entry::directory(name, id)
            })
            .collect();
        entries.extend(files);
        Ok(entries)
    }

    async fn read_bytes(&self, item_ref: &str) -> Result<Vec<u8>> {
        self.data
            .read()
            .expect("RwLock poisoned")
            .get(&Self::normalize(item_ref))
            .cloned()
            .ok_or_else(|| Error::not_found(item_ref))
    }

    async fn resolve_path_to_id(&self, path: &str) -> Result<Option<String>> {
        let key = Self::normalize(path);
        let data = self.data.read().expect("RwLock poisoned");
        if data.contains_key(&key) || Self::is_directory(&data, &key) {
            Ok(Some(key))
        } else {
            Ok(None)
        }
    }

    async fn resolve_id_to_path(&self, id: &str) -> Result<Option<String>> {
        self.resolve_path_to_id(id).await
    }
}

// ============================================================================
// LocalDisk Implementation
// ============================================================================

/// Native filesystem backend rooted at a base directory.
///
/// References are filesystem paths (the base directory joined with the
/// relative path); resolving a path to an id and back is a pure join/strip.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    base_path: PathBuf,
}

impl LocalDisk {
    /// Create a new local backend with the given base path
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the base path for this storage
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_relative_path(&self, path: &str) -> Result<PathBuf> {
        let p = Path::new(path);

        // Disallow absolute paths and path traversal.
        if p.is_absolute()
            || p.components().any(|c| {
                matches!(
                    c,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            })
        {
            return Err(Error::invalid_path(format!(
                "'{}' must be a relative path without '..'",
                path
            )));
        }

        Ok(self.base_path.join(p))
    }

    /// Map a reference to a filesystem path, accepting both absolute
    /// references under the base and base-relative paths.
    fn resolve_ref(&self, item_ref: &str) -> Result<PathBuf> {
        let p = Path::new(item_ref);
        if p.is_absolute() {
            if p.starts_with(&self.base_path)
                && !p.components().any(|c| matches!(c, Component::ParentDir))
            {
                return Ok(p.to_path_buf());
            }
            return Err(Error::invalid_path(format!(
                "'{}' is outside {}",
                item_ref,
                self.base_path.display()
            )));
        }
        self.resolve_relative_path(item_ref)
    }

    fn to_id(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }
}

#[async_trait]
impl StorageBackend for LocalDisk {
    fn method(&self) -> &str {
        STORAGE_METHOD_FILE
    }

    fn root_ref(&self) -> String {
        Self::to_id(&self.base_path)
    }

    async fn list(&self, dir_ref: &str) -> Result<Vec<Entry>> {
        let dir = self.resolve_ref(dir_ref)?;
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(format!("directory {}", dir.display())));
            }
            Err(e) => {
                return Err(Error::io(format!("Failed to list {}: {}", dir.display(), e)));
            }
        };

        let mut entries = Vec::new();
        while let Some(child) = read_dir.next_entry().await.map_err(|e| {
            Error::io(format!("Failed to read entry in {}: {}", dir.display(), e))
        })? {
            let path = child.path();
            let metadata = match child.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let kind = if metadata.is_dir() {
                EntryKind::Directory
            } else if metadata.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(Entry {
                name: child.file_name().to_string_lossy().to_string(),
                id: Self::to_id(&path),
                kind,
                size: (kind == EntryKind::File).then(|| metadata.len()),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_bytes(&self, item_ref: &str) -> Result<Vec<u8>> {
        let path = self.resolve_ref(item_ref)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(path.display().to_string())
            } else {
                Error::io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    async fn resolve_path_to_id(&self, path: &str) -> Result<Option<String>> {
        let relative = path_segments(path).collect::<Vec<_>>().join("/");
        let full = self.resolve_relative_path(&relative)?;
        match tokio::fs::metadata(&full).await {
            Ok(_) => Ok(Some(Self::to_id(&full))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(format!("Failed to stat {}: {}", full.display(), e))),
        }
    }

    async fn resolve_id_to_path(&self, id: &str) -> Result<Option<String>> {
        let full = match self.resolve_ref(id) {
            Ok(p) => p,
            Err(Error::InvalidPath(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if tokio::fs::metadata(&full).await.is_err() {
            return Ok(None);
        }
        let relative = full
            .strip_prefix(&self.base_path)
            .map_err(|_| Error::invalid_path(id))?;
        Ok(Some(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/"),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
