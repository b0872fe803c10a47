//! # climscen core
//!
//! Runtime-agnostic building blocks for addressing climate-scenario artifacts
//! by structured relative path, whatever backend stores them.
//!
//! This crate provides:
//! - The [`StorageBackend`] contract plus the [`LocalDisk`] and
//!   [`MemoryStorage`] implementations
//! - Shell-style glob patterns ([`GlobPattern`]) with `*` and `**`
//! - Backend-agnostic recursive search ([`walk::find`])
//! - The session-scoped [`VirtualFileIndex`]
//!
//! ## Example
//!
//! ```ignore
//! use climscen_core::{IndexRoot, LocalDisk, StorageBackend, VirtualFileIndex};
//!
//! let disk = LocalDisk::new("/data/scenarios");
//! let root = disk.resolve_path_to_id("demo").await?.unwrap();
//! let index = VirtualFileIndex::build(&disk, &[IndexRoot::new("", root)]).await;
//! let series = index.files_matching("ts/*/*_rcp_False.csv")?;
//! ```

pub mod error;
pub mod glob;
pub mod index;
pub mod storage;
pub mod walk;

pub use error::{Error, Result};
pub use glob::{GlobPattern, SegmentMatcher};
pub use index::{is_indexed_name, IndexRoot, VirtualFileIndex, INDEXED_EXTENSIONS};
pub use storage::{
    join_relative, path_segments, AnyStorage, Entry, EntryKind, LocalDisk, MemoryStorage,
    StorageBackend, STORAGE_METHOD_FILE, STORAGE_METHOD_MEMORY,
};
pub use walk::{find, find_bounded, walk_files, walk_roots, Match, LIST_CONCURRENCY};
