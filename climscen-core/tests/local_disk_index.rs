//! Index and glob search over a real directory tree.

use climscen_core::{
    find, GlobPattern, IndexRoot, LocalDisk, MemoryStorage, StorageBackend, VirtualFileIndex,
};
use std::collections::BTreeSet;
use std::path::Path;

const FILES: &[&str] = &[
    "demo/demo.ini",
    "demo/ts/pr/pr_rcp_False.csv",
    "demo/ts/pr/pr_sim_False.csv",
    "demo/map/tas/1981-2010/tas_ref_1981_2010_mean.csv",
    "demo/map/tas/2021-2050/tas_rcp45_2021_2050_c010.csv",
    "demo/map/tas/2021-2050/tas_rcp45_2021_2050_c010.png",
    "context/regions.geojson",
];

fn write_tree(root: &Path) {
    for file in FILES {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("contents of {}", file)).unwrap();
    }
}

async fn roots(backend: &dyn StorageBackend) -> Vec<IndexRoot> {
    let project = backend.resolve_path_to_id("demo").await.unwrap().unwrap();
    let shared = backend.resolve_path_to_id("context").await.unwrap().unwrap();
    vec![IndexRoot::new("", project), IndexRoot::new("context", shared)]
}

#[tokio::test]
async fn local_disk_index_matches_memory_index() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());
    let disk = LocalDisk::new(dir.path());

    let memory = MemoryStorage::new();
    for file in FILES {
        memory.insert(*file, format!("contents of {}", file));
    }

    let disk_index = VirtualFileIndex::build(&disk, &roots(&disk).await).await;
    let memory_index = VirtualFileIndex::build(&memory, &roots(&memory).await).await;

    let disk_paths: BTreeSet<_> = disk_index.paths().collect();
    let memory_paths: BTreeSet<_> = memory_index.paths().collect();
    assert_eq!(disk_paths, memory_paths);
    assert_eq!(disk_paths.len(), 6);
    assert!(!disk_index.contains("map/tas/2021-2050/tas_rcp45_2021_2050_c010.png"));

    // Backend references are readable as-is
    let reference = disk_index.backend_ref("ts/pr/pr_rcp_False.csv").unwrap();
    assert_eq!(
        disk.read_text(reference).await.unwrap(),
        "contents of demo/ts/pr/pr_rcp_False.csv"
    );
}

#[tokio::test]
async fn rebuilding_from_same_snapshot_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());
    let disk = LocalDisk::new(dir.path());
    let roots = roots(&disk).await;

    let first = VirtualFileIndex::build(&disk, &roots).await;
    let second = VirtualFileIndex::build(&disk, &roots).await;
    let a: BTreeSet<_> = first.iter().collect();
    let b: BTreeSet<_> = second.iter().collect();
    assert_eq!(a, b);
}

#[tokio::test]
async fn index_is_a_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());
    let disk = LocalDisk::new(dir.path());
    let index = VirtualFileIndex::build(&disk, &roots(&disk).await).await;

    std::fs::write(dir.path().join("demo/ts/pr/pr_rcp_True.csv"), "year\n").unwrap();
    assert!(index.files_matching("ts/pr/*_True.csv").unwrap().is_empty());
}

#[tokio::test]
async fn find_over_disk_agrees_with_index_matching() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path());
    let disk = LocalDisk::new(dir.path());
    let roots = roots(&disk).await;
    let index = VirtualFileIndex::build(&disk, &roots[..1]).await;

    for source in ["map/tas/*/tas_*.csv", "ts/*/*_False.csv", "**/*.ini"] {
        let pattern = GlobPattern::new(source).unwrap();
        let found: Vec<String> = find(&disk, &roots[0].root_ref, &pattern)
            .await
            .into_iter()
            .map(|m| m.path)
            .collect();
        assert_eq!(found, index.files_matching_glob(&pattern), "pattern {}", source);
    }
}
