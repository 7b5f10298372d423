// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{
    FilesystemFile, PointerFile, StoreError, WriteDurability, DEFAULT_FILESYSTEM_FILENAME,
    DEFAULT_POINTER_FILENAME,
};
use crate::model::fixtures::{file, id, sample_tree};
use crate::model::FileTree;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("arbor-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn tmp() -> TempDir {
    TempDir::new("store")
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".arbor.tmp."))
        .collect()
}

#[rstest]
fn missing_filesystem_file_loads_as_empty_tree(tmp: TempDir) {
    let store = FilesystemFile::new(tmp.path().join("filesystem.json"));
    assert_eq!(store.load().expect("load"), FileTree::new());
}

#[rstest]
#[case("")]
#[case("   \n\t")]
fn blank_filesystem_file_loads_as_empty_tree(tmp: TempDir, #[case] contents: &str) {
    let path = tmp.path().join("filesystem.json");
    std::fs::write(&path, contents).unwrap();
    assert!(FilesystemFile::new(path).load().expect("load").is_empty());
}

#[rstest]
fn corrupt_filesystem_file_is_a_json_error(tmp: TempDir) {
    let path = tmp.path().join("filesystem.json");
    std::fs::write(&path, "[{\"id\": ").unwrap();

    let err = FilesystemFile::new(&path).load().unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }), "{err:?}");
}

#[rstest]
fn duplicate_ids_on_disk_are_rejected(tmp: TempDir) {
    let path = tmp.path().join("filesystem.json");
    let tree = FileTree::from(vec![file("a", "a.txt", ""), file("a", "b.txt", "")]);
    std::fs::write(&path, serde_json::to_string(&tree).unwrap()).unwrap();

    let err = FilesystemFile::new(&path).load().unwrap_err();
    assert!(matches!(err, StoreError::InvalidTree { .. }), "{err:?}");
}

#[rstest]
#[case(WriteDurability::BestEffort)]
#[case(WriteDurability::Durable)]
fn save_then_load_returns_the_same_tree(tmp: TempDir, #[case] durability: WriteDurability) {
    let store = FilesystemFile::new(tmp.path().join("nested/dir/filesystem.json"))
        .with_durability(durability);
    let tree = sample_tree();

    store.save(&tree).expect("save");
    assert_eq!(store.load().expect("load"), tree);

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("[\n"), "pretty printed: {text}");
    assert!(leftover_temp_files(store.path().parent().unwrap()).is_empty());
}

#[rstest]
fn save_overwrites_previous_contents(tmp: TempDir) {
    let store = FilesystemFile::new(tmp.path().join("filesystem.json"));
    store.save(&sample_tree()).expect("first save");
    store.save(&FileTree::new()).expect("second save");

    assert!(store.load().expect("load").is_empty());
}

#[cfg(unix)]
#[rstest]
fn save_refuses_to_follow_symlinks(tmp: TempDir) {
    let target = tmp.path().join("elsewhere.json");
    std::fs::write(&target, "[]").unwrap();
    let link = tmp.path().join("filesystem.json");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let err = FilesystemFile::new(&link).save(&sample_tree()).unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }), "{err:?}");
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "[]");
}

#[rstest]
fn pointer_round_trips_and_clears(tmp: TempDir) {
    let pointer = PointerFile::new(tmp.path().join("state/active-file"));
    assert_eq!(pointer.load().expect("load missing"), None);

    pointer.store(Some(&id("main-css"))).expect("store");
    assert_eq!(pointer.load().expect("load"), Some(id("main-css")));

    pointer.store(None).expect("clear");
    assert_eq!(pointer.load().expect("load cleared"), None);
    pointer.store(None).expect("clearing twice is fine");
}

#[rstest]
fn blank_pointer_file_means_no_selection(tmp: TempDir) {
    let path = tmp.path().join("active-file");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(PointerFile::new(path).load().expect("load"), None);
}

#[rstest]
fn default_file_names_share_one_directory(tmp: TempDir) {
    let store = FilesystemFile::new(tmp.path().join(DEFAULT_FILESYSTEM_FILENAME));
    let pointer = PointerFile::new(tmp.path().join(DEFAULT_POINTER_FILENAME));

    store.save(&sample_tree()).expect("save");
    pointer.store(Some(&id("index"))).expect("store");

    assert_eq!(store.load().expect("load"), sample_tree());
    assert_eq!(pointer.load().expect("load"), Some(id("index")));
    assert!(tmp.path().join("filesystem.json").is_file());
    assert!(tmp.path().join("active-file").is_file());
}
