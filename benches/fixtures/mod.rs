// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use arbor::model::{Entry, EntryId, FileEntry, FileTree, FolderEntry};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 4 levels, 4 folders and 6 files per folder.
    Medium,
    /// 6 levels, 4 folders and 8 files per folder.
    Large,
}

impl Case {
    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Medium => (4, 4, 6),
            Self::Large => (6, 4, 8),
        }
    }
}

pub fn id(raw: impl Into<String>) -> EntryId {
    EntryId::new(raw).expect("fixture id")
}

/// Every folder is `d<depth>_<index>`, every file `<folder>_f<index>.<ext>`; ids mirror names.
pub fn tree(case: Case) -> FileTree {
    let (depth, folders, files) = case.shape();
    FileTree::from(level("root", depth, folders, files))
}

fn level(prefix: &str, depth: usize, folders: usize, files: usize) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(folders + files);
    if depth > 0 {
        for idx in 0..folders {
            let name = format!("{prefix}_d{idx}");
            let children = level(&name, depth - 1, folders, files);
            entries.push(
                FolderEntry::new(id(format!("dir:{name}")), name.clone())
                    .with_children(children)
                    .into(),
            );
        }
    }
    for idx in 0..files {
        let ext = ["html", "css", "js", "py", "txt", "json"][idx % 6];
        let name = format!("{prefix}_f{idx}.{ext}");
        let content = match ext {
            "html" => format!(
                "<html><head><link rel=\"stylesheet\" href=\"{prefix}_f1.css\"></head>\
                 <body><script src=\"{prefix}_f2.js\"></script></body></html>"
            ),
            _ => format!("/* {name} */"),
        };
        entries.push(FileEntry::new(id(format!("file:{name}")), name).with_content(content).into());
    }
    entries
}

/// The id chain and root-relative path of the deepest first folder.
pub fn deepest_folder(case: Case) -> (Vec<EntryId>, String) {
    let (depth, _, _) = case.shape();
    let mut prefix = "root".to_owned();
    let mut ids = Vec::with_capacity(depth);
    let mut segments = Vec::with_capacity(depth);
    for _ in 0..depth {
        prefix = format!("{prefix}_d0");
        ids.push(id(format!("dir:{prefix}")));
        segments.push(prefix.clone());
    }
    (ids, segments.join("/"))
}

/// Name of the markup file inside the folder named `folder_name`.
pub fn markup_in(folder_name: &str) -> EntryId {
    id(format!("file:{folder_name}_f0.html"))
}
