// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flattened rows for drawing the tree.

use std::cmp::Ordering;

use crate::mode::FileIcon;
use crate::model::{Entry, EntryId, EntryKind, FileTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: EntryId,
    pub depth: usize,
    pub kind: EntryKind,
    pub name: String,
    /// `None` for folders.
    pub icon: Option<FileIcon>,
    pub is_open: bool,
    pub is_active: bool,
}

/// Rows in display order: within each folder, folders first, then files, each group sorted by
/// case-insensitive name. Closed folders contribute their own row only.
///
/// Stored sibling order is left alone; sorting happens on borrowed slices.
pub fn visible_rows(tree: &FileTree, active: Option<&EntryId>) -> Vec<TreeRow> {
    let mut rows = Vec::with_capacity(tree.roots().len());
    push_rows(tree.roots(), 0, active, &mut rows);
    rows
}

fn push_rows(items: &[Entry], depth: usize, active: Option<&EntryId>, rows: &mut Vec<TreeRow>) {
    let mut sorted = items.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| display_order(a, b));

    for item in sorted {
        let (icon, is_open) = match item {
            Entry::File(file) => (Some(FileIcon::for_file_name(file.name())), false),
            Entry::Folder(folder) => (None, folder.is_open()),
        };
        rows.push(TreeRow {
            id: item.id().clone(),
            depth,
            kind: item.kind(),
            name: item.name().to_owned(),
            icon,
            is_open,
            is_active: active == Some(item.id()),
        });
        if is_open {
            push_rows(item.children(), depth + 1, active, rows);
        }
    }
}

fn display_order(a: &Entry, b: &Entry) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
    }
}
