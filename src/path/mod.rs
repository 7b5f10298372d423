// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Relative reference resolution over the virtual tree.
//!
//! Directories are expressed as chains of ancestor ids (see [`FileTree::find_path_ids`]) instead
//! of textual paths, so a resolved reference is itself an id chain that can be fed back into
//! [`FileTree::resolve_path_ids`].

use smallvec::SmallVec;

use crate::model::{EntryId, FileTree};

/// Resolves a POSIX-style relative reference (`./a`, `../b/c`, `d`) against `base_dir_ids`.
///
/// Empty and `.` segments are ignored. `..` pops one level and fails at the root. Any other
/// segment must match a child name exactly (case-sensitive); the first matching sibling wins.
/// Returns `None` instead of a partial chain when any segment cannot be resolved.
pub fn resolve(
    tree: &FileTree,
    reference: &str,
    base_dir_ids: &[EntryId],
) -> Option<Vec<EntryId>> {
    let segments = reference
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<SmallVec<[&str; 8]>>();

    let mut current = base_dir_ids.to_vec();
    for segment in segments {
        if segment == ".." {
            current.pop()?;
            continue;
        }

        let children = tree.children_at(&current)?;
        let child = children.iter().find(|entry| entry.name() == segment)?;
        current.push(child.id().clone());
    }

    Some(current)
}

/// The directory an entry lives in, as an id chain: its path ids without itself.
///
/// Root entries and unknown ids both yield the root (an empty chain).
pub fn base_dir_of(tree: &FileTree, id: &EntryId) -> Vec<EntryId> {
    let mut path = tree.find_path_ids(id).unwrap_or_default();
    path.pop();
    path
}
