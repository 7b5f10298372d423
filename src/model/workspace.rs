// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::entry::FileEntry;
use super::ids::EntryId;
use super::tree::FileTree;

/// The state mutations run against: the tree plus the active-file pointer.
///
/// The pointer carries no ownership weight. It may dangle (e.g. after loading a tree that no
/// longer contains the remembered id), so callers go through [`Workspace::active_file`], which
/// re-resolves it every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    tree: FileTree,
    active_file_id: Option<EntryId>,
}

impl Workspace {
    pub fn new(tree: FileTree) -> Self {
        Self { tree, active_file_id: None }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FileTree {
        &mut self.tree
    }

    pub fn replace_tree(&mut self, tree: FileTree) {
        self.tree = tree;
    }

    pub fn active_file_id(&self) -> Option<&EntryId> {
        self.active_file_id.as_ref()
    }

    pub fn set_active_file_id(&mut self, active_file_id: Option<EntryId>) {
        self.active_file_id = active_file_id;
    }

    /// The active file, if the pointer still resolves to a file.
    pub fn active_file(&self) -> Option<&FileEntry> {
        let id = self.active_file_id.as_ref()?;
        self.tree.find_by_id(id)?.as_file()
    }

    pub fn active_file_mut(&mut self) -> Option<&mut FileEntry> {
        let id = self.active_file_id.as_ref()?;
        self.tree.find_by_id_mut(id)?.as_file_mut()
    }
}
