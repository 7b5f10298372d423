// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entry::Entry;
use super::ids::EntryId;

/// The whole virtual file system: an ordered sequence of root entries.
///
/// No parent back-references are stored. Every "who contains this entry" question is answered
/// by walking the tree again, which keeps ownership strictly parent → children and leaves no
/// index to invalidate on mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<Entry>,
}

/// The array that directly holds an entry, plus the entry's position in it.
#[derive(Debug)]
pub struct ParentContext<'a> {
    pub siblings: &'a mut Vec<Entry>,
    pub index: usize,
}

impl ParentContext<'_> {
    pub fn entry(&self) -> &Entry {
        &self.siblings[self.index]
    }

    pub fn remove(self) -> Entry {
        self.siblings.remove(self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    DuplicateId { entry_id: EntryId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { entry_id } => write!(f, "duplicate entry id (id={entry_id})"),
        }
    }
}

impl std::error::Error for TreeError {}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from decoded entries, rejecting trees whose ids are not unique.
    pub fn from_entries(roots: Vec<Entry>) -> Result<Self, TreeError> {
        let tree = Self { roots };
        tree.validate()?;
        Ok(tree)
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        let mut stack = self.roots.iter().collect::<Vec<_>>();
        while let Some(entry) = stack.pop() {
            if !seen.insert(entry.id()) {
                return Err(TreeError::DuplicateId { entry_id: entry.id().clone() });
            }
            stack.extend(entry.children());
        }
        Ok(())
    }

    pub fn roots(&self) -> &[Entry] {
        &self.roots
    }

    pub fn roots_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.roots
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        let mut count = 0;
        let mut stack = self.roots.iter().collect::<Vec<_>>();
        while let Some(entry) = stack.pop() {
            count += 1;
            stack.extend(entry.children());
        }
        count
    }

    pub fn contains_id(&self, id: &EntryId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Pre-order depth-first search; returns the first entry with `id`.
    pub fn find_by_id(&self, id: &EntryId) -> Option<&Entry> {
        find_in(&self.roots, id)
    }

    pub fn find_by_id_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        find_in_mut(&mut self.roots, id)
    }

    /// Ids from a root entry down to and including `id`, in descent order.
    pub fn find_path_ids(&self, id: &EntryId) -> Option<Vec<EntryId>> {
        let mut path = Vec::new();
        path_in(&self.roots, id, &mut path).then_some(path)
    }

    /// Walks `ids` from the root, each step looking for the next id among the previous entry's
    /// children. An empty chain resolves to nothing.
    pub fn resolve_path_ids(&self, ids: &[EntryId]) -> Option<&Entry> {
        let (last, parents) = ids.split_last()?;
        let siblings = self.children_at(parents)?;
        siblings.iter().find(|entry| entry.id() == last)
    }

    /// Children of the directory named by `ids`: the root sequence for an empty chain,
    /// otherwise the children of the folder the chain resolves to.
    pub fn children_at(&self, ids: &[EntryId]) -> Option<&[Entry]> {
        let mut current = self.roots.as_slice();
        for id in ids {
            let next = current.iter().find(|entry| entry.id() == id)?;
            current = next.as_folder()?.children();
        }
        Some(current)
    }

    /// Locates the array that directly holds `id`. The root array is checked first, then
    /// folders depth-first.
    pub fn find_parent_context(&mut self, id: &EntryId) -> Option<ParentContext<'_>> {
        parent_context_in(&mut self.roots, id)
            .map(|(siblings, index)| ParentContext { siblings, index })
    }

    /// Pre-order depth-first search for the first file.
    pub fn find_first_file(&self) -> Option<EntryId> {
        first_file_in(&self.roots)
    }

    /// True when `candidate` is `ancestor` itself or lies anywhere below it.
    ///
    /// Derived from fresh path chains: the candidate's chain must start with the ancestor's
    /// chain, compared element by element.
    pub fn is_self_or_descendant(&self, ancestor: &EntryId, candidate: &EntryId) -> bool {
        let (Some(ancestor_path), Some(candidate_path)) =
            (self.find_path_ids(ancestor), self.find_path_ids(candidate))
        else {
            return false;
        };
        candidate_path.starts_with(&ancestor_path)
    }
}

impl From<Vec<Entry>> for FileTree {
    fn from(roots: Vec<Entry>) -> Self {
        Self { roots }
    }
}

fn find_in<'a>(items: &'a [Entry], id: &EntryId) -> Option<&'a Entry> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Some(found) = find_in(item.children(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(items: &'a mut [Entry], id: &EntryId) -> Option<&'a mut Entry> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let Entry::Folder(folder) = item {
            if let Some(found) = find_in_mut(folder.children_mut(), id) {
                return Some(found);
            }
        }
    }
    None
}

fn path_in(items: &[Entry], id: &EntryId, path: &mut Vec<EntryId>) -> bool {
    for item in items {
        path.push(item.id().clone());
        if item.id() == id || path_in(item.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn parent_context_in<'a>(
    items: &'a mut Vec<Entry>,
    id: &EntryId,
) -> Option<(&'a mut Vec<Entry>, usize)> {
    if let Some(index) = items.iter().position(|item| item.id() == id) {
        return Some((items, index));
    }
    for item in items.iter_mut() {
        if let Entry::Folder(folder) = item {
            if let Some(found) = parent_context_in(folder.children_mut(), id) {
                return Some(found);
            }
        }
    }
    None
}

fn first_file_in(items: &[Entry]) -> Option<EntryId> {
    for item in items {
        match item {
            Entry::File(file) => return Some(file.id().clone()),
            Entry::Folder(folder) => {
                if let Some(found) = first_file_in(folder.children()) {
                    return Some(found);
                }
            }
        }
    }
    None
}
