// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

/// A node of the virtual file tree.
///
/// Serialized as `{"id", "name", "type": "file" | "folder", ...}` with `content` for files and
/// `children` / `isOpen` for folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    File(FileEntry),
    Folder(FolderEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    id: EntryId,
    name: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    id: EntryId,
    name: String,
    // Absent and empty children are the same state.
    #[serde(default)]
    children: Vec<Entry>,
    #[serde(default, rename = "isOpen")]
    is_open: bool,
}

impl Entry {
    pub fn new(id: EntryId, kind: EntryKind, name: impl Into<String>) -> Self {
        match kind {
            EntryKind::File => Self::File(FileEntry::new(id, name)),
            EntryKind::Folder => Self::Folder(FolderEntry::new(id, name)),
        }
    }

    pub fn id(&self) -> &EntryId {
        match self {
            Self::File(file) => &file.id,
            Self::Folder(folder) => &folder.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Self::File(file) => file.name = name.into(),
            Self::Folder(folder) => folder.name = name.into(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::File(_) => EntryKind::File,
            Self::Folder(_) => EntryKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileEntry> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderEntry> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }

    pub fn as_folder_mut(&mut self) -> Option<&mut FolderEntry> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }

    /// Children of a folder; files have none.
    pub fn children(&self) -> &[Entry] {
        match self {
            Self::Folder(folder) => &folder.children,
            Self::File(_) => &[],
        }
    }

    /// Collects this entry's id and the ids of every descendant in pre-order.
    pub fn subtree_ids(&self) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(entry) = stack.pop() {
            out.push(entry.id().clone());
            stack.extend(entry.children().iter().rev());
        }
        out
    }
}

impl FileEntry {
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), content: String::new() }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

impl FolderEntry {
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), children: Vec::new(), is_open: false }
    }

    pub fn with_children(mut self, children: Vec<Entry>) -> Self {
        self.children = children;
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.children
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }
}

impl From<FileEntry> for Entry {
    fn from(file: FileEntry) -> Self {
        Self::File(file)
    }
}

impl From<FolderEntry> for Entry {
    fn from(folder: FolderEntry) -> Self {
        Self::Folder(folder)
    }
}
