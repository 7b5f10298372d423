// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};

use crate::model::{Entry, FileTree};

use super::{read_optional, write_atomic, StoreError, WriteDurability};

pub const DEFAULT_FILESYSTEM_FILENAME: &str = "filesystem.json";

/// The persisted tree on the service side: one pretty-printed JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl FilesystemFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored tree. A missing or whitespace-only file is an empty tree.
    pub fn load(&self) -> Result<FileTree, StoreError> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(FileTree::new());
        };
        if text.trim().is_empty() {
            return Ok(FileTree::new());
        }

        let entries = serde_json::from_str::<Vec<Entry>>(&text)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        FileTree::from_entries(entries)
            .map_err(|source| StoreError::InvalidTree { path: self.path.clone(), source })
    }

    pub fn save(&self, tree: &FileTree) -> Result<(), StoreError> {
        let mut json = serde_json::to_string_pretty(tree)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes(), self.durability)?;
        tracing::debug!(path = ?self.path, entries = tree.entry_count(), "filesystem saved");
        Ok(())
    }
}
