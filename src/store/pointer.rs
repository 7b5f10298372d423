// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::EntryId;

use super::{read_optional, write_atomic, StoreError, WriteDurability};

pub const DEFAULT_POINTER_FILENAME: &str = "active-file";

/// Remembers the last active file id between runs.
///
/// The file holds the bare id followed by a newline; an absent or blank file means no
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerFile {
    path: PathBuf,
}

impl PointerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<EntryId>, StoreError> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(None);
        };
        // A blank or otherwise unusable pointer is the same as no pointer.
        Ok(EntryId::new(text.trim()).ok())
    }

    pub fn store(&self, id: Option<&EntryId>) -> Result<(), StoreError> {
        match id {
            Some(id) => {
                let text = format!("{id}\n");
                write_atomic(&self.path, text.as_bytes(), WriteDurability::BestEffort)
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StoreError::Io { path: self.path.clone(), source }),
            },
        }
    }
}
