// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: entries, the file tree that owns them and the workspace the shell edits.

pub mod entry;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod tree;
pub mod workspace;

pub use entry::{Entry, EntryKind, FileEntry, FolderEntry};
pub use ids::{EntryId, IdError};
pub use tree::{FileTree, ParentContext, TreeError};
pub use workspace::Workspace;
