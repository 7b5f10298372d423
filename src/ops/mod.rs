// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural mutations of the file tree.
//!
//! Every operation either applies completely or leaves the workspace untouched and reports an
//! [`ApplyError`]. Successful operations produce a small delta plus the follow-up work the
//! caller owes the rest of the system (persisting, re-pointing the editor).

use std::collections::BTreeSet;
use std::fmt;

use crate::mode::EditorMode;
use crate::model::{Entry, EntryId, EntryKind, Workspace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Create { entry_id: EntryId, kind: EntryKind, name: String, parent_id: Option<EntryId> },
    Rename { entry_id: EntryId, name: String },
    Delete { entry_id: EntryId },
    Move { entry_id: EntryId, target_folder_id: EntryId },
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Create { .. } => OpKind::Create,
            Self::Rename { .. } => OpKind::Rename,
            Self::Delete { .. } => OpKind::Delete,
            Self::Move { .. } => OpKind::Move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Rename,
    Delete,
    Move,
}

/// How the active-file pointer changed as a side effect of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionChange {
    #[default]
    Unchanged,
    /// The pointer now names this file (new file, or repair after deleting the active one).
    Selected(EntryId),
    /// The active file was deleted and no file remains.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    /// False for no-op results (e.g. renaming to the current name); nothing to persist.
    pub changed: bool,
    pub delta: Delta,
    pub selection: SelectionChange,
    /// Set when the active file was renamed into a different editor mode.
    pub active_mode: Option<EditorMode>,
}

impl ApplyResult {
    fn unchanged() -> Self {
        Self {
            changed: false,
            delta: Delta::default(),
            selection: SelectionChange::Unchanged,
            active_mode: None,
        }
    }
}

/// Ids touched by an operation, each list sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<EntryId>,
    pub removed: Vec<EntryId>,
    pub updated: Vec<EntryId>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<EntryId>,
    removed: BTreeSet<EntryId>,
    updated: BTreeSet<EntryId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: EntryId) {
        self.removed.remove(&id);
        self.updated.remove(&id);
        self.added.insert(id);
    }

    fn record_removed(&mut self, id: EntryId) {
        self.added.remove(&id);
        self.updated.remove(&id);
        self.removed.insert(id);
    }

    fn record_updated(&mut self, id: EntryId) {
        if self.added.contains(&id) || self.removed.contains(&id) {
            return;
        }
        self.updated.insert(id);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

/// Applies one operation to the workspace.
///
/// Rejections are logged at `warn` and returned; they never panic and never leave a partial
/// mutation behind.
pub fn apply_op(workspace: &mut Workspace, op: &Op) -> Result<ApplyResult, ApplyError> {
    let result = match op {
        Op::Create { entry_id, kind, name, parent_id } => {
            apply_create(workspace, entry_id, *kind, name, parent_id.as_ref())
        }
        Op::Rename { entry_id, name } => apply_rename(workspace, entry_id, name),
        Op::Delete { entry_id } => apply_delete(workspace, entry_id),
        Op::Move { entry_id, target_folder_id } => {
            apply_move(workspace, entry_id, target_folder_id)
        }
    };

    match &result {
        Ok(applied) => tracing::debug!(op = ?op.kind(), changed = applied.changed, "op applied"),
        Err(err) => tracing::warn!(op = ?op.kind(), error = %err, "op rejected"),
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    EmptyName,
    AlreadyExists { entry_id: EntryId },
    NotFound { entry_id: EntryId },
    NotAFolder { entry_id: EntryId },
    MoveIntoSelf { entry_id: EntryId },
    MoveIntoDescendant { entry_id: EntryId, target_folder_id: EntryId },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("name must not be empty"),
            Self::AlreadyExists { entry_id } => write!(f, "entry already exists (id={entry_id})"),
            Self::NotFound { entry_id } => write!(f, "entry not found (id={entry_id})"),
            Self::NotAFolder { entry_id } => write!(f, "entry is not a folder (id={entry_id})"),
            Self::MoveIntoSelf { entry_id } => {
                write!(f, "cannot move entry into itself (id={entry_id})")
            }
            Self::MoveIntoDescendant { entry_id, target_folder_id } => write!(
                f,
                "cannot move entry into its own subtree (id={entry_id}, target={target_folder_id})"
            ),
        }
    }
}

impl std::error::Error for ApplyError {}

// Extracted per-operation implementation.
include!("ops_impl.rs");
