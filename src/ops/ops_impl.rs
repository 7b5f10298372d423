// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Per-operation implementation helpers used by `apply_op`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_create(
    workspace: &mut Workspace,
    entry_id: &EntryId,
    kind: EntryKind,
    name: &str,
    parent_id: Option<&EntryId>,
) -> Result<ApplyResult, ApplyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApplyError::EmptyName);
    }
    if workspace.tree().contains_id(entry_id) {
        return Err(ApplyError::AlreadyExists { entry_id: entry_id.clone() });
    }

    let entry = Entry::new(entry_id.clone(), kind, name);
    let mut delta = DeltaBuilder::default();

    // Unknown or non-folder parents fall back to the root.
    let parent = match parent_id {
        Some(id) => workspace.tree_mut().find_by_id_mut(id).and_then(Entry::as_folder_mut),
        None => None,
    };
    match parent {
        Some(folder) => {
            folder.children_mut().push(entry);
            folder.set_open(true);
            delta.record_updated(folder.id().clone());
        }
        None => workspace.tree_mut().roots_mut().push(entry),
    }
    delta.record_added(entry_id.clone());

    let selection = match kind {
        EntryKind::File => {
            workspace.set_active_file_id(Some(entry_id.clone()));
            SelectionChange::Selected(entry_id.clone())
        }
        EntryKind::Folder => SelectionChange::Unchanged,
    };

    Ok(ApplyResult { changed: true, delta: delta.finish(), selection, active_mode: None })
}

fn apply_rename(
    workspace: &mut Workspace,
    entry_id: &EntryId,
    name: &str,
) -> Result<ApplyResult, ApplyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApplyError::EmptyName);
    }

    let is_active = workspace.active_file_id() == Some(entry_id);
    let Some(entry) = workspace.tree_mut().find_by_id_mut(entry_id) else {
        return Err(ApplyError::NotFound { entry_id: entry_id.clone() });
    };
    if entry.name() == name {
        return Ok(ApplyResult::unchanged());
    }

    let old_mode = EditorMode::for_file_name(entry.name());
    let new_mode = EditorMode::for_file_name(name);
    let active_mode = (is_active && entry.is_file() && old_mode != new_mode).then_some(new_mode);
    entry.set_name(name);

    let mut delta = DeltaBuilder::default();
    delta.record_updated(entry_id.clone());

    Ok(ApplyResult {
        changed: true,
        delta: delta.finish(),
        selection: SelectionChange::Unchanged,
        active_mode,
    })
}

fn apply_delete(workspace: &mut Workspace, entry_id: &EntryId) -> Result<ApplyResult, ApplyError> {
    let Some(context) = workspace.tree_mut().find_parent_context(entry_id) else {
        return Err(ApplyError::NotFound { entry_id: entry_id.clone() });
    };
    let removed = context.remove();

    let mut delta = DeltaBuilder::default();
    for id in removed.subtree_ids() {
        delta.record_removed(id);
    }

    // The pointer is repaired when it named the deleted entry or anything beneath it.
    let active_removed =
        workspace.active_file_id().is_some_and(|active| !workspace.tree().contains_id(active));
    let selection = if active_removed {
        let next = workspace.tree().find_first_file();
        workspace.set_active_file_id(next.clone());
        match next {
            Some(next) => SelectionChange::Selected(next),
            None => SelectionChange::Cleared,
        }
    } else {
        SelectionChange::Unchanged
    };

    Ok(ApplyResult { changed: true, delta: delta.finish(), selection, active_mode: None })
}

fn apply_move(
    workspace: &mut Workspace,
    entry_id: &EntryId,
    target_folder_id: &EntryId,
) -> Result<ApplyResult, ApplyError> {
    let tree = workspace.tree();
    match tree.find_by_id(target_folder_id) {
        Some(target) if target.is_folder() => {}
        Some(_) => return Err(ApplyError::NotAFolder { entry_id: target_folder_id.clone() }),
        None => return Err(ApplyError::NotFound { entry_id: target_folder_id.clone() }),
    }
    if !tree.contains_id(entry_id) {
        return Err(ApplyError::NotFound { entry_id: entry_id.clone() });
    }
    if entry_id == target_folder_id {
        return Err(ApplyError::MoveIntoSelf { entry_id: entry_id.clone() });
    }
    if tree.is_self_or_descendant(entry_id, target_folder_id) {
        return Err(ApplyError::MoveIntoDescendant {
            entry_id: entry_id.clone(),
            target_folder_id: target_folder_id.clone(),
        });
    }

    let parent_id = workspace
        .tree()
        .find_path_ids(entry_id)
        .and_then(|ids| ids.iter().rev().nth(1).cloned());
    let Some(context) = workspace.tree_mut().find_parent_context(entry_id) else {
        return Err(ApplyError::NotFound { entry_id: entry_id.clone() });
    };
    let index = context.index;
    let moved = context.remove();

    let Some(target) =
        workspace.tree_mut().find_by_id_mut(target_folder_id).and_then(Entry::as_folder_mut)
    else {
        restore_entry(workspace, parent_id.as_ref(), index, moved);
        return Err(ApplyError::NotFound { entry_id: target_folder_id.clone() });
    };
    target.children_mut().push(moved);
    target.set_open(true);

    let mut delta = DeltaBuilder::default();
    delta.record_updated(entry_id.clone());
    delta.record_updated(target_folder_id.clone());

    Ok(ApplyResult {
        changed: true,
        delta: delta.finish(),
        selection: SelectionChange::Unchanged,
        active_mode: None,
    })
}

/// Puts a detached entry back at `index` under `parent_id`, or among the roots.
fn restore_entry(
    workspace: &mut Workspace,
    parent_id: Option<&EntryId>,
    index: usize,
    entry: Entry,
) {
    let tree = workspace.tree_mut();
    let parent = parent_id.and_then(|id| tree.find_by_id_mut(id)).and_then(Entry::as_folder_mut);
    let siblings = match parent {
        Some(folder) => folder.children_mut(),
        None => tree.roots_mut(),
    };
    let index = index.min(siblings.len());
    siblings.insert(index, entry);
}
