// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editor shell: gesture handlers tying the tree, the editor widget and the gateways
//! together.
//!
//! Every handler runs synchronously on the caller's thread. Only saves (through
//! [`SaveQueue`]), remote runs and the exit transmission leave it. While a name edit is pending
//! the shell refuses structural gestures with [`ShellError::Busy`] instead of queueing them.

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::gateway::{ExecKind, ExecutionGateway, GatewayError, PersistenceGateway};
use crate::inline::{self, InlineError, InlinedDocument};
use crate::mode::{self, EditorMode};
use crate::model::{Entry, EntryId, EntryKind, FileTree, Workspace};
use crate::ops::{self, ApplyError, ApplyResult, Op, SelectionChange};
use crate::view::{self, TreeRow};

mod console;
mod debounce;
mod editor;
mod save_queue;

pub use console::{ConsoleLevel, ConsoleLine};
pub use debounce::Debounce;
pub use editor::{EditorWidget, SelectionStore};
pub use save_queue::SaveQueue;

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Quiet period after the last keystroke before editor content is committed.
    pub debounce_window: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self { debounce_window: DEFAULT_DEBOUNCE_WINDOW }
    }
}

/// A name edit waiting for the user's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEdit {
    Create { kind: EntryKind, parent_id: Option<EntryId> },
    Rename { entry_id: EntryId },
}

#[derive(Debug)]
pub enum ShellError {
    /// A name edit is pending; the gesture was refused.
    Busy,
    NoPendingEdit,
    NoActiveFile,
    EntryNotFound { entry_id: EntryId },
    NotAFile { entry_id: EntryId },
    NotAFolder { entry_id: EntryId },
    UnsupportedFile { name: String, expected: &'static str },
    Apply(ApplyError),
    Inline(InlineError),
    Gateway(GatewayError),
    /// A background thread (save worker or remote run) could not be started.
    Spawn { source: io::Error },
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("a name edit is pending"),
            Self::NoPendingEdit => f.write_str("no name edit is pending"),
            Self::NoActiveFile => f.write_str("no active file"),
            Self::EntryNotFound { entry_id } => write!(f, "entry not found (id={entry_id})"),
            Self::NotAFile { entry_id } => write!(f, "entry is not a file (id={entry_id})"),
            Self::NotAFolder { entry_id } => write!(f, "entry is not a folder (id={entry_id})"),
            Self::UnsupportedFile { name, expected } => {
                write!(f, "{name:?} cannot be run here; expected {expected}")
            }
            Self::Apply(err) => write!(f, "{err}"),
            Self::Inline(err) => write!(f, "{err}"),
            Self::Gateway(err) => write!(f, "{err}"),
            Self::Spawn { source } => write!(f, "cannot start background thread: {source}"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply(err) => Some(err),
            Self::Inline(err) => Some(err),
            Self::Gateway(err) => Some(err),
            Self::Spawn { source } => Some(source),
            _ => None,
        }
    }
}

impl From<ApplyError> for ShellError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

impl From<InlineError> for ShellError {
    fn from(err: InlineError) -> Self {
        Self::Inline(err)
    }
}

impl From<GatewayError> for ShellError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

pub struct Shell<E, S> {
    workspace: Workspace,
    editor: E,
    selection: S,
    persistence: Arc<dyn PersistenceGateway>,
    execution: Arc<dyn ExecutionGateway>,
    saves: SaveQueue,
    debounce: Debounce,
    name_edit: Option<NameEdit>,
    console_tx: Sender<ConsoleLine>,
    console_rx: Receiver<ConsoleLine>,
}

impl<E: EditorWidget, S: SelectionStore> Shell<E, S> {
    pub fn new(
        editor: E,
        selection: S,
        persistence: Arc<dyn PersistenceGateway>,
        execution: Arc<dyn ExecutionGateway>,
        config: ShellConfig,
    ) -> Result<Self, ShellError> {
        let (console_tx, console_rx) = mpsc::channel();
        let saves = SaveQueue::new(persistence.clone(), console_tx.clone())
            .map_err(|source| ShellError::Spawn { source })?;
        Ok(Self {
            workspace: Workspace::default(),
            editor,
            selection,
            persistence,
            execution,
            saves,
            debounce: Debounce::new(config.debounce_window),
            name_edit: None,
            console_tx,
            console_rx,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn tree(&self) -> &FileTree {
        self.workspace.tree()
    }

    pub fn active_file_id(&self) -> Option<&EntryId> {
        self.workspace.active_file_id()
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn selection_store(&self) -> &S {
        &self.selection
    }

    pub fn pending_edit(&self) -> Option<&NameEdit> {
        self.name_edit.as_ref()
    }

    pub fn is_editing_name(&self) -> bool {
        self.name_edit.is_some()
    }

    pub fn debounce(&self) -> &Debounce {
        &self.debounce
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        view::visible_rows(self.workspace.tree(), self.workspace.active_file_id())
    }

    /// Everything written to the console since the last drain, including lines produced by
    /// background saves and runs.
    pub fn drain_console(&self) -> Vec<ConsoleLine> {
        self.console_rx.try_iter().collect()
    }

    /// Blocks until queued background saves have been handed to the gateway.
    pub fn flush_saves(&self) {
        self.saves.flush();
    }

    /// Loads the tree and restores the last active file.
    pub fn start(&mut self) {
        let tree = match self.persistence.load() {
            Ok(tree) => tree,
            Err(err) => {
                tracing::error!(error = %err, "cannot load file system");
                self.console(ConsoleLine::error(format!("Cannot load file system: {err}")));
                FileTree::new()
            }
        };
        self.workspace = Workspace::new(tree);
        self.name_edit = None;
        self.debounce.cancel();

        let remembered = self.selection.load();
        let restored = remembered.clone().filter(|id| self.resolves_to_file(id));
        if remembered.is_some() && restored.is_none() {
            self.selection.store(None);
        }

        match restored.or_else(|| self.workspace.tree().find_first_file()) {
            Some(id) => self.activate(id),
            None => self.reset_editor(),
        }
        tracing::info!(
            entries = self.workspace.tree().entry_count(),
            active = ?self.workspace.active_file_id(),
            "shell started"
        );
    }

    /// Click on a file: commit the current editor content, then show `entry_id`.
    pub fn open_file(&mut self, entry_id: &EntryId) -> Result<(), ShellError> {
        self.ensure_idle()?;
        match self.workspace.tree().find_by_id(entry_id) {
            Some(entry) if entry.is_file() => {}
            Some(_) => return Err(ShellError::NotAFile { entry_id: entry_id.clone() }),
            None => return Err(ShellError::EntryNotFound { entry_id: entry_id.clone() }),
        }
        if self.workspace.active_file_id() == Some(entry_id) {
            return Ok(());
        }

        if self.workspace.active_file().is_some() {
            self.flush_editor();
            self.schedule_save();
        }
        self.activate(entry_id.clone());
        Ok(())
    }

    /// Click on a folder: flip its open state.
    pub fn toggle_folder(&mut self, entry_id: &EntryId) -> Result<bool, ShellError> {
        self.ensure_idle()?;
        let folder = match self.workspace.tree_mut().find_by_id_mut(entry_id) {
            Some(Entry::Folder(folder)) => folder,
            Some(_) => return Err(ShellError::NotAFolder { entry_id: entry_id.clone() }),
            None => return Err(ShellError::EntryNotFound { entry_id: entry_id.clone() }),
        };
        let open = !folder.is_open();
        folder.set_open(open);
        self.schedule_save();
        Ok(open)
    }

    /// Opens the name input for a new entry. A folder `parent_id` is opened right away so the
    /// input shows inside it; anything else places the entry at the root.
    pub fn start_create(
        &mut self,
        kind: EntryKind,
        parent_id: Option<&EntryId>,
    ) -> Result<(), ShellError> {
        self.ensure_idle()?;
        let parent = match parent_id {
            Some(id) => self.workspace.tree_mut().find_by_id_mut(id).and_then(Entry::as_folder_mut),
            None => None,
        };
        let parent_id = parent.map(|folder| {
            folder.set_open(true);
            folder.id().clone()
        });

        self.name_edit = Some(NameEdit::Create { kind, parent_id });
        Ok(())
    }

    /// Opens the name input for `entry_id`; returns the current name to prefill it with.
    pub fn start_rename(&mut self, entry_id: &EntryId) -> Result<String, ShellError> {
        self.ensure_idle()?;
        let name = self
            .workspace
            .tree()
            .find_by_id(entry_id)
            .map(|entry| entry.name().to_owned())
            .ok_or_else(|| ShellError::EntryNotFound { entry_id: entry_id.clone() })?;

        self.name_edit = Some(NameEdit::Rename { entry_id: entry_id.clone() });
        Ok(name)
    }

    /// Finishes the pending name edit with `input`.
    ///
    /// Blank input discards the edit and returns `Ok(None)`. A new file becomes the active file.
    pub fn commit_name_edit(&mut self, input: &str) -> Result<Option<ApplyResult>, ShellError> {
        let edit = self.name_edit.take().ok_or(ShellError::NoPendingEdit)?;
        let name = input.trim();
        if name.is_empty() {
            tracing::debug!("name edit discarded");
            return Ok(None);
        }

        let op = match edit {
            NameEdit::Create { kind, parent_id } => {
                Op::Create { entry_id: EntryId::generate(), kind, name: name.to_owned(), parent_id }
            }
            NameEdit::Rename { entry_id } => Op::Rename { entry_id, name: name.to_owned() },
        };

        // The editor still shows the previously active file.
        self.flush_editor();
        let result = self.apply(&op)?;

        if let SelectionChange::Selected(id) = &result.selection {
            self.selection.store(Some(id));
            self.load_active_into_editor();
        }
        if let Some(mode) = result.active_mode {
            self.editor.set_mode(mode);
            self.apply_lint(mode);
            self.editor.refresh();
        }
        if result.changed {
            self.schedule_save();
        }
        Ok(Some(result))
    }

    pub fn cancel_name_edit(&mut self) {
        if self.name_edit.take().is_some() {
            tracing::debug!("name edit cancelled");
        }
    }

    /// Deletes `entry_id` after `confirm` accepts the prompt. Returns whether anything was
    /// deleted.
    pub fn delete(
        &mut self,
        entry_id: &EntryId,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, ShellError> {
        self.ensure_idle()?;
        let prompt = match self.workspace.tree().find_by_id(entry_id) {
            Some(Entry::Folder(folder)) => {
                format!("Delete '{}' and all of its contents?", folder.name())
            }
            Some(Entry::File(file)) => format!("Delete '{}'?", file.name()),
            None => return Err(ShellError::EntryNotFound { entry_id: entry_id.clone() }),
        };
        if !confirm(&prompt) {
            return Ok(false);
        }

        self.flush_editor();
        let result = self.apply(&Op::Delete { entry_id: entry_id.clone() })?;

        match result.selection {
            SelectionChange::Selected(next) => {
                self.editor.set_value("");
                self.selection.store(Some(&next));
                self.load_active_into_editor();
            }
            SelectionChange::Cleared => {
                self.selection.store(None);
                self.reset_editor();
            }
            SelectionChange::Unchanged => {}
        }
        self.schedule_save();
        Ok(true)
    }

    /// Drag-over rule: whether dropping `dragged_id` onto `target_id` would be accepted.
    pub fn can_drop(&self, dragged_id: &EntryId, target_id: &EntryId) -> bool {
        if self.name_edit.is_some() || dragged_id == target_id {
            return false;
        }
        let tree = self.workspace.tree();
        let target_is_folder = tree.find_by_id(target_id).is_some_and(Entry::is_folder);
        target_is_folder
            && tree.contains_id(dragged_id)
            && !tree.is_self_or_descendant(dragged_id, target_id)
    }

    /// Drop: re-parent `dragged_id` under the folder `target_id`.
    pub fn move_entry(
        &mut self,
        dragged_id: &EntryId,
        target_id: &EntryId,
    ) -> Result<ApplyResult, ShellError> {
        self.ensure_idle()?;
        self.flush_editor();
        let result = self.apply(&Op::Move {
            entry_id: dragged_id.clone(),
            target_folder_id: target_id.clone(),
        })?;
        self.schedule_save();
        Ok(result)
    }

    /// The widget reported a content change; restarts the quiet period.
    pub fn editor_changed(&mut self, now: Instant) {
        self.debounce.arm(now);
    }

    /// Drives the debounce. Commits the editor content once the quiet period has elapsed and
    /// returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debounce.fire(now) || self.name_edit.is_some() {
            return false;
        }
        if !self.commit_editor() {
            return false;
        }
        if self.editor.mode().is_lintable() {
            self.editor.perform_lint();
        }
        true
    }

    /// Commits the editor content into the active file right away.
    pub fn flush_editor(&mut self) {
        self.debounce.cancel();
        self.commit_editor();
    }

    /// Explicit save: blocks until the gateway answers. Supersedes any queued background save.
    pub fn save_now(&mut self) -> Result<(), ShellError> {
        self.ensure_idle()?;
        self.flush_editor();
        match self.saves.save_now(self.workspace.tree()) {
            Ok(()) => {
                self.console(ConsoleLine::info("Saved."));
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "save failed");
                self.console(ConsoleLine::error(format!("Save failed: {err}")));
                self.console(ConsoleLine::warn("Could not save (see console)."));
                Err(err.into())
            }
        }
    }

    /// Local run of the active markup file: the self-contained preview document.
    pub fn run_preview(&mut self) -> Result<InlinedDocument, ShellError> {
        self.ensure_idle()?;
        self.flush_editor();
        let (entry_id, name) = self.runnable_active_file(mode::is_markup_entry, ".html or .htm")?;

        let document = inline::inline_assets(self.workspace.tree(), &entry_id)?;
        for asset in &document.inlined {
            self.console(ConsoleLine::info(format!(
                "Inlined {}: {}",
                asset.kind.label(),
                asset.reference
            )));
        }
        for asset in &document.unresolved {
            self.console(ConsoleLine::warn(format!(
                "Could not find {}: {}",
                asset.kind.label(),
                asset.reference
            )));
        }
        self.console(ConsoleLine::info(format!("Running HTML file: {name}...")));
        Ok(document)
    }

    /// Remote run of the active script file on a background thread.
    ///
    /// Output reaches the console when the run finishes. Returns `Ok(None)` when the file is
    /// empty and nothing was sent.
    pub fn run_remote(&mut self) -> Result<Option<JoinHandle<()>>, ShellError> {
        self.ensure_idle()?;
        self.flush_editor();
        let (entry_id, name) = self.runnable_active_file(mode::is_python_entry, ".py")?;

        let code = self
            .workspace
            .tree()
            .find_by_id(&entry_id)
            .and_then(Entry::as_file)
            .map(|file| file.content().to_owned())
            .unwrap_or_default();
        if code.trim().is_empty() {
            self.console(ConsoleLine::warn("Python file is empty."));
            return Ok(None);
        }

        self.console(ConsoleLine::info(format!("Sending {name} to the server...")));
        let execution = self.execution.clone();
        let console = self.console_tx.clone();
        let handle = std::thread::Builder::new()
            .name("arbor-run".to_owned())
            .spawn(move || {
                let lines = match execution.execute(ExecKind::Python, &code) {
                    Ok(output) => {
                        let header = ConsoleLine::info(format!("--- Output of {name} ---"));
                        let mut lines = vec![header];
                        if !output.stdout.is_empty() {
                            lines.push(ConsoleLine::log(output.stdout));
                        }
                        if !output.stderr.is_empty() {
                            lines.push(ConsoleLine::error(output.stderr));
                        }
                        lines.push(ConsoleLine::info(format!("--- End of output {name} ---")));
                        lines
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "remote run failed");
                        vec![ConsoleLine::error(format!("Run failed: {err}"))]
                    }
                };
                for line in lines {
                    let _ = console.send(line);
                }
            })
            .map_err(|source| ShellError::Spawn { source })?;
        Ok(Some(handle))
    }

    /// Exit path: commit the editor, then hand the tree to a one-way transmission without
    /// waiting for it. Skipped while a name edit is pending.
    pub fn shutdown(&mut self) {
        self.flush_editor();
        if self.name_edit.is_some() {
            tracing::debug!("exit save skipped: name edit pending");
            return;
        }
        // Older queued snapshots must not land after the exit transmission.
        self.saves.discard_pending();
        self.persistence.send_best_effort(self.workspace.tree());
    }

    fn ensure_idle(&self) -> Result<(), ShellError> {
        match self.name_edit {
            Some(_) => Err(ShellError::Busy),
            None => Ok(()),
        }
    }

    fn console(&self, line: ConsoleLine) {
        // The receiver lives in `self`, so the send cannot fail.
        let _ = self.console_tx.send(line);
    }

    fn resolves_to_file(&self, id: &EntryId) -> bool {
        self.workspace.tree().find_by_id(id).is_some_and(Entry::is_file)
    }

    fn apply(&mut self, op: &Op) -> Result<ApplyResult, ShellError> {
        ops::apply_op(&mut self.workspace, op).map_err(|err| {
            self.console(ConsoleLine::error(format!("{:?} failed: {err}", op.kind())));
            ShellError::Apply(err)
        })
    }

    fn runnable_active_file(
        &self,
        accepts: fn(&str) -> bool,
        expected: &'static str,
    ) -> Result<(EntryId, String), ShellError> {
        let entry_id = self.workspace.active_file_id().ok_or(ShellError::NoActiveFile)?;
        let entry = self
            .workspace
            .tree()
            .find_by_id(entry_id)
            .ok_or_else(|| ShellError::EntryNotFound { entry_id: entry_id.clone() })?;
        let file =
            entry.as_file().ok_or_else(|| ShellError::NotAFile { entry_id: entry_id.clone() })?;
        if !accepts(file.name()) {
            return Err(ShellError::UnsupportedFile { name: file.name().to_owned(), expected });
        }
        Ok((entry_id.clone(), file.name().to_owned()))
    }

    fn commit_editor(&mut self) -> bool {
        let value = self.editor.value();
        let Some(file) = self.workspace.active_file_mut() else {
            return false;
        };
        if file.content() == value {
            return false;
        }
        file.set_content(value);
        true
    }

    fn schedule_save(&mut self) {
        if self.name_edit.is_some() {
            tracing::debug!("save skipped: name edit pending");
            return;
        }
        self.commit_editor();
        self.saves.schedule(self.workspace.tree().clone());
    }

    fn activate(&mut self, entry_id: EntryId) {
        self.selection.store(Some(&entry_id));
        self.workspace.set_active_file_id(Some(entry_id));
        self.load_active_into_editor();
    }

    fn load_active_into_editor(&mut self) {
        self.debounce.cancel();
        let Some(file) = self.workspace.active_file() else {
            self.reset_editor();
            return;
        };
        let mode = EditorMode::for_file_name(file.name());
        let content = file.content().to_owned();

        self.editor.set_value(&content);
        self.editor.set_mode(mode);
        self.apply_lint(mode);
        self.editor.refresh();
    }

    fn apply_lint(&mut self, mode: EditorMode) {
        if mode.is_lintable() {
            self.editor.perform_lint();
        } else {
            self.editor.clear_gutter();
        }
    }

    fn reset_editor(&mut self) {
        self.debounce.cancel();
        self.workspace.set_active_file_id(None);
        self.editor.set_value("");
        self.editor.set_mode(EditorMode::PlainText);
        self.editor.clear_gutter();
    }
}
