// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-oriented front end for [`Shell`].
//!
//! Each input line is one gesture. Entries are addressed by slash-separated paths from the
//! root (`site/css/main.css`); the editor is a plain text buffer edited with `write`/`append`.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::mode::EditorMode;
use crate::model::{EntryId, EntryKind, FileTree};
use crate::path;
use crate::shell::{EditorWidget, SelectionStore, Shell, ShellError};

/// Text buffer standing in for a code-editor widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEditor {
    value: String,
    mode: EditorMode,
    lint_runs: usize,
}

impl Default for BufferEditor {
    fn default() -> Self {
        Self { value: String::new(), mode: EditorMode::PlainText, lint_runs: 0 }
    }
}

impl BufferEditor {
    pub fn lint_runs(&self) -> usize {
        self.lint_runs
    }
}

impl EditorWidget for BufferEditor {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value.clear();
        self.value.push_str(value);
    }

    fn mode(&self) -> EditorMode {
        self.mode
    }

    fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    fn perform_lint(&mut self) {
        self.lint_runs += 1;
    }

    fn clear_gutter(&mut self) {}

    fn refresh(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(String),
    Toggle(String),
    Create { kind: EntryKind, path: String },
    Rename { path: String, name: String },
    Remove(String),
    Move { path: String, target: String },
    Show,
    Write(String),
    Append(String),
    Save,
    Run,
    Preview { out: Option<String> },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<ShellError> for CommandError {
    fn from(err: ShellError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

pub const HELP: &str = "\
commands:
  ls                      show the tree (* marks the active file)
  open <path>             make a file the active file
  toggle <path>           open or close a folder
  touch <path>            create a file (parent folder must exist)
  mkdir <path>            create a folder
  rename <path> <name>    rename an entry
  rm <path>               delete an entry (asks for confirmation)
  mv <path> <folder>      move an entry into a folder
  cat                     print the editor buffer
  write <text>            replace the editor buffer (\\n for newlines)
  append <text>           append to the editor buffer
  save                    save now
  run                     run the active .py file on the server
  preview [<out-file>]    inline assets of the active .html file
  quit                    save and leave";

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (trimmed, ""),
    };
    let args = rest.split_whitespace().collect::<Vec<_>>();

    let command = match (verb, args.as_slice()) {
        ("ls", []) => Command::List,
        ("open", [path]) => Command::Open((*path).to_owned()),
        ("toggle", [path]) => Command::Toggle((*path).to_owned()),
        ("touch", [path]) => Command::Create { kind: EntryKind::File, path: (*path).to_owned() },
        ("mkdir", [path]) => Command::Create { kind: EntryKind::Folder, path: (*path).to_owned() },
        ("rename", [path, ..]) if args.len() >= 2 => {
            let name = rest.trim_start()[path.len()..].trim();
            Command::Rename { path: (*path).to_owned(), name: name.to_owned() }
        }
        ("rm", [path]) => Command::Remove((*path).to_owned()),
        ("mv", [path, target]) => {
            Command::Move { path: (*path).to_owned(), target: (*target).to_owned() }
        }
        ("cat", []) => Command::Show,
        // Keep the text verbatim apart from the single separating space.
        ("write", _) => Command::Write(unescape(rest)),
        ("append", _) => Command::Append(unescape(rest)),
        ("save", []) => Command::Save,
        ("run", []) => Command::Run,
        ("preview", []) => Command::Preview { out: None },
        ("preview", [out]) => Command::Preview { out: Some((*out).to_owned()) },
        ("help", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        ("ls" | "open" | "toggle" | "touch" | "mkdir" | "rename" | "rm" | "mv" | "cat", _)
        | ("save" | "run" | "preview" | "quit" | "exit", _) => {
            return Err(CommandError::new(format!("wrong arguments for `{verb}` (try `help`)")));
        }
        _ => return Err(CommandError::new(format!("unknown command `{verb}` (try `help`)"))),
    };
    Ok(Some(command))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Resolves a root-relative path to the id of the entry it names.
pub fn lookup(tree: &FileTree, raw: &str) -> Result<EntryId, CommandError> {
    path::resolve(tree, raw, &[])
        .and_then(|mut ids| ids.pop())
        .ok_or_else(|| CommandError::new(format!("no such entry: {raw}")))
}

/// Splits `a/b/name` into the parent folder id (`None` for the root) and `name`.
pub fn split_parent(tree: &FileTree, raw: &str) -> Result<(Option<EntryId>, String), CommandError> {
    let trimmed = raw.trim_matches('/');
    let (parent, name) = match trimmed.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, trimmed),
    };
    if name.is_empty() {
        return Err(CommandError::new("a name is required"));
    }
    let parent_id = match parent {
        Some(parent) => {
            let id = lookup(tree, parent)?;
            if !tree.find_by_id(&id).is_some_and(|entry| entry.is_folder()) {
                return Err(CommandError::new(format!("not a folder: {parent}")));
            }
            Some(id)
        }
        None => None,
    };
    Ok((parent_id, name.to_owned()))
}

/// Drives `shell` from `input` until `quit` or end of input, then runs the exit path.
pub fn run_session<S: SelectionStore>(
    shell: &mut Shell<BufferEditor, S>,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut lines = input.lines();
    print_console(shell, out)?;

    while let Some(line) = lines.next() {
        let line = line?;
        shell.tick(Instant::now());

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        let mut confirm = |prompt: &str| -> bool {
            let _ = write!(out, "{prompt} [y/N] ");
            let _ = out.flush();
            matches!(lines.next(), Some(Ok(answer)) if answer.trim().eq_ignore_ascii_case("y"))
        };
        let result = execute(shell, command, &mut confirm);
        match result {
            Ok(text) => {
                if !text.is_empty() {
                    writeln!(out, "{text}")?;
                }
            }
            Err(err) => writeln!(out, "error: {err}")?,
        }
        print_console(shell, out)?;
    }

    shell.shutdown();
    print_console(shell, out)?;
    Ok(())
}

fn execute<S: SelectionStore>(
    shell: &mut Shell<BufferEditor, S>,
    command: Command,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CommandError> {
    match command {
        Command::List => Ok(render_rows(shell)),
        Command::Open(raw) => {
            let id = lookup(shell.tree(), &raw)?;
            shell.open_file(&id)?;
            Ok(String::new())
        }
        Command::Toggle(raw) => {
            let id = lookup(shell.tree(), &raw)?;
            let open = shell.toggle_folder(&id)?;
            Ok(format!("{raw}: {}", if open { "open" } else { "closed" }))
        }
        Command::Create { kind, path: raw } => {
            let (parent_id, name) = split_parent(shell.tree(), &raw)?;
            shell.start_create(kind, parent_id.as_ref())?;
            shell.commit_name_edit(&name)?;
            Ok(String::new())
        }
        Command::Rename { path: raw, name } => {
            let id = lookup(shell.tree(), &raw)?;
            shell.start_rename(&id)?;
            match shell.commit_name_edit(&name)? {
                Some(result) if !result.changed => Ok("name unchanged".to_owned()),
                _ => Ok(String::new()),
            }
        }
        Command::Remove(raw) => {
            let id = lookup(shell.tree(), &raw)?;
            let deleted = shell.delete(&id, |prompt| confirm(prompt))?;
            Ok(if deleted { String::new() } else { "kept".to_owned() })
        }
        Command::Move { path: raw, target } => {
            let id = lookup(shell.tree(), &raw)?;
            let target_id = lookup(shell.tree(), &target)?;
            shell.move_entry(&id, &target_id)?;
            Ok(String::new())
        }
        Command::Show => match shell.active_file_id() {
            Some(_) => Ok(shell.editor().value()),
            None => Err(ShellError::NoActiveFile.into()),
        },
        Command::Write(text) => {
            require_active(shell)?;
            shell.editor_mut().set_value(&text);
            shell.editor_changed(Instant::now());
            Ok(String::new())
        }
        Command::Append(text) => {
            require_active(shell)?;
            let mut value = shell.editor().value();
            value.push_str(&text);
            shell.editor_mut().set_value(&value);
            shell.editor_changed(Instant::now());
            Ok(String::new())
        }
        Command::Save => {
            shell.save_now()?;
            Ok(String::new())
        }
        Command::Run => {
            if let Some(handle) = shell.run_remote()? {
                if handle.join().is_err() {
                    return Err(CommandError::new("run thread panicked"));
                }
            }
            Ok(String::new())
        }
        Command::Preview { out } => {
            let document = shell.run_preview()?;
            match out {
                Some(out) => {
                    std::fs::write(&out, document.html)?;
                    Ok(format!("wrote {out}"))
                }
                None => Ok(document.html),
            }
        }
        Command::Help => Ok(HELP.to_owned()),
        Command::Quit => Ok(String::new()),
    }
}

fn require_active<S: SelectionStore>(shell: &Shell<BufferEditor, S>) -> Result<(), CommandError> {
    match shell.active_file_id() {
        Some(_) => Ok(()),
        None => Err(ShellError::NoActiveFile.into()),
    }
}

fn render_rows<S: SelectionStore>(shell: &Shell<BufferEditor, S>) -> String {
    let rows = shell.rows();
    if rows.is_empty() {
        return "(empty)".to_owned();
    }
    let mut text = String::new();
    for row in rows {
        let marker = match (row.kind, row.is_open, row.is_active) {
            (EntryKind::Folder, true, _) => "-",
            (EntryKind::Folder, false, _) => "+",
            (EntryKind::File, _, true) => "*",
            (EntryKind::File, _, false) => " ",
        };
        let suffix = if row.kind == EntryKind::Folder { "/" } else { "" };
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!("{}{marker} {}{suffix}", "  ".repeat(row.depth), row.name));
    }
    text
}

fn print_console<S: SelectionStore>(
    shell: &Shell<BufferEditor, S>,
    out: &mut impl Write,
) -> io::Result<()> {
    for line in shell.drain_console() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
