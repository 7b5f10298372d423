// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::{Arc, Mutex};

use rstest::rstest;

use super::{lookup, parse_command, run_session, split_parent, BufferEditor, Command};
use crate::gateway::{
    ExecKind, ExecutionGateway, ExecutionOutput, GatewayError, PersistenceGateway,
};
use crate::model::fixtures::{id, sample_tree};
use crate::model::{Entry, EntryId, EntryKind, FileTree};
use crate::shell::{SelectionStore, Shell, ShellConfig};

#[derive(Debug, Default)]
struct Memory {
    tree: Mutex<FileTree>,
    exit_saves: Mutex<Vec<FileTree>>,
}

impl PersistenceGateway for Memory {
    fn load(&self) -> Result<FileTree, GatewayError> {
        Ok(self.tree.lock().unwrap().clone())
    }

    fn save(&self, tree: &FileTree) -> Result<(), GatewayError> {
        *self.tree.lock().unwrap() = tree.clone();
        Ok(())
    }

    fn send_best_effort(&self, tree: &FileTree) {
        self.exit_saves.lock().unwrap().push(tree.clone());
    }
}

struct Echo;

impl ExecutionGateway for Echo {
    fn execute(&self, _kind: ExecKind, code: &str) -> Result<ExecutionOutput, GatewayError> {
        Ok(ExecutionOutput { stdout: format!("ran {} bytes", code.len()), stderr: String::new() })
    }
}

#[derive(Debug, Default)]
struct NoSelection;

impl SelectionStore for NoSelection {
    fn load(&self) -> Option<EntryId> {
        None
    }

    fn store(&mut self, _id: Option<&EntryId>) {}
}

fn session(tree: FileTree, script: &str) -> (String, Arc<Memory>) {
    let memory = Arc::new(Memory { tree: Mutex::new(tree), ..Memory::default() });
    let mut shell = Shell::new(
        BufferEditor::default(),
        NoSelection,
        memory.clone(),
        Arc::new(Echo),
        ShellConfig::default(),
    )
    .expect("shell");
    shell.start();

    let mut out = Vec::new();
    run_session(&mut shell, script.as_bytes(), &mut out).expect("session");
    shell.flush_saves();
    (String::from_utf8(out).expect("utf8"), memory)
}

#[rstest]
#[case("ls", Command::List)]
#[case("  open site/index.html", Command::Open("site/index.html".to_owned()))]
#[case(
    "touch site/a.css",
    Command::Create { kind: EntryKind::File, path: "site/a.css".to_owned() }
)]
#[case("mkdir lib", Command::Create { kind: EntryKind::Folder, path: "lib".to_owned() })]
#[case(
    "rename notes.txt my notes.txt",
    Command::Rename { path: "notes.txt".to_owned(), name: "my notes.txt".to_owned() }
)]
#[case(
    "mv notes.txt site",
    Command::Move { path: "notes.txt".to_owned(), target: "site".to_owned() }
)]
#[case("write a\\nb  c", Command::Write("a\nb  c".to_owned()))]
#[case("append \\tx\\\\", Command::Append("\tx\\".to_owned()))]
#[case("preview out.html", Command::Preview { out: Some("out.html".to_owned()) })]
#[case("exit", Command::Quit)]
fn parses_commands(#[case] line: &str, #[case] expected: Command) {
    assert_eq!(parse_command(line).expect("parse"), Some(expected));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("# a comment")]
fn skips_blank_lines_and_comments(#[case] line: &str) {
    assert_eq!(parse_command(line).expect("parse"), None);
}

#[rstest]
#[case("frobnicate", "unknown command")]
#[case("open", "wrong arguments")]
#[case("rename notes.txt", "wrong arguments")]
#[case("mv a", "wrong arguments")]
#[case("ls -la", "wrong arguments")]
fn rejects_bad_commands(#[case] line: &str, #[case] expected: &str) {
    let err = parse_command(line).unwrap_err();
    assert!(err.to_string().contains(expected), "{err}");
}

#[test]
fn lookup_and_split_parent_walk_the_tree() {
    let tree = sample_tree();
    assert_eq!(lookup(&tree, "site/js/app.js").expect("lookup"), id("app-js"));
    assert_eq!(lookup(&tree, "site/css/").expect("lookup"), id("f:css"));
    lookup(&tree, "site/nope").unwrap_err();
    lookup(&tree, "").unwrap_err();

    assert_eq!(
        split_parent(&tree, "site/css/theme.css").expect("split"),
        (Some(id("f:css")), "theme.css".to_owned())
    );
    assert_eq!(split_parent(&tree, "top.txt").expect("split"), (None, "top.txt".to_owned()));
    split_parent(&tree, "notes.txt/inner.txt").unwrap_err();
    split_parent(&tree, "missing/inner.txt").unwrap_err();
    split_parent(&tree, "/").unwrap_err();
}

#[test]
fn session_creates_edits_and_lists() {
    let script = "touch lib\nmkdir src\ntouch src/main.py\nwrite print('hi')\\n\nrun\nls\ncat\n";
    let (out, memory) = session(FileTree::new(), script);

    assert!(out.contains("[info] --- Output of main.py ---"), "{out}");
    assert!(out.contains("[log] ran 12 bytes"), "{out}");
    assert!(out.contains("- src/\n  * main.py\n  lib"), "{out}");
    assert!(out.ends_with("print('hi')\n\n"), "{out}");

    let exit = memory.exit_saves.lock().unwrap().clone();
    assert_eq!(exit.len(), 1);
    let src = exit[0].roots().iter().find(|entry| entry.name() == "src").expect("src");
    let file = src.children()[0].as_file().expect("file");
    assert_eq!(file.content(), "print('hi')\n");
}

#[test]
fn session_asks_before_deleting() {
    let script = "rm site\nn\nrm notes.txt\ny\nls\nquit\nls\n";
    let (out, memory) = session(sample_tree(), script);

    assert!(out.contains("Delete 'site' and all of its contents? [y/N] kept"), "{out}");
    assert!(out.contains("Delete 'notes.txt'? [y/N] "), "{out}");
    // Nothing after `quit` runs.
    assert_eq!(out.matches("+ site/").count(), 1, "{out}");

    let exit = memory.exit_saves.lock().unwrap().clone();
    let saved = exit.last().expect("exit save");
    assert!(saved.find_by_id(&id("f:site")).is_some_and(Entry::is_folder));
    assert!(!saved.contains_id(&id("notes")));
}

#[test]
fn session_reports_errors_and_keeps_going() {
    let script = "open nowhere\nbogus\nmv site site/css\nsave\n";
    let (out, _memory) = session(sample_tree(), script);

    assert!(out.contains("error: no such entry: nowhere"), "{out}");
    assert!(out.contains("error: unknown command `bogus`"), "{out}");
    assert!(out.contains("[error] Move failed"), "{out}");
    assert!(out.contains("[info] Saved."), "{out}");
}
