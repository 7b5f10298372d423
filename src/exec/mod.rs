// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Service-side code execution: an import screen, a temp file and a time-limited interpreter
//! subprocess.
//!
//! This is not a sandbox. The screen only rejects obvious imports of GUI toolkits and
//! process/network/system modules; the interpreter runs in isolated mode (`-I`) with the
//! privileges of the service.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tree_sitter::{Node, Parser};

use crate::gateway::ExecutionOutput;

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_FORBIDDEN_MODULES: &[&str] = &[
    "pygame",
    "tkinter",
    "kivy",
    "turtle",
    "PyQt5",
    "PySide2",
    "PyQt6",
    "PySide6",
    "wx",
    "arcade",
    "pyglet",
    "os",
    "subprocess",
    "shutil",
    "sys",
    "_thread",
    "threading",
    "multiprocessing",
    "socket",
    "requests",
    "urllib",
    "ctypes",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecPolicy {
    pub interpreter: String,
    pub timeout: Duration,
    pub forbidden_modules: BTreeSet<String>,
}

impl Default for ExecPolicy {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_owned(),
            timeout: DEFAULT_EXEC_TIMEOUT,
            forbidden_modules: DEFAULT_FORBIDDEN_MODULES.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

#[derive(Debug)]
pub enum ExecError {
    TempFile { path: PathBuf, source: io::Error },
    Spawn { interpreter: String, source: io::Error },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TempFile { path, source } => {
                write!(f, "cannot write script to {path:?}: {source}")
            }
            Self::Spawn { interpreter, source } => {
                write!(f, "cannot run interpreter {interpreter:?}: {source}")
            }
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TempFile { source, .. } | Self::Spawn { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PythonRunner {
    policy: ExecPolicy,
}

impl PythonRunner {
    pub fn new(policy: ExecPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExecPolicy {
        &self.policy
    }

    /// Runs `code` and captures both streams.
    ///
    /// A screened import or an exceeded time limit is still a successful run: the explanation
    /// lands in `stderr`. Only failures to start the interpreter at all are errors.
    pub async fn run(&self, code: &str) -> Result<ExecutionOutput, ExecError> {
        if let Some(module) = find_forbidden_import(code, &self.policy.forbidden_modules) {
            tracing::info!(module = %module, "execution refused by import screen");
            return Ok(ExecutionOutput {
                stdout: String::new(),
                stderr: format!(
                    "Security error: forbidden import '{module}' detected. Execution aborted."
                ),
            });
        }

        let script = TempScript::write(code).await?;
        let child = Command::new(&self.policy.interpreter)
            .arg("-u")
            .arg("-I")
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                interpreter: self.policy.interpreter.clone(),
                source,
            })?;

        // Dropping the pending future on timeout drops the child, which kills it.
        match tokio::time::timeout(self.policy.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                tracing::debug!(status = %output.status, "execution finished");
                Ok(ExecutionOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Ok(Err(source)) => {
                Err(ExecError::Spawn { interpreter: self.policy.interpreter.clone(), source })
            }
            Err(_) => {
                let limit = describe_limit(self.policy.timeout);
                tracing::info!(limit = %limit, "execution timed out");
                Ok(ExecutionOutput {
                    stdout: String::new(),
                    stderr: format!("Error: the code ran longer than {limit} and was stopped."),
                })
            }
        }
    }
}

fn describe_limit(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

/// Returns the first forbidden module named by an `import` or `from … import` statement,
/// wherever it sits: nested in a block, a function body or behind a `;`.
///
/// Dotted names are screened by their top-level package, so `import os.path` is caught too.
/// Relative imports never name a top-level package and pass. Code the grammar cannot fully
/// parse is additionally screened statement by statement.
pub fn find_forbidden_import(code: &str, forbidden: &BTreeSet<String>) -> Option<String> {
    let is_forbidden = |name: &str| {
        let top = name.split('.').next().unwrap_or(name);
        forbidden.contains(top)
    };

    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(tree_sitter_python::language()) {
        tracing::error!(error = %err, "python grammar unavailable, screening line by line");
        return screen_lines(code, &is_forbidden);
    }
    let Some(syntax) = parser.parse(code, None) else {
        return screen_lines(code, &is_forbidden);
    };
    let source = code.as_bytes();

    let mut cursor = syntax.walk();
    let mut stack = vec![syntax.root_node()];
    while let Some(node) = stack.pop() {
        let modules: Vec<Node> = match node.kind() {
            "import_statement" => node
                .children_by_field_name("name", &mut cursor)
                .filter_map(imported_module)
                .collect(),
            "import_from_statement" => node
                .child_by_field_name("module_name")
                .filter(|module| module.kind() == "dotted_name")
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        for module in modules {
            let Ok(name) = module.utf8_text(source) else {
                continue;
            };
            if is_forbidden(name) {
                return Some(name.to_owned());
            }
        }

        // Reverse so the first statement in the source is screened first.
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    if syntax.root_node().has_error() {
        return screen_lines(code, &is_forbidden);
    }
    None
}

fn screen_lines(code: &str, is_forbidden: &impl Fn(&str) -> bool) -> Option<String> {
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    static FROM: OnceLock<Regex> = OnceLock::new();
    let import = IMPORT.get_or_init(|| Regex::new(r"^import\s+(.+)$").expect("static regex"));
    let from = FROM.get_or_init(|| {
        Regex::new(r"^from\s+([A-Za-z_][\w.]*)\s+import\b").expect("static regex")
    });

    for statement in code.lines().flat_map(|line| line.split(';')) {
        let statement = statement.split('#').next().unwrap_or("").trim();

        if let Some(captures) = from.captures(statement) {
            let module = &captures[1];
            if is_forbidden(module) {
                return Some(module.to_owned());
            }
            continue;
        }

        if let Some(captures) = import.captures(statement) {
            for alias in captures[1].split(',') {
                let name = alias.split_whitespace().next().unwrap_or("");
                if !name.is_empty() && is_forbidden(name) {
                    return Some(name.to_owned());
                }
            }
        }
    }

    None
}

/// `import a.b` names `a.b`, `import a.b as c` names it through the alias node.
fn imported_module(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "dotted_name" => Some(node),
        "aliased_import" => node.child_by_field_name("name"),
        _ => None,
    }
}

/// A uniquely named script file removed again on drop.
struct TempScript {
    path: PathBuf,
}

impl TempScript {
    async fn write(code: &str) -> Result<Self, ExecError> {
        let path = std::env::temp_dir().join(format!("arbor-exec-{}.py", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, code)
            .await
            .map_err(|source| ExecError::TempFile { path: path.clone(), source })?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = ?self.path, error = %err, "cannot remove temp script");
            }
        }
    }
}
