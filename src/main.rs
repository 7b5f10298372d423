// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arbor CLI entrypoint.
//!
//! `arbor serve` runs the persistence and execution service, `arbor shell` drives an editing
//! session against it, and `arbor preview` prints the inlined document for a stored markup file.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arbor::exec::{ExecPolicy, PythonRunner};
use arbor::gateway::HttpGateway;
use arbor::server::ServerState;
use arbor::shell::{Shell, ShellConfig};
use arbor::store::{
    FilesystemFile, PointerFile, WriteDurability, DEFAULT_FILESYSTEM_FILENAME,
    DEFAULT_POINTER_FILENAME,
};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} serve [--data-dir <dir>] [--host <addr>] [--port <port>] [--durable-writes] [--exec-timeout-ms <ms>] [--interpreter <cmd>]\n  {program} shell [--server <url>] [--state-dir <dir>]\n  {program} preview <path> [--data-dir <dir>]\n\nserve stores the tree in <dir>/{DEFAULT_FILESYSTEM_FILENAME} (default: current directory) and listens on 127.0.0.1:{} unless --host/--port say otherwise (port 0 = ephemeral).\nshell talks to --server (default {DEFAULT_SERVER_URL}) and remembers the active file in <state-dir>/{DEFAULT_POINTER_FILENAME}.\npreview reads the stored tree directly and prints the self-contained document for <path>.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\nLog verbosity follows RUST_LOG (default {}).",
        arbor::server::DEFAULT_PORT,
        arbor::logging::DEFAULT_FILTER,
    );
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Subcommand {
    #[default]
    Serve,
    Shell,
    Preview,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    subcommand: Subcommand,
    data_dir: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    durable_writes: bool,
    exec_timeout_ms: Option<u64>,
    interpreter: Option<String>,
    server_url: Option<String>,
    state_dir: Option<String>,
    preview_path: Option<String>,
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    let mut args = match args.next() {
        None => return Ok(options),
        Some(first) => {
            options.subcommand = match first.as_str() {
                "serve" => Subcommand::Serve,
                "shell" => Subcommand::Shell,
                "preview" => Subcommand::Preview,
                _ => return Err(()),
            };
            args
        }
    };

    while let Some(arg) = args.next() {
        match (options.subcommand, arg.as_str()) {
            (Subcommand::Serve | Subcommand::Preview, "--data-dir") => {
                set_once(&mut options.data_dir, args.next().ok_or(())?)?;
            }
            (Subcommand::Serve, "--host") => {
                set_once(&mut options.host, args.next().ok_or(())?)?;
            }
            (Subcommand::Serve, "--port") => {
                let port: u16 = args.next().ok_or(())?.parse().map_err(|_| ())?;
                set_once(&mut options.port, port)?;
            }
            (Subcommand::Serve, "--durable-writes") => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            (Subcommand::Serve, "--exec-timeout-ms") => {
                let ms: u64 = args.next().ok_or(())?.parse().map_err(|_| ())?;
                if ms == 0 {
                    return Err(());
                }
                set_once(&mut options.exec_timeout_ms, ms)?;
            }
            (Subcommand::Serve, "--interpreter") => {
                set_once(&mut options.interpreter, args.next().ok_or(())?)?;
            }
            (Subcommand::Shell, "--server") => {
                set_once(&mut options.server_url, args.next().ok_or(())?)?;
            }
            (Subcommand::Shell, "--state-dir") => {
                set_once(&mut options.state_dir, args.next().ok_or(())?)?;
            }
            (_, flag) if flag.starts_with('-') => return Err(()),
            (Subcommand::Preview, _) => set_once(&mut options.preview_path, arg)?,
            _ => return Err(()),
        }
    }

    if options.subcommand == Subcommand::Preview && options.preview_path.is_none() {
        return Err(());
    }

    Ok(options)
}

fn filesystem_file(options: &CliOptions) -> FilesystemFile {
    let dir = PathBuf::from(options.data_dir.as_deref().unwrap_or("."));
    let file = FilesystemFile::new(dir.join(DEFAULT_FILESYSTEM_FILENAME));
    if options.durable_writes {
        file.with_durability(WriteDurability::Durable)
    } else {
        file
    }
}

fn run_serve(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let mut policy = ExecPolicy::default();
    if let Some(ms) = options.exec_timeout_ms {
        policy.timeout = Duration::from_millis(ms);
    }
    if let Some(interpreter) = &options.interpreter {
        policy.interpreter = interpreter.clone();
    }
    let state = ServerState::new(filesystem_file(options), PythonRunner::new(policy));
    let router = arbor::server::router(state);

    let host = options.host.clone().unwrap_or_else(|| "127.0.0.1".to_owned());
    let port = options.port.unwrap_or(arbor::server::DEFAULT_PORT);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
        arbor::server::serve(listener, router, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
    })?;
    Ok(())
}

fn run_shell(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let url = options.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL);
    let gateway = Arc::new(HttpGateway::new(url)?);
    let state_dir = PathBuf::from(options.state_dir.as_deref().unwrap_or("."));
    let pointer = PointerFile::new(state_dir.join(DEFAULT_POINTER_FILENAME));

    let mut shell = Shell::new(
        arbor::cli::BufferEditor::default(),
        pointer,
        gateway.clone(),
        gateway,
        ShellConfig::default(),
    )?;
    shell.start();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    arbor::cli::run_session(&mut shell, stdin.lock(), &mut stdout)?;
    // Give the exit transmission a moment before the process goes away.
    std::thread::sleep(Duration::from_millis(200));
    Ok(())
}

fn run_preview(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let raw = options.preview_path.as_deref().unwrap_or_default();
    let tree = filesystem_file(options).load()?;
    let entry_id = arbor::cli::lookup(&tree, raw)?;
    let document = arbor::inline::inline_assets(&tree, &entry_id)?;
    for asset in &document.unresolved {
        eprintln!("arbor: could not find {}: {}", asset.kind.label(), asset.reference);
    }
    println!("{}", document.html);
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "arbor".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        arbor::logging::init();
        match options.subcommand {
            Subcommand::Serve => run_serve(&options),
            Subcommand::Shell => run_shell(&options),
            Subcommand::Preview => run_preview(&options),
        }
    })();

    if let Err(err) = result {
        eprintln!("arbor: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions, Subcommand};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_empty_args_as_serve() {
        let options = parse(&[]).expect("parse options");
        assert_eq!(options, CliOptions::default());
        assert_eq!(options.subcommand, Subcommand::Serve);
    }

    #[test]
    fn parses_serve_flags() {
        let options = parse(&[
            "serve",
            "--data-dir",
            "data",
            "--port",
            "0",
            "--host",
            "0.0.0.0",
            "--durable-writes",
            "--exec-timeout-ms",
            "250",
            "--interpreter",
            "python3.12",
        ])
        .expect("parse options");
        assert_eq!(options.data_dir.as_deref(), Some("data"));
        assert_eq!(options.port, Some(0));
        assert_eq!(options.host.as_deref(), Some("0.0.0.0"));
        assert!(options.durable_writes);
        assert_eq!(options.exec_timeout_ms, Some(250));
        assert_eq!(options.interpreter.as_deref(), Some("python3.12"));
    }

    #[test]
    fn parses_shell_flags() {
        let options = parse(&["shell", "--server", "http://h:1", "--state-dir", "st"])
            .expect("parse options");
        assert_eq!(options.subcommand, Subcommand::Shell);
        assert_eq!(options.server_url.as_deref(), Some("http://h:1"));
        assert_eq!(options.state_dir.as_deref(), Some("st"));
    }

    #[test]
    fn parses_preview_path_in_any_position() {
        let options = parse(&["preview", "--data-dir", "d", "site/index.html"]).expect("parse");
        assert_eq!(options.preview_path.as_deref(), Some("site/index.html"));
        assert_eq!(options.data_dir.as_deref(), Some("d"));

        let options = parse(&["preview", "site/index.html", "--data-dir", "d"]).expect("parse");
        assert_eq!(options.preview_path.as_deref(), Some("site/index.html"));
    }

    #[test]
    fn rejects_preview_without_path() {
        parse(&["preview"]).unwrap_err();
        parse(&["preview", "a.html", "b.html"]).unwrap_err();
    }

    #[test]
    fn rejects_flags_of_other_subcommands() {
        parse(&["shell", "--port", "1"]).unwrap_err();
        parse(&["serve", "--server", "http://h"]).unwrap_err();
        parse(&["preview", "a.html", "--durable-writes"]).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_args() {
        parse(&["--nope"]).unwrap_err();
        parse(&["bogus"]).unwrap_err();
        parse(&["serve", "extra"]).unwrap_err();
        parse(&["serve", "--port", "1", "--port", "2"]).unwrap_err();
        parse(&["serve", "--durable-writes", "--durable-writes"]).unwrap_err();
        parse(&["serve", "--port", "nope"]).unwrap_err();
        parse(&["serve", "--port"]).unwrap_err();
        parse(&["serve", "--exec-timeout-ms", "0"]).unwrap_err();
    }
}
