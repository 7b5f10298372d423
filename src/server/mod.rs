// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The companion HTTP service: tree persistence and remote execution.
//!
//! Routes:
//! - `GET /filesystem`: the stored tree as a JSON array (`[]` when nothing is stored yet)
//! - `POST /filesystem`: replace the stored tree, answers `{"success": true}`
//! - `POST /execute/{kind}`: run `{code}`, answers `{stdout, stderr}`
//!
//! Every failure answers with a JSON `{"error": …}` body.

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::exec::PythonRunner;
use crate::gateway::{ExecKind, ExecutionOutput};
use crate::model::{Entry, FileTree};
use crate::store::FilesystemFile;

pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug)]
pub struct ServerState {
    // Serializes concurrent saves; loads take it too so they never observe a half-finished
    // save sequence.
    filesystem: Mutex<FilesystemFile>,
    runner: PythonRunner,
}

impl ServerState {
    pub fn new(filesystem: FilesystemFile, runner: PythonRunner) -> Self {
        Self { filesystem: Mutex::new(filesystem), runner }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/filesystem", get(load_filesystem).post(save_filesystem))
        .route("/execute/{kind}", post(execute))
        .with_state(Arc::new(state))
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "serving");
    }
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn load_filesystem(State(state): State<Arc<ServerState>>) -> Response {
    let filesystem = state.filesystem.lock().await;
    match filesystem.load() {
        Ok(tree) => {
            tracing::debug!(entries = tree.entry_count(), "filesystem loaded");
            Json(tree).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "cannot load filesystem");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Cannot read stored file system: {err}"),
            )
        }
    }
}

async fn save_filesystem(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Request body must be JSON");
    };
    if !value.is_array() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid data format: expected a list");
    }
    let tree = match serde_json::from_value::<Vec<Entry>>(value)
        .map_err(|err| err.to_string())
        .and_then(|entries| FileTree::from_entries(entries).map_err(|err| err.to_string()))
    {
        Ok(tree) => tree,
        Err(message) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid tree: {message}"));
        }
    };

    let filesystem = state.filesystem.lock().await;
    match filesystem.save(&tree) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "cannot save filesystem");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Cannot save file system: {err}"),
            )
        }
    }
}

async fn execute(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Response {
    let kind = match kind.parse::<ExecKind>() {
        Ok(kind) => kind,
        Err(err) => return error_response(StatusCode::NOT_FOUND, err.to_string()),
    };
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Request body must be JSON");
    };
    let code = match value.get("code") {
        None | Some(Value::Null) => {
            return error_response(StatusCode::BAD_REQUEST, "Missing 'code' in request body");
        }
        Some(Value::String(code)) => code,
        Some(_) => return error_response(StatusCode::BAD_REQUEST, "'code' must be a string"),
    };

    let output = match kind {
        ExecKind::Python => state.runner.run(code).await,
    };
    match output {
        Ok(output) => Json(output).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "execution failed");
            Json(ExecutionOutput {
                stdout: String::new(),
                stderr: format!("Execution failed on server: {err}"),
            })
            .into_response()
        }
    }
}
