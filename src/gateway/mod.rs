// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Contracts for the remote half of the editor: persisting the tree and running code.
//!
//! The shell only ever talks to these traits. [`HttpGateway`] is the production
//! implementation; tests substitute in-memory fakes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::FileTree;

mod http;

pub use http::HttpGateway;

pub trait PersistenceGateway: Send + Sync {
    fn load(&self) -> Result<FileTree, GatewayError>;

    fn save(&self, tree: &FileTree) -> Result<(), GatewayError>;

    /// One-way transmission used on exit. Must not block the caller and reports nothing back.
    fn send_best_effort(&self, tree: &FileTree);
}

pub trait ExecutionGateway: Send + Sync {
    fn execute(&self, kind: ExecKind, code: &str) -> Result<ExecutionOutput, GatewayError>;
}

/// Languages the execution service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecKind {
    Python,
}

impl ExecKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
        }
    }
}

impl fmt::Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecKind {
    type Err = UnknownExecKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Self::Python),
            other => Err(UnknownExecKind { kind: other.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExecKind {
    pub kind: String,
}

impl fmt::Display for UnknownExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported execution kind: {:?}", self.kind)
    }
}

impl std::error::Error for UnknownExecKind {}

/// Captured output of one remote run. Either stream may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The service could not be reached at all.
    Connect { url: String, message: String },
    /// The service answered with a non-success status; `message` is its `{error}` text, if any.
    Status { url: String, status: u16, message: Option<String> },
    /// The service answered but the body was not what the contract promises.
    Decode { url: String, message: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { url, message } => write!(f, "cannot reach {url}: {message}"),
            Self::Status { url, status, message: Some(message) } => {
                write!(f, "{url} answered {status}: {message}")
            }
            Self::Status { url, status, message: None } => write!(f, "{url} answered {status}"),
            Self::Decode { url, message } => write!(f, "unexpected response from {url}: {message}"),
        }
    }
}

impl std::error::Error for GatewayError {}
