// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arbor: a virtual file-tree code editor shell.
//!
//! The tree lives in memory ([`model`]), is mutated through [`ops`], persisted by a small
//! HTTP service ([`server`]) and reached from the editing side through [`gateway`]. [`shell`]
//! ties the gestures together; [`inline`] builds self-contained previews of markup files.

pub mod cli;
pub mod exec;
pub mod gateway;
pub mod inline;
pub mod logging;
pub mod mode;
pub mod model;
pub mod ops;
pub mod path;
pub mod server;
pub mod shell;
pub mod store;
pub mod view;
