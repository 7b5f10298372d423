// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Operator logging via `tracing`.
//!
//! Output goes to stderr so stdout stays free for documents printed by `arbor preview`. The
//! filter comes from `RUST_LOG` and falls back to [`DEFAULT_FILTER`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "arbor=info";

/// Installs the global subscriber and a panic hook that logs before the default hook runs.
///
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init().is_err() {
        return;
    }

    install_panic_hook();
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line()));
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_owned()
        };
        tracing::error!(location = location.as_deref().unwrap_or("unknown"), %message, "panic");
        default_hook(info);
    }));
}
