// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// Severity of a user-visible console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One line of the editor's output panel. Separate from `tracing`, which is for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub text: String,
}

impl ConsoleLine {
    pub fn new(level: ConsoleLevel, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }

    pub fn log(text: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Log, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Info, text)
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Warn, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ConsoleLevel::Error, text)
    }
}

impl fmt::Display for ConsoleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.text)
    }
}
