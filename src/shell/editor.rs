// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::mode::EditorMode;
use crate::model::EntryId;
use crate::store::PointerFile;

/// The text-editing widget the shell drives.
pub trait EditorWidget {
    fn value(&self) -> String;

    fn set_value(&mut self, value: &str);

    fn mode(&self) -> EditorMode;

    fn set_mode(&mut self, mode: EditorMode);

    fn perform_lint(&mut self);

    /// Clears the lint-marker gutter.
    fn clear_gutter(&mut self);

    fn refresh(&mut self);
}

/// Where the "last active file" pointer survives between sessions.
pub trait SelectionStore {
    fn load(&self) -> Option<EntryId>;

    fn store(&mut self, id: Option<&EntryId>);
}

impl SelectionStore for PointerFile {
    fn load(&self) -> Option<EntryId> {
        match PointerFile::load(self) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(error = %err, "cannot read active file pointer");
                None
            }
        }
    }

    fn store(&mut self, id: Option<&EntryId>) {
        if let Err(err) = PointerFile::store(self, id) {
            tracing::warn!(error = %err, "cannot write active file pointer");
        }
    }
}
