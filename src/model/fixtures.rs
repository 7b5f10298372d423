// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Small hand-built trees shared by unit tests across modules.

use super::{Entry, EntryId, FileEntry, FileTree, FolderEntry};

pub(crate) fn id(raw: &str) -> EntryId {
    EntryId::new(raw).expect("fixture id")
}

pub(crate) fn file(raw_id: &str, name: &str, content: &str) -> Entry {
    FileEntry::new(id(raw_id), name).with_content(content).into()
}

pub(crate) fn folder(raw_id: &str, name: &str, children: Vec<Entry>) -> Entry {
    FolderEntry::new(id(raw_id), name).with_children(children).into()
}

/// ```text
/// site/            (f:site)
///   index.html     (index)
///   css/           (f:css)
///     main.css     (main-css)
///   js/            (f:js)
///     app.js       (app-js)
/// shared.css       (shared-css)
/// notes.txt        (notes)
/// ```
pub(crate) fn sample_tree() -> FileTree {
    FileTree::from(vec![
        folder(
            "f:site",
            "site",
            vec![
                file(
                    "index",
                    "index.html",
                    "<html><head><link rel=\"stylesheet\" href=\"css/main.css\"></head></html>",
                ),
                folder("f:css", "css", vec![file("main-css", "main.css", "body { margin: 0; }")]),
                folder("f:js", "js", vec![file("app-js", "app.js", "console.log('hi');")]),
            ],
        ),
        file("shared-css", "shared.css", "h1 { color: red; }"),
        file("notes", "notes.txt", "todo"),
    ])
}
