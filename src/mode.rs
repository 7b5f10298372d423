// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! File-name based classification: editor mode, tree icon and which run path applies.

/// Display mode handed to the editor widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    Markup,
    Stylesheet,
    Script { json: bool },
    GenericMarkup,
    Python,
    PlainText,
}

impl EditorMode {
    pub fn for_file_name(name: &str) -> Self {
        match extension(name).as_str() {
            "html" | "htm" => Self::Markup,
            "css" => Self::Stylesheet,
            "js" => Self::Script { json: false },
            "json" => Self::Script { json: true },
            "xml" => Self::GenericMarkup,
            "py" => Self::Python,
            _ => Self::PlainText,
        }
    }

    /// Mode name understood by the widget.
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Markup => "htmlmixed",
            Self::Stylesheet => "css",
            Self::Script { json: false } => "javascript",
            Self::Script { json: true } => "application/json",
            Self::GenericMarkup => "xml",
            Self::Python => "python",
            Self::PlainText => "text/plain",
        }
    }

    /// Script modes get linted; everything else has its lint gutter cleared.
    pub fn is_lintable(self) -> bool {
        matches!(self, Self::Script { .. })
    }
}

/// Icon class shown next to a file in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileIcon {
    Html,
    Css,
    Js,
    Json,
    Python,
    Text,
    Generic,
}

impl FileIcon {
    pub fn for_file_name(name: &str) -> Self {
        match extension(name).as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" => Self::Js,
            "json" => Self::Json,
            "py" => Self::Python,
            "txt" => Self::Text,
            _ => Self::Generic,
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Html => "icon-html",
            Self::Css => "icon-css",
            Self::Js => "icon-js",
            Self::Json => "icon-json",
            Self::Python => "icon-py",
            Self::Text => "icon-txt",
            Self::Generic => "",
        }
    }
}

/// Files the local preview can run.
pub fn is_markup_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

/// Files the remote execution gateway can run.
pub fn is_python_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".py")
}

// Text after the last dot; a name without a dot is its own "extension".
fn extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{is_markup_entry, is_python_entry, EditorMode, FileIcon};

    #[rstest]
    #[case("index.html", EditorMode::Markup)]
    #[case("INDEX.HTM", EditorMode::Markup)]
    #[case("site.css", EditorMode::Stylesheet)]
    #[case("app.js", EditorMode::Script { json: false })]
    #[case("data.json", EditorMode::Script { json: true })]
    #[case("feed.xml", EditorMode::GenericMarkup)]
    #[case("main.py", EditorMode::Python)]
    #[case("notes.txt", EditorMode::PlainText)]
    #[case("Makefile", EditorMode::PlainText)]
    #[case("archive.tar.gz", EditorMode::PlainText)]
    #[case("", EditorMode::PlainText)]
    fn mode_follows_extension(#[case] name: &str, #[case] expected: EditorMode) {
        assert_eq!(EditorMode::for_file_name(name), expected);
    }

    #[test]
    fn only_script_modes_are_lintable() {
        assert!(EditorMode::Script { json: false }.is_lintable());
        assert!(EditorMode::Script { json: true }.is_lintable());
        assert!(!EditorMode::Markup.is_lintable());
        assert!(!EditorMode::PlainText.is_lintable());
    }

    #[test]
    fn descriptors_distinguish_json_from_javascript() {
        assert_eq!(EditorMode::Script { json: false }.descriptor(), "javascript");
        assert_ne!(
            EditorMode::Script { json: true }.descriptor(),
            EditorMode::Script { json: false }.descriptor()
        );
    }

    #[test]
    fn icons_follow_extension() {
        assert_eq!(FileIcon::for_file_name("a.PY").class_name(), "icon-py");
        assert_eq!(FileIcon::for_file_name("readme.md"), FileIcon::Generic);
        assert_eq!(FileIcon::for_file_name("readme.md").class_name(), "");
    }

    #[test]
    fn run_paths_are_gated_by_suffix() {
        assert!(is_markup_entry("Page.HTML"));
        assert!(is_markup_entry("page.htm"));
        assert!(!is_markup_entry("page.html.txt"));
        assert!(is_python_entry("script.py"));
        assert!(!is_python_entry("script.pyc"));
    }
}
