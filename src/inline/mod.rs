// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Local preview: turns a markup file into one self-contained document.
//!
//! Stylesheet links and external scripts that point into the virtual tree are replaced by
//! inline `<style>` / `<script>` elements carrying the referenced file's content. Everything
//! else in the document is kept byte-for-byte.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::model::{EntryId, FileTree};
use crate::path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Script,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stylesheet => "CSS",
            Self::Script => "JS",
        }
    }
}

/// A relative asset reference found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedDocument {
    pub html: String,
    /// References replaced by inline content, in document order.
    pub inlined: Vec<AssetRef>,
    /// Relative references that did not resolve to a file; their elements are left untouched.
    pub unresolved: Vec<AssetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineError {
    EntryNotFound { entry_id: EntryId },
    NotAFile { entry_id: EntryId },
    Language { message: String },
    Parse { entry_id: EntryId },
}

impl fmt::Display for InlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryNotFound { entry_id } => write!(f, "entry not found (id={entry_id})"),
            Self::NotAFile { entry_id } => write!(f, "entry is not a file (id={entry_id})"),
            Self::Language { message } => write!(f, "cannot load markup grammar: {message}"),
            Self::Parse { entry_id } => write!(f, "cannot parse markup (id={entry_id})"),
        }
    }
}

impl std::error::Error for InlineError {}

/// Builds the preview document for the markup file `entry_id`.
///
/// References are resolved relative to the directory holding the entry. Absolute URLs
/// (`http…`, `//…`) and `data:` URIs are never touched.
pub fn inline_assets(tree: &FileTree, entry_id: &EntryId) -> Result<InlinedDocument, InlineError> {
    let entry = tree
        .find_by_id(entry_id)
        .ok_or_else(|| InlineError::EntryNotFound { entry_id: entry_id.clone() })?;
    let file = entry.as_file().ok_or_else(|| InlineError::NotAFile { entry_id: entry_id.clone() })?;
    let source = file.content();

    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_html::language())
        .map_err(|err| InlineError::Language { message: err.to_string() })?;
    let syntax = parser
        .parse(source, None)
        .ok_or_else(|| InlineError::Parse { entry_id: entry_id.clone() })?;

    let mut candidates = Vec::new();
    collect_candidates(syntax.root_node(), source.as_bytes(), &mut candidates);

    let base_dir = path::base_dir_of(tree, entry_id);
    let mut edits = Vec::new();
    let mut inlined = Vec::new();
    let mut unresolved = Vec::new();

    for candidate in candidates {
        if !is_relative_reference(&candidate.reference) {
            continue;
        }

        let asset = AssetRef { kind: candidate.kind, reference: candidate.reference.clone() };
        let content = path::resolve(tree, &candidate.reference, &base_dir)
            .and_then(|ids| tree.resolve_path_ids(&ids))
            .and_then(|entry| entry.as_file())
            .map(|file| file.content());
        let Some(content) = content else {
            tracing::warn!(
                kind = asset.kind.label(),
                reference = %asset.reference,
                "linked asset not found"
            );
            unresolved.push(asset);
            continue;
        };

        edits.push((candidate.start..candidate.end, candidate.replacement(content)));
        inlined.push(asset);
    }

    // Candidates come out of a pre-order walk over disjoint elements, so the ranges are
    // already sorted and non-overlapping.
    let mut html = source.to_owned();
    for (range, replacement) in edits.into_iter().rev() {
        html.replace_range(range, &replacement);
    }

    Ok(InlinedDocument { html, inlined, unresolved })
}

/// `http…`, `//…` and `data:` references point outside the virtual tree. An empty reference
/// names nothing.
fn is_relative_reference(reference: &str) -> bool {
    !reference.trim().is_empty()
        && !["http", "//", "data:"].iter().any(|prefix| reference.starts_with(prefix))
}

#[derive(Debug)]
struct Candidate {
    kind: AssetKind,
    start: usize,
    end: usize,
    reference: String,
    script_type: Option<String>,
    defer: bool,
    is_async: bool,
}

impl Candidate {
    fn replacement(&self, content: &str) -> String {
        match self.kind {
            AssetKind::Stylesheet => format!("<style>{content}</style>"),
            AssetKind::Script => {
                let mut open = String::from("<script");
                if let Some(script_type) = &self.script_type {
                    open.push_str(" type=\"");
                    open.push_str(&script_type.replace('"', "&quot;"));
                    open.push('"');
                }
                if self.defer {
                    open.push_str(" defer");
                }
                if self.is_async {
                    open.push_str(" async");
                }
                format!("{open}>{}</script>", escape_script_close(content))
            }
        }
    }
}

fn escape_script_close(content: &str) -> std::borrow::Cow<'_, str> {
    static CLOSE: OnceLock<Regex> = OnceLock::new();
    let close = CLOSE.get_or_init(|| Regex::new(r"(?i)</(script)").expect("static regex"));
    close.replace_all(content, "<\\/$1")
}

fn collect_candidates(node: Node<'_>, source: &[u8], out: &mut Vec<Candidate>) {
    match node.kind() {
        "element" => {
            if let Some(candidate) = stylesheet_candidate(node, source) {
                out.push(candidate);
                return;
            }
        }
        "script_element" => {
            if let Some(candidate) = script_candidate(node, source) {
                out.push(candidate);
            }
            return;
        }
        _ => {}
    }

    for index in 0..node.named_child_count() {
        if let Some(child) = node.named_child(index) {
            collect_candidates(child, source, out);
        }
    }
}

fn stylesheet_candidate(element: Node<'_>, source: &[u8]) -> Option<Candidate> {
    let tag = opening_tag(element)?;
    let attributes = Attributes::read(tag, source)?;
    if !attributes.tag_name.eq_ignore_ascii_case("link") {
        return None;
    }
    let rel = attributes.get("rel")?;
    if !rel.split_ascii_whitespace().any(|token| token.eq_ignore_ascii_case("stylesheet")) {
        return None;
    }
    let reference = attributes.get("href")?.to_owned();

    Some(Candidate {
        kind: AssetKind::Stylesheet,
        start: element.start_byte(),
        end: element.end_byte(),
        reference,
        script_type: None,
        defer: false,
        is_async: false,
    })
}

fn script_candidate(element: Node<'_>, source: &[u8]) -> Option<Candidate> {
    let tag = opening_tag(element)?;
    let attributes = Attributes::read(tag, source)?;
    let reference = attributes.get("src")?.to_owned();

    Some(Candidate {
        kind: AssetKind::Script,
        start: element.start_byte(),
        end: element.end_byte(),
        reference,
        script_type: attributes.get("type").map(str::to_owned),
        defer: attributes.has("defer"),
        is_async: attributes.has("async"),
    })
}

fn opening_tag(element: Node<'_>) -> Option<Node<'_>> {
    (0..element.named_child_count())
        .filter_map(|index| element.named_child(index))
        .find(|child| matches!(child.kind(), "start_tag" | "self_closing_tag"))
}

/// Tag name plus attributes of one opening tag. Names are lower-cased; a value-less
/// attribute maps to `None`.
struct Attributes<'a> {
    tag_name: &'a str,
    entries: Vec<(String, Option<&'a str>)>,
}

impl<'a> Attributes<'a> {
    fn read(tag: Node<'_>, source: &'a [u8]) -> Option<Self> {
        let mut tag_name = None;
        let mut entries = Vec::new();

        for index in 0..tag.named_child_count() {
            let Some(child) = tag.named_child(index) else {
                continue;
            };
            match child.kind() {
                "tag_name" => tag_name = Some(node_text(child, source)?),
                "attribute" => {
                    if let Some(entry) = read_attribute(child, source) {
                        entries.push(entry);
                    }
                }
                _ => {}
            }
        }

        Some(Self { tag_name: tag_name?, entries })
    }

    /// Value of the first attribute named `name`; value-less attributes read as "".
    fn get(&self, name: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.unwrap_or(""))
    }

    fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }
}

fn read_attribute<'a>(attribute: Node<'_>, source: &'a [u8]) -> Option<(String, Option<&'a str>)> {
    let mut name = None;
    let mut value = None;

    for index in 0..attribute.named_child_count() {
        let Some(child) = attribute.named_child(index) else {
            continue;
        };
        match child.kind() {
            "attribute_name" => name = Some(node_text(child, source)?.to_ascii_lowercase()),
            "attribute_value" => value = Some(node_text(child, source)?),
            // `""` parses as a quoted value with no inner value node.
            "quoted_attribute_value" => {
                let inner = (0..child.named_child_count())
                    .filter_map(|index| child.named_child(index))
                    .find(|inner| inner.kind() == "attribute_value");
                value = Some(match inner {
                    Some(inner) => node_text(inner, source)?,
                    None => "",
                });
            }
            _ => {}
        }
    }

    Some((name?, value))
}

fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    std::str::from_utf8(source.get(node.start_byte()..node.end_byte())?).ok()
}
