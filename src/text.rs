//! Text content extraction and normalization.
//!
//! Text is rendered roughly the way a browser would lay it out: block
//! elements start a new line, runs of whitespace collapse into a single
//! space, empty lines are dropped and the result is NFC-normalized.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

use crate::model::{DocumentTree, NodeData, NodeId};

/// Elements whose content is never part of the visible text.
pub const DISCARD_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements rendered on their own line.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "dialog", "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu",
    "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// Check if a tag is discarded from text.
pub fn is_discarded(tag: &str) -> bool {
    DISCARD_TAGS.contains(&tag)
}

/// Check if a tag is rendered as a block.
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// Heading level for `h1`..`h6`.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}

/// Normalize text to Unicode NFC, returning the input as-is when already normalized.
pub fn normalize_unicode(text: String) -> String {
    match is_nfc_quick(text.chars()) {
        IsNormalized::Yes => text,
        _ => text.nfc().collect(),
    }
}

enum Step {
    Enter(NodeId),
    Exit,
}

/// Visible text of a node and its descendants.
///
/// Lines produced by block elements (and `<br>`) are joined with `\n`.
pub fn node_text(tree: &DocumentTree, id: NodeId) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut stack = vec![Step::Enter(id)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Exit => flush_line(&mut lines, &mut line),
            Step::Enter(node_id) => match &tree.node(node_id).data {
                NodeData::Text(content) => line.push_str(content),
                NodeData::Element { tag, .. } => {
                    if is_discarded(tag) {
                        continue;
                    }
                    if tag == "br" {
                        flush_line(&mut lines, &mut line);
                        continue;
                    }
                    if is_block(tag) {
                        flush_line(&mut lines, &mut line);
                        stack.push(Step::Exit);
                    } else if !line.is_empty() && needs_separator(tag) {
                        line.push(' ');
                    }
                    stack.extend(tree.children(node_id).iter().rev().map(|c| Step::Enter(*c)));
                }
            },
        }
    }
    flush_line(&mut lines, &mut line);

    normalize_unicode(lines.join("\n"))
}

/// Replaced and form elements that visually separate surrounding words.
fn needs_separator(tag: &str) -> bool {
    matches!(tag, "img" | "input" | "select" | "textarea" | "button")
}

fn flush_line(lines: &mut Vec<String>, line: &mut String) {
    if line.is_empty() {
        return;
    }
    let collapsed = collapse_whitespace(line);
    if !collapsed.is_empty() {
        lines.push(collapsed);
    }
    line.clear();
}

/// Keep at most `max_chars` characters from the start of `text`.
///
/// `max_chars == 0` means unlimited.
pub fn truncate_head(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return text.to_string();
    }
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Keep at most `max_chars` characters from the end of `text`.
///
/// `max_chars == 0` means unlimited.
pub fn truncate_tail(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return text.to_string();
    }
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    match text.char_indices().nth(total - max_chars) {
        Some((byte_idx, _)) => text[byte_idx..].trim_start().to_string(),
        None => String::new(),
    }
}
