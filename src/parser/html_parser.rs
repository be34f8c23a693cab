//! HTML parser building the arena document tree.
//!
//! Tokenizing and tree construction are done by `scraper` (html5ever), which
//! recovers from unclosed tags, stray end tags and unknown elements the way
//! browsers do. The result is copied into a [`DocumentTree`] so the rest of
//! the pipeline works on plain indices.

use std::collections::BTreeMap;

use scraper::{Html, Node};

use crate::error::{Error, Result};
use crate::model::DocumentTree;

/// HTML document parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse markup into a document tree.
    ///
    /// Fails only when there is nothing to build a document from (empty or
    /// whitespace-only input); malformed markup degrades, it never errors.
    pub fn parse(&self, input: &str) -> Result<DocumentTree> {
        if input.chars().all(|c| c.is_whitespace() || c == '\0') {
            return Err(Error::Parse("input contains no markup".to_string()));
        }

        let html = Html::parse_document(input);
        if !html.errors.is_empty() {
            log::trace!("html5ever recovered from {} parse errors", html.errors.len());
        }

        let root = html
            .tree
            .root()
            .children()
            .find(|n| n.value().is_element())
            .ok_or_else(|| Error::Parse("document has no root element".to_string()))?;

        let (root_tag, root_attrs) = match root.value() {
            Node::Element(el) => (el.name().to_string(), copy_attrs(el)),
            _ => ("html".to_string(), BTreeMap::new()),
        };
        let mut tree = DocumentTree::with_root(root_tag, root_attrs);

        let mut stack: Vec<_> = root.children().rev().map(|c| (tree.root(), c)).collect();
        while let Some((parent, node)) = stack.pop() {
            match node.value() {
                Node::Element(el) => {
                    let id = tree.append_element(parent, el.name(), copy_attrs(el));
                    stack.extend(node.children().rev().map(|c| (id, c)));
                }
                Node::Text(text) => {
                    tree.append_text(parent, text);
                }
                // comments, doctypes and processing instructions carry no content
                _ => {}
            }
        }

        log::debug!("Parsed document with {} nodes", tree.len());
        Ok(tree)
    }

    /// Parse raw bytes, replacing invalid UTF-8 sequences.
    pub fn parse_bytes(&self, data: &[u8]) -> Result<DocumentTree> {
        self.parse(&String::from_utf8_lossy(data))
    }
}

fn copy_attrs(el: &scraper::node::Element) -> BTreeMap<String, String> {
    el.attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
