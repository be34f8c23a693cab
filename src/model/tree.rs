//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` owned by [`DocumentTree`]; parent and child
//! links are [`NodeId`] indices into that arena, so the tree has exactly one
//! owner and no reference cycles.

use std::collections::BTreeMap;

use crate::text;

/// Index of a node inside a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena (document order of creation).
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with a lowercase tag name and its attributes
    Element {
        /// Tag name (lowercase)
        tag: String,
        /// Attributes, sorted by name
        attrs: BTreeMap<String, String>,
    },
    /// A run of character data
    Text(String),
}

/// A node of the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Element or text payload
    pub data: NodeData,
    parent: Option<NodeId>,
    index: usize,
    children: Vec<NodeId>,
}

impl Node {
    /// Tag name if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Character data if this is a text node.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            NodeData::Element { .. } => None,
        }
    }

    /// Attribute value if this is an element carrying `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    /// All attributes (empty for text nodes).
    pub fn attrs(&self) -> Option<&BTreeMap<String, String>> {
        match &self.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            NodeData::Text(_) => None,
        }
    }

    /// Check if this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    /// Check if this node is an element with the given tag.
    pub fn is_tag(&self, name: &str) -> bool {
        self.tag() == Some(name)
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A parsed HTML document.
///
/// The root is always the `<html>` element. Comments, doctypes and
/// processing instructions are not represented.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    /// Create a tree holding a single root element.
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self::with_root(root_tag, BTreeMap::new())
    }

    /// Create a tree whose root element carries attributes.
    pub fn with_root(root_tag: impl Into<String>, attrs: BTreeMap<String, String>) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element {
                    tag: root_tag.into(),
                    attrs,
                },
                parent: None,
                index: 0,
                children: Vec::new(),
            }],
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append an element under `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attrs: BTreeMap<String, String>,
    ) -> NodeId {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.into(),
                attrs,
            },
        )
    }

    /// Append a text node under `parent`, merging with a preceding text sibling.
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.0].data {
                existing.push_str(content);
                return last;
            }
        }
        self.push(parent, NodeData::Text(content.to_string()))
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        let index = self.nodes[parent.0].children.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            index,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Get a node by id, `None` if the id belongs to another tree.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::tag)
    }

    /// Attribute of an element node.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attr(name))
    }

    /// Child elements of a node, skipping text.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.node(*c).is_element())
    }

    /// Index of a node among its parent's children.
    pub fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let node = self.get(id)?;
        node.parent.map(|_| node.index)
    }

    /// Sibling immediately before `id`.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position_in_parent(id)?.checked_sub(1)?;
        self.children(parent).get(pos).copied()
    }

    /// Sibling immediately after `id`.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let pos = self.position_in_parent(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    /// Pre-order traversal of the subtree rooted at `id` (inclusive).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
            last_pushed: 0,
        }
    }

    /// Ancestors of `id`, nearest first (exclusive).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// First element with the given tag in document order.
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|id| self.node(*id).is_tag(tag))
    }

    /// Text of the first `<title>` element, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        let title = self.find_first("title")?;
        let text = text::node_text(self, title);
        (!text.is_empty()).then_some(text)
    }

    /// Path from the root to `id`.
    ///
    /// Each segment is `tag[n]`, where `n` counts preceding element siblings
    /// with the same tag. A nested element's path always starts with the
    /// path of every enclosing element.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            let segment = match node.tag() {
                Some(tag) => {
                    let nth = match node.parent() {
                        Some(parent) => self
                            .children(parent)
                            .iter()
                            .take_while(|c| **c != node_id)
                            .filter(|c| self.node(**c).is_tag(tag))
                            .count(),
                        None => 0,
                    };
                    format!("{}[{}]", tag, nth)
                }
                None => format!("#text[{}]", self.position_in_parent(node_id).unwrap_or(0)),
            };
            segments.push(segment);
            current = node.parent();
        }
        segments.reverse();
        segments.join("/")
    }

    /// Markup of `id` and its subtree.
    ///
    /// Attributes are written in name order. Comments are not kept in the
    /// tree, so they never appear.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![Markup::Open(id)];

        while let Some(step) = stack.pop() {
            let node_id = match step {
                Markup::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
                Markup::Open(node_id) => node_id,
            };

            let node = self.node(node_id);
            match &node.data {
                NodeData::Text(content) => {
                    let raw = node.parent.and_then(|p| self.tag(p)).is_some_and(is_raw_text);
                    if raw {
                        out.push_str(content);
                    } else {
                        escape_into(&mut out, content, false);
                    }
                }
                NodeData::Element { tag, attrs } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attrs {
                        out.push(' ');
                        out.push_str(name);
                        out.push_str("=\"");
                        escape_into(&mut out, value, true);
                        out.push('"');
                    }
                    out.push('>');
                    if is_void(tag) {
                        continue;
                    }
                    stack.push(Markup::Close(tag));
                    stack.extend(node.children.iter().rev().map(|c| Markup::Open(*c)));
                }
            }
        }

        out
    }
}

enum Markup<'a> {
    Open(NodeId),
    Close(&'a str),
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "keygen" | "link"
            | "meta" | "param" | "source" | "track" | "wbr"
    )
}

fn is_raw_text(tag: &str) -> bool {
    matches!(
        tag,
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
    )
}

fn escape_into(out: &mut String, value: &str, in_attribute: bool) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
    last_pushed: usize,
}

impl Descendants<'_> {
    /// Do not descend into the children of the node returned last.
    pub fn skip_children(&mut self) {
        let keep = self.stack.len() - self.last_pushed;
        self.stack.truncate(keep);
        self.last_pushed = 0;
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.tree.children(id);
        self.stack.extend(children.iter().rev().copied());
        self.last_pushed = children.len();
        Some(id)
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a DocumentTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DocumentTree, NodeId, NodeId, NodeId) {
        let mut tree = DocumentTree::new("html");
        let body = tree.append_element(tree.root(), "body", BTreeMap::new());
        let p = tree.append_element(body, "p", BTreeMap::new());
        tree.append_text(p, "Hello");
        let div = tree.append_element(body, "div", BTreeMap::new());
        let p2 = tree.append_element(div, "p", BTreeMap::new());
        tree.append_text(p2, "World");
        (tree, body, p, p2)
    }

    #[test]
    fn test_preorder_traversal() {
        let (tree, _, _, _) = sample();
        let tags: Vec<String> = tree
            .descendants(tree.root())
            .map(|id| match &tree.node(id).data {
                NodeData::Element { tag, .. } => tag.clone(),
                NodeData::Text(t) => format!("'{}'", t),
            })
            .collect();
        assert_eq!(
            tags,
            vec!["html", "body", "p", "'Hello'", "div", "p", "'World'"]
        );
    }

    #[test]
    fn test_skip_children() {
        let (tree, _, _, _) = sample();
        let mut iter = tree.descendants(tree.root());
        let mut seen = Vec::new();
        while let Some(id) = iter.next() {
            if tree.node(id).is_tag("div") {
                iter.skip_children();
            }
            seen.push(id);
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_parent_and_siblings() {
        let (tree, body, p, p2) = sample();
        assert_eq!(tree.parent(p), Some(body));
        assert_eq!(tree.parent(tree.root()), None);
        let div = tree.next_sibling(p).unwrap();
        assert!(tree.node(div).is_tag("div"));
        assert_eq!(tree.prev_sibling(div), Some(p));
        assert_eq!(tree.prev_sibling(p), None);
        assert_eq!(tree.ancestors(p2).count(), 3);
    }

    #[test]
    fn test_siblings_of_root_and_ends() {
        let (tree, body, _, _) = sample();
        assert_eq!(tree.next_sibling(tree.root()), None);
        assert_eq!(tree.position_in_parent(tree.root()), None);
        let div = tree.children(body)[1];
        assert_eq!(tree.position_in_parent(div), Some(1));
        assert_eq!(tree.next_sibling(div), None);
    }

    #[test]
    fn test_outer_html() {
        let mut tree = DocumentTree::new("html");
        let mut attrs = BTreeMap::new();
        attrs.insert("title".to_string(), "a \"quoted\" & more".to_string());
        attrs.insert("class".to_string(), "x".to_string());
        let td = tree.append_element(tree.root(), "td", attrs);
        let mut href = BTreeMap::new();
        href.insert("href".to_string(), "/wiki/K2?a=1&b=2".to_string());
        let a = tree.append_element(td, "a", href);
        tree.append_text(a, "K2");
        tree.append_element(td, "br", BTreeMap::new());
        tree.append_text(td, "1 < 2\u{a0}m");

        assert_eq!(
            tree.outer_html(td),
            "<td class=\"x\" title=\"a &quot;quoted&quot; &amp; more\">\
             <a href=\"/wiki/K2?a=1&amp;b=2\">K2</a><br>1 &lt; 2&nbsp;m</td>"
        );
    }

    #[test]
    fn test_outer_html_raw_text_and_depth() {
        let mut tree = DocumentTree::new("html");
        let script = tree.append_element(tree.root(), "script", BTreeMap::new());
        tree.append_text(script, "if (a < b) {}");
        assert_eq!(tree.outer_html(script), "<script>if (a < b) {}</script>");

        let mut parent = tree.root();
        for _ in 0..50_000 {
            parent = tree.append_element(parent, "span", BTreeMap::new());
        }
        let html = tree.outer_html(tree.root());
        assert!(html.ends_with("</span></html>"));
    }

    #[test]
    fn test_text_merging() {
        let mut tree = DocumentTree::new("html");
        let a = tree.append_text(tree.root(), "foo");
        let b = tree.append_text(tree.root(), "bar");
        assert_eq!(a, b);
        assert_eq!(tree.node(a).text(), Some("foobar"));
    }

    #[test]
    fn test_path() {
        let (tree, _, p, p2) = sample();
        assert_eq!(tree.path(p), "html[0]/body[0]/p[0]");
        assert_eq!(tree.path(p2), "html[0]/body[0]/div[0]/p[0]");
    }
}
