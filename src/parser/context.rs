//! Page context harvesting.
//!
//! A table's context is what a reader sees around it: its caption, the
//! section headings that are open where it appears, and the nearest prose
//! before and after it. Headings and other tables are section boundaries;
//! surrounding text never crosses them.

use std::collections::BTreeMap;

use crate::model::{Context, DocumentTree, Heading, NodeData, NodeId};
use crate::text::{self, collapse_whitespace, node_text, normalize_unicode};

use super::options::ContextOptions;

/// Produces the context of a table.
///
/// Implementations must not keep state between calls; one harvester is
/// shared by every extraction of a [`TableExtractor`](crate::TableExtractor).
pub trait ContextHarvester: Send + Sync {
    /// Harvest the context of `table`, or `None` to attach no context.
    fn harvest(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        page_title: Option<&str>,
        page_url: &str,
    ) -> Option<Context>;

    /// Harvest the context of every table of a page, in the order given.
    fn harvest_all(
        &self,
        tree: &DocumentTree,
        tables: &[NodeId],
        page_title: Option<&str>,
        page_url: &str,
    ) -> Vec<Option<Context>> {
        tables
            .iter()
            .map(|table| self.harvest(tree, *table, page_title, page_url))
            .collect()
    }
}

/// Harvester that never produces a context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHarvester;

impl ContextHarvester for NoopHarvester {
    fn harvest(&self, _: &DocumentTree, _: NodeId, _: Option<&str>, _: &str) -> Option<Context> {
        None
    }

    fn harvest_all(
        &self,
        _: &DocumentTree,
        tables: &[NodeId],
        _: Option<&str>,
        _: &str,
    ) -> Vec<Option<Context>> {
        tables.iter().map(|_| None).collect()
    }
}

/// Harvester following heading structure and sibling text.
#[derive(Debug, Clone, Default)]
pub struct HeadingContextHarvester {
    options: ContextOptions,
}

impl HeadingContextHarvester {
    /// Create a harvester with default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a harvester with custom bounds.
    pub fn with_options(options: ContextOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Headings open at `table`, outermost first.
    pub fn heading_chain(&self, tree: &DocumentTree, table: NodeId) -> Vec<Heading> {
        self.heading_chains(tree, &[table])
            .pop()
            .unwrap_or_default()
    }

    /// Heading chains of several tables, computed in one pass over the document.
    ///
    /// Tables the walk never reaches (inside discarded elements or inside a
    /// heading) get an empty chain.
    pub fn heading_chains(&self, tree: &DocumentTree, tables: &[NodeId]) -> Vec<Vec<Heading>> {
        let mut wanted: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
        for (i, table) in tables.iter().enumerate() {
            wanted.entry(*table).or_default().push(i);
        }

        let mut chains = vec![Vec::new(); tables.len()];
        let mut chain: Vec<Heading> = Vec::new();
        let mut iter = tree.descendants(tree.root());

        while let Some(id) = iter.next() {
            if wanted.is_empty() {
                break;
            }
            if let Some(slots) = wanted.remove(&id) {
                for slot in slots {
                    chains[slot] = chain.clone();
                }
            }
            let Some(tag) = tree.tag(id) else {
                continue;
            };
            if text::is_discarded(tag) {
                iter.skip_children();
                continue;
            }
            let Some(level) = text::heading_level(tag) else {
                continue;
            };
            iter.skip_children();

            let heading = collapse_whitespace(&node_text(tree, id));
            if heading.is_empty() {
                continue;
            }
            while chain.last().is_some_and(|h| h.level >= level) {
                chain.pop();
            }
            chain.push(Heading::new(level, heading));
        }

        chains
    }

    /// Caption of `table` and the element it came from.
    pub fn caption(&self, tree: &DocumentTree, table: NodeId) -> Option<(NodeId, String)> {
        let own = tree
            .child_elements(table)
            .find(|c| tree.node(*c).is_tag("caption"));
        if let Some(found) = own.and_then(|c| non_empty_text(tree, c)) {
            return Some(found);
        }

        let figure = tree
            .ancestors(table)
            .take_while(|a| !matches!(tree.tag(*a), Some("table" | "td" | "th" | "body")))
            .find(|a| tree.node(*a).is_tag("figure"));
        if let Some(figure) = figure {
            let figcaption = tree
                .child_elements(figure)
                .find(|c| tree.node(*c).is_tag("figcaption"));
            if let Some(found) = figcaption.and_then(|c| non_empty_text(tree, c)) {
                return Some(found);
            }
        }

        self.lookback_caption(tree, table)
    }

    fn lookback_caption(&self, tree: &DocumentTree, table: NodeId) -> Option<(NodeId, String)> {
        let mut inspected = 0;
        let mut sibling = tree.prev_sibling(table);

        while let Some(id) = sibling {
            if inspected >= self.options.caption_lookback {
                break;
            }
            sibling = tree.prev_sibling(id);

            let node = tree.node(id);
            let Some(tag) = node.tag() else {
                if node.text().is_some_and(|t| !t.trim().is_empty()) {
                    inspected += 1;
                }
                continue;
            };
            if text::is_discarded(tag) {
                continue;
            }
            if is_boundary(tag) {
                break;
            }
            if is_caption_like(tree, id) {
                if let Some(found) = non_empty_text(tree, id) {
                    return Some(found);
                }
            }
            inspected += 1;
        }

        None
    }

    /// Nearest text before (`Direction::Backward`) or after the table.
    fn adjacent_text(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        skip: Option<NodeId>,
        direction: Direction,
    ) -> Option<String> {
        let mut current = table;

        loop {
            let mut sibling = direction.step(tree, current);
            while let Some(id) = sibling {
                if Some(id) != skip {
                    match scan(tree, id, direction, self.options.max_context_chars) {
                        Scan::Found(text) => return Some(text),
                        Scan::Stop => return None,
                        Scan::NotFound => {}
                    }
                }
                sibling = direction.step(tree, id);
            }

            let parent = tree.parent(current)?;
            if matches!(tree.tag(parent), Some("body" | "html" | "td" | "th")) {
                return None;
            }
            current = parent;
        }
    }

    fn build(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        heading_chain: Vec<Heading>,
        page_title: Option<&str>,
        page_url: &str,
    ) -> Context {
        let max = self.options.max_context_chars;
        let caption = self.caption(tree, table);
        let caption_node = caption.as_ref().map(|(id, _)| *id);

        let mut context = Context::new(page_url);
        context.caption = caption.map(|(_, text)| text::truncate_head(&text, max));
        context.heading_chain = heading_chain;
        context.preceding_text = self
            .adjacent_text(tree, table, caption_node, Direction::Backward)
            .map(|t| text::truncate_tail(&t, max));
        context.following_text = self
            .adjacent_text(tree, table, caption_node, Direction::Forward)
            .map(|t| text::truncate_head(&t, max));
        context.page_title = page_title.map(str::to_string);

        log::trace!(
            "Context for {}: {} headings, caption {}",
            tree.path(table),
            context.heading_chain.len(),
            context.caption.is_some()
        );
        context
    }
}

impl ContextHarvester for HeadingContextHarvester {
    fn harvest(
        &self,
        tree: &DocumentTree,
        table: NodeId,
        page_title: Option<&str>,
        page_url: &str,
    ) -> Option<Context> {
        let chain = self.heading_chain(tree, table);
        Some(self.build(tree, table, chain, page_title, page_url))
    }

    fn harvest_all(
        &self,
        tree: &DocumentTree,
        tables: &[NodeId],
        page_title: Option<&str>,
        page_url: &str,
    ) -> Vec<Option<Context>> {
        let chains = self.heading_chains(tree, tables);
        tables
            .iter()
            .zip(chains)
            .map(|(table, chain)| Some(self.build(tree, *table, chain, page_title, page_url)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

impl Direction {
    fn step(self, tree: &DocumentTree, id: NodeId) -> Option<NodeId> {
        match self {
            Direction::Backward => tree.prev_sibling(id),
            Direction::Forward => tree.next_sibling(id),
        }
    }
}

enum Scan {
    Found(String),
    Stop,
    NotFound,
}

enum Step {
    Enter(NodeId),
    Exit,
}

/// Text of a sibling subtree, nearest to the table first.
///
/// Collection starts at the first non-empty text and ends at the first
/// heading or table, at the end of the subtree, or once more than
/// `max_chars` characters are held (`0` means unbounded). Every node is
/// visited at most once.
fn scan(tree: &DocumentTree, id: NodeId, direction: Direction, max_chars: usize) -> Scan {
    let mut run = TextRun::new(direction);
    let mut stack = vec![Step::Enter(id)];

    while let Some(step) = stack.pop() {
        let node_id = match step {
            Step::Exit => {
                run.break_line();
                continue;
            }
            Step::Enter(node_id) => node_id,
        };

        match &tree.node(node_id).data {
            NodeData::Text(content) => {
                run.push(content);
                if max_chars > 0 && run.chars > max_chars {
                    break;
                }
            }
            NodeData::Element { tag, .. } => {
                if text::is_discarded(tag) {
                    continue;
                }
                if is_boundary(tag) {
                    return run.finish().map_or(Scan::Stop, Scan::Found);
                }
                if tag == "br" {
                    run.break_line();
                    continue;
                }
                if text::is_block(tag) {
                    run.break_line();
                    stack.push(Step::Exit);
                }
                let children = tree.children(node_id);
                match direction {
                    Direction::Forward => {
                        stack.extend(children.iter().rev().map(|c| Step::Enter(*c)))
                    }
                    Direction::Backward => stack.extend(children.iter().map(|c| Step::Enter(*c))),
                }
            }
        }
    }

    run.finish().map_or(Scan::NotFound, Scan::Found)
}

/// Text gathered in walk order, laid out in document order on finish.
struct TextRun {
    direction: Direction,
    lines: Vec<String>,
    pieces: Vec<String>,
    chars: usize,
}

impl TextRun {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            lines: Vec::new(),
            pieces: Vec::new(),
            chars: 0,
        }
    }

    fn push(&mut self, content: &str) {
        let visible = collapse_whitespace(content).chars().count();
        if visible == 0 && self.pieces.is_empty() {
            return;
        }
        self.chars += visible;
        self.pieces.push(content.to_string());
    }

    fn break_line(&mut self) {
        if self.pieces.is_empty() {
            return;
        }
        if self.direction == Direction::Backward {
            self.pieces.reverse();
        }
        let line = collapse_whitespace(&self.pieces.concat());
        self.pieces.clear();
        if !line.is_empty() {
            self.chars += 1;
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> Option<String> {
        self.break_line();
        if self.lines.is_empty() {
            return None;
        }
        if self.direction == Direction::Backward {
            self.lines.reverse();
        }
        Some(normalize_unicode(self.lines.join("\n")))
    }
}

/// Headings and tables end a section of surrounding text.
fn is_boundary(tag: &str) -> bool {
    tag == "table" || text::heading_level(tag).is_some()
}

fn is_caption_like(tree: &DocumentTree, id: NodeId) -> bool {
    let node = tree.node(id);
    if matches!(node.tag(), Some("caption" | "figcaption" | "label")) {
        return true;
    }
    ["class", "id"].iter().any(|name| {
        node.attr(name)
            .is_some_and(|v| v.to_ascii_lowercase().contains("caption"))
    })
}

fn non_empty_text(tree: &DocumentTree, id: NodeId) -> Option<(NodeId, String)> {
    let content = node_text(tree, id);
    (!content.is_empty()).then_some((id, content))
}
