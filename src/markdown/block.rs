//! Line-oriented block conversion
//!
//! Each line is classified once (heading, bullet item, numbered item, blank
//! or plain) and fed through a three-state list machine:
//! no list, inside a bullet list, inside a numbered list.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::inline::{parse_inline, Inline};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3}) +(.*)$").expect("heading pattern is valid"));
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s+(.*)$").expect("bullet pattern is valid"));
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("numbered pattern is valid"));

/// Heading depth. Lower numbers carry more visual weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Level for a run of `#` characters (1 to 3)
    pub fn from_marker_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Style classes applied when serialized to HTML
    pub fn css_class(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "text-2xl font-bold mt-4 mb-2 text-foreground",
            HeadingLevel::H2 => "text-xl font-bold mt-3 mb-1 text-foreground",
            HeadingLevel::H3 => "text-lg font-bold mt-2 mb-1 text-foreground",
        }
    }
}

/// Kind of list block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    pub fn html_tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ListKind::Bullet => "list-inside space-y-0.5 my-1 ml-4 text-sm list-disc",
            ListKind::Numbered => "list-inside space-y-0.5 my-1 ml-4 text-sm list-decimal",
        }
    }
}

/// One node of converted output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Heading { level: HeadingLevel, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    ListOpen { kind: ListKind },
    ListItem { content: Vec<Inline> },
    ListClose { kind: ListKind },
}

/// Ordered nodes produced from one text blob
///
/// Always recomputed from the source text, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBlock {
    nodes: Vec<Node>,
}

impl RenderedBlock {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for &'a RenderedBlock {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading(HeadingLevel, &'a str),
    Item(ListKind, &'a str),
    Plain(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = HEADING.captures(line) {
        let marker = caps.get(1).map_or(0, |m| m.as_str().len());
        if let Some(level) = HeadingLevel::from_marker_len(marker) {
            let text = caps.get(2).map_or("", |m| m.as_str());
            return Line::Heading(level, text.trim_end());
        }
    }

    if let Some(caps) = BULLET_ITEM.captures(line) {
        return Line::Item(ListKind::Bullet, caps.get(1).map_or("", |m| m.as_str().trim()));
    }

    if let Some(caps) = NUMBERED_ITEM.captures(line) {
        return Line::Item(ListKind::Numbered, caps.get(1).map_or("", |m| m.as_str().trim()));
    }

    Line::Plain(line)
}

/// List grouping state machine
struct ListGrouper {
    nodes: Vec<Node>,
    open: Option<ListKind>,
}

impl ListGrouper {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            open: None,
        }
    }

    fn close_list(&mut self) {
        if let Some(kind) = self.open.take() {
            self.nodes.push(Node::ListClose { kind });
        }
    }

    fn push_item(&mut self, kind: ListKind, text: &str) {
        if self.open != Some(kind) {
            // Lists of different kinds are never merged
            self.close_list();
            self.nodes.push(Node::ListOpen { kind });
            self.open = Some(kind);
        }
        self.nodes.push(Node::ListItem {
            content: parse_inline(text),
        });
    }

    fn push_line(&mut self, line: Line<'_>) {
        match line {
            Line::Item(kind, text) => self.push_item(kind, text),
            // A blank line ends the current list
            Line::Blank => self.close_list(),
            Line::Heading(level, text) => {
                self.close_list();
                self.nodes.push(Node::Heading {
                    level,
                    content: parse_inline(text),
                });
            }
            Line::Plain(text) => {
                self.close_list();
                self.nodes.push(Node::Paragraph {
                    content: parse_inline(text),
                });
            }
        }
    }

    fn finish(mut self) -> RenderedBlock {
        self.close_list();
        RenderedBlock { nodes: self.nodes }
    }
}

/// Convert markdown-ish text into structured nodes
///
/// Pure: the same text always yields the same output.
pub fn convert(text: &str) -> RenderedBlock {
    let mut grouper = ListGrouper::new();
    for line in text.lines() {
        grouper.push_line(classify(line));
    }
    grouper.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::text(s)]
    }

    fn item(s: &str) -> Node {
        Node::ListItem { content: text(s) }
    }

    fn open(kind: ListKind) -> Node {
        Node::ListOpen { kind }
    }

    fn close(kind: ListKind) -> Node {
        Node::ListClose { kind }
    }

    #[test]
    fn test_empty_input() {
        assert!(convert("").is_empty());
        assert!(convert("\n  \n\t\n").is_empty());
    }

    #[test]
    fn test_headings_by_level() {
        let block = convert("# One\n## Two\n### Three");
        assert_eq!(
            block.nodes(),
            &[
                Node::Heading { level: HeadingLevel::H1, content: text("One") },
                Node::Heading { level: HeadingLevel::H2, content: text("Two") },
                Node::Heading { level: HeadingLevel::H3, content: text("Three") },
            ]
        );
    }

    #[test]
    fn test_heading_requires_space_and_line_start() {
        let block = convert("##Title\n#### Deep\n  # Indented\nSome ## not heading");
        assert!(block
            .iter()
            .all(|node| matches!(node, Node::Paragraph { .. })));
        assert_eq!(block.len(), 4);
    }

    #[test]
    fn test_heading_with_emphasis() {
        let block = convert("## **Bold** title");
        assert_eq!(
            block.nodes(),
            &[Node::Heading {
                level: HeadingLevel::H2,
                content: vec![Inline::Strong(text("Bold")), Inline::text(" title")],
            }]
        );
    }

    #[test]
    fn test_bullet_list() {
        let block = convert("* a\n  * b\n*   c  ");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Bullet),
                item("a"),
                item("b"),
                item("c"),
                close(ListKind::Bullet),
            ]
        );
    }

    #[test]
    fn test_numbered_list_strips_marker() {
        let block = convert("1. first\n10. tenth");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Numbered),
                item("first"),
                item("tenth"),
                close(ListKind::Numbered),
            ]
        );
    }

    #[test]
    fn test_list_kind_change_splits_blocks() {
        let block = convert("* a\n1. b\n* c");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Bullet),
                item("a"),
                close(ListKind::Bullet),
                open(ListKind::Numbered),
                item("b"),
                close(ListKind::Numbered),
                open(ListKind::Bullet),
                item("c"),
                close(ListKind::Bullet),
            ]
        );
    }

    #[test]
    fn test_plain_line_closes_list() {
        let block = convert("* a\nafter");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Bullet),
                item("a"),
                close(ListKind::Bullet),
                Node::Paragraph { content: text("after") },
            ]
        );
    }

    #[test]
    fn test_blank_line_splits_same_kind_lists() {
        let block = convert("* a\n\n* b");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Bullet),
                item("a"),
                close(ListKind::Bullet),
                open(ListKind::Bullet),
                item("b"),
                close(ListKind::Bullet),
            ]
        );
    }

    #[test]
    fn test_blank_lines_dropped() {
        let block = convert("a\n\nb");
        assert_eq!(
            block.nodes(),
            &[
                Node::Paragraph { content: text("a") },
                Node::Paragraph { content: text("b") },
            ]
        );
    }

    #[test]
    fn test_star_without_space_is_not_a_bullet() {
        let block = convert("*emphasis* first");
        assert_eq!(
            block.nodes(),
            &[Node::Paragraph {
                content: vec![Inline::Emphasis(text("emphasis")), Inline::text(" first")],
            }]
        );
    }

    #[test]
    fn test_bullet_marker_is_not_emphasis() {
        let block = convert("* item with *stress*");
        assert_eq!(
            block.nodes(),
            &[
                open(ListKind::Bullet),
                Node::ListItem {
                    content: vec![Inline::text("item with "), Inline::Emphasis(text("stress"))],
                },
                close(ListKind::Bullet),
            ]
        );
    }

    #[test]
    fn test_crlf_lines() {
        let block = convert("a\r\n* b\r\n");
        assert_eq!(
            block.nodes(),
            &[
                Node::Paragraph { content: text("a") },
                open(ListKind::Bullet),
                item("b"),
                close(ListKind::Bullet),
            ]
        );
    }

    #[test]
    fn test_heading_level_mapping() {
        assert_eq!(HeadingLevel::from_marker_len(2), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_marker_len(4), None);
        assert!(HeadingLevel::H1 < HeadingLevel::H3);
        assert_eq!(HeadingLevel::H3.number(), 3);
    }
}
