//! Inline emphasis
//!
//! Two passes over a single line, in this order:
//!
//! 1. `**X**` becomes a strong span. The opening `**` pairs with the nearest
//!    following `**`; pairs never overlap.
//! 2. `*X*` becomes an emphasis span, scanning the text left after pass 1, so
//!    asterisks already consumed by a strong span are never seen again.
//!
//! An emphasis pair whose delimiters sit on different sides of a strong
//! boundary cannot be expressed as a tree; both of its asterisks stay literal.
//! Unpaired asterisks are literal text.

use serde::{Deserialize, Serialize};

/// A node of inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(text.into())
    }

    /// Concatenated text of this node without any markup
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                for child in children {
                    child.write_plain(out);
                }
            }
        }
    }
}

/// Plain text of a run of inline nodes
pub fn plain_text(nodes: &[Inline]) -> String {
    nodes.iter().map(Inline::plain_text).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Char(char),
    StrongOpen,
    StrongClose,
}

#[derive(Debug, Clone, Copy)]
enum SpanKind {
    Strong,
    Emphasis,
}

/// Resolve emphasis in one line of text
pub fn parse_inline(line: &str) -> Vec<Inline> {
    if line.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = line.chars().collect();
    let tokens = resolve_strong(&chars);
    let emphasis = pair_emphasis(&tokens);
    build_tree(&tokens, &emphasis)
}

fn is_double_star(chars: &[char], at: usize) -> bool {
    chars.get(at) == Some(&'*') && chars.get(at + 1) == Some(&'*')
}

/// First pass: pair `**` delimiters left to right
fn resolve_strong(chars: &[char]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if is_double_star(chars, i) {
            if let Some(close) = (i + 2..chars.len()).find(|&j| is_double_star(chars, j)) {
                tokens.push(Token::StrongOpen);
                tokens.extend(chars[i + 2..close].iter().copied().map(Token::Char));
                tokens.push(Token::StrongClose);
                i = close + 2;
                continue;
            }
        }
        tokens.push(Token::Char(chars[i]));
        i += 1;
    }

    tokens
}

/// Second pass: pair remaining single asterisks
///
/// Returns, per token, whether it opens or closes an accepted emphasis span.
fn pair_emphasis(tokens: &[Token]) -> Vec<Option<SpanEdge>> {
    let stars: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == Token::Char('*'))
        .map(|(idx, _)| idx)
        .collect();

    let mut edges = vec![None; tokens.len()];
    for pair in stars.chunks_exact(2) {
        let (open, close) = (pair[0], pair[1]);
        if nests_cleanly(&tokens[open + 1..close]) {
            edges[open] = Some(SpanEdge::Open);
            edges[close] = Some(SpanEdge::Close);
        }
    }
    edges
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanEdge {
    Open,
    Close,
}

/// True if the strong markers inside `between` are balanced
fn nests_cleanly(between: &[Token]) -> bool {
    let mut depth = 0i32;
    for token in between {
        match token {
            Token::StrongOpen => depth += 1,
            Token::StrongClose => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Token::Char(_) => {}
        }
    }
    depth == 0
}

struct TreeBuilder {
    frames: Vec<(Option<SpanKind>, Vec<Inline>)>,
    text: String,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            frames: vec![(None, Vec::new())],
            text: String::new(),
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if let Some((_, children)) = self.frames.last_mut() {
            children.push(Inline::Text(text));
        }
    }

    fn open(&mut self, kind: SpanKind) {
        self.flush_text();
        self.frames.push((Some(kind), Vec::new()));
    }

    fn close(&mut self) {
        self.flush_text();
        if self.frames.len() < 2 {
            return;
        }
        if let Some((Some(kind), children)) = self.frames.pop() {
            let node = match kind {
                SpanKind::Strong => Inline::Strong(children),
                SpanKind::Emphasis => Inline::Emphasis(children),
            };
            if let Some((_, parent)) = self.frames.last_mut() {
                parent.push(node);
            }
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        while self.frames.len() > 1 {
            self.close();
        }
        self.flush_text();
        self.frames.pop().map(|(_, nodes)| nodes).unwrap_or_default()
    }
}

fn build_tree(tokens: &[Token], emphasis: &[Option<SpanEdge>]) -> Vec<Inline> {
    let mut builder = TreeBuilder::new();

    for (token, edge) in tokens.iter().zip(emphasis) {
        match (token, edge) {
            (_, Some(SpanEdge::Open)) => builder.open(SpanKind::Emphasis),
            (_, Some(SpanEdge::Close)) => builder.close(),
            (Token::StrongOpen, None) => builder.open(SpanKind::Strong),
            (Token::StrongClose, None) => builder.close(),
            (Token::Char(c), None) => builder.text.push(*c),
        }
    }

    builder.finish()
}
