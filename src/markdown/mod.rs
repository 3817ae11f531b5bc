//! Markdown conversion for finished bot replies
//!
//! A small, deterministic subset of markdown:
//!
//! | Syntax | Result |
//! |--------|--------|
//! | `**X**` | strong span |
//! | `*X*` | emphasis span |
//! | `#`, `##`, `###` + space at line start | heading, levels 1 to 3 |
//! | `* item` | bullet list item |
//! | `1. item` | numbered list item |
//! | anything else non-blank | paragraph |
//!
//! Output is a typed [`RenderedBlock`], not a markup string. Use
//! [`RenderedBlock::to_html`] when an escaped HTML string is needed.
//!
//! ```ignore
//! let block = chatmark::markdown::convert("## Services\n* Training\n* Consulting");
//! assert_eq!(block.len(), 5);
//! ```

mod block;
mod html;
mod inline;

pub use block::{convert, HeadingLevel, ListKind, Node, RenderedBlock};
pub use html::escape;
pub use inline::{parse_inline, plain_text, Inline};
