//! HTML serialization of converted markup
//!
//! All text is escaped here, so model output can never inject tags.

use super::block::{Node, RenderedBlock};
use super::inline::Inline;

const PARAGRAPH_CLASS: &str = "my-1 leading-relaxed text-sm text-foreground/90";

/// Escape text for use in HTML element content or a quoted attribute
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_inline(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                write_inline(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                write_inline(children, out);
                out.push_str("</em>");
            }
        }
    }
}

fn node_html(node: &Node) -> String {
    let mut out = String::new();
    match node {
        Node::Heading { level, content } => {
            let n = level.number();
            out.push_str(&format!("<h{} class=\"{}\">", n, level.css_class()));
            write_inline(content, &mut out);
            out.push_str(&format!("</h{}>", n));
        }
        Node::Paragraph { content } => {
            out.push_str(&format!("<p class=\"{}\">", PARAGRAPH_CLASS));
            write_inline(content, &mut out);
            out.push_str("</p>");
        }
        Node::ListOpen { kind } => {
            out.push_str(&format!("<{} class=\"{}\">", kind.html_tag(), kind.css_class()));
        }
        Node::ListItem { content } => {
            out.push_str("<li>");
            write_inline(content, &mut out);
            out.push_str("</li>");
        }
        Node::ListClose { kind } => {
            out.push_str(&format!("</{}>", kind.html_tag()));
        }
    }
    out
}

impl RenderedBlock {
    /// Serialize to HTML, one node per line
    pub fn to_html(&self) -> String {
        self.iter().map(node_html).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::markdown::convert;

    #[test]
    fn test_paragraph_with_emphasis() {
        assert_eq!(
            convert("a **b** *c*").to_html(),
            "<p class=\"my-1 leading-relaxed text-sm text-foreground/90\">a <strong>b</strong> <em>c</em></p>"
        );
    }

    #[test]
    fn test_list_html() {
        let html = convert("1. x\n* y").to_html();
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("<ol class=\""));
        assert!(lines[0].contains("list-decimal"));
        assert_eq!(lines[1], "<li>x</li>");
        assert_eq!(lines[2], "</ol>");
        assert!(lines[3].contains("list-disc"));
        assert_eq!(lines[4], "<li>y</li>");
        assert_eq!(lines[5], "</ul>");
    }

    #[test]
    fn test_heading_html_carries_level_class() {
        let html = convert("# Big").to_html();
        assert_eq!(
            html,
            "<h1 class=\"text-2xl font-bold mt-4 mb-2 text-foreground\">Big</h1>"
        );
    }

    #[test]
    fn test_markup_in_text_is_escaped() {
        let html = convert("<h1>fake</h1> & <script>x</script>").to_html();
        assert!(html.starts_with("<p "));
        assert!(html.contains("&lt;h1&gt;fake&lt;/h1&gt; &amp; &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_block_is_empty_html() {
        assert_eq!(convert("").to_html(), "");
    }
}
