use colored::*;
use std::io::{self, Write};

use crate::conversation::{Message, MessageId, MessageView, Sender};
use crate::markdown::{Inline, ListKind, Node, RenderedBlock};
use crate::stream::ExchangeObserver;

/// Console handles all terminal I/O with colored formatting
#[derive(Debug, Clone, Copy)]
pub struct Console {
    user_color: Color,
    bot_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            user_color: Color::Cyan,
            bot_color: Color::Green,
        }
    }

    fn sender_color(&self, sender: Sender) -> Color {
        match sender {
            Sender::User => self.user_color,
            Sender::Bot => self.bot_color,
        }
    }

    /// Print a whole message, rendered if it is a finished bot reply
    pub fn print_message(&self, message: &Message) {
        let label = message.sender().label().color(self.sender_color(message.sender())).bold();
        match message.view() {
            MessageView::Raw(text) => println!("{} {}", label, text),
            MessageView::Rendered(block) => {
                println!("{}", label);
                print!("{}", render_block(&block));
            }
        }
    }

    /// Print the bot label before streamed text (without newline)
    pub fn print_bot_prefix(&self) {
        print!("{} ", Sender::Bot.label().color(self.bot_color).bold());
        let _ = io::stdout().flush();
    }

    /// Print a chunk of bot text as it streams in
    pub fn print_chunk(&self, chunk: &str) {
        print!("{}", chunk.dimmed());
        let _ = io::stdout().flush();
    }

    /// Print the formatted form of a finished reply
    pub fn print_rendered(&self, block: &RenderedBlock) {
        print!("{}", render_block(block));
        let _ = io::stdout().flush();
    }

    /// Print the waiting indicator
    pub fn print_loading(&self) {
        println!("{}", "... is generating response".italic().dimmed());
    }

    /// Print a newline
    pub fn println(&self) {
        println!();
    }

    /// Print a system message (errors, info, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Show the input prompt; the line itself is read by the caller
    pub fn print_prompt(&self) {
        print!("{} ", ">".color(self.user_color).bold());
        let _ = io::stdout().flush();
    }

    /// Print a welcome banner
    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  AI Assistant".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Type your message and press Enter. Ctrl-C stops a reply, or leaves when pressed at the prompt. 'exit' and 'quit' also leave.");
        println!();
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn render_inline(nodes: &[Inline], bold: bool, italic: bool, out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => {
                let mut styled = text.normal();
                if bold {
                    styled = styled.bold();
                }
                if italic {
                    styled = styled.italic();
                }
                out.push_str(&styled.to_string());
            }
            Inline::Strong(children) => render_inline(children, true, italic, out),
            Inline::Emphasis(children) => render_inline(children, bold, true, out),
        }
    }
}

fn inline_string(nodes: &[Inline]) -> String {
    let mut out = String::new();
    render_inline(nodes, false, false, &mut out);
    out
}

/// Render converted markup for a terminal, one line per node
pub fn render_block(block: &RenderedBlock) -> String {
    let mut out = String::new();
    let mut open: Option<ListKind> = None;
    // Position within the current numbered list
    let mut index = 0usize;

    for node in block {
        match node {
            Node::Heading { level, content } => {
                let text = crate::markdown::plain_text(content);
                let styled = match level.number() {
                    1 => text.bright_white().bold().underline(),
                    2 => text.bright_white().bold(),
                    _ => text.bold(),
                };
                out.push_str(&format!("{}\n", styled));
            }
            Node::Paragraph { content } => {
                out.push_str(&format!("{}\n", inline_string(content)));
            }
            Node::ListOpen { kind } => {
                open = Some(*kind);
                index = 0;
            }
            Node::ListItem { content } => {
                let marker = match open {
                    Some(ListKind::Numbered) => {
                        index += 1;
                        format!("{}.", index)
                    }
                    _ => "•".to_string(),
                };
                out.push_str(&format!("  {} {}\n", marker, inline_string(content)));
            }
            Node::ListClose { .. } => open = None,
        }
    }

    out
}

/// Prints an exchange to the terminal as it happens
///
/// Streamed text is echoed dimmed as it arrives; once the reply is finished
/// its formatted form is printed below.
pub struct ConsoleObserver {
    console: Console,
    streamed: Option<(MessageId, usize)>,
}

impl ConsoleObserver {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            streamed: None,
        }
    }
}

impl ExchangeObserver for ConsoleObserver {
    fn on_update(&mut self, message: &Message) {
        if message.sender() == Sender::User {
            return;
        }

        match self.streamed {
            Some((id, printed)) if id == message.id() => {
                let content = message.content();
                if content.len() > printed {
                    self.console.print_chunk(&content[printed..]);
                }
                self.streamed = Some((id, content.len()));
            }
            _ if message.is_streaming() => {
                self.console.print_bot_prefix();
                self.console.print_chunk(message.content());
                self.streamed = Some((message.id(), message.content().len()));
            }
            _ => {
                self.console.print_message(message);
                return;
            }
        }

        if !message.is_streaming() {
            self.console.println();
            self.console.print_separator();
            if let MessageView::Rendered(block) = message.view() {
                self.console.print_rendered(&block);
            }
            self.streamed = None;
        }
    }

    fn on_loading(&mut self, loading: bool) {
        if loading {
            self.console.print_loading();
        }
    }
}
