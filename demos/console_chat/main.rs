//! Console Chat Example
//!
//! Talks to a streaming chat backend from the terminal:
//! - replies stream in as they are generated
//! - finished replies are printed formatted (headings, lists, emphasis)
//! - Ctrl-C stops the current reply
//!
//! Configure with CHAT_API_ENDPOINT (default http://127.0.0.1:8000/chat).
//!
//! Run with: cargo run --example console_chat

use anyhow::Result;

use chatmark::{
    cli::{ChatRepl, Console},
    config::ChatConfig,
    logging::init_logging,
    stream::ChatSession,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("logs")?;

    let config = ChatConfig::from_env()?;
    println!("[Setup] Chat endpoint: {}", config.endpoint);

    let session = ChatSession::new(&config)?;
    println!("[Setup] Session: {}", session.session_id());

    let mut repl = ChatRepl::new(Console::new(), session);
    repl.run().await?;

    Ok(())
}
