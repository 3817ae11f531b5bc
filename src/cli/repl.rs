//! Interactive chat loop
//!
//! Reads a line, runs one exchange, prints the reply, repeats. Input is not
//! read while an exchange is in flight.
//!
//! One Ctrl-C listener lives for the whole loop: while a reply streams it
//! stops that reply, at the prompt it ends the loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::console::{Console, ConsoleObserver};
use crate::core::{ChatError, ChatResult};
use crate::stream::{ChatSession, ExchangeOutcome};

/// Terminal front end for a [`ChatSession`]
pub struct ChatRepl {
    console: Console,
    session: ChatSession,
}

impl ChatRepl {
    pub fn new(console: Console, session: ChatSession) -> Self {
        Self { console, session }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run on stdin until the user exits, presses Ctrl-C at the prompt, or
    /// closes the input
    pub async fn run(&mut self) -> ChatResult<()> {
        let (interrupts, listener) = listen_for_interrupts();
        let result = self
            .run_with(BufReader::new(tokio::io::stdin()), interrupts)
            .await;
        listener.abort();
        result
    }

    async fn run_with<R>(
        &mut self,
        input: R,
        mut interrupts: mpsc::UnboundedReceiver<()>,
    ) -> ChatResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        tracing::info!("Starting chat loop (session {})", self.session.session_id());
        self.console.print_banner();

        for message in self.session.conversation().messages() {
            self.console.print_message(message);
        }
        self.console.println();

        let mut lines = input.lines();
        loop {
            self.console.print_prompt();

            let line = tokio::select! {
                biased;
                Some(()) = interrupts.recv() => {
                    tracing::info!("Interrupted at the prompt");
                    self.console.println();
                    self.console.print_system("Goodbye!");
                    break;
                }
                line = lines.next_line() => line,
            };

            let user_input = match line {
                Ok(Some(line)) => line.trim().to_string(),
                Ok(None) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read user input: {}", e);
                    self.console
                        .print_error(&format!("Failed to read input: {}", e));
                    return Err(ChatError::Io(e));
                }
            };

            if is_exit_command(&user_input) {
                tracing::info!("User requested exit");
                self.console.print_system("Goodbye!");
                break;
            }

            if user_input.is_empty() {
                continue;
            }

            self.console.println();
            self.exchange(&user_input, &mut interrupts).await;
            self.console.println();
            self.console.print_separator();
        }

        tracing::info!("Chat loop ended");
        Ok(())
    }

    async fn exchange(&mut self, query: &str, interrupts: &mut mpsc::UnboundedReceiver<()>) {
        let cancel = CancellationToken::new();
        let mut observer = ConsoleObserver::new(self.console);

        let send = self.session.send_with_cancel(query, &cancel, &mut observer);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                result = &mut send => break result,
                Some(()) = interrupts.recv() => {
                    tracing::info!("Interrupt received, stopping reply");
                    cancel.cancel();
                }
            }
        };

        match result {
            Ok(ExchangeOutcome::NoResponse) => {
                self.console.print_system("The assistant sent an empty reply.");
            }
            Ok(ExchangeOutcome::Cancelled(_)) => {
                self.console.println();
                self.console.print_system("Reply stopped.");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Exchange rejected: {}", e);
                self.console.print_error(&e.to_string());
            }
        }
    }
}

/// Forward every Ctrl-C to a channel until the receiver is dropped
fn listen_for_interrupts() -> (mpsc::UnboundedReceiver<()>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    (rx, listener)
}

fn is_exit_command(input: &str) -> bool {
    let input = input.to_lowercase();
    input == "exit" || input == "quit"
}
