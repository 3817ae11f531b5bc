//! Terminal front end

mod console;
mod repl;

pub use console::{render_block, Console, ConsoleObserver};
pub use repl::ChatRepl;
