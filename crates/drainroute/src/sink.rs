//! User-visible progress and error reporting.

use colored::Colorize;

/// Receiver for user-visible messages produced during a run.
///
/// The routing engine narrates its steps through this trait and never writes
/// to stdout/stderr directly.
pub trait MessageSink {
    /// Report a progress message.
    fn info(&self, text: &str);

    /// Report an error message.
    fn error(&self, text: &str);
}

/// Sink that writes to the console, errors in red on stderr.
pub struct ConsoleSink {
    quiet: bool,
    color: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self { quiet, color }
    }
}

impl MessageSink for ConsoleSink {
    fn info(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    fn error(&self, text: &str) {
        // Errors are never suppressed by --quiet.
        if self.color {
            eprintln!("{} {}", "error:".red().bold(), text);
        } else {
            eprintln!("error: {text}");
        }
    }
}

/// Sink that records messages in memory. Used by tests.
#[derive(Default)]
pub struct VecSink {
    messages: std::cell::RefCell<Vec<String>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far, info and error alike.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl MessageSink for VecSink {
    fn info(&self, text: &str) {
        self.messages.borrow_mut().push(text.to_string());
    }

    fn error(&self, text: &str) {
        self.messages.borrow_mut().push(format!("error: {text}"));
    }
}
