//! Console output for index runs.
//!
//! The runner talks to a [`Reporter`] so that output can be styled for a
//! terminal or captured in tests.

use std::sync::Mutex;
use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar layout: current/max, bar, percent, elapsed/estimated, item.
pub const PROGRESS_TEMPLATE: &str =
    "{pos}/{len} [{bar:28.cyan/blue}] {percent:>3}% {elapsed:>6}/{eta:<6} {msg}";

/// Sink for everything an index run prints.
pub trait Reporter: Send + Sync {
    fn title(&self, message: &str);
    fn section(&self, message: &str);
    fn note(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);

    /// Start a progress sequence of `total` items.
    fn progress_start(&self, total: u64);
    /// One more item processed; `position` counts from 1.
    fn progress_advance(&self, position: u64, label: &str);
    /// Remove the progress display.
    fn progress_clear(&self);
}

/// Kind of a one-line message, which picks its marker and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Note,
    Warning,
    Error,
    Success,
}

impl Level {
    fn paint<'a>(self, text: &'a str) -> StyledObject<&'a str> {
        let styled = style(text);
        match self {
            Level::Note => styled.cyan(),
            Level::Warning => styled.yellow(),
            Level::Error => styled.red(),
            Level::Success => styled.green(),
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Level::Note => "→",
            Level::Warning => "!",
            Level::Error => "✗",
            Level::Success => "✓",
        }
    }

    fn line(self, message: &str) -> String {
        let marker = self.paint(self.marker());
        match self {
            // Notes sit under a section, only the marker is colored
            Level::Note => format!("  {} {}", marker, message),
            _ => format!("{} {}", marker, self.paint(message)),
        }
    }
}

/// Styled terminal output with an indicatif progress bar.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Print a line without tearing an active progress bar.
    fn println(&self, line: String) {
        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.println(line),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn title(&self, message: &str) {
        let underline = "=".repeat(console::measure_text_width(message));
        self.println(format!(
            "\n{}\n{}\n",
            style(message).green().bold(),
            style(underline).green()
        ));
    }

    fn section(&self, message: &str) {
        let underline = "-".repeat(console::measure_text_width(message));
        self.println(format!(
            "\n{}\n{}",
            style(message).yellow().bold(),
            style(underline).yellow()
        ));
    }

    fn note(&self, message: &str) {
        self.println(Level::Note.line(message));
    }

    fn warning(&self, message: &str) {
        self.println(Level::Warning.line(message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", Level::Error.line(message));
    }

    fn success(&self, message: &str) {
        self.println(Level::Success.line(message));
    }

    fn progress_start(&self, total: u64) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(Self::create_progress_bar(total));
        }
    }

    fn progress_advance(&self, position: u64, label: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(style(label).green().to_string());
                pb.set_position(position);
            }
        }
    }

    fn progress_clear(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}
