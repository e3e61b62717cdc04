//! Terminal styling helpers
//!
//! Colors are applied only when stdout supports them; anstream strips
//! anything left over when output is redirected.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark for completed steps
pub const CHECK: &str = "✓";
/// Cross for failed steps
pub const CROSS: &str = "✗";
/// Arrow for sub-steps and relationships
pub const ARROW: &str = "→";

/// Semantic colors for CLI output
pub trait Stylize: Display + Sized {
    /// Names the user should notice (branches, counts)
    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Secondary detail
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Headings
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Completed work
    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Needs attention
    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    /// Failures, written to stderr
    fn error(&self) -> String {
        self.if_supports_color(Stream::Stderr, |t| t.red())
            .to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.if_supports_color(Stream::Stdout, |t| t.red())
        .to_string()
}

/// Dimmed arrow
pub fn arrow() -> String {
    ARROW.muted()
}

/// Branch colors by tree depth
const DEPTH_COLORS: [owo_colors::AnsiColors; 5] = [
    owo_colors::AnsiColors::Blue,
    owo_colors::AnsiColors::Cyan,
    owo_colors::AnsiColors::Green,
    owo_colors::AnsiColors::Magenta,
    owo_colors::AnsiColors::Yellow,
];

/// Color a tree line by its depth
pub fn depth_colored(text: &str, depth: usize) -> String {
    let color = DEPTH_COLORS[depth % DEPTH_COLORS.len()];
    text.if_supports_color(Stream::Stdout, |t| t.color(color))
        .to_string()
}

/// Clickable link where the terminal supports it, plain URL otherwise
pub fn link(text: &str, url: &str) -> String {
    if url.is_empty() {
        return text.to_string();
    }
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(text, url).to_string()
    } else {
        format!("{text} {}", url.muted())
    }
}

/// Spinner style shared by long-running network steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
