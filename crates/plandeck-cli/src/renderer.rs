//! Terminal rendering for rich markdown output
//!
//! Results go to stdout through termimad, or as plain text when color is
//! disabled. Warnings always go to stderr so they never mix with output
//! meant for pipes.

use plandeck_core::display::OperationStatus;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to stdout
    pub fn render(&self, markdown: &str) {
        if self.rich_enabled {
            for line in markdown.lines() {
                // Keep the hash marks of headers visible
                if line.starts_with('#') {
                    println!("\x1b[34m{line}\x1b[0m");
                } else {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        } else {
            print!("{markdown}");
        }
    }

    /// Print a non-fatal warning to stderr
    pub fn warn(&self, message: impl Into<String>) {
        let status = OperationStatus::warning(message);
        if self.rich_enabled {
            eprint!("\x1b[33m{status}\x1b[0m");
        } else {
            eprint!("{status}");
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
