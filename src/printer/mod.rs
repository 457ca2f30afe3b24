//! Console output for run summaries: colored status lines and Markdown tables.

use owo_colors::OwoColorize;
use termimad::MadSkin;

/// How a finished run went, as far as the operator is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every attempted round produced a measurement.
    Complete,
    /// Some rounds were dropped or the run was interrupted.
    Partial,
}

pub fn print_status(outcome: Outcome, text: &str) {
    match outcome {
        Outcome::Complete => println!("{}", text.green()),
        Outcome::Partial => println!("{}", text.yellow()),
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) { self.skin.print_text(text); println!(); }
}
