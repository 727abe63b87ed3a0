//! ANSI color helpers for shell output.
//!
//! Colors are plain escape sequences, gated on the NO_COLOR standard
//! (https://no-color.org/) and on stdout being a terminal so piped output
//! stays clean.

use std::io::IsTerminal;

/// Colors used by the prompt and status output.
#[derive(Debug, Clone, Copy)]
pub enum Color {
    Green,
    Red,
    Yellow,
    Bold,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Green => "\x1b[92m",
            Color::Red => "\x1b[91m",
            Color::Yellow => "\x1b[93m",
            Color::Bold => "\x1b[1m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Whether stdout should carry ANSI codes.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Wrap `text` in the escape codes for `color`. The caller decides whether
/// to colorize at all (see [`should_colorize`]); this function always paints.
pub fn paint(text: &str, color: Color) -> String {
    format!("{}{}{}", color.code(), text, RESET)
}

/// Paint only when `enabled`, otherwise pass the text through.
pub fn paint_if(enabled: bool, text: &str, color: Color) -> String {
    if enabled {
        paint(text, color)
    } else {
        text.to_string()
    }
}
