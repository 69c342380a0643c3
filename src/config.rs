// src/config.rs
//
// Tunables for a conversion run. The defaults are the layout conventions of the
// book the pattern battery was written for.

/// Number of leading physical lines rendered as the centered title block.
pub const DEFAULT_TITLE_LINES: usize = 5;

/// Target width for dot-leader lines and the longest line whose full stop
/// still ends a paragraph.
pub const DEFAULT_STOP_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Lines 1..=title_lines (global line counter) become `<H1>`..`<Hn>`.
    pub title_lines: usize,
    /// Width in characters, see [`DEFAULT_STOP_WIDTH`].
    pub stop_width: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            title_lines: DEFAULT_TITLE_LINES,
            stop_width: DEFAULT_STOP_WIDTH,
        }
    }
}

impl Options {
    /// Options with the title block switched off; handy when feeding fragments.
    pub fn without_title(self) -> Self {
        Self {
            title_lines: 0,
            ..self
        }
    }
}
