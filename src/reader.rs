// src/reader.rs
//
// Input side: whole files read as UTF-8, split into lines with trailing
// whitespace removed, numbered by one counter that runs across every file of
// the run.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Read a text dump. Missing files and invalid UTF-8 are both fatal.
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Every character that ends a line. `\r\n` counts as one break.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Lines of `text` with trailing whitespace stripped.
///
/// Form feeds between pages and lone carriage returns end a line just as
/// `\n` does, so a running head after a page break starts its own line.
pub fn source_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(i) = rest.find(LINE_BREAKS) else {
            let line = rest;
            rest = "";
            return Some(line);
        };
        let line = &rest[..i];
        let tail = &rest[i..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
        Some(line)
    })
    .map(str::trim_end)
}

/// Global physical line counter. Starts at zero; the first line read is 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineCursor {
    line_no: usize,
}

impl LineCursor {
    pub fn advance(&mut self) -> usize {
        self.line_no += 1;
        self.line_no
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn strips_trailing_whitespace_only() {
        let lines: Vec<_> = source_lines("  a  \t\nb\r\n\n  c").collect();
        assert_eq!(lines, vec!["  a", "b", "", "  c"]);
    }

    #[test]
    fn splits_on_page_breaks_and_lone_returns() {
        let lines: Vec<_> = source_lines("a\x0cChapter 5\rb\r\nc\u{2028}d\x0be\u{85}f\n").collect();
        assert_eq!(lines, vec!["a", "Chapter 5", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn trailing_break_adds_no_line() {
        assert_eq!(source_lines("a\n\n").collect::<Vec<_>>(), vec!["a", ""]);
        assert_eq!(source_lines("").count(), 0);
    }

    #[test]
    fn cursor_counts_from_one() {
        let mut cursor = LineCursor::default();
        assert_eq!(cursor.line_no(), 0);
        assert_eq!(cursor.advance(), 1);
        assert_eq!(cursor.advance(), 2);
        assert_eq!(cursor.line_no(), 2);
    }

    #[test]
    fn reads_utf8_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Cæsar").unwrap();
        assert_eq!(read_document(file.path()).unwrap(), "Cæsar\n");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }
}
