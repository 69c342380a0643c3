// src/patterns.rs
//
// The recognizer battery. Every test the converter makes against a line lives
// here; nothing in this module holds state, so one `Patterns` is built per run
// and shared by reference.
//
// The boilerplate strings are those of one particular book dump ("Programming
// Algol 68 Made Easy"): running heads, stray folios, roman contents folios and
// the dedication page. They are not expected to generalise.

use std::borrow::Cow;

use memchr::memmem;
use regex::{Captures, Regex};

use crate::error::Result;

/* =============================== Pattern text ============================ */

/// Whole-line boilerplate. Each entry is anchored at both ends.
const IGNORE_LINES: &[&str] = &[
    r"Contents\s{10}\s+Index",
    r"Appendix A\.  Answers\s+5[0-9]{2}",
    r"\s+[1-9][0-9]*\s*",
    r"\s+x*iv\s*",
    r"Contents\s{10}\s+[xvi]+",
    r"CONTENTS\s{10}\s+[xvi]+",
    r"INDEX\s{10}\s+[56][0-9]{2}",
];

/// Dedication page lines, each preceded by at least ten spaces.
const SPECIAL_LINES: &[&str] = &[
    "Sian Leitch",
    "Inbhir Nis",
    "March 2003",
    "To$",
    "Aad van Wijngaarden",
    "Father of Algol 68",
];

const PAGE_BREAK: &str =
    r"^Chapter [1-9][0-9]*\.  [A-Z][a-zæ]+(?:\s+[A-Za-z][a-z]+)*\s+(?P<page>[1-9][0-9]*)";
const HEADING: &str = r"^(?:[1-9][0-9]*(?:\.[1-9][0-9]*)+\s+|Chapter [1-9][0-9]*$|Preface$)";
const CHAPTER: &str = r"^Chapter [1-9][0-9]*$";
const EXERCISE: &str = r"^Ex [1-9]";
const PAGE_REF: &str = r"[1-9][0-9]*,|[1-9][0-9]*$|[A1-9][0-9]*\.[1-9][0-9.]*";
const PARAGRAPH: &str = r"^(?: {3,4}(?:[IA] |[A-Z][a-z])|[A-Za-z]).*\s";
const RULE: &str = r"___+";
const CONTINUATION: &str = r"[a-z]-$";
const RIGHT_COLUMN: &str = r"^\s{26,}";
const GLUED_NUMBER: &str = r"\s[1-9][0-9]*([A-Z][a-z]+)";
const WHITESPACE: &str = r"\s+";

/// Three dot-leader cells in a row: the mark of a contents line.
pub const LEADER_RUN: &str = ".  .  .";
/// Two dot-leader cells.
pub const LEADER_PAIR: &str = ".  .";

/// The deep-indented exercise answer marker and its two replacements.
pub const A_PREFIX: &str = "     (a)";
pub const A_PREFIX_SHALLOW: &str = " (a)";
/// Once an emitted line contains this, `A_PREFIX` is left alone.
pub const A_PREFIX_MARKER: &str = "(a)  cur file:=NIL";

/// Literal fixes applied to body text before classification.
const BODY_FIXES: &[(&str, &str)] = &[
    ("Kl\u{a8}oke", "Kl\u{f6}ke"),
    ("c &#x25CB;", "&copy;"),
    ("&#x2219;", "&bull;"),
];

/* ================================ Battery ================================ */

#[derive(Debug, Clone)]
pub struct Patterns {
    ignore: Regex,
    page_break: Regex,
    heading: Regex,
    chapter: Regex,
    exercise: Regex,
    special: Regex,
    paragraph: Regex,
    rule: Regex,
    continuation: Regex,
    right_column: Regex,
    glued_number: Regex,
    whitespace: Regex,
    pub(crate) page_ref: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        let ignore = format!("^(?:{})$", IGNORE_LINES.join("|"));
        let special = format!(r"^\s{{10}}\s*(?:{})", SPECIAL_LINES.join("|"));

        Ok(Self {
            ignore: Regex::new(&ignore)?,
            page_break: Regex::new(PAGE_BREAK)?,
            heading: Regex::new(HEADING)?,
            chapter: Regex::new(CHAPTER)?,
            exercise: Regex::new(EXERCISE)?,
            special: Regex::new(&special)?,
            paragraph: Regex::new(PARAGRAPH)?,
            rule: Regex::new(RULE)?,
            continuation: Regex::new(CONTINUATION)?,
            right_column: Regex::new(RIGHT_COLUMN)?,
            glued_number: Regex::new(GLUED_NUMBER)?,
            whitespace: Regex::new(WHITESPACE)?,
            page_ref: Regex::new(PAGE_REF)?,
        })
    }

    /// Running heads, stray folios and other pagination debris.
    pub fn is_ignored(&self, line: &str) -> bool {
        self.ignore.is_match(line)
    }

    /// A chapter running head; the `page` group holds the folio.
    pub fn page_break<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        self.page_break.captures(line)
    }

    pub fn is_heading(&self, line: &str) -> bool {
        self.heading.is_match(line)
    }

    /// A bare `Chapter <n>` line.
    pub fn is_chapter(&self, line: &str) -> bool {
        self.chapter.is_match(line)
    }

    pub fn is_exercise(&self, line: &str) -> bool {
        self.exercise.is_match(line)
    }

    pub fn is_special(&self, line: &str) -> bool {
        self.special.is_match(line)
    }

    /// Prose by indentation and initial capital.
    pub fn is_paragraph(&self, line: &str) -> bool {
        self.paragraph.is_match(line)
    }

    pub fn is_right_column(&self, line: &str) -> bool {
        self.right_column.is_match(line)
    }

    /// Ends in a lowercase letter and a hyphen: a word broken across lines.
    pub fn is_continued(&self, line: &str) -> bool {
        self.continuation.is_match(line)
    }

    pub fn has_rule(&self, line: &str) -> bool {
        self.rule.is_match(line)
    }

    /// Replace every underscore rule in `line` with `markup`.
    pub fn replace_rules<'l>(&self, line: &'l str, markup: &str) -> Cow<'l, str> {
        self.rule.replace_all(line, regex::NoExpand(markup))
    }

    /// Whitespace runs to `_`, for chapter heading ids.
    pub fn underscore_whitespace<'l>(&self, line: &'l str) -> Cow<'l, str> {
        self.whitespace.replace_all(line, "_")
    }

    /// Book-specific spelling and entity repairs for body text.
    pub fn fix_body(&self, line: &str) -> String {
        let mut fixed = self.glued_number.replace_all(line, "$1").into_owned();
        for (from, to) in BODY_FIXES {
            if fixed.contains(from) {
                fixed = fixed.replace(from, to);
            }
        }
        fixed
    }
}

/* ============================ Literal markers ============================ */

pub fn has_leader_run(line: &str) -> bool {
    memmem::find(line.as_bytes(), LEADER_RUN.as_bytes()).is_some()
}

pub fn has_leader(line: &str) -> bool {
    memmem::find(line.as_bytes(), LEADER_PAIR.as_bytes()).is_some()
}

pub fn has_a_prefix(line: &str) -> bool {
    memmem::find(line.as_bytes(), A_PREFIX.as_bytes()).is_some()
}

pub fn has_a_prefix_marker(line: &str) -> bool {
    memmem::find(line.as_bytes(), A_PREFIX_MARKER.as_bytes()).is_some()
}

/// `æ` is not safe in every consumer of the output; spell it as an entity.
pub fn encode_ligatures(line: &str) -> Cow<'_, str> {
    if line.contains('\u{e6}') {
        Cow::Owned(line.replace('\u{e6}', "&aelig;"))
    } else {
        Cow::Borrowed(line)
    }
}

/// Split a numbered heading into its id parts: the leading token and the text
/// after it, both with periods turned into underscores.
pub fn heading_ids(line: &str) -> (String, String) {
    let (number, text) = match line.find(char::is_whitespace) {
        Some(i) => (&line[..i], line[i..].trim_start()),
        None => (line, ""),
    };
    (number.replace('.', "_"), text.replace('.', "_"))
}
