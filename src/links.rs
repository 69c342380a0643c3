// src/links.rs
//
// Page references. Contents and index lines end in folios ("129"), folio lists
// ("12, 34") or section numbers ("A.1.2"); each becomes a link to the anchor
// the converter drops at the matching page break or heading.

use std::borrow::Cow;

use crate::patterns::{has_leader_run, Patterns, LEADER_PAIR, LEADER_RUN};

/// Anchor name for a page or section token: periods become underscores.
pub fn anchor_name(token: &str) -> String {
    token.replace('.', "_")
}

/// Render one page-reference token as a link.
///
/// A trailing comma is kept out of the link text and re-appended after it, so
/// `"12,"` gives `<a href="#12">12</a>,`.
pub fn page_ref(token: &str) -> String {
    let (page, tail) = match token.strip_suffix(',') {
        Some(page) => (page, ","),
        None => (token, ""),
    };
    format!(r##"<a href="#{}">{page}</a>{tail}"##, anchor_name(page))
}

/// Link every page-reference token in `line`.
pub fn link_pages<'l>(patterns: &Patterns, line: &'l str) -> Cow<'l, str> {
    patterns
        .page_ref
        .replace_all(line, |caps: &regex::Captures<'_>| page_ref(&caps[0]))
}

/// Even out dot leaders so contents lines line up at `width` characters.
///
/// Lines longer than `width` lose leader cells until they fit (or the run is
/// gone); shorter ones are padded one space at a time in front of the leaders.
pub fn normalize_leaders(line: &str, width: usize) -> Cow<'_, str> {
    if !has_leader_run(line) {
        return Cow::Borrowed(line);
    }

    let mut line = line.to_string();
    while has_leader_run(&line) && line.chars().count() > width {
        line = line.replacen(LEADER_RUN, LEADER_PAIR, 1);
    }
    while has_leader_run(&line) && line.chars().count() < width {
        line = line.replacen(LEADER_PAIR, " .  .", 1);
    }
    Cow::Owned(line)
}
