// src/converter.rs
//
// The block state machine. One line at a time:
//
//   1. classify the line (`LineKind`): pagination debris, page break, title
//      block, chapter heading and its title, dedication, index start, index
//      entry, or body text;
//   2. for body text, pick the block it belongs to (heading, paragraph,
//      preformatted) and emit the close/open tags the change of block implies.
//
// Per-file state is reset at the top of every file. The line counter, the set
// of heading ids already used and the "(a)" prefix convention live for the
// whole run.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::config::Options;
use crate::emit::Emitter;
use crate::error::{Error, Result};
use crate::links::{link_pages, normalize_leaders};
use crate::patterns::{
    encode_ligatures, has_a_prefix, has_a_prefix_marker, has_leader, has_leader_run, heading_ids,
    Patterns, A_PREFIX, A_PREFIX_SHALLOW,
};
use crate::reader::{read_document, source_lines, LineCursor};

/* ================================ Markup ================================= */

const INDEX_HEADING: &str = "<H2><CENTER>Index</CENTER></H2>";
const INDEX_OPEN: &str = r#"<TABLE border="2" valign=top width="90%"><TR><TD valign=top><pre>"#;
const INDEX_NEXT_CELL: &str = "</pre></td><td valign=top><pre>";
const INDEX_NEXT_ROW: &str = "</pre></td></tr><tr><td valign=top><pre>";
const INDEX_CLOSE: &str = "</pre></td></tr></TABLE>";

const RULE_OPEN: &str = r#"<table  border="2" width="90%"><tr><td>"#;
const RULE_CLOSE: &str = "</td></tr></table>";

/* ================================= Types ================================= */

/// Typographic column of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The block the previous line left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    None,
    Heading,
    Paragraph,
    Preformatted,
    Index(Side),
}

/// What a line is, before any body-level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'l> {
    Blank,
    Ignore,
    PageBreak(&'l str),
    /// Title block line at the given heading level.
    Title(usize),
    /// Bare `Chapter <n>`.
    Chapter,
    /// The line after a bare chapter line.
    ChapterTitle,
    Special,
    IndexStart,
    Index(Side),
    Body,
}

#[derive(Debug, Clone, Copy)]
struct FileState {
    mode: Mode,
    after_chapter: bool,
    continuation: bool,
    table_open: bool,
}

impl Default for FileState {
    fn default() -> Self {
        Self {
            mode: Mode::None,
            after_chapter: false,
            continuation: false,
            // A rule before any other closes rather than opens.
            table_open: true,
        }
    }
}

/* =============================== Converter =============================== */

pub struct Converter<W: Write> {
    patterns: Patterns,
    opts: Options,
    out: Emitter<W>,
    cursor: LineCursor,
    seen_ids: HashSet<String>,
    a_prefix: &'static str,
    state: FileState,
}

impl<W: Write> Converter<W> {
    pub fn new(opts: Options, output: W) -> Result<Self> {
        Ok(Self::with_patterns(Patterns::new()?, opts, output))
    }

    pub fn with_patterns(patterns: Patterns, opts: Options, output: W) -> Self {
        Self {
            patterns,
            opts,
            out: Emitter::new(output),
            cursor: LineCursor::default(),
            seen_ids: HashSet::new(),
            a_prefix: A_PREFIX_SHALLOW,
            state: FileState::default(),
        }
    }

    /// Convert one input file, appending to the output.
    pub fn convert_file(&mut self, path: &Path) -> Result<()> {
        let text = read_document(path)?;
        log::debug!("converting {}", path.display());
        self.convert_str(&text)
    }

    /// Convert the text of one file. Block state starts fresh; the line
    /// counter and heading ids carry over from earlier files.
    pub fn convert_str(&mut self, text: &str) -> Result<()> {
        self.state = FileState::default();
        let first = self.cursor.line_no() + 1;

        for line in source_lines(text) {
            let line_no = self.cursor.advance();
            self.process_line(line_no, line)?;
        }
        self.finish_file()?;

        log::debug!("lines {first}..={} done", self.cursor.line_no());
        Ok(())
    }

    /// Flush and hand back the output.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out.into_inner())
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Decide what `line` is. `prepared` is the line after dot-leader
    /// normalization and linking, which is what everything past the title
    /// block is tested against.
    pub fn classify<'l>(
        &self,
        line_no: usize,
        line: &'l str,
        prepared: &str,
    ) -> Result<LineKind<'l>> {
        if self.patterns.is_ignored(line) {
            return Ok(LineKind::Ignore);
        }
        if let Some(caps) = self.patterns.page_break(line) {
            let page = caps.name("page").ok_or_else(|| Error::MissingPageNumber {
                line_no,
                line: line.to_string(),
            })?;
            return Ok(LineKind::PageBreak(page.as_str()));
        }
        if line.is_empty() {
            return Ok(LineKind::Blank);
        }
        if line_no <= self.opts.title_lines {
            return Ok(LineKind::Title(line_no));
        }
        if self.patterns.is_chapter(prepared) {
            return Ok(LineKind::Chapter);
        }
        if self.state.after_chapter {
            return Ok(LineKind::ChapterTitle);
        }
        if self.patterns.is_special(prepared) {
            return Ok(LineKind::Special);
        }
        if prepared == "Index" {
            return Ok(LineKind::IndexStart);
        }
        if let Mode::Index(_) = self.state.mode {
            let side = if self.patterns.is_right_column(prepared) {
                Side::Right
            } else {
                Side::Left
            };
            return Ok(LineKind::Index(side));
        }
        Ok(LineKind::Body)
    }

    fn process_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let leveled = normalize_leaders(line, self.opts.stop_width);
        let linked;
        let prepared: &str = if has_leader(&leveled) {
            linked = link_pages(&self.patterns, &leveled);
            &linked
        } else {
            &leveled
        };

        let kind = self.classify(line_no, line, prepared)?;
        log::trace!("{line_no}: {kind:?}");

        match kind {
            LineKind::Blank => {
                if let Mode::Index(_) = self.state.mode {
                    self.out.emit_line("")?;
                }
            }
            LineKind::Ignore => self.out.comment(line)?,
            LineKind::PageBreak(page) => {
                self.out.emit(&format!(r#"<a name="{page}"></a>"#))?;
                self.out.comment(line)?;
            }
            LineKind::Title(level) => {
                self.out
                    .emit_line(&format!("<CENTER><H{level}>{line}</H{level}></CENTER>"))?;
            }
            LineKind::Chapter => {
                self.close_block()?;
                let id = self.patterns.underscore_whitespace(prepared);
                self.out.emit_line(&format!(
                    r#"<HR><H2 ID="{id}"><CENTER>{prepared}</CENTER></H2>"#
                ))?;
                self.state.after_chapter = true;
                log::debug!("{prepared} at line {line_no}");
            }
            LineKind::ChapterTitle => {
                self.close_block()?;
                let id = self.patterns.underscore_whitespace(prepared);
                self.out
                    .emit_line(&format!(r#"<H2 ID="{id}"><CENTER>{prepared}</CENTER></H2>"#))?;
                self.state.after_chapter = false;
            }
            LineKind::Special => {
                self.close_block()?;
                self.out
                    .emit_line(&format!("<H3><CENTER>{}</CENTER></H3>", prepared.trim()))?;
            }
            LineKind::IndexStart => {
                self.close_block()?;
                self.out.emit_line(INDEX_HEADING)?;
                self.out.emit_line(INDEX_OPEN)?;
                self.state.mode = Mode::Index(Side::Left);
                log::debug!("index starts at line {line_no}");
            }
            LineKind::Index(side) => self.index_line(side, &leveled)?,
            LineKind::Body => self.body_line(prepared)?,
        }
        Ok(())
    }

    /* ============================ Index table ============================ */

    fn index_line(&mut self, side: Side, line: &str) -> Result<()> {
        let previous = match self.state.mode {
            Mode::Index(previous) => previous,
            _ => Side::Left,
        };
        match (previous, side) {
            (Side::Left, Side::Right) => self.out.emit(INDEX_NEXT_CELL)?,
            (Side::Right, Side::Left) => self.out.emit(INDEX_NEXT_ROW)?,
            _ => {}
        }

        let entry = match side {
            Side::Right => line.trim_start(),
            Side::Left => line,
        };
        self.out.emit_line(&link_pages(&self.patterns, entry))?;
        self.state.mode = Mode::Index(side);
        Ok(())
    }

    /* ============================== Body text ============================ */

    fn classify_body(&self, line: &str) -> Mode {
        let leaders = has_leader_run(line);
        let exercise = self.patterns.is_exercise(line);

        if self.patterns.is_heading(line) && !leaders && !exercise {
            Mode::Heading
        } else if exercise {
            Mode::Preformatted
        } else if self.patterns.is_paragraph(line) {
            Mode::Paragraph
        } else if line.starts_with(' ') || leaders {
            Mode::Preformatted
        } else {
            Mode::Paragraph
        }
    }

    fn body_line(&mut self, line: &str) -> Result<()> {
        let mut text = self.patterns.fix_body(line);
        let mode = if self.state.continuation {
            text = text.trim_start().to_string();
            Mode::Paragraph
        } else {
            self.classify_body(&text)
        };
        let mut text = encode_ligatures(&text).into_owned();

        let previous = self.state.mode;
        if previous != mode {
            self.close_block()?;
        }

        if mode == Mode::Heading {
            return self.heading(&text);
        }

        if mode == Mode::Preformatted && previous != Mode::Preformatted {
            self.out.emit("<pre>\n")?;
            if text.starts_with("     ") && !has_a_prefix(&text) {
                text.replace_range(..2, "");
            }
        }
        if mode == Mode::Paragraph && previous != Mode::Paragraph {
            self.out.emit("<p>")?;
        }

        if self.patterns.has_rule(&text) {
            let markup = if previous != Mode::Preformatted && !self.state.table_open {
                self.state.table_open = true;
                RULE_OPEN
            } else {
                self.state.table_open = false;
                RULE_CLOSE
            };
            text = self.patterns.replace_rules(&text, markup).into_owned();
        }

        if mode != Mode::Preformatted && self.patterns.is_continued(&text) {
            self.out.emit(&text[..text.len() - 1])?;
            self.state.continuation = true;
        } else {
            if has_a_prefix(&text) {
                text = text.replace(A_PREFIX, self.a_prefix);
            }
            self.out.emit_line(&text)?;
            if self.a_prefix == A_PREFIX_SHALLOW && has_a_prefix_marker(&text) {
                self.a_prefix = A_PREFIX;
                log::debug!("\"(a)\" lines keep their indent from here on");
            }
            self.state.continuation = false;
        }

        self.state.mode = mode;
        if mode == Mode::Paragraph
            && text.ends_with('.')
            && text.chars().count() <= self.opts.stop_width
        {
            self.close_block()?;
        }
        Ok(())
    }

    fn heading(&mut self, text: &str) -> Result<()> {
        let (primary, secondary) = heading_ids(text);
        if self.seen_ids.contains(&secondary) {
            log::debug!("heading id {secondary:?} already used, keeping only {primary:?}");
            self.out
                .emit_line(&format!(r#"<H3 id="{primary}">{text}</H3>"#))?;
        } else {
            self.out.emit_line(&format!(
                r#"<H3 id="{primary}" id="{secondary}">{text}</H3>"#
            ))?;
            self.seen_ids.insert(secondary);
        }
        self.state.mode = Mode::Heading;
        Ok(())
    }

    /* ============================= Block ends ============================ */

    /// Close an open paragraph or preformatted block. The index table stays
    /// open until the end of the file.
    fn close_block(&mut self) -> Result<()> {
        match self.state.mode {
            Mode::Paragraph => self.out.emit("</p>")?,
            Mode::Preformatted => self.out.emit("</pre>")?,
            Mode::Index(_) => return Ok(()),
            Mode::None | Mode::Heading => {}
        }
        self.state.mode = Mode::None;
        Ok(())
    }

    fn finish_file(&mut self) -> Result<()> {
        self.close_block()?;
        if !matches!(self.state.mode, Mode::Index(_)) {
            log::trace!("closing an index table that was never opened");
        }
        // Emitted for every file, index or not.
        self.out.emit_line(INDEX_CLOSE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TAIL: &str = "</pre></td></tr></TABLE>\n";

    fn converter(opts: Options) -> Converter<Vec<u8>> {
        Converter::new(opts, Vec::new()).unwrap()
    }

    fn convert(text: &str) -> String {
        let mut conv = converter(Options::default().without_title());
        conv.convert_str(text).unwrap();
        String::from_utf8(conv.finish().unwrap()).unwrap()
    }

    #[test]
    fn ignored_lines_become_comments() {
        let line = "Contents                                                         Index";
        assert_eq!(convert(line), format!("<!-- {line} \n-->{TAIL}"));
    }

    #[test]
    fn page_break_drops_anchor_before_comment() {
        let line = "Chapter 5.  Names                                           129";
        let out = convert(line);
        assert_eq!(out, format!("<a name=\"129\"></a><!-- {line} \n-->{TAIL}"));
        assert_eq!(out.matches(r#"<a name="129">"#).count(), 1);
    }

    #[test]
    fn contents_line_links_to_page_anchor() {
        let out = convert("Bibliography .  .  .  .  .  586");
        assert!(out.contains(r##"<a href="#586">586</a>"##), "{out}");
    }

    #[test]
    fn preformatted_then_paragraph() {
        let out = convert("    indented code;\n\nFlush prose line.\n");
        assert_eq!(
            out,
            format!("<pre>\n    indented code;\n</pre><p>Flush prose line.\n</p>{TAIL}")
        );
    }

    #[test]
    fn hyphenated_words_are_joined() {
        let out = convert("exam-\nple text\n");
        assert_eq!(out, format!("<p>example text\n</p>{TAIL}"));
    }

    #[test]
    fn continuation_skips_reclassification() {
        // The indented tail would be preformatted on its own.
        let out = convert("an exam-\n    ple of words\n");
        assert_eq!(out, format!("<p>an example of words\n</p>{TAIL}"));
    }

    #[test]
    fn index_is_a_two_column_table() {
        let right = format!("{}assignment, 34", " ".repeat(30));
        let out = convert(&format!("Index\nAlgol, 12\n{right}\n"));
        assert_eq!(
            out,
            format!(
                "{INDEX_HEADING}\n{INDEX_OPEN}\n\
                 Algol, <a href=\"#12\">12</a>\n\
                 {INDEX_NEXT_CELL}assignment, <a href=\"#34\">34</a>\n{TAIL}"
            )
        );
        assert_eq!(out.matches("<TABLE").count(), 1);
    }

    #[test]
    fn index_starts_a_new_row_when_back_on_the_left() {
        let right = format!("{}b, 2", " ".repeat(30));
        let out = convert(&format!("Index\na, 1\n{right}\nc, 3\n\nd, 4\n"));
        assert!(out.contains(&format!("{INDEX_NEXT_CELL}b, ")));
        assert!(out.contains(&format!("{INDEX_NEXT_ROW}c, ")));
        assert!(out.contains("</a>\n\nd, "), "{out}");
    }

    #[test]
    fn duplicate_heading_ids_are_dropped() {
        let out = convert("5.1 Names\n6.1 Names\n");
        assert_eq!(
            out,
            format!(
                "<H3 id=\"5_1\" id=\"Names\">5.1 Names</H3>\n\
                 <H3 id=\"6_1\">6.1 Names</H3>\n{TAIL}"
            )
        );
    }

    #[test]
    fn chapter_line_and_its_title() {
        let out = convert("Chapter 5\n\nNames\nSome prose here.\n");
        assert_eq!(
            out,
            format!(
                "<HR><H2 ID=\"Chapter_5\"><CENTER>Chapter 5</CENTER></H2>\n\
                 <H2 ID=\"Names\"><CENTER>Names</CENTER></H2>\n\
                 <p>Some prose here.\n</p>{TAIL}"
            )
        );
    }

    #[test]
    fn title_block_uses_increasing_levels() {
        let mut conv = converter(Options::default());
        conv.convert_str("Programming Algol 68\nMade Easy\n\nSian Leitch\nx\nBody text here.\n")
            .unwrap();
        let out = String::from_utf8(conv.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            format!(
                "<CENTER><H1>Programming Algol 68</H1></CENTER>\n\
                 <CENTER><H2>Made Easy</H2></CENTER>\n\
                 <CENTER><H4>Sian Leitch</H4></CENTER>\n\
                 <CENTER><H5>x</H5></CENTER>\n\
                 <p>Body text here.\n</p>{TAIL}"
            )
        );
    }

    #[test]
    fn dedication_lines_are_centered() {
        let out = convert("            Sian Leitch\n");
        assert_eq!(out, format!("<H3><CENTER>Sian Leitch</CENTER></H3>\n{TAIL}"));
    }

    #[test]
    fn exercises_are_preformatted() {
        let out = convert("Ex 1.1 Write a program\n");
        assert_eq!(out, format!("<pre>\nEx 1.1 Write a program\n</pre>{TAIL}"));
    }

    #[test]
    fn first_preformatted_line_loses_two_spaces() {
        let out = convert("     BEGIN\n     END\n");
        assert_eq!(out, format!("<pre>\n   BEGIN\n     END\n</pre>{TAIL}"));
    }

    #[test]
    fn a_prefix_flips_once_marker_is_seen() {
        let out = convert("     (a)  x := 1\n     (a)  cur file:=NIL\n     (a)  y\n");
        assert_eq!(
            out,
            format!("<pre>\n (a)  x := 1\n (a)  cur file:=NIL\n     (a)  y\n</pre>{TAIL}")
        );
    }

    #[test]
    fn rule_toggle_starts_open() {
        let out = convert("A line of text\n____\nBoxed text\n____\n");
        let close = out.find(RULE_CLOSE).expect("close");
        let open = out.find(RULE_OPEN).expect("open");
        assert!(close < open, "{out}");
        assert_eq!(out.matches(RULE_OPEN).count(), 1);
    }

    #[test]
    fn form_feed_before_running_head() {
        let out = convert("Some prose here.\n\x0cChapter 5.  Names                 129\nMore text.\n");
        assert_eq!(
            out,
            format!(
                "<p>Some prose here.\n</p><a name=\"129\"></a>\
                 <!-- Chapter 5.  Names                 129 \n-->\
                 <p>More text.\n</p>{TAIL}"
            )
        );
    }

    #[test]
    fn lone_carriage_return_ends_running_head() {
        let out = convert("Chapter 5.  Names     129\rMore text.\n");
        assert_eq!(
            out,
            format!(
                "<a name=\"129\"></a><!-- Chapter 5.  Names     129 \n-->\
                 <p>More text.\n</p>{TAIL}"
            )
        );
    }

    #[test]
    fn ignored_line_leaves_preformatted_block_open() {
        let out = convert("    code;\n      xiv\n    more;\n");
        assert_eq!(
            out,
            format!("<pre>\n    code;\n<!--       xiv \n-->    more;\n</pre>{TAIL}")
        );
        assert_eq!(out.matches("<pre>").count(), 1);
    }

    #[test]
    fn page_break_leaves_paragraph_open() {
        let out = convert("A line of words\nChapter 5.  Names     129\nmore words here\n");
        assert_eq!(
            out,
            format!(
                "<p>A line of words\n<a name=\"129\"></a>\
                 <!-- Chapter 5.  Names     129 \n-->more words here\n</p>{TAIL}"
            )
        );
    }

    #[test]
    fn rule_inside_preformatted_block_closes() {
        let out = convert("A line of text\n____\n    code;\n    ____\n");
        assert_eq!(out.matches(RULE_OPEN).count(), 0, "{out}");
        assert_eq!(out.matches(RULE_CLOSE).count(), 2, "{out}");
        assert!(out.contains(&format!("<pre>\n    code;\n    {RULE_CLOSE}\n")));
    }

    #[test]
    fn short_sentence_ends_paragraph() {
        let out = convert("First sentence here.\nSecond one here.\n");
        assert_eq!(
            out,
            format!("<p>First sentence here.\n</p><p>Second one here.\n</p>{TAIL}")
        );
    }

    #[test]
    fn long_line_keeps_paragraph_open() {
        let long = format!("This line runs long {}end.", "word ".repeat(12));
        let out = convert(&format!("{long}\nmore words follow\n"));
        assert_eq!(out, format!("<p>{long}\nmore words follow\n</p>{TAIL}"));
    }

    #[test]
    fn ligature_and_spelling_fixes() {
        let out = convert("The Cæsar code by Kl\u{a8}oke\n");
        assert_eq!(out, format!("<p>The C&aelig;sar code by Kl\u{f6}ke\n</p>{TAIL}"));
    }

    #[test]
    fn state_resets_per_file_but_ids_do_not() {
        let mut conv = converter(Options::default().without_title());
        conv.convert_str("5.1 Names\n    code\n").unwrap();
        assert_eq!(conv.mode(), Mode::None);
        conv.convert_str("6.1 Names\n").unwrap();
        let out = String::from_utf8(conv.finish().unwrap()).unwrap();
        assert_eq!(out.matches(TAIL).count(), 2);
        assert!(out.contains("<H3 id=\"6_1\">6.1 Names</H3>"));
    }

    #[test]
    fn classify_orders_tests() {
        let conv = converter(Options::default());
        assert_eq!(conv.classify(1, "", "").unwrap(), LineKind::Blank);
        assert_eq!(conv.classify(2, "Title", "Title").unwrap(), LineKind::Title(2));
        assert_eq!(
            conv.classify(1, "      xiv", "      xiv").unwrap(),
            LineKind::Ignore
        );
        assert_eq!(conv.classify(9, "Index", "Index").unwrap(), LineKind::IndexStart);
        assert_eq!(conv.classify(9, "Chapter 2", "Chapter 2").unwrap(), LineKind::Chapter);
        assert_eq!(conv.classify(9, "words", "words").unwrap(), LineKind::Body);
        let line = "Chapter 5.  Names    129";
        assert_eq!(conv.classify(9, line, line).unwrap(), LineKind::PageBreak("129"));
    }
}
