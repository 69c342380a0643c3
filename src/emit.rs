// src/emit.rs
//
// Output side of the converter: fragments go out exactly as given, lines get a
// trailing '\n', suppressed input goes out inside a comment.

use std::io::{self, Write};

pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write a fragment with no line break.
    pub fn emit(&mut self, fragment: &str) -> io::Result<()> {
        self.out.write_all(fragment.as_bytes())
    }

    pub fn emit_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")
    }

    /// Keep a suppressed source line visible to anyone reading the HTML.
    pub fn comment(&mut self, line: &str) -> io::Result<()> {
        write!(self.out, "<!-- {line} \n-->")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fragments_lines_and_comments() {
        let mut em = Emitter::new(Vec::new());
        em.emit("<p>").unwrap();
        em.emit_line("text").unwrap();
        em.comment("Contents    Index").unwrap();
        let out = String::from_utf8(em.into_inner()).unwrap();
        assert_eq!(out, "<p>text\n<!-- Contents    Index \n-->");
    }
}
