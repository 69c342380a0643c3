//! dvitohtml - turn a plain-text dump of a typeset book into HTML
//!
//! The text carries nothing but layout: indentation, capitals, trailing
//! punctuation and the book's own running heads. From those the converter
//! infers chapters, section headings, paragraphs, preformatted blocks, the
//! two-column index and page cross-references, and writes an HTML fragment
//! stream.
//!
//! # Example
//!
//! ```
//! use dvitohtml::{Converter, Options};
//!
//! let mut conv = Converter::new(Options::default().without_title(), Vec::new()).unwrap();
//! conv.convert_str("Chapter 5.  Names     129\nA name is a word.\n").unwrap();
//! let html = String::from_utf8(conv.finish().unwrap()).unwrap();
//! assert!(html.starts_with("<a name=\"129\"></a>"));
//! ```

mod config;
mod converter;
mod emit;
mod error;
mod links;
mod patterns;
mod reader;

use std::io::Write;
use std::path::Path;

pub use config::{Options, DEFAULT_STOP_WIDTH, DEFAULT_TITLE_LINES};
pub use converter::{Converter, LineKind, Mode, Side};
pub use emit::Emitter;
pub use error::{Error, Result};
pub use links::{anchor_name, link_pages, normalize_leaders, page_ref};
pub use patterns::Patterns;
pub use reader::{read_document, source_lines, LineCursor};

/// Convert `paths` in order into `output` and return it flushed.
///
/// On error, whatever was written before the failure stays written.
pub fn convert_paths<W, P>(paths: &[P], opts: Options, output: W) -> Result<W>
where
    W: Write,
    P: AsRef<Path>,
{
    let mut conv = Converter::new(opts, output)?;
    for path in paths {
        conv.convert_file(path.as_ref())?;
    }
    conv.finish()
}
