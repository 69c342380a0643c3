// src/error.rs
//
// Everything that can stop a conversion run. All of it is fatal: output already
// written stays written, nothing is retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("error writing output: {0}")]
    Write(#[from] io::Error),

    #[error("line {line_no}: page-break marker without a page number: {line:?}")]
    MissingPageNumber { line_no: usize, line: String },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
