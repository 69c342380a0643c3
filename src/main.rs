// src/main.rs
//
// dvitohtml — plain-text book dump to HTML
//
// - Reads each input in order as UTF-8 and writes one HTML fragment stream
//   (no <html>/<head> wrapper) to stdout or --output.
// - Running heads and stray folios go out as comments; chapter running heads
//   also drop a <a name=PAGE> anchor.
// - The first --title-lines lines of the run become a centered title block.
// - Contents and index folios become <a href="#PAGE"> links.
// - Any failure is fatal; output written before it is kept.
//
// Logging goes to stderr through env_logger; set RUST_LOG=debug for per-file
// progress, RUST_LOG=trace for per-line classification.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dvitohtml::{convert_paths, Error, Options, DEFAULT_STOP_WIDTH, DEFAULT_TITLE_LINES};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of leading lines rendered as the centered title block
    #[arg(long, default_value_t = DEFAULT_TITLE_LINES)]
    title_lines: usize,

    /// Dot-leader width, and the longest line whose full stop ends a paragraph
    #[arg(long, default_value_t = DEFAULT_STOP_WIDTH)]
    stop_width: usize,

    /// Output file (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input text dumps, converted in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dvitohtml: error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let opts = Options {
        title_lines: cli.title_lines,
        stop_width: cli.stop_width,
    };

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    // BufWriter flushes on drop, so a failed run still leaves its partial output.
    let mut out = convert_paths(&cli.inputs, opts, BufWriter::new(sink))?;
    out.flush()?;
    Ok(())
}
