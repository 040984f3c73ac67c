//! CLI binary: convert a Markdown file with one synchronous converter call.
//!
//! Resolves the first available entry point of the converter library,
//! forwards `--parse-mode` only when that entry point accepts it, and writes
//! the returned text verbatim.

use anyhow::{Context, Result};
use clap::Parser;
use md2tgmdv2::config::DEFAULT_PARSE_MODE;
use md2tgmdv2::{markdownify_file, ConversionOptions, ConverterLibrary};
use std::path::PathBuf;
use std::process::ExitCode;

mod common;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a reply for a Telegram bot
  tg-markdownify answer.md answer.tg.txt

  # Explicit parse mode (ignored by converters that do not take one)
  tg-markdownify --parse-mode MarkdownV2 notes.md out/notes.txt

EXIT CODES:
  0  success
  1  I/O or conversion error
  2  invalid arguments
  3  converter library not available in this build
  4  no known conversion function in the converter library
"#;

/// Convert a Markdown file to Telegram MarkdownV2.
#[derive(Parser, Debug)]
#[command(
    name = "tg-markdownify",
    version,
    about = "Convert a Markdown file to Telegram MarkdownV2",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to convert.
    input_file: PathBuf,

    /// Where to write the converted text. Missing directories are created.
    output_file: PathBuf,

    /// Parse mode passed to converters that support one.
    #[arg(long, env = "MD2TG_PARSE_MODE", default_value = DEFAULT_PARSE_MODE)]
    parse_mode: String,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2TG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2TG_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    common::init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => common::fail(&e),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = ConversionOptions::builder()
        .parse_mode(cli.parse_mode.as_str())
        .build()
        .context("Invalid options")?;

    let library = ConverterLibrary::load();
    markdownify_file(&cli.input_file, &cli.output_file, &options, library.as_ref())
        .context("Conversion failed")?;

    if !cli.quiet {
        common::summary(&cli.output_file, &format!("parse mode {}", options.parse_mode));
    }
    Ok(())
}
