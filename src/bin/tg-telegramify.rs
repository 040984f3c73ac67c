//! CLI binary: convert a Markdown file through the async interpreter chain.
//!
//! The chain produces content blocks. TEXT blocks are joined with
//! `"\n=========\n"` into the output file; all other blocks are dropped.

use anyhow::{Context, Result};
use clap::Parser;
use md2tgmdv2::{telegramify_file, ContentType, ConversionOptions, ConverterLibrary};
use std::path::PathBuf;
use std::process::ExitCode;

mod common;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a document through the interpreter pipeline
  tg-telegramify report.md report.tg.txt

  # Inspect the produced blocks
  tg-telegramify --json report.md report.tg.txt | jq '.[].content_type'

EXIT CODES:
  0  success
  1  I/O or conversion error
  2  invalid arguments
  3  converter library not available in this build
"#;

/// Convert a Markdown file into Telegram MarkdownV2 message blocks.
#[derive(Parser, Debug)]
#[command(
    name = "tg-telegramify",
    version,
    about = "Convert a Markdown file into Telegram MarkdownV2 message blocks",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to convert.
    input_file: PathBuf,

    /// Where to write the joined TEXT blocks. Missing directories are created.
    output_file: PathBuf,

    /// Also print every produced block to stdout as JSON.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2TG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2TG_QUIET")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    common::init_logging(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => common::fail(&e),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let options = ConversionOptions::telegramify();
    let library = ConverterLibrary::load();

    let blocks = telegramify_file(&cli.input_file, &cli.output_file, &options, library.as_ref())
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&blocks).context("Failed to serialise blocks")?;
        println!("{json}");
    }

    if !cli.quiet {
        let text = blocks
            .iter()
            .filter(|b| b.content_type == ContentType::Text && b.content.is_some())
            .count();
        common::summary(
            &cli.output_file,
            &format!("{} text / {} total blocks", text, blocks.len()),
        );
    }
    Ok(())
}
