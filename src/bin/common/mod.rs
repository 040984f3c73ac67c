//! Helpers shared by the `tg-markdownify` and `tg-telegramify` binaries.

use md2tgmdv2::Md2TgError;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

pub fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
pub fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
pub fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
pub fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

// ── Exit ─────────────────────────────────────────────────────────────────────

/// Print the error chain and map it to the process exit code.
pub fn fail(err: &anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", red("✘"), err);
    let code = err
        .downcast_ref::<Md2TgError>()
        .map_or(1, Md2TgError::exit_code);
    ExitCode::from(code)
}

/// One-line success summary on stderr.
pub fn summary(output: &std::path::Path, detail: &str) {
    eprintln!(
        "{}  {}  {}",
        green("✔"),
        bold(&output.display().to_string()),
        dim(detail)
    );
}
