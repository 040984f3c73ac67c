//! Error types for the md2tgmdv2 library.
//!
//! Two error types reflect two layers:
//!
//! * [`Md2TgError`]: **fatal** for a run: the converter library is missing,
//!   the input cannot be read, the converter failed, or the output cannot be
//!   written. Returned from every top-level entry point in [`crate::convert`].
//!
//! * [`RenderError`]: raised by the MarkdownV2 renderer itself. It is wrapped
//!   into [`Md2TgError::Conversion`] together with the name of the entry point
//!   that produced it.
//!
//! None of these are retried. The output file is only written after a fully
//! successful conversion, so every error leaves the previous output intact.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2tgmdv2 library.
#[derive(Debug, Error)]
pub enum Md2TgError {
    // ── Capability errors ─────────────────────────────────────────────────
    /// No converter library is linked into this build.
    #[error(
        "The telegramify converter library is not available in this build.\n\
Rebuild with the default features enabled, e.g.:\n\
  cargo install md2tgmdv2 --features builtin"
    )]
    DependencyMissing,

    /// The library is present but exposes none of the known entry points.
    #[error("No conversion function found inside the converter library (tried: {tried}).")]
    CapabilityUnresolved { tried: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read, but its bytes are not valid UTF-8.
    #[error("Input file '{path}' is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { path: PathBuf, offset: usize },

    /// Any other failure while reading the input.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The converter raised while transforming the text.
    #[error("Conversion failed in '{entry_point}': {source}")]
    Conversion {
        entry_point: String,
        #[source]
        source: RenderError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2TgError {
    /// Process exit code the binaries use for this error.
    ///
    /// `2` is reserved for argument errors, which clap reports itself.
    pub fn exit_code(&self) -> u8 {
        match self {
            Md2TgError::DependencyMissing => 3,
            Md2TgError::CapabilityUnresolved { .. } => 4,
            _ => 1,
        }
    }
}

/// Errors raised by the MarkdownV2 renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The parser finished with formatting frames still open.
    #[error("Unbalanced tags: {open} frame(s) still open at end of input")]
    UnbalancedTags { open: usize },

    /// An end tag arrived that does not match the innermost open frame.
    #[error("Unexpected end of {found} (innermost open frame: {expected})")]
    UnexpectedEnd { expected: String, found: String },

    /// Only Telegram MarkdownV2 output is supported.
    #[error("Unsupported parse mode '{0}' (supported: MarkdownV2)")]
    UnsupportedParseMode(String),
}
