//! # md2tgmdv2
//!
//! Convert Markdown files into Telegram MarkdownV2 messages.
//!
//! ## Why this crate?
//!
//! Telegram's MarkdownV2 is not Markdown. It has its own markers (`*bold*`,
//! `_italic_`), demands a backslash before reserved characters such as
//! `.` and `-` anywhere outside an entity, and rejects messages over 4096
//! bytes.
//! Sending raw Markdown produces parse errors or mangled text. This crate
//! parses CommonMark with `pulldown-cmark` and writes valid MarkdownV2,
//! splitting long documents into messages that each parse on their own.
//!
//! ## Two tools
//!
//! ```text
//! tg-markdownify  INPUT ──▶ resolve entry point ──▶ convert once ──▶ OUTPUT
//!                           (markdownify, telegramify, …)
//!
//! tg-telegramify  INPUT ──▶ normalize ──▶ interpreter chain ──▶ TEXT blocks
//!                                                                 │
//!                     OUTPUT ◀── joined with "\n=========\n" ◀─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use md2tgmdv2::{markdownify, ConversionOptions, ConverterLibrary};
//!
//! let library = ConverterLibrary::builtin();
//! let out = markdownify("## 1. What", &ConversionOptions::default(), Some(&library)).unwrap();
//! assert_eq!(out, "*⭐ 1\\. What*");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `tg-markdownify` / `tg-telegramify` binaries (clap + anyhow + tracing-subscriber) |
//! | `builtin` | on      | Links the built-in converter library returned by [`ConverterLibrary::load`] |
//!
//! Without `builtin` both tools exit with the dependency-missing error.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod files;
pub mod library;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, ConversionOptionsBuilder};
pub use convert::{
    convert_async, markdownify, markdownify_file, telegramify_file, telegramify_file_sync,
};
pub use error::{Md2TgError, RenderError};
pub use library::{
    invoke, resolve_converter, ConverterLibrary, MarkdownConverter, CANDIDATE_NAMES,
};
pub use output::{join_text_blocks, ContentBlock, ContentType, TEXT_BLOCK_SEPARATOR};
pub use pipeline::{Interpreter, InterpreterChain};
pub use render::{Renderer, TELEGRAM_BOT_MAX_MESSAGE_LENGTH};
