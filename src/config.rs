//! Configuration types for Markdown-to-MarkdownV2 conversion.
//!
//! Every conversion knob lives in [`ConversionOptions`], built via its
//! [`ConversionOptionsBuilder`]. A run constructs the options once, from CLI
//! arguments and fixed constants, and never mutates them afterwards.

use crate::error::Md2TgError;
use crate::render::TELEGRAM_BOT_MAX_MESSAGE_LENGTH;
use serde::Serialize;

/// Default parse mode forwarded to converters that accept one.
pub const DEFAULT_PARSE_MODE: &str = "MarkdownV2";

/// Word-count cap large enough that it never triggers a split.
pub const UNBOUNDED_WORD_COUNT: usize = usize::MAX;

/// Message-length cap that never splits a rendered group.
pub const UNBOUNDED_MESSAGE_LEN: usize = usize::MAX;

/// Smallest accepted `max_message_len`. Below this, closing and reopening
/// markers across a split can outgrow the chunk itself.
pub const MIN_MESSAGE_LEN: usize = 16;

/// Options for a single conversion run.
///
/// # Example
/// ```rust
/// use md2tgmdv2::ConversionOptions;
///
/// let options = ConversionOptions::builder()
///     .parse_mode("MarkdownV2")
///     .latex_escape(true)
///     .max_word_count(500)
///     .build()
///     .unwrap();
/// assert_eq!(options.max_word_count, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOptions {
    /// Formatting dialect requested from the converter. Default: `"MarkdownV2"`.
    ///
    /// Only forwarded to converters that declare support for it.
    pub parse_mode: String,

    /// Rewrite `$…$` / `$$…$$` math into readable Unicode. Default: true.
    pub latex_escape: bool,

    /// Clean line endings, invisible characters and blank-line runs before
    /// rendering. Default: false.
    pub normalize_whitespace: bool,

    /// Maximum words per rendered text group. Default: unbounded.
    ///
    /// Groups are cut at top-level block boundaries only, so a single block
    /// larger than the cap is kept whole.
    pub max_word_count: usize,

    /// Maximum bytes per text block. Default: 4096 (Telegram's limit).
    ///
    /// Must be at least [`MIN_MESSAGE_LEN`].
    pub max_message_len: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            parse_mode: DEFAULT_PARSE_MODE.to_string(),
            latex_escape: true,
            normalize_whitespace: false,
            max_word_count: UNBOUNDED_WORD_COUNT,
            max_message_len: TELEGRAM_BOT_MAX_MESSAGE_LENGTH,
        }
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// The fixed options the interpreter-chain converter always runs with.
    ///
    /// Neither cap splits: each group of the document renders into a single
    /// TEXT block.
    pub fn telegramify() -> Self {
        Self {
            latex_escape: true,
            normalize_whitespace: true,
            max_word_count: UNBOUNDED_WORD_COUNT,
            max_message_len: UNBOUNDED_MESSAGE_LEN,
            ..Self::default()
        }
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn parse_mode(mut self, mode: impl Into<String>) -> Self {
        self.options.parse_mode = mode.into();
        self
    }

    pub fn latex_escape(mut self, v: bool) -> Self {
        self.options.latex_escape = v;
        self
    }

    pub fn normalize_whitespace(mut self, v: bool) -> Self {
        self.options.normalize_whitespace = v;
        self
    }

    pub fn max_word_count(mut self, n: usize) -> Self {
        self.options.max_word_count = n;
        self
    }

    pub fn max_message_len(mut self, n: usize) -> Self {
        self.options.max_message_len = n;
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConversionOptions, Md2TgError> {
        let o = &self.options;
        if o.parse_mode.trim().is_empty() {
            return Err(Md2TgError::InvalidConfig(
                "Parse mode must not be empty".into(),
            ));
        }
        if o.max_word_count == 0 {
            return Err(Md2TgError::InvalidConfig(
                "max_word_count must be ≥ 1".into(),
            ));
        }
        if o.max_message_len < MIN_MESSAGE_LEN {
            return Err(Md2TgError::InvalidConfig(format!(
                "max_message_len must be ≥ {MIN_MESSAGE_LEN}, got {}",
                o.max_message_len
            )));
        }
        Ok(self.options)
    }
}
