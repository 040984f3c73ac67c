//! Converter library: a symbol table of named conversion entry points.
//!
//! The sync tool does not know in advance which entry point a library
//! exposes. It probes [`CANDIDATE_NAMES`] in priority order and calls the
//! first one registered. Whether an entry point takes a parse mode is a
//! static property of its adapter ([`MarkdownConverter::supports_parse_mode`]).

use crate::config::{ConversionOptions, DEFAULT_PARSE_MODE};
use crate::convert::convert_async;
use crate::error::{Md2TgError, RenderError};
use crate::output::ContentBlock;
use crate::pipeline::InterpreterChain;
use crate::render::{escape_text, render_single};
use std::collections::HashMap;
use tracing::debug;

/// Entry points probed by [`resolve_converter`], highest priority first.
pub const CANDIDATE_NAMES: [&str; 4] = [
    "markdownify",
    "telegramify",
    "telegramify_markdown",
    "escape_markdown",
];

/// A synchronous Markdown → Telegram text converter.
pub trait MarkdownConverter: Send + Sync {
    /// Whether [`convert`](Self::convert) honours the `parse_mode` argument.
    fn supports_parse_mode(&self) -> bool {
        false
    }

    /// Convert `text`. `parse_mode` is `None` for converters that do not
    /// support it.
    fn convert(&self, text: &str, parse_mode: Option<&str>) -> Result<String, Md2TgError>;
}

/// Named converters plus the interpreter chain used by the async entry.
pub struct ConverterLibrary {
    converters: HashMap<String, Box<dyn MarkdownConverter>>,
    chain: InterpreterChain,
}

impl ConverterLibrary {
    /// A library with no entry points and a text-only chain.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            chain: InterpreterChain::text_only(),
        }
    }

    /// The library shipped with this crate.
    pub fn builtin() -> Self {
        let mut lib = Self::empty();
        lib.register("markdownify", Box::new(MarkdownifyConverter::default()));
        lib.register("escape_markdown", Box::new(EscapeConverter));
        lib
    }

    /// The library linked into this build, if any.
    pub fn load() -> Option<Self> {
        #[cfg(feature = "builtin")]
        {
            Some(Self::builtin())
        }
        #[cfg(not(feature = "builtin"))]
        {
            None
        }
    }

    /// Replace the interpreter chain used by [`telegramify`](Self::telegramify).
    pub fn with_chain(mut self, chain: InterpreterChain) -> Self {
        self.chain = chain;
        self
    }

    /// Register a converter under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, converter: Box<dyn MarkdownConverter>) {
        self.converters.insert(name.into(), converter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn MarkdownConverter> {
        self.converters.get(name).map(|c| c.as_ref())
    }

    /// All registered entry-point names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.converters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Async interpreter-chain conversion of a whole document.
    pub async fn telegramify(
        &self,
        content: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<ContentBlock>, Md2TgError> {
        convert_async(content, &self.chain, options).await
    }
}

impl Default for ConverterLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ConverterLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterLibrary")
            .field("names", &self.names())
            .field("chain", &self.chain)
            .finish()
    }
}

/// A converter picked by [`resolve_converter`].
pub struct ResolvedConverter<'a> {
    pub name: &'static str,
    pub converter: &'a dyn MarkdownConverter,
}

/// Pick the first registered entry point from [`CANDIDATE_NAMES`].
///
/// # Errors
/// * [`Md2TgError::DependencyMissing`] when no library is linked.
/// * [`Md2TgError::CapabilityUnresolved`] when none of the names is registered.
pub fn resolve_converter(
    library: Option<&ConverterLibrary>,
) -> Result<ResolvedConverter<'_>, Md2TgError> {
    let library = library.ok_or(Md2TgError::DependencyMissing)?;
    CANDIDATE_NAMES
        .iter()
        .find_map(|&name| {
            library
                .get(name)
                .map(|converter| ResolvedConverter { name, converter })
        })
        .inspect(|resolved| {
            debug!(
                "Resolved entry point '{}' (parse_mode: {})",
                resolved.name,
                resolved.converter.supports_parse_mode()
            )
        })
        .ok_or_else(|| Md2TgError::CapabilityUnresolved {
            tried: CANDIDATE_NAMES.join(", "),
        })
}

/// Call `converter` once, forwarding the parse mode only when supported.
pub fn invoke(
    converter: &dyn MarkdownConverter,
    text: &str,
    options: &ConversionOptions,
) -> Result<String, Md2TgError> {
    let parse_mode = converter
        .supports_parse_mode()
        .then_some(options.parse_mode.as_str());
    debug!(?parse_mode, "Invoking converter on {} bytes", text.len());
    converter.convert(text, parse_mode)
}

// ── Built-in adapters ────────────────────────────────────────────────────

/// Whole-document MarkdownV2 rendering into a single string.
#[derive(Debug, Clone)]
pub struct MarkdownifyConverter {
    pub latex_escape: bool,
}

impl Default for MarkdownifyConverter {
    fn default() -> Self {
        Self { latex_escape: true }
    }
}

impl MarkdownConverter for MarkdownifyConverter {
    fn supports_parse_mode(&self) -> bool {
        true
    }

    fn convert(&self, text: &str, parse_mode: Option<&str>) -> Result<String, Md2TgError> {
        let conversion = |source: RenderError| Md2TgError::Conversion {
            entry_point: "markdownify".into(),
            source,
        };
        let mode = parse_mode.unwrap_or(DEFAULT_PARSE_MODE);
        if !mode.eq_ignore_ascii_case(DEFAULT_PARSE_MODE) {
            return Err(conversion(RenderError::UnsupportedParseMode(mode.into())));
        }
        render_single(text, self.latex_escape).map_err(conversion)
    }
}

/// Escapes every reserved character; no formatting is interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeConverter;

impl MarkdownConverter for EscapeConverter {
    fn convert(&self, text: &str, _parse_mode: Option<&str>) -> Result<String, Md2TgError> {
        Ok(escape_text(text))
    }
}
