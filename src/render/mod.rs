//! Markdown → Telegram MarkdownV2 renderer.
//!
//! [`Renderer`] walks `pulldown-cmark` events and writes MarkdownV2 into one
//! or more chunks, none longer than the configured limit. Telegram rejects
//! messages over 4096 bytes, so long documents must be split. A split may
//! land inside formatting, in which case every open marker is closed at the
//! end of the chunk and reopened at the start of the next one, keeping each
//! chunk independently valid.
//!
//! The limit holds whenever it leaves room for the open markers and quote
//! prefix of a chunk. Below that (a handful of bytes) it is best effort.
//! [`ConversionOptions`](crate::ConversionOptions) rejects limits under
//! [`MIN_MESSAGE_LEN`](crate::config::MIN_MESSAGE_LEN).
//!
//! ## Layout rules
//!
//! | Markdown            | MarkdownV2                      |
//! |---------------------|---------------------------------|
//! | `**strong**`        | `*strong*`                      |
//! | `*emphasis*`        | `_emphasis_`                    |
//! | `~~strike~~`        | `~strike~`                      |
//! | `` `code` ``        | `` `code` ``                    |
//! | fenced code         | ```` ```lang\n…``` ````         |
//! | `# H1` … `#### H4`  | `*🌟 …*` … `*🔸 …*`             |
//! | `##### H5`, `H6`    | `_🔹 …_`, `_✴️ …_`              |
//! | `- item`            | `⦁ item`                        |
//! | `1. item`           | `1\. item`                      |
//! | `> quote`           | `>quote`                        |
//! | `[t](url)`          | `[t](url)`                      |
//! | `---`               | `———`                           |
//!
//! Paragraphs, headings, code blocks and lists are separated by line breaks.
//! Breaks are *requested* by block events and only materialise when the next
//! text is written, so trailing blank lines never appear and consecutive
//! requests collapse into the largest one.

pub mod escape;
pub mod latex;
pub mod split;

pub use escape::{escape_link_url, escape_text};

use crate::error::RenderError;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tracing::trace;

/// Telegram MarkdownV2 message hard limit.
pub const TELEGRAM_BOT_MAX_MESSAGE_LENGTH: usize = 4096;

const BULLET: &str = "⦁ ";
const RULE: &str = "———";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Style {
    Strong,
    Emphasis,
    Strikethrough,
    Code,
    CodeBlock(String),
    Heading(u8),
    List { ordered: bool, next: u64 },
    Item,
}

impl Style {
    fn name(&self) -> &'static str {
        match self {
            Style::Strong => "strong",
            Style::Emphasis => "emphasis",
            Style::Strikethrough => "strikethrough",
            Style::Code => "code",
            Style::CodeBlock(_) => "code block",
            Style::Heading(_) => "heading",
            Style::List { .. } => "list",
            Style::Item => "item",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            Style::Strong => "*",
            Style::Emphasis => "_",
            Style::Strikethrough => "~",
            Style::Code => "`",
            Style::CodeBlock(_) => "```",
            Style::Heading(level) if *level <= 4 => "*",
            Style::Heading(_) => "_",
            Style::List { .. } | Style::Item => "",
        }
    }

    /// List markers belong to the first line only; everything else is
    /// reopened after a chunk split.
    fn reopens(&self) -> bool {
        !matches!(self, Style::List { .. } | Style::Item)
    }
}

#[derive(Debug)]
struct Frame {
    style: Style,
    open: String,
    close: &'static str,
    /// Whether `open` has been written into the current chunk.
    applied: bool,
}

#[derive(Debug)]
struct LinkBuf {
    url: String,
    title: String,
    image: bool,
}

/// Streaming MarkdownV2 renderer with chunk splitting.
///
/// # Example
/// ```rust
/// use md2tgmdv2::render::Renderer;
///
/// let chunks = Renderer::default().render("**Hello** world.").unwrap();
/// assert_eq!(chunks, vec!["*Hello* world\\.".to_string()]);
/// ```
#[derive(Debug)]
pub struct Renderer {
    max_len: usize,
    latex_escape: bool,
    chunks: Vec<String>,
    stack: Vec<Frame>,
    /// Open markers of frames not yet applied in the current chunk.
    prefix: String,
    quote_level: usize,
    /// Pending line breaks, written before the next text.
    breaks: usize,
    /// Lowest quote level seen while breaks were pending.
    break_quote: usize,
    link: Option<LinkBuf>,
    nested_links: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(TELEGRAM_BOT_MAX_MESSAGE_LENGTH)
    }
}

impl Renderer {
    /// Create a renderer whose chunks never exceed `max_len` bytes, given room
    /// for the markers a chunk must close.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            latex_escape: true,
            chunks: Vec::new(),
            stack: Vec::new(),
            prefix: String::new(),
            quote_level: 0,
            breaks: 0,
            break_quote: 0,
            link: None,
            nested_links: 0,
        }
    }

    /// Parse `$…$` math and rewrite it into Unicode. Default: true.
    pub fn latex_escape(mut self, enabled: bool) -> Self {
        self.latex_escape = enabled;
        self
    }

    /// Convert Markdown into MarkdownV2 chunks.
    ///
    /// Empty (or whitespace-only) input yields no chunks.
    pub fn render(&mut self, markdown: &str) -> Result<Vec<String>, RenderError> {
        *self = Self::new(self.max_len).latex_escape(self.latex_escape);

        let markdown = markdown.trim();
        if markdown.is_empty() {
            return Ok(Vec::new());
        }
        self.chunks.push(String::new());

        for event in Parser::new_ext(markdown, parser_options(self.latex_escape)) {
            trace!(?event, "render event");
            self.event(event)?;
        }

        if !self.stack.is_empty() {
            return Err(RenderError::UnbalancedTags {
                open: self.stack.len(),
            });
        }

        Ok(std::mem::take(&mut self.chunks)
            .into_iter()
            .map(|chunk| chunk.trim_end().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect())
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag)?,
            Event::Text(text) => self.inline_text(&escape_text(&text)),
            Event::Code(code) => {
                let escaped = escape_text(&code);
                match self.link.as_mut() {
                    Some(link) => {
                        link.title.push('`');
                        link.title.push_str(&escaped);
                        link.title.push('`');
                    }
                    None => {
                        self.push_frame(Style::Code);
                        self.push_text(&escaped);
                        self.pop_frame("code")?;
                    }
                }
            }
            Event::InlineMath(src) => self.inline_text(&escape_text(&latex::to_unicode(&src))),
            Event::DisplayMath(src) => {
                self.request_breaks(1);
                self.push_text(&escape_text(&latex::to_unicode(&src)));
                self.request_breaks(1);
            }
            Event::Html(html) => {
                self.push_text(&escape_text(html.trim_end()));
                self.request_breaks(1);
            }
            Event::InlineHtml(html) => self.inline_text(&escape_text(&html)),
            Event::FootnoteReference(label) => {
                self.inline_text(&escape_text(&format!("[{label}]")))
            }
            Event::SoftBreak | Event::HardBreak => match self.link.as_mut() {
                Some(link) => link.title.push(' '),
                None => self.request_breaks(1),
            },
            Event::Rule => {
                self.request_breaks(2);
                self.push_text(RULE);
                self.request_breaks(2);
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "☑️ " } else { "☐ " });
            }
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.request_breaks(2),
            Tag::Heading { level, .. } => {
                self.request_breaks(2);
                self.push_frame(Style::Heading(heading_level(level)));
            }
            Tag::BlockQuote(_) => {
                self.quote_level += 1;
                self.request_breaks(1);
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.request_breaks(2);
                self.push_frame(Style::CodeBlock(lang));
            }
            Tag::List(start) => {
                self.request_breaks(1);
                self.push_frame(Style::List {
                    ordered: start.is_some(),
                    next: start.unwrap_or(1),
                });
            }
            Tag::Item => {
                self.request_breaks(1);
                self.push_frame(Style::Item);
            }
            Tag::Emphasis => self.start_inline(Style::Emphasis),
            Tag::Strong => self.start_inline(Style::Strong),
            Tag::Strikethrough => self.start_inline(Style::Strikethrough),
            Tag::Link { dest_url, .. } => self.start_link(dest_url.to_string(), false),
            Tag::Image { dest_url, .. } => self.start_link(dest_url.to_string(), true),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), RenderError> {
        match tag {
            TagEnd::Paragraph => self.request_breaks(2),
            TagEnd::Heading(_) => {
                self.pop_frame("heading")?;
                self.request_breaks(2);
            }
            TagEnd::BlockQuote(_) => {
                self.quote_level = self.quote_level.saturating_sub(1);
                if self.breaks > 0 {
                    self.break_quote = self.break_quote.min(self.quote_level);
                }
            }
            TagEnd::CodeBlock => {
                self.pop_frame("code block")?;
                self.request_breaks(1);
            }
            TagEnd::List(_) => {
                self.pop_frame("list")?;
                let nested = self
                    .stack
                    .iter()
                    .any(|f| matches!(f.style, Style::List { .. }));
                self.request_breaks(if nested { 1 } else { 2 });
            }
            TagEnd::Item => {
                self.pop_frame("item")?;
                self.request_breaks(1);
            }
            TagEnd::Emphasis => self.end_inline(Style::Emphasis)?,
            TagEnd::Strong => self.end_inline(Style::Strong)?,
            TagEnd::Strikethrough => self.end_inline(Style::Strikethrough)?,
            TagEnd::Link | TagEnd::Image => self.end_link(),
            _ => {}
        }
        Ok(())
    }

    // ── Inline helpers ───────────────────────────────────────────────────

    fn inline_text(&mut self, escaped: &str) {
        match self.link.as_mut() {
            Some(link) => link.title.push_str(escaped),
            None => self.push_text(escaped),
        }
    }

    fn start_inline(&mut self, style: Style) {
        match self.link.as_mut() {
            Some(link) => link.title.push_str(style.marker()),
            None => self.push_frame(style),
        }
    }

    fn end_inline(&mut self, style: Style) -> Result<(), RenderError> {
        match self.link.as_mut() {
            Some(link) => {
                link.title.push_str(style.marker());
                Ok(())
            }
            None => self.pop_frame(style.name()),
        }
    }

    fn start_link(&mut self, url: String, image: bool) {
        if self.link.is_some() {
            self.nested_links += 1;
            return;
        }
        self.link = Some(LinkBuf {
            url,
            title: String::new(),
            image,
        });
    }

    fn end_link(&mut self) {
        if self.nested_links > 0 {
            self.nested_links -= 1;
            return;
        }
        let Some(link) = self.link.take() else {
            return;
        };
        let title = if !link.title.is_empty() {
            link.title
        } else if link.image {
            "Image".to_string()
        } else {
            escape_text(&link.url)
        };
        self.push_text(&format!("[{}]({})", title, escape_link_url(&link.url)));
    }

    // ── Frames ───────────────────────────────────────────────────────────

    fn push_frame(&mut self, style: Style) {
        let (open, close) = match &style {
            Style::Item => (self.item_marker(), ""),
            Style::List { .. } => (String::new(), ""),
            Style::CodeBlock(lang) => (format!("```{lang}\n"), style.marker()),
            Style::Heading(level) => (heading_open(*level).to_string(), style.marker()),
            Style::Strong | Style::Emphasis | Style::Strikethrough | Style::Code => {
                let marker = style.marker();
                // Same marker already open: writing it again would close it.
                if self.stack.iter().any(|f| f.close == marker) {
                    (String::new(), "")
                } else {
                    (marker.to_string(), marker)
                }
            }
        };
        self.prefix.push_str(&open);
        self.stack.push(Frame {
            style,
            open,
            close,
            applied: false,
        });
    }

    fn pop_frame(&mut self, found: &'static str) -> Result<(), RenderError> {
        let frame = self.stack.pop().ok_or_else(|| RenderError::UnexpectedEnd {
            expected: "nothing".into(),
            found: found.into(),
        })?;
        if frame.style.name() != found {
            return Err(RenderError::UnexpectedEnd {
                expected: frame.style.name().into(),
                found: found.into(),
            });
        }
        self.close_frame(frame);
        Ok(())
    }

    fn close_frame(&mut self, frame: Frame) {
        if frame.applied {
            if let Some(chunk) = self.chunks.last_mut() {
                if matches!(frame.style, Style::CodeBlock(_)) && !chunk.ends_with('\n') {
                    chunk.push('\n');
                }
                chunk.push_str(frame.close);
            }
        } else if !frame.open.is_empty() && self.prefix.ends_with(&frame.open) {
            // Never written: drop the empty pair.
            let len = self.prefix.len() - frame.open.len();
            self.prefix.truncate(len);
        }
    }

    fn item_marker(&mut self) -> String {
        let depth = self
            .stack
            .iter()
            .filter(|f| matches!(f.style, Style::List { .. }))
            .count();
        let mut marker = "  ".repeat(depth.saturating_sub(1));

        let list = self.stack.iter_mut().rev().find_map(|f| match &mut f.style {
            Style::List { ordered, next } => Some((*ordered, next)),
            _ => None,
        });
        match list {
            Some((true, next)) => {
                marker.push_str(&format!("{next}\\. "));
                *next += 1;
            }
            _ => marker.push_str(BULLET),
        }
        marker
    }

    fn in_code_block(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f.style, Style::CodeBlock(_)))
    }

    fn closing_len(&self) -> usize {
        self.stack
            .iter()
            .map(|f| f.close.len() + usize::from(matches!(f.style, Style::CodeBlock(_))))
            .sum()
    }

    // ── Output ───────────────────────────────────────────────────────────

    fn request_breaks(&mut self, n: usize) {
        if self.breaks == 0 {
            self.break_quote = self.quote_level;
        } else {
            self.break_quote = self.break_quote.min(self.quote_level);
        }
        self.breaks = self.breaks.max(n);
    }

    fn current_len(&self) -> usize {
        self.chunks.last().map_or(0, String::len)
    }

    /// Text written before the next run: pending newlines, each followed by
    /// its quote prefix. A fresh chunk only gets the quote prefix.
    fn line_lead(&self) -> String {
        if self.breaks == 0 {
            return String::new();
        }
        if self.current_len() == 0 {
            return ">".repeat(self.quote_level);
        }
        let mut lead = String::new();
        for _ in 1..self.breaks {
            lead.push('\n');
            lead.push_str(&">".repeat(self.break_quote));
        }
        lead.push('\n');
        lead.push_str(&">".repeat(self.quote_level));
        lead
    }

    fn push_text(&mut self, text: &str) {
        let mut remaining = text;
        while !remaining.is_empty() {
            let lead = self.line_lead();
            let current_len = self.current_len();
            let used = current_len + lead.len() + self.prefix.len() + self.closing_len();
            let available = self.max_len.saturating_sub(used);
            let (token, _) = split::leading_token(remaining);

            if token > available && current_len > 0 {
                self.split_chunk();
                if !self.in_code_block() {
                    remaining = remaining.trim_start();
                }
                continue;
            }

            let (cut, skip) = if remaining.len() <= available {
                (remaining.len(), 0)
            } else if token > available {
                // The token alone does not fit an empty chunk.
                (split::hard_cut(remaining, available), 0)
            } else {
                split::split_point(remaining, available, token)
            };

            if let Some(chunk) = self.chunks.last_mut() {
                chunk.push_str(&lead);
                chunk.push_str(&self.prefix);
                chunk.push_str(&remaining[..cut]);
            }
            self.prefix.clear();
            for frame in &mut self.stack {
                frame.applied = true;
            }
            self.breaks = 0;

            remaining = &remaining[cut + skip..];
            if !remaining.is_empty() {
                self.split_chunk();
            }
        }
    }

    fn split_chunk(&mut self) {
        if let Some(chunk) = self.chunks.last_mut() {
            for frame in self.stack.iter().rev().filter(|f| f.applied) {
                if matches!(frame.style, Style::CodeBlock(_)) && !chunk.ends_with('\n') {
                    chunk.push('\n');
                }
                chunk.push_str(frame.close);
            }
        }
        trace!(chunks = self.chunks.len(), "chunk closed");
        self.chunks.push(String::new());

        self.prefix.clear();
        for frame in &mut self.stack {
            frame.applied = false;
            if frame.style.reopens() {
                self.prefix.push_str(&frame.open);
            }
        }
        if self.quote_level > 0 {
            self.request_breaks(1);
        }
    }
}

/// Parser extensions the renderer understands.
pub fn parser_options(latex_escape: bool) -> Options {
    let mut options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    if latex_escape {
        options |= Options::ENABLE_MATH;
    }
    options
}

/// Render a whole document as one MarkdownV2 string, without chunking.
pub fn render_single(markdown: &str, latex_escape: bool) -> Result<String, RenderError> {
    let chunks = Renderer::new(usize::MAX)
        .latex_escape(latex_escape)
        .render(markdown)?;
    Ok(chunks.into_iter().next().unwrap_or_default())
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_open(level: u8) -> &'static str {
    match level {
        1 => "*🌟 ",
        2 => "*⭐ ",
        3 => "*✨ ",
        4 => "*🔸 ",
        5 => "_🔹 ",
        _ => "_✴️ ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(input: &str, max_len: usize) -> Vec<String> {
        Renderer::new(max_len).render(input).unwrap()
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(chunks("", 100).is_empty());
        assert!(chunks("  \n\n ", 100).is_empty());
    }

    #[test]
    fn splits_words_to_fit() {
        assert_eq!(chunks("12345 12345", 5), vec!["12345", "12345"]);
        assert_eq!(chunks("12345 12345", 10), vec!["12345", "12345"]);
        assert_eq!(chunks("12345 12345", 11), vec!["12345 12345"]);
    }

    #[test]
    fn splits_code_block_and_reopens_fence() {
        let input = "```\n1234567890\n1234567890\n```";
        for max_len in [18, 19, 28] {
            assert_eq!(
                chunks(input, max_len),
                vec!["```\n1234567890\n```", "```\n1234567890\n```"],
                "max_len {max_len}"
            );
        }
        assert_eq!(chunks(input, 29), vec!["```\n1234567890\n1234567890\n```"]);
    }

    #[test]
    fn strong_reopens_in_next_chunk() {
        assert_eq!(chunks("**aaaa bbbb**", 7), vec!["*aaaa*", "*bbbb*"]);
    }

    #[test]
    fn link_moves_whole_to_next_chunk() {
        assert_eq!(
            chunks("word [docs](https://ex.io/a)", 25),
            vec!["word", "[docs](https://ex.io/a)"]
        );
    }

    #[test]
    fn chunks_respect_limit() {
        let input = "Lorem ipsum dolor sit amet, **consectetur adipiscing** elit. ".repeat(40);
        for chunk in chunks(&input, 120) {
            assert!(chunk.len() <= 120, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn whitespace_between_styles_is_kept() {
        assert_eq!(render_single("*a* *b*", true).unwrap(), "_a_ _b_");
    }

    #[test]
    fn nested_same_marker_is_not_duplicated() {
        assert_eq!(render_single("## **bold** x", true).unwrap(), "*⭐ bold x*");
        assert_eq!(
            render_single("***bold italic***", true).unwrap(),
            "_*bold italic*_"
        );
    }

    #[test]
    fn math_becomes_unicode() {
        assert_eq!(render_single("Area $\\pi r^2$", true).unwrap(), "Area π r²");
    }

    #[test]
    fn dollar_is_plain_without_latex() {
        assert_eq!(render_single("costs $5", false).unwrap(), "costs $5");
    }
}
