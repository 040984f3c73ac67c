//! Interpreter stages: turn raw Markdown segments into content blocks.
//!
//! A chain starts from one raw segment holding the whole document. Each
//! stage rewrites the raw segments it is given into blocks, or into a mix of
//! blocks and smaller raw segments for the stages after it. Blocks produced
//! by an earlier stage pass through later stages untouched.

use crate::config::{ConversionOptions, UNBOUNDED_WORD_COUNT};
use crate::error::Md2TgError;
use crate::output::ContentBlock;
use crate::render::{escape_text, parser_options, Renderer};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Pipeline state between stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Markdown no stage has claimed yet.
    Raw(String),
    Block(ContentBlock),
}

/// One stage of an [`InterpreterChain`].
pub trait Interpreter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrite one raw segment. Returned segments replace it in order.
    fn interpret(&self, raw: &str, options: &ConversionOptions)
        -> Result<Vec<Segment>, Md2TgError>;
}

// ── TextInterpreter ──────────────────────────────────────────────────────

/// Renders Markdown into MarkdownV2 TEXT blocks.
///
/// The input is grouped at top-level block boundaries so no group exceeds
/// `max_word_count` words (a single larger block stays whole), and each
/// group is rendered into chunks of at most `max_message_len` bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextInterpreter;

impl Interpreter for TextInterpreter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn interpret(
        &self,
        raw: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<Segment>, Md2TgError> {
        let mut renderer =
            Renderer::new(options.max_message_len).latex_escape(options.latex_escape);
        let mut out = Vec::new();
        for group in group_by_words(raw, options.max_word_count, options.latex_escape) {
            let chunks = renderer
                .render(group)
                .map_err(|source| Md2TgError::Conversion {
                    entry_point: "telegramify".into(),
                    source,
                })?;
            out.extend(chunks.into_iter().map(|c| Segment::Block(ContentBlock::text(c))));
        }
        Ok(out)
    }
}

/// Byte ranges of the top-level blocks of `markdown`.
fn top_level_blocks(markdown: &str, latex_escape: bool) -> Vec<Range<usize>> {
    let mut depth = 0usize;
    let mut blocks = Vec::new();
    for (event, range) in Parser::new_ext(markdown, parser_options(latex_escape)).into_offset_iter()
    {
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    blocks.push(range);
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ if depth == 0 => blocks.push(range),
            _ => {}
        }
    }
    blocks
}

fn group_by_words(markdown: &str, max_words: usize, latex_escape: bool) -> Vec<&str> {
    if max_words == UNBOUNDED_WORD_COUNT {
        return vec![markdown];
    }

    let mut groups = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut words = 0usize;
    for range in top_level_blocks(markdown, latex_escape) {
        let n = markdown[range.clone()].split_whitespace().count();
        if let Some(s) = start {
            if words + n > max_words {
                groups.push(&markdown[s..end]);
                start = None;
                words = 0;
            }
        }
        start.get_or_insert(range.start);
        end = range.end;
        words += n;
    }
    if let Some(s) = start {
        groups.push(&markdown[s..end]);
    }
    debug!("Grouped document into {} text group(s)", groups.len());
    groups
}

// ── FileInterpreter ──────────────────────────────────────────────────────

/// Extracts long top-level fenced code blocks as FILE attachments.
#[derive(Debug, Clone, Copy)]
pub struct FileInterpreter {
    /// Code blocks with fewer lines stay inline.
    pub min_lines: usize,
}

impl Default for FileInterpreter {
    fn default() -> Self {
        Self { min_lines: 20 }
    }
}

struct Snippet {
    range: Range<usize>,
    lang: String,
    code: String,
}

impl Interpreter for FileInterpreter {
    fn name(&self) -> &'static str {
        "file"
    }

    fn interpret(
        &self,
        raw: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<Segment>, Md2TgError> {
        let mut out = Vec::new();
        let mut cursor = 0;
        let mut depth = 0usize;
        let mut current: Option<Snippet> = None;

        for (event, range) in
            Parser::new_ext(raw, parser_options(options.latex_escape)).into_offset_iter()
        {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if depth == 0 => {
                    current = Some(Snippet {
                        range,
                        lang: info.split_whitespace().next().unwrap_or("").to_string(),
                        code: String::new(),
                    });
                    depth += 1;
                }
                Event::Start(_) => depth += 1,
                Event::End(TagEnd::CodeBlock) if depth == 1 => {
                    depth = 0;
                    let Some(snippet) = current.take() else {
                        continue;
                    };
                    if snippet.code.lines().count() < self.min_lines {
                        continue;
                    }
                    push_raw(&mut out, &raw[cursor..snippet.range.start]);
                    out.push(Segment::Block(ContentBlock::file(
                        snippet_name(&snippet.lang),
                        snippet.code,
                    )));
                    cursor = snippet.range.end;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Text(text) => {
                    if let Some(snippet) = current.as_mut() {
                        snippet.code.push_str(&text);
                    }
                }
                _ => {}
            }
        }
        push_raw(&mut out, &raw[cursor..]);
        Ok(out)
    }
}

fn push_raw(out: &mut Vec<Segment>, raw: &str) {
    if !raw.trim().is_empty() {
        out.push(Segment::Raw(raw.to_string()));
    }
}

fn snippet_name(lang: &str) -> String {
    let lang = lang.to_ascii_lowercase();
    let ext = match lang.as_str() {
        "" | "text" | "plain" | "plaintext" => "txt",
        "rust" => "rs",
        "python" | "py" => "py",
        "javascript" | "js" => "js",
        "typescript" | "ts" => "ts",
        "bash" | "sh" | "shell" | "zsh" => "sh",
        "markdown" | "md" => "md",
        "yaml" | "yml" => "yaml",
        other => other,
    };
    format!("snippet.{ext}")
}

// ── InterpreterChain ─────────────────────────────────────────────────────

/// Ordered interpreter stages.
#[derive(Clone, Default)]
pub struct InterpreterChain {
    stages: Vec<Arc<dyn Interpreter>>,
}

impl InterpreterChain {
    pub fn new(stages: Vec<Arc<dyn Interpreter>>) -> Self {
        Self { stages }
    }

    /// The chain the telegramify tool runs: a single [`TextInterpreter`].
    pub fn text_only() -> Self {
        Self::new(vec![Arc::new(TextInterpreter)])
    }

    /// Append a stage.
    pub fn push(mut self, stage: impl Interpreter + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Fold `content` through every stage.
    ///
    /// Raw segments left after the last stage become escaped plain TEXT
    /// blocks; blank ones are dropped.
    pub fn run(
        &self,
        content: &str,
        options: &ConversionOptions,
    ) -> Result<Vec<ContentBlock>, Md2TgError> {
        let mut segments = vec![Segment::Raw(content.to_string())];
        for stage in &self.stages {
            let mut next = Vec::with_capacity(segments.len());
            for segment in segments {
                match segment {
                    Segment::Raw(raw) => next.extend(stage.interpret(&raw, options)?),
                    block => next.push(block),
                }
            }
            debug!("Stage '{}' produced {} segment(s)", stage.name(), next.len());
            segments = next;
        }

        Ok(segments
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Block(block) => Some(block),
                Segment::Raw(raw) if raw.trim().is_empty() => None,
                Segment::Raw(raw) => Some(ContentBlock::text(escape_text(raw.trim()))),
            })
            .collect())
    }
}

impl std::fmt::Debug for InterpreterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
