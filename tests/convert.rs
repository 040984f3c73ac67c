//! Library-level conversion properties: entry-point resolution, parse-mode
//! forwarding, output assembly and the file boundary.

use md2tgmdv2::pipeline::Segment;
use md2tgmdv2::{
    convert_async, markdownify_file, resolve_converter, telegramify_file, ContentBlock,
    ContentType, ConversionOptions, ConverterLibrary, Interpreter, InterpreterChain,
    MarkdownConverter, Md2TgError,
};
use std::sync::{Arc, Mutex};

// ── Stub converters ──────────────────────────────────────────────────────────

/// Returns its input unchanged; takes no parse mode.
struct Identity {
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

impl MarkdownConverter for Identity {
    fn convert(&self, text: &str, parse_mode: Option<&str>) -> Result<String, Md2TgError> {
        self.seen.lock().unwrap().push(parse_mode.map(str::to_string));
        Ok(text.to_string())
    }
}

/// Records the parse mode it was called with.
struct Recording {
    seen: Arc<Mutex<Vec<Option<String>>>>,
}

impl MarkdownConverter for Recording {
    fn supports_parse_mode(&self) -> bool {
        true
    }

    fn convert(&self, text: &str, parse_mode: Option<&str>) -> Result<String, Md2TgError> {
        self.seen.lock().unwrap().push(parse_mode.map(str::to_string));
        Ok(format!("[{}] {}", parse_mode.unwrap_or("-"), text))
    }
}

/// Converter that tags its output with its name.
struct Named(&'static str);

impl MarkdownConverter for Named {
    fn convert(&self, _text: &str, _parse_mode: Option<&str>) -> Result<String, Md2TgError> {
        Ok(self.0.to_string())
    }
}

/// Ignores the input and emits a fixed block sequence.
struct FixedBlocks;

impl Interpreter for FixedBlocks {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn interpret(
        &self,
        _raw: &str,
        _options: &ConversionOptions,
    ) -> Result<Vec<Segment>, Md2TgError> {
        Ok(vec![
            Segment::Block(ContentBlock::text("a")),
            Segment::Block(ContentBlock::image("photo.png")),
            Segment::Block(ContentBlock::text("b")),
            Segment::Block(ContentBlock {
                content_type: ContentType::Text,
                content: None,
                file_name: None,
            }),
        ])
    }
}

fn recorder() -> Arc<Mutex<Vec<Option<String>>>> {
    Arc::new(Mutex::new(Vec::new()))
}

// ── Resolution order ─────────────────────────────────────────────────────────

#[test]
fn resolves_lone_escape_markdown() {
    let mut lib = ConverterLibrary::empty();
    lib.register("escape_markdown", Box::new(Named("escape")));
    let resolved = resolve_converter(Some(&lib)).unwrap();
    assert_eq!(resolved.name, "escape_markdown");
}

#[test]
fn markdownify_beats_telegramify() {
    let mut lib = ConverterLibrary::empty();
    lib.register("telegramify", Box::new(Named("telegramify")));
    lib.register("markdownify", Box::new(Named("markdownify")));
    let resolved = resolve_converter(Some(&lib)).unwrap();
    assert_eq!(resolved.name, "markdownify");
    assert_eq!(resolved.converter.convert("x", None).unwrap(), "markdownify");
}

#[test]
fn unknown_names_are_unresolved() {
    let mut lib = ConverterLibrary::empty();
    lib.register("to_html", Box::new(Named("html")));
    let err = resolve_converter(Some(&lib)).err().unwrap();
    assert!(matches!(err, Md2TgError::CapabilityUnresolved { .. }));
    assert_eq!(err.exit_code(), 4);
}

// ── Parse-mode forwarding ────────────────────────────────────────────────────

#[test]
fn parse_mode_withheld_from_unsupporting_converter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "# raw *text*\n").unwrap();

    let seen = recorder();
    let mut lib = ConverterLibrary::empty();
    lib.register("markdownify", Box::new(Identity { seen: seen.clone() }));

    let options = ConversionOptions::builder()
        .parse_mode("HTML")
        .build()
        .unwrap();
    let output = dir.path().join("out.txt");
    markdownify_file(&input, &output, &options, Some(&lib)).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![None]);
    // Identity converter: output equals input.
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "# raw *text*\n");
}

#[test]
fn parse_mode_forwarded_when_supported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "hello").unwrap();

    let seen = recorder();
    let mut lib = ConverterLibrary::empty();
    lib.register("telegramify", Box::new(Recording { seen: seen.clone() }));

    let output = dir.path().join("default.txt");
    markdownify_file(&input, &output, &ConversionOptions::default(), Some(&lib)).unwrap();
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "[MarkdownV2] hello"
    );

    let custom = ConversionOptions::builder()
        .parse_mode("MarkdownV2Custom")
        .build()
        .unwrap();
    markdownify_file(&input, &output, &custom, Some(&lib)).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Some("MarkdownV2".to_string()),
            Some("MarkdownV2Custom".to_string())
        ]
    );
}

// ── Dependency missing ───────────────────────────────────────────────────────

#[test]
fn missing_dependency_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "hello").unwrap();
    let output = dir.path().join("sub/out.txt");

    let err = markdownify_file(&input, &output, &ConversionOptions::default(), None).unwrap_err();
    assert!(matches!(err, Md2TgError::DependencyMissing));
    assert_eq!(err.exit_code(), 3);
    assert!(!output.exists());
    assert!(!dir.path().join("sub").exists());

    let err = tokio_test::block_on(telegramify_file(
        &input,
        &output,
        &ConversionOptions::telegramify(),
        None,
    ))
    .unwrap_err();
    assert!(matches!(err, Md2TgError::DependencyMissing));
    assert!(!output.exists());
}

#[test]
fn failed_conversion_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "hello").unwrap();
    let output = dir.path().join("out.txt");
    std::fs::write(&output, "previous").unwrap();

    let options = ConversionOptions::builder().parse_mode("HTML").build().unwrap();
    let err = markdownify_file(&input, &output, &options, Some(&ConverterLibrary::builtin()))
        .unwrap_err();
    assert!(matches!(err, Md2TgError::Conversion { .. }));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
}

// ── Output assembly ──────────────────────────────────────────────────────────

#[tokio::test]
async fn only_text_blocks_with_content_are_joined() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    tokio::fs::write(&input, "ignored").await.unwrap();
    let output = dir.path().join("out.txt");

    let chain = InterpreterChain::new(vec![Arc::new(FixedBlocks)]);
    let lib = ConverterLibrary::empty().with_chain(chain);
    let blocks = telegramify_file(&input, &output, &ConversionOptions::telegramify(), Some(&lib))
        .await
        .unwrap();

    assert_eq!(blocks.len(), 4);
    assert_eq!(
        tokio::fs::read_to_string(&output).await.unwrap(),
        "a\n=========\nb"
    );
}

#[tokio::test]
async fn builtin_chain_splits_long_documents() {
    let input = "word ".repeat(2000);
    let options = ConversionOptions::builder()
        .max_message_len(1000)
        .build()
        .unwrap();
    let blocks = convert_async(&input, &InterpreterChain::text_only(), &options)
        .await
        .unwrap();
    assert!(blocks.len() >= 10);
    assert!(blocks
        .iter()
        .all(|b| b.is_text() && b.content.as_deref().is_some_and(|c| c.len() <= 1000)));
}

#[tokio::test]
async fn fixed_options_keep_long_paragraph_whole() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    tokio::fs::write(&input, "word ".repeat(1200)).await.unwrap();
    let output = dir.path().join("out.txt");

    let lib = ConverterLibrary::builtin();
    let blocks = telegramify_file(&input, &output, &ConversionOptions::telegramify(), Some(&lib))
        .await
        .unwrap();

    assert_eq!(blocks.len(), 1);
    let out = tokio::fs::read_to_string(&output).await.unwrap();
    assert!(out.len() > 4096, "len {}", out.len());
    assert!(!out.contains("\n=========\n"));
    assert_eq!(out, "word ".repeat(1200).trim_end());
}

// ── File boundary ────────────────────────────────────────────────────────────

#[tokio::test]
async fn creates_missing_output_directories() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    tokio::fs::write(&input, "**hi**").await.unwrap();
    let output = dir.path().join("a/b/c/out.txt");

    let lib = ConverterLibrary::builtin();
    telegramify_file(&input, &output, &ConversionOptions::telegramify(), Some(&lib))
        .await
        .unwrap();
    assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "*hi*");
}

#[test]
fn repeated_runs_are_identical_and_replace() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "# Title\n\nSome *text* (with parens).").unwrap();
    let output = dir.path().join("out.txt");
    std::fs::write(&output, "stale content that is much longer than the result").unwrap();

    let lib = ConverterLibrary::builtin();
    markdownify_file(&input, &output, &ConversionOptions::default(), Some(&lib)).unwrap();
    let first = std::fs::read(&output).unwrap();
    markdownify_file(&input, &output, &ConversionOptions::default(), Some(&lib)).unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(second).unwrap(),
        "*🌟 Title*\n\nSome _text_ \\(with parens\\)\\."
    );
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = markdownify_file(
        &dir.path().join("nope.md"),
        &dir.path().join("out.txt"),
        &ConversionOptions::default(),
        Some(&ConverterLibrary::builtin()),
    )
    .unwrap_err();
    assert!(matches!(err, Md2TgError::InputNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}
