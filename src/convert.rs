//! Conversion entry points for the two tools.
//!
//! * [`markdownify_file`]: synchronous. Resolves an entry point in the
//!   converter library, calls it once on the whole file, writes the result
//!   verbatim.
//! * [`telegramify_file`]: async. Runs the interpreter chain, keeps the TEXT
//!   blocks, joins them with [`TEXT_BLOCK_SEPARATOR`](crate::output::TEXT_BLOCK_SEPARATOR).
//!
//! Both check for the converter library before touching the file system and
//! only write the output after a fully successful conversion.

use crate::config::ConversionOptions;
use crate::error::Md2TgError;
use crate::files::{read_source, read_source_async, write_output, write_output_async};
use crate::library::{invoke, resolve_converter, ConverterLibrary};
use crate::normalize::normalize;
use crate::output::{join_text_blocks, ContentBlock};
use crate::pipeline::InterpreterChain;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert Markdown text through the first available library entry point.
pub fn markdownify(
    text: &str,
    options: &ConversionOptions,
    library: Option<&ConverterLibrary>,
) -> Result<String, Md2TgError> {
    let resolved = resolve_converter(library)?;
    invoke(resolved.converter, text, options)
}

/// Read `input`, convert it with the resolved entry point, write `output`.
pub fn markdownify_file(
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
    library: Option<&ConverterLibrary>,
) -> Result<(), Md2TgError> {
    let start = Instant::now();
    let resolved = resolve_converter(library)?;
    info!(
        "Converting {} via '{}'",
        input.display(),
        resolved.name
    );

    let text = read_source(input)?;
    let converted = invoke(resolved.converter, &text, options)?;
    write_output(output, &converted)?;

    info!(
        "Wrote {} ({} bytes) in {}ms",
        output.display(),
        converted.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}

/// Run `chain` over `content` on the blocking pool.
///
/// This is the only suspension point of the async conversion. It is awaited
/// once, without a timeout.
pub async fn convert_async(
    content: &str,
    chain: &InterpreterChain,
    options: &ConversionOptions,
) -> Result<Vec<ContentBlock>, Md2TgError> {
    let content = content.to_owned();
    let chain = chain.clone();
    let options = options.clone();
    debug!(?chain, "Starting interpreter chain on {} bytes", content.len());

    tokio::task::spawn_blocking(move || {
        let content = if options.normalize_whitespace {
            normalize(&content)
        } else {
            content
        };
        chain.run(&content, &options)
    })
    .await
    .map_err(|e| Md2TgError::Internal(format!("Conversion task failed: {}", e)))?
}

/// Read `input`, run the library's interpreter chain, write the joined TEXT
/// blocks to `output`. Returns every block, including the dropped ones.
pub async fn telegramify_file(
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
    library: Option<&ConverterLibrary>,
) -> Result<Vec<ContentBlock>, Md2TgError> {
    let start = Instant::now();
    let library = library.ok_or(Md2TgError::DependencyMissing)?;
    info!("Converting {} via 'telegramify'", input.display());

    let text = read_source_async(input).await?;
    let blocks = library.telegramify(&text, options).await?;
    let document = join_text_blocks(&blocks);
    write_output_async(output, &document).await?;

    info!(
        "Wrote {} ({} blocks, {} bytes) in {}ms",
        output.display(),
        blocks.len(),
        document.len(),
        start.elapsed().as_millis()
    );
    Ok(blocks)
}

/// Synchronous wrapper around [`telegramify_file`].
///
/// Drives the future on a single-threaded runtime.
pub fn telegramify_file_sync(
    input: &Path,
    output: &Path,
    options: &ConversionOptions,
    library: Option<&ConverterLibrary>,
) -> Result<Vec<ContentBlock>, Md2TgError> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| Md2TgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(telegramify_file(input, output, options, library))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ContentType;

    #[tokio::test]
    async fn convert_async_normalizes_when_asked() {
        let chain = InterpreterChain::text_only();
        let options = ConversionOptions::telegramify();
        let blocks = convert_async("a\r\n\r\n\r\n\r\n\r\nb\u{200B}", &chain, &options)
            .await
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content_type, ContentType::Text);
        assert_eq!(blocks[0].content.as_deref(), Some("a\n\nb"));
    }

    #[test]
    fn markdownify_uses_builtin() {
        let lib = ConverterLibrary::builtin();
        let out = markdownify("**bold**", &ConversionOptions::default(), Some(&lib)).unwrap();
        assert_eq!(out, "*bold*");
    }

    #[test]
    fn missing_library_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.md");
        let err = markdownify_file(
            &dir.path().join("does-not-exist.md"),
            &output,
            &ConversionOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Md2TgError::DependencyMissing));
        assert!(!output.exists());
    }

    #[test]
    fn sync_wrapper_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.md");
        let output = dir.path().join("out/tg.txt");
        std::fs::write(&input, "Hello *there*").unwrap();
        let lib = ConverterLibrary::builtin();
        let blocks = telegramify_file_sync(
            &input,
            &output,
            &ConversionOptions::telegramify(),
            Some(&lib),
        )
        .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Hello _there_");
    }
}
