//! Content blocks produced by the interpreter pipeline.

use serde::Serialize;

/// Separator placed between TEXT blocks in the assembled output document.
pub const TEXT_BLOCK_SEPARATOR: &str = "\n=========\n";

/// Kind of payload a [`ContentBlock`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A MarkdownV2 message ready to send.
    Text,
    /// An attachment, such as a long code snippet.
    File,
    /// An image reference.
    Image,
}

/// One unit of converted output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub content_type: ContentType,

    /// Rendered text, or the attachment body for FILE blocks.
    pub content: Option<String>,

    /// Suggested attachment name (FILE / IMAGE blocks).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            content: Some(content.into()),
            file_name: None,
        }
    }

    pub fn file(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::File,
            content: Some(content.into()),
            file_name: Some(file_name.into()),
        }
    }

    pub fn image(file_name: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Image,
            content: None,
            file_name: Some(file_name.into()),
        }
    }

    pub fn is_text(&self) -> bool {
        self.content_type == ContentType::Text
    }
}

/// Join the payloads of TEXT blocks that carry content, in order.
///
/// Non-text blocks and text blocks with no content are dropped. No separator
/// is added before the first or after the last block.
pub fn join_text_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.is_text())
        .filter_map(|b| b.content.as_deref())
        .collect::<Vec<_>>()
        .join(TEXT_BLOCK_SEPARATOR)
}
