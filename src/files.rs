//! File I/O boundary: read the Markdown source, write the converted output.
//!
//! Writes go to a uniquely named temporary file in the target directory and
//! are renamed onto the target. A failed run never leaves a truncated output
//! file behind, and a successful run replaces the previous one completely.

use crate::error::Md2TgError;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read the whole input file as UTF-8.
pub fn read_source(path: &Path) -> Result<String, Md2TgError> {
    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
    decode(path, bytes)
}

/// Async variant of [`read_source`].
pub async fn read_source_async(path: &Path) -> Result<String, Md2TgError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_error(path, e))?;
    decode(path, bytes)
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, Md2TgError> {
    let len = bytes.len();
    let text = String::from_utf8(bytes).map_err(|e| Md2TgError::InvalidUtf8 {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })?;
    debug!("Read {} bytes from {}", len, path.display());
    Ok(text)
}

fn read_error(path: &Path, e: std::io::Error) -> Md2TgError {
    let path = path.to_path_buf();
    match e.kind() {
        ErrorKind::NotFound => Md2TgError::InputNotFound { path },
        ErrorKind::PermissionDenied => Md2TgError::PermissionDenied { path },
        _ => Md2TgError::InputReadFailed { path, source: e },
    }
}

/// Write `text` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, text: &str) -> Result<(), Md2TgError> {
    let write_err = |source: std::io::Error| Md2TgError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Async variant of [`write_output`]. The write runs on the blocking pool.
pub async fn write_output_async(path: &Path, text: &str) -> Result<(), Md2TgError> {
    let owned_path = path.to_path_buf();
    let owned_text = text.to_string();
    tokio::task::spawn_blocking(move || write_output(&owned_path, &owned_text))
        .await
        .map_err(|e| Md2TgError::Internal(format!("Output write task failed: {e}")))?
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
