//! Corpus document loading and text extraction.

use crate::types::Document;
use medquery_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Page separator emitted by PDF extraction (form feed). Plain-text corpora
/// may also use it to mark page boundaries.
const PAGE_SEPARATOR: char = '\x0c';

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Markdown,
    PlainText,
    Unsupported,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unsupported,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
            Self::Unsupported => "unsupported",
        }
    }

    /// Whether this content type can be ingested.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Load a corpus document from a file.
///
/// PDF pages come from the extractor's form-feed markers; text files may
/// carry the same marker, otherwise they load as a single page. The source
/// identifier is the file name, which stays stable across runs and is what
/// citations render.
pub fn load_document(path: &Path) -> AppResult<Document> {
    let content_type = ContentType::from_path(path);

    let source_id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Load(format!("Not a file path: {:?}", path)))?;

    let raw = match content_type {
        ContentType::Pdf => extract_pdf_text(path)?,
        ContentType::Markdown | ContentType::PlainText => fs::read_to_string(path)
            .map_err(|e| AppError::Load(format!("Failed to read {:?}: {}", path, e)))?,
        ContentType::Unsupported => {
            return Err(AppError::Load(format!(
                "Unsupported document type: {:?}",
                path
            )));
        }
    };

    let pages: Vec<String> = raw
        .split(PAGE_SEPARATOR)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let text = pages.join("\n");

    tracing::debug!(
        "Loaded document '{}': {} pages, {} bytes",
        source_id,
        pages.len(),
        text.len()
    );

    Ok(Document {
        source_id,
        text,
        pages,
    })
}

/// Extract text from a PDF file.
fn extract_pdf_text(path: &Path) -> AppResult<String> {
    pdf_extract::extract_text(path)
        .map_err(|e| AppError::Load(format!("Failed to extract PDF text from {:?}: {}", path, e)))
}
