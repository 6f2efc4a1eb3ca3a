//! Source document loading.

use std::path::Path;

use docqa_vector_store::Document;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};

/// Formats the loader can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Text,
    Markdown,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Name recorded in document metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

/// Loads a source file as a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load `path` with `source` and `format` metadata.
    ///
    /// A PDF yields one document per page, numbered from zero under `page`,
    /// so chunks never span a page break. Text formats yield one document.
    pub async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let format = DocumentFormat::from_path(path)?;

        let bytes = fs::read(path).await.map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = path.display().to_string();
        let documents: Vec<Document> = match format {
            DocumentFormat::Pdf => extract_pdf_pages(bytes)
                .await?
                .into_iter()
                .enumerate()
                .map(|(page, text)| {
                    Document::new(text)
                        .with_metadata("source", source.as_str())
                        .with_metadata("format", format.as_str())
                        .with_metadata("page", page)
                })
                .collect(),
            DocumentFormat::Text | DocumentFormat::Markdown => {
                let text = match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("{source} is not valid UTF-8, replacing invalid bytes");
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                };
                vec![
                    Document::new(text)
                        .with_metadata("source", source.as_str())
                        .with_metadata("format", format.as_str()),
                ]
            }
        };

        let chars: usize = documents.iter().map(|d| d.content.chars().count()).sum();
        if documents.iter().all(|d| d.content.trim().is_empty()) {
            warn!("No text found in {source}");
        }

        debug!("Loaded {chars} characters from {source}");
        info!(
            "Loaded {source} ({}, {} documents)",
            format.as_str(),
            documents.len()
        );
        Ok(documents)
    }
}

async fn extract_pdf_pages(bytes: Vec<u8>) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .await
        .map_err(|e| IngestError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| IngestError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("guide.PDF")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.txt")).unwrap(),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("README.md")).unwrap(),
            DocumentFormat::Markdown
        );
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            DocumentFormat::from_path(Path::new("sheet.xlsx")),
            Err(IngestError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentFormat::from_path(Path::new("Makefile")),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }
}
