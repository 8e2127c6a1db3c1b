//! Plain-text extraction from uploaded documents.

use std::io::Write;

use async_trait::async_trait;

use crate::error::{CyBotError, Result};
use crate::ports::TextExtractor;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Accepts UTF-8 text only. Binary input is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, raw: &[u8]) -> Result<String> {
        if raw.contains(&0) {
            return Err(CyBotError::Ingestion(
                "input looks binary (contains NUL bytes)".to_string(),
            ));
        }
        let text = std::str::from_utf8(raw)
            .map_err(|e| CyBotError::Ingestion(format!("input is not valid UTF-8: {e}")))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }
}

/// Runs poppler's `pdftotext` on a scratch copy of the document.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    program: String,
}

impl PdfTextExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, raw: &[u8]) -> Result<String> {
        let mut scratch = tempfile::Builder::new()
            .prefix("cybot-upload-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| CyBotError::Ingestion(format!("could not stage document: {e}")))?;
        scratch
            .write_all(raw)
            .and_then(|()| scratch.flush())
            .map_err(|e| CyBotError::Ingestion(format!("could not stage document: {e}")))?;

        let output = tokio::process::Command::new(&self.program)
            .arg("-enc")
            .arg("UTF-8")
            .arg(scratch.path())
            .arg("-")
            .output()
            .await
            .map_err(|e| {
                CyBotError::Ingestion(format!(
                    "could not run {} (is poppler installed?): {e}",
                    self.program
                ))
            })?;

        if !output.status.success() {
            return Err(CyBotError::Ingestion(format!(
                "{} failed: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!(chars = text.chars().count(), "extracted pdf text");
        Ok(text)
    }
}

/// Dispatches on the `%PDF-` signature.
#[derive(Debug, Clone, Default)]
pub struct AutoExtractor {
    plain: PlainTextExtractor,
    pdf: PdfTextExtractor,
}

impl AutoExtractor {
    pub const fn new(pdf: PdfTextExtractor) -> Self {
        Self {
            plain: PlainTextExtractor,
            pdf,
        }
    }
}

#[async_trait]
impl TextExtractor for AutoExtractor {
    async fn extract_text(&self, raw: &[u8]) -> Result<String> {
        if raw.starts_with(PDF_MAGIC) {
            self.pdf.extract_text(raw).await
        } else {
            self.plain.extract_text(raw).await
        }
    }
}
