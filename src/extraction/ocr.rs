//! OCR adapter driving the `ocrmypdf` command-line tool.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::pdf::PdfAdapter;
use super::types::AdapterError;

/// Black-box OCR operation: rasterize a document, recognize text, and return
/// the recognized content.
#[async_trait]
pub trait OcrAdapter: Send + Sync {
    /// Run OCR over the document at `path` using the given language packs
    /// (Tesseract syntax, e.g. `deu+eng`).
    async fn ocr_to_text(&self, path: &Path, languages: &str) -> Result<String, AdapterError>;
}

/// Default adapter spawning `ocrmypdf` as a child process.
///
/// The tool writes a text-layered copy of the document into a temporary file
/// owned by the call; the text layer of that copy is then read back through
/// the [`PdfAdapter`]. The temporary file is removed on every exit path.
pub struct OcrMyPdfAdapter {
    command: String,
    pdf: Arc<dyn PdfAdapter>,
}

impl OcrMyPdfAdapter {
    /// Create an adapter invoking `command` and re-reading OCR output via `pdf`.
    pub fn new(command: impl Into<String>, pdf: Arc<dyn PdfAdapter>) -> Self {
        Self {
            command: command.into(),
            pdf,
        }
    }
}

#[async_trait]
impl OcrAdapter for OcrMyPdfAdapter {
    async fn ocr_to_text(&self, path: &Path, languages: &str) -> Result<String, AdapterError> {
        // Owned by this call; dropped (and deleted) on success and failure alike.
        let output_file = tempfile::Builder::new()
            .prefix("docrouter-ocr-")
            .suffix(".pdf")
            .tempfile()?;

        tracing::info!(
            languages,
            file = %path.display(),
            "OCR start"
        );

        let output = Command::new(&self.command)
            .arg("--force-ocr")
            .arg("--quiet")
            .arg("--language")
            .arg(languages)
            .arg(path)
            .arg(output_file.path())
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                trimmed => trimmed.to_string(),
            };
            return Err(AdapterError::Tool {
                command: self.command.clone(),
                detail,
            });
        }

        let text = self.pdf.read_text_layer(output_file.path()).await?;
        tracing::info!(chars = text.len(), "OCR done");
        Ok(text)
    }
}
