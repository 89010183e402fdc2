//! Core data types and error definitions for the extraction pipeline.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the external tool adapters (text layer, page count, OCR).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The document or a temporary resource could not be read or written.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// The document could not be parsed by the PDF library.
    #[error("failed to parse document: {0}")]
    Parse(String),
    /// An external tool ran but reported failure.
    #[error("{command} failed: {detail}")]
    Tool {
        /// Executable that was invoked.
        command: String,
        /// Trimmed stderr or status description from the tool.
        detail: String,
    },
    /// A background worker task died before producing a result.
    #[error("worker task failed: {0}")]
    Task(String),
}

/// Errors emitted by the extraction pipeline.
///
/// Text-layer and page-count failures are absorbed by the pipeline's fallback
/// policy; only a failed OCR run, when OCR was required, surfaces here.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// OCR was required for this document but the OCR adapter failed.
    #[error(
        "OCR failed: {detail}. Make sure the OCR tooling (ocrmypdf with Tesseract) is installed and on PATH"
    )]
    Ocr {
        /// Diagnostic detail from the OCR adapter.
        detail: String,
    },
}

/// Unified outcome of extracting text from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted content, possibly empty.
    pub text: String,
    /// True only if the original document carried an extractable text layer
    /// (never true for a layer produced by our own OCR pass).
    pub has_text_layer: bool,
    /// True if OCR was invoked to produce `text`.
    pub used_ocr: bool,
    /// Page count, or `None` when counting failed.
    pub pages: Option<usize>,
    /// Size of the source document in bytes.
    pub size_bytes: u64,
}
