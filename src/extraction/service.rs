//! Extraction service orchestrating the text-layer and OCR adapters.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::get_config,
    extraction::{
        ocr::{OcrAdapter, OcrMyPdfAdapter},
        pdf::{LopdfAdapter, PdfAdapter},
        types::{ExtractionError, ExtractionResult},
    },
    metrics::ServiceMetrics,
};

/// Abstraction over the extraction pipeline used by external surfaces.
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    /// Extract text from the document at `path`, falling back to OCR with the
    /// given language packs when the document carries no usable text layer.
    /// `None` or a blank language string disables OCR.
    async fn extract(
        &self,
        path: &Path,
        ocr_languages: Option<&str>,
    ) -> Result<ExtractionResult, ExtractionError>;
}

/// Coordinates text-layer extraction, page counting, and the OCR fallback.
///
/// The service is stateless apart from shared metrics and is safe to invoke
/// concurrently for independent documents. Adapter calls are attempted once
/// per document; no retries happen inside the pipeline.
pub struct ExtractionService {
    pdf: Arc<dyn PdfAdapter>,
    ocr: Arc<dyn OcrAdapter>,
    max_ocr_pages: Option<usize>,
    metrics: Arc<ServiceMetrics>,
}

impl ExtractionService {
    /// Build the service with the default lopdf and ocrmypdf adapters.
    pub fn new(metrics: Arc<ServiceMetrics>) -> Self {
        let config = get_config();
        let pdf: Arc<dyn PdfAdapter> = Arc::new(LopdfAdapter);
        let ocr = Arc::new(OcrMyPdfAdapter::new(
            config.ocr_command.clone(),
            Arc::clone(&pdf),
        ));
        Self::with_adapters(pdf, ocr, config.max_ocr_pages, metrics)
    }

    /// Build the service over explicit adapters and page ceiling.
    pub fn with_adapters(
        pdf: Arc<dyn PdfAdapter>,
        ocr: Arc<dyn OcrAdapter>,
        max_ocr_pages: Option<usize>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            pdf,
            ocr,
            max_ocr_pages,
            metrics,
        }
    }

    /// Run the extraction pipeline for one document.
    pub async fn extract(
        &self,
        path: &Path,
        ocr_languages: Option<&str>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let pages = match self.pdf.page_count(path).await {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "Page count failed");
                None
            }
        };
        let size_bytes = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "Size lookup failed");
                0
            }
        };
        tracing::info!(file = %path.display(), pages = ?pages, "Extract start");

        let mut text = match self.pdf.read_text_layer(path).await {
            Ok(text) => {
                tracing::info!(chars = text.len(), "Extract via text layer");
                text
            }
            Err(err) => {
                tracing::warn!(error = %err, "Text layer extraction failed, will try OCR");
                String::new()
            }
        };

        let mut used_ocr = false;
        if needs_ocr(&text) {
            match ocr_languages.map(str::trim).filter(|langs| !langs.is_empty()) {
                None => {
                    tracing::info!("No text and OCR disabled, returning empty text");
                    text = String::new();
                }
                Some(languages) => {
                    if let (Some(limit), Some(count)) = (self.max_ocr_pages, pages)
                        && count > limit
                    {
                        tracing::warn!(pages = count, limit, "OCR skipped, page ceiling exceeded");
                        text = String::new();
                    } else {
                        text = self.ocr.ocr_to_text(path, languages).await.map_err(|err| {
                            ExtractionError::Ocr {
                                detail: err.to_string(),
                            }
                        })?;
                        used_ocr = true;
                    }
                }
            }
        }

        // An OCR pass writes its own text layer into the output copy; the
        // result must still report the original document as layer-less.
        let has_text_layer = !text.trim().is_empty() && !used_ocr;
        self.metrics.record_extraction(used_ocr);
        tracing::info!(
            chars = text.len(),
            has_text_layer,
            used_ocr,
            size_bytes,
            "Extract done"
        );

        Ok(ExtractionResult {
            text,
            has_text_layer,
            used_ocr,
            pages,
            size_bytes,
        })
    }
}

/// OCR is required exactly when the text layer trims to nothing.
fn needs_ocr(text: &str) -> bool {
    text.trim().is_empty()
}

#[async_trait]
impl ExtractionApi for ExtractionService {
    async fn extract(
        &self,
        path: &Path,
        ocr_languages: Option<&str>,
    ) -> Result<ExtractionResult, ExtractionError> {
        ExtractionService::extract(self, path, ocr_languages).await
    }
}
