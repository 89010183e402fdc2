//! Document extraction pipeline: text layer, page counting, and OCR fallback.

pub mod ocr;
pub mod pdf;
mod service;
pub mod types;

pub use service::{ExtractionApi, ExtractionService};
pub use types::{AdapterError, ExtractionError, ExtractionResult};
