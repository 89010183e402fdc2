use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing extraction and decision activity.
#[derive(Default)]
pub struct ServiceMetrics {
    documents_extracted: AtomicU64,
    ocr_runs: AtomicU64,
    decisions_enqueued: AtomicU64,
    decisions_resolved: AtomicU64,
    decisions_discarded: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed extraction and whether OCR was part of it.
    pub fn record_extraction(&self, used_ocr: bool) {
        self.documents_extracted.fetch_add(1, Ordering::Relaxed);
        if used_ocr {
            self.ocr_runs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a decision accepted into the queue.
    pub fn record_enqueued(&self) {
        self.decisions_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decision resolved with a valid human choice.
    pub fn record_resolved(&self) {
        self.decisions_resolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decision discarded because of invalid input.
    pub fn record_discarded(&self) {
        self.decisions_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_extracted: self.documents_extracted.load(Ordering::Relaxed),
            ocr_runs: self.ocr_runs.load(Ordering::Relaxed),
            decisions_enqueued: self.decisions_enqueued.load(Ordering::Relaxed),
            decisions_resolved: self.decisions_resolved.load(Ordering::Relaxed),
            decisions_discarded: self.decisions_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the service counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents that have gone through the extraction pipeline.
    pub documents_extracted: u64,
    /// Number of extractions that fell back to OCR.
    pub ocr_runs: u64,
    /// Number of routing decisions accepted into the queue.
    pub decisions_enqueued: u64,
    /// Number of decisions resolved with a valid human choice.
    pub decisions_resolved: u64,
    /// Number of decisions discarded because of invalid input.
    pub decisions_discarded: u64,
}
