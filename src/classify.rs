//! Language classification adapter.
//!
//! Wraps the `whatlang` detector behind a small service type. The detector is
//! warmed up once at process start with a probe sentence; if the probe fails,
//! every later call degrades to "unknown" instead of crashing the service.
//! The detector is stateless after warm-up, so concurrent calls need no lock.

use serde::Serialize;

/// Outcome of classifying a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// ISO 639-3 code of the most likely language, when one was identified.
    pub language_code: Option<String>,
    /// Confidence of the identification in `[0, 1]`; `0.0` when unknown.
    pub probability: f64,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            language_code: None,
            probability: 0.0,
        }
    }
}

/// Language classifier with explicit startup warm-up.
pub struct LanguageClassifier {
    ready: bool,
}

impl LanguageClassifier {
    /// Warm up the detector before the service accepts traffic.
    ///
    /// Runs a probe detection on a known-English sentence. A failed probe
    /// leaves the classifier in degraded mode where [`Self::classify`] always
    /// returns unknown.
    pub fn warm_up() -> Self {
        const PROBE: &str = "This is a warmup sentence for the language detector.";
        let ready = matches!(
            whatlang::detect(PROBE),
            Some(info) if info.lang() == whatlang::Lang::Eng
        );
        if ready {
            tracing::info!("Language detector warmed up");
        } else {
            tracing::warn!("Language detector warmup failed; classification disabled");
        }
        Self { ready }
    }

    /// Classify the primary language of `text`.
    ///
    /// Empty or whitespace-only input short-circuits to unknown without
    /// invoking the detector.
    pub fn classify(&self, text: &str) -> Classification {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Classification::unknown();
        }
        if !self.ready {
            return Classification::unknown();
        }

        match whatlang::detect(trimmed) {
            Some(info) => Classification {
                language_code: Some(info.lang().code().to_string()),
                probability: info.confidence().clamp(0.0, 1.0),
            },
            None => Classification::unknown(),
        }
    }
}
