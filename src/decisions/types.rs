//! Data types for the routing decision handshake.

use serde::{Deserialize, Serialize};

/// One routing choice awaiting a human.
///
/// Created by an inbound request, enqueued, consumed exactly once by the
/// resolver loop, and discarded after the callback attempt. Ownership moves
/// producer → queue → resolver; no two components hold it concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDecision {
    /// Unique identifier supplied by the producer.
    pub request_id: String,
    /// Callback target to notify once the decision is resolved.
    pub resume_url: String,
    /// Candidate destinations, 1-indexed for selection.
    pub folder_endpoints: Vec<String>,
    /// Proposed new destination when no candidate fits.
    #[serde(default)]
    pub suggested_path: Option<String>,
    /// Bounded-length content preview for human review.
    #[serde(default)]
    pub preview_text: Option<String>,
}

/// Outcome of a resolved decision, sent to the decision's `resume_url`.
///
/// Exactly one of `selected_path` or (`suggested_path` with `create=true`)
/// is populated. Field names are the wire contract with the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Identifier echoed from the originating [`PendingDecision`].
    pub request_id: String,
    /// Existing destination chosen from the candidate list.
    pub selected_path: Option<String>,
    /// New destination to be created.
    pub suggested_path: Option<String>,
    /// Whether the destination must be created.
    pub create: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_result_wire_format_keeps_nulls() {
        let result = DecisionResult {
            request_id: "req-7".into(),
            selected_path: Some("a/b/c/d".into()),
            suggested_path: None,
            create: false,
        };

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            value,
            json!({
                "request_id": "req-7",
                "selected_path": "a/b/c/d",
                "suggested_path": null,
                "create": false
            })
        );
    }

    #[test]
    fn pending_decision_accepts_minimal_payload() {
        let decision: PendingDecision = serde_json::from_value(json!({
            "request_id": "req-1",
            "resume_url": "http://workflow.local/resume",
            "folder_endpoints": ["a/b/c/d"]
        }))
        .expect("deserialize");

        assert_eq!(decision.request_id, "req-1");
        assert_eq!(decision.folder_endpoints.len(), 1);
        assert!(decision.suggested_path.is_none());
        assert!(decision.preview_text.is_none());
    }
}
