//! Single-consumer loop turning queued decisions into workflow callbacks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::metrics::ServiceMetrics;

use super::console::{DecisionPrompt, PromptReply};
use super::types::{DecisionResult, PendingDecision};

/// Consumes the decision queue and resolves one item at a time.
///
/// A decision is fully handled (human reply obtained, callback attempted)
/// before the next one is dequeued, so decisions reach the human surface in
/// arrival order and exactly one is live at any moment. A malformed reply or
/// a failed callback never stops the loop.
pub struct DecisionResolver<P: DecisionPrompt> {
    rx: UnboundedReceiver<PendingDecision>,
    prompt: P,
    client: reqwest::Client,
    metrics: Arc<ServiceMetrics>,
}

impl<P: DecisionPrompt> DecisionResolver<P> {
    /// Build a resolver over the consumer end of the queue.
    ///
    /// `resume_timeout` bounds each outbound callback so an unresponsive
    /// workflow engine cannot stall the loop forever.
    pub fn new(
        rx: UnboundedReceiver<PendingDecision>,
        prompt: P,
        resume_timeout: Duration,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("docrouter/0.2")
            .timeout(resume_timeout)
            .build()?;
        Ok(Self {
            rx,
            prompt,
            client,
            metrics,
        })
    }

    /// Run until the producer side of the queue is dropped.
    pub async fn run(mut self) {
        tracing::info!("Decision resolver started");
        while let Some(decision) = self.rx.recv().await {
            self.resolve(decision).await;
        }
        tracing::info!("Decision queue closed, resolver stopping");
    }

    async fn resolve(&self, decision: PendingDecision) {
        tracing::info!(
            request_id = %decision.request_id,
            endpoints = decision.folder_endpoints.len(),
            "Decision required"
        );

        let reply = self.prompt.choose(&decision).await;
        let Some(result) = apply_reply(&decision, reply) else {
            // Fire-and-forget policy: the producer reissues its wait step.
            tracing::warn!(request_id = %decision.request_id, "Invalid choice, decision discarded");
            self.metrics.record_discarded();
            return;
        };

        tracing::info!(
            request_id = %result.request_id,
            selected = ?result.selected_path,
            create = result.create,
            "Decision resolved"
        );
        self.metrics.record_resolved();
        self.post_resume(&decision.resume_url, &result).await;
    }

    async fn post_resume(&self, resume_url: &str, result: &DecisionResult) {
        match self.client.post(resume_url).json(result).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(request_id = %result.request_id, "Resume callback delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    request_id = %result.request_id,
                    status = %response.status(),
                    "Resume callback rejected"
                );
            }
            Err(err) => {
                tracing::warn!(request_id = %result.request_id, error = %err, "Resume callback failed");
            }
        }
    }
}

/// Turn a human reply into a decision result, or `None` when the reply is
/// invalid (out-of-range index, unparseable input, blank create path with no
/// suggested default).
pub fn apply_reply(decision: &PendingDecision, reply: PromptReply) -> Option<DecisionResult> {
    match reply {
        PromptReply::Select(index) => {
            let selected = decision
                .folder_endpoints
                .get(index.checked_sub(1)?)?
                .clone();
            Some(DecisionResult {
                request_id: decision.request_id.clone(),
                selected_path: Some(selected),
                suggested_path: None,
                create: false,
            })
        }
        PromptReply::Create(path) => {
            let new_path = path.or_else(|| {
                decision
                    .suggested_path
                    .clone()
                    .filter(|suggested| !suggested.trim().is_empty())
            })?;
            Some(DecisionResult {
                request_id: decision.request_id.clone(),
                selected_path: None,
                suggested_path: Some(new_path),
                create: true,
            })
        }
        PromptReply::Unrecognized(_) => None,
    }
}
