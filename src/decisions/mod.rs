//! Human-in-the-loop routing decisions: queue, resolver loop, and prompt surfaces.

pub mod console;
mod queue;
mod resolver;
pub mod types;

pub use console::{ConsolePrompt, DecisionPrompt, PromptReply};
pub use queue::{DecisionQueue, SubmitError};
pub use resolver::{DecisionResolver, apply_reply};
pub use types::{DecisionResult, PendingDecision};
