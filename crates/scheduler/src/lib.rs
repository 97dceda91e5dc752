//! # Plansmith Scheduler
//!
//! The generation pipeline: retrieve context, compose a prompt, call the
//! model, validate its output, retry with feedback, and project the result
//! onto weekdays.
//!
//! ```text
//! ContextRetriever → compose → CompletionClient → validate
//!        ▲                                           │
//!        └────────────── RetryController ◀───────────┘
//!                               │
//!                          normalize → ScheduleStore
//! ```

pub mod completion;
pub mod normalize;
pub mod prompt;
pub mod retriever;
pub mod retry;
pub mod validator;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use completion::CompletionClient;
pub use normalize::normalize;
pub use prompt::compose;
pub use retriever::ContextRetriever;
pub use retry::{
    AttemptOutcome, AttemptState, FailureReason, GenerationAttempt, GenerationOutcome,
    RetryController,
};
pub use validator::{ValidationErrors, Violation, ViolationKind, validate};
pub use workflow::{ReportStatus, ScheduleWorkflow, WorkflowReport};
