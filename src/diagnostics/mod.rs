//! Diagnostic test queue
//!
//! Ad hoc evaluations targeting a node, domain, module or the whole
//! system, run one at a time and graded through the evaluation gateway.

pub mod models;
pub mod queue;

pub use models::*;
pub use queue::{CancelMode, DiagnosticQueue, PendingEvaluation, SubmissionOutcome, SubmitError};
