//! Evaluation gateway
//!
//! The core treats the evaluation service as an opaque, possibly slow and
//! possibly failing remote call. Failures are returned as [`GatewayError`]
//! and turned into failing results by callers, never propagated into the
//! session state machine.

#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod policy;

pub use models::*;
pub use policy::{EvaluationGateway, GatewayError, GatewayPolicy};
