//! Adaptive tutoring core
//!
//! Tracks what a learner knows, schedules spaced reviews, runs ad hoc
//! diagnostics through an evaluation gateway, and drives the interaction
//! modes a presentation layer renders.

pub mod config;
pub mod content;
pub mod diagnostics;
pub mod gateway;
pub mod progress;
pub mod scheduler;
pub mod session;

pub use config::TutorConfig;
pub use content::{Catalog, ContentProvider};
pub use gateway::{EvaluationGateway, GatewayPolicy};
pub use progress::{ProgressStorage, ProgressTracker};
pub use session::SessionManager;
