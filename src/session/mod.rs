//! Interaction session
//!
//! This module provides:
//! - The interaction state machine and its total transition function
//! - View resolution with guarded entry for context-dependent modes
//! - Chronicle loading and the review session flow
//! - `SessionManager`, which ties content, progress, diagnostics and the
//!   evaluation gateway together for one user session

pub mod chronicle;
pub mod manager;
pub mod review;
pub mod state;
pub mod view;

pub use chronicle::{ChronicleLoader, ChronicleRun, ChronicleState, DungeonLoad};
pub use manager::{Notification, NotificationLevel, SessionManager};
pub use review::{ReviewError, ReviewItem, ReviewOutcome, ReviewSession};
pub use state::{transition, Event, InteractionState, UnknownState};
pub use view::{resolve_view, ChronicleView, ReadingSession, SessionContext, View};
