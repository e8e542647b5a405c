//! Spaced-repetition scheduler
//!
//! Pure functions over node progress and a reference time:
//! - Memory decay and effective strength
//! - Due dates, due classification and review priority
//! - Weighted EPIC component selection
//! - On-demand derivation of review candidates

pub mod algorithm;
pub mod candidates;
pub mod epic;

pub use algorithm::*;
pub use candidates::{
    derive_review_candidates, summarize_module, ModuleSummary, ReviewCandidate, ReviewFilters,
    ReviewWindow,
};
pub use epic::{choose_epic_component, review_prompt, EpicComponent};
