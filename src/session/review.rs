//! Review session flow
//!
//! A review session walks through the top review candidates, asking each
//! with its chosen EPIC prompt. Grades go through the same evaluation
//! contract as diagnostics and land in the progress tracker.

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

use crate::content::ContentProvider;
use crate::scheduler::{review_prompt, ReviewCandidate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Not in review mode")]
    NotReviewing,

    #[error("No review item is waiting for an answer")]
    NoActiveItem,

    #[error("Answer is empty")]
    EmptyAnswer,

    #[error("Review item has no progress for node {0}")]
    MissingContext(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub candidate: ReviewCandidate,
    pub title: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ReviewOutcome {
    Passed { node_id: String, strength: f64 },
    Failed { node_id: String, strength: f64 },
    /// The grade could not be obtained; the item stays current
    GatewayFailed { message: String },
}

#[derive(Debug, Default)]
pub struct ReviewSession {
    items: VecDeque<ReviewItem>,
    answered: usize,
}

impl ReviewSession {
    /// Build a session from ranked candidates. Candidates whose node is
    /// missing from content are skipped.
    pub fn from_candidates(candidates: Vec<ReviewCandidate>, catalog: &dyn ContentProvider) -> Self {
        let items = candidates
            .into_iter()
            .filter_map(|candidate| {
                let Some(node) = catalog.node(&candidate.module_id, candidate.domain_index, candidate.node_index)
                else {
                    log::warn!("Review candidate {} has no content, skipping", candidate.node_id);
                    return None;
                };
                Some(ReviewItem {
                    title: node.title.clone(),
                    prompt: review_prompt(candidate.chosen_epic_component, node),
                    candidate,
                })
            })
            .collect();

        Self { items, answered: 0 }
    }

    pub fn current(&self) -> Option<&ReviewItem> {
        self.items.front()
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn is_done(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop the current item after it was graded
    pub(crate) fn complete_current(&mut self) -> Option<ReviewItem> {
        let item = self.items.pop_front()?;
        self.answered += 1;
        Some(item)
    }

    /// Move the current item to the back of the line
    pub fn skip(&mut self) -> bool {
        match self.items.pop_front() {
            Some(item) => {
                self.items.push_back(item);
                true
            }
            None => false,
        }
    }
}
