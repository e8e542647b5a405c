//! Evaluation request/response types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::progress::{clamp_strength, NodeProgress};

/// Scope an evaluation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationLevel {
    Node,
    Domain,
    Module,
    System,
}

impl EvaluationLevel {
    /// Levels that evaluate against a specific target id
    pub fn requires_target(self) -> bool {
        !matches!(self, EvaluationLevel::System)
    }

    /// Levels that cannot be graded without a node snapshot
    pub fn requires_node_context(self) -> bool {
        matches!(self, EvaluationLevel::Node)
    }
}

/// Snapshot of a node handed to the evaluator for grading continuity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeContext {
    pub module_id: String,
    pub domain_id: String,
    pub domain_index: usize,
    pub node_index: usize,
    pub title: String,
    pub progress: NodeProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub node_context: Option<NodeContext>,
    pub prompt: String,
    pub user_input: String,
    pub level: EvaluationLevel,
}

/// Grade returned by the evaluation service. `is_pass` is authoritative;
/// `score` may be on a 0-1 or 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    pub is_pass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<BTreeMap<String, f64>>,
}

impl EvaluationResult {
    /// Failing result produced locally when grading could not happen
    pub fn failure(feedback: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            feedback: feedback.into(),
            is_pass: false,
            rubric: None,
        }
    }

    /// Score on the 0-100 strength scale. Scores within [0, 1] are treated
    /// as fractions; anything else is clamped.
    pub fn normalized_score(&self) -> f64 {
        if !self.score.is_finite() {
            return 0.0;
        }
        if (0.0..=1.0).contains(&self.score) {
            self.score * 100.0
        } else {
            clamp_strength(self.score)
        }
    }
}
