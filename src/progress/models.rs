//! Per-user progress models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ContentModule, ModuleType};

/// Upper bound of memory strength
pub const MAX_STRENGTH: f64 = 100.0;

/// Lifecycle of a module in the user's library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    New,
    InLibrary,
    Downloading,
    Downloaded,
    Installing,
    Installed,
}

/// Learning status of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Never touched
    #[default]
    New,
    Familiar,
    Understood,
    /// Retention has decayed or a review failed
    NeedsReview,
}

/// Mutable state of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProgress {
    pub id: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub familiar: bool,
    #[serde(default)]
    pub understood: bool,
    /// Retention estimate in [0, 100]; `None` until the first review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_strength: Option<f64>,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_hint: String,
}

impl NodeProgress {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: NodeStatus::New,
            familiar: false,
            understood: false,
            memory_strength: None,
            last_reviewed: None,
            review_hint: String::new(),
        }
    }

    /// Stored strength, treating "never reviewed" as zero
    pub fn strength(&self) -> f64 {
        clamp_strength(self.memory_strength.unwrap_or(0.0))
    }

    /// Only nodes already learned (or flagged) take part in review scheduling
    pub fn is_review_eligible(&self) -> bool {
        self.understood || self.status == NodeStatus::NeedsReview
    }
}

/// Clamp a strength into [0, 100]; NaN becomes 0
pub fn clamp_strength(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_STRENGTH)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainProgress {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<NodeProgress>,
}

/// Mutable state of a module and all of its nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub module_type: ModuleType,
    #[serde(default)]
    pub status: ModuleStatus,
    #[serde(default)]
    pub domains: Vec<DomainProgress>,
}

impl ModuleProgress {
    /// Fresh progress for a module, with every node `new`
    pub fn from_content(module: &ContentModule) -> Self {
        Self {
            id: module.id.clone(),
            title: module.title.clone(),
            module_type: module.module_type,
            status: ModuleStatus::New,
            domains: module
                .domains
                .iter()
                .map(|domain| DomainProgress {
                    id: domain.id.clone(),
                    title: domain.title.clone(),
                    nodes: domain
                        .nodes
                        .iter()
                        .map(|node| {
                            let mut progress = NodeProgress::new(node.id.clone());
                            progress.review_hint = node.review_hint.clone();
                            progress
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Carry persisted state over onto a structure freshly built from content.
    /// Nodes are matched by id so reordered content keeps its progress.
    pub fn merge_persisted(&mut self, persisted: &ModuleProgress) {
        self.status = persisted.status;
        for domain in &mut self.domains {
            for node in &mut domain.nodes {
                let saved = persisted
                    .domains
                    .iter()
                    .flat_map(|d| d.nodes.iter())
                    .find(|n| n.id == node.id);
                if let Some(saved) = saved {
                    let hint = std::mem::take(&mut node.review_hint);
                    *node = saved.clone();
                    node.memory_strength = node.memory_strength.map(clamp_strength);
                    if node.review_hint.is_empty() {
                        node.review_hint = hint;
                    }
                }
            }
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, usize, &NodeProgress)> {
        self.domains.iter().enumerate().flat_map(|(d, domain)| {
            domain
                .nodes
                .iter()
                .enumerate()
                .map(move |(n, node)| (d, n, node))
        })
    }
}

/// Whole-user progress, modules kept in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub modules: Vec<ModuleProgress>,
}

impl ProgressSnapshot {
    pub fn module(&self, module_id: &str) -> Option<&ModuleProgress> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub(crate) fn module_mut(&mut self, module_id: &str) -> Option<&mut ModuleProgress> {
        self.modules.iter_mut().find(|m| m.id == module_id)
    }
}

/// A change emitted for external persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressMutation {
    NodeUpdated {
        module_id: String,
        domain_index: usize,
        node_index: usize,
        node: NodeProgress,
    },
    ModuleStatusChanged {
        module_id: String,
        status: ModuleStatus,
    },
}
