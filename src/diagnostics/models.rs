//! Diagnostic test models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::{EvaluationLevel, EvaluationResult, NodeContext};

/// Status of a queued test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

/// An ad hoc evaluation of a node, domain, module or the whole system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticTest {
    pub id: Uuid,
    pub level: EvaluationLevel,
    /// Node, domain or module id; `None` for system tests
    pub target_id: Option<String>,
    pub status: TestStatus,
    pub prompt: String,
    #[serde(default)]
    pub user_input: String,
    pub result: Option<EvaluationResult>,
    pub node_context: Option<NodeContext>,
    pub created_at: DateTime<Utc>,
    /// Bumped every time the test starts running; results carry the attempt
    /// they were requested under so stale ones can be told apart.
    #[serde(default)]
    pub attempt: u32,
}

impl DiagnosticTest {
    pub fn new(
        level: EvaluationLevel,
        target_id: Option<String>,
        prompt: String,
        node_context: Option<NodeContext>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            target_id,
            status: TestStatus::Pending,
            prompt,
            user_input: String::new(),
            result: None,
            node_context,
            created_at: Utc::now(),
            attempt: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TestStatus::Running
    }

    /// Back to pending with any partial answer or result dropped
    pub(crate) fn reset(&mut self) {
        self.status = TestStatus::Pending;
        self.user_input.clear();
        self.result = None;
    }
}
