//! Diagnostic test queue
//!
//! Tests move `pending -> running -> completed | error`. At most one test is
//! running at a time. A submission is split into `begin_submission` (checks
//! and builds the gateway request) and `complete_submission` (applies the
//! gateway outcome) so a test cancelled while its evaluation is in flight
//! ignores the late result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::models::{DiagnosticTest, TestStatus};
use crate::content::{ContentNode, ContentProvider, ModuleType};
use crate::gateway::{
    EvaluationGateway, EvaluationLevel, EvaluationRequest, EvaluationResult, GatewayError,
    GatewayPolicy, NodeContext,
};
use crate::progress::{NodeStatus, ProgressTracker};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Diagnostic test not found: {0}")]
    NotFound(Uuid),

    #[error("Diagnostic test is {0:?}, not running")]
    NotRunning(TestStatus),

    #[error("Diagnostic test has no prompt")]
    EmptyPrompt,

    #[error("Answer is empty")]
    EmptyInput,

    #[error("Diagnostic test has no node context")]
    MissingContext,
}

/// What to do with a running test when the user backs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    /// Put it back as pending
    Requeue,
    /// Drop it from the queue
    Discard,
}

/// A request ready to be sent to the evaluation gateway
#[derive(Debug, Clone)]
pub struct PendingEvaluation {
    pub test_id: Uuid,
    pub attempt: u32,
    pub request: EvaluationRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// Graded; `passed` mirrors `is_pass`
    Completed { passed: bool },
    /// The gateway failed; the test is in `error` and can be retried
    Failed { message: String },
    /// The test was no longer waiting for this result
    Discarded,
}

#[derive(Debug, Default)]
pub struct DiagnosticQueue {
    tests: Vec<DiagnosticTest>,
    current: Option<Uuid>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tests(&self) -> &[DiagnosticTest] {
        &self.tests
    }

    pub fn get(&self, test_id: Uuid) -> Option<&DiagnosticTest> {
        self.tests.iter().find(|t| t.id == test_id)
    }

    fn get_mut(&mut self, test_id: Uuid) -> Option<&mut DiagnosticTest> {
        self.tests.iter_mut().find(|t| t.id == test_id)
    }

    /// The test the user is looking at, if any
    pub fn current(&self) -> Option<&DiagnosticTest> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn running(&self) -> Option<&DiagnosticTest> {
        self.tests.iter().find(|t| t.is_running())
    }

    pub fn running_count(&self) -> usize {
        self.tests.iter().filter(|t| t.is_running()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| t.status == TestStatus::Pending)
            .count()
    }

    /// Queue a test. Node context and prompt are resolved from content and
    /// progress. Returns `None` without queueing when the level needs a
    /// target and none was given.
    pub fn enqueue(
        &mut self,
        level: EvaluationLevel,
        target_id: Option<&str>,
        catalog: &dyn ContentProvider,
        tracker: &ProgressTracker,
    ) -> Option<Uuid> {
        let target_id = target_id.map(str::trim).filter(|t| !t.is_empty());
        if level.requires_target() && target_id.is_none() {
            log::debug!("Ignoring {:?} diagnostic without a target", level);
            return None;
        }

        let resolved = resolve_node(level, target_id, catalog);
        let node_context = resolved.as_ref().and_then(|(module_id, domain_id, d, n, node)| {
            tracker.node_at(module_id, *d, *n).map(|progress| NodeContext {
                module_id: module_id.clone(),
                domain_id: domain_id.clone(),
                domain_index: *d,
                node_index: *n,
                title: node.title.clone(),
                progress: progress.clone(),
            })
        });

        let prompt = resolved
            .as_ref()
            .and_then(|(.., node)| node.explain().map(str::to_string))
            .unwrap_or_else(|| fallback_prompt(level, resolved.as_ref().map(|(.., node)| node.title.as_str())));

        let test = DiagnosticTest::new(level, target_id.map(str::to_string), prompt, node_context);
        let id = test.id;
        log::debug!("Queued {:?} diagnostic {} for {:?}", level, id, target_id);
        self.tests.push(test);
        if self.current.is_none() {
            self.current = Some(id);
        }
        Some(id)
    }

    /// Start the earliest pending test. No-op while another test is running.
    pub fn run_next(&mut self) -> Option<Uuid> {
        if let Some(running) = self.running() {
            log::debug!("Diagnostic {} already running", running.id);
            return None;
        }

        let test = self
            .tests
            .iter_mut()
            .find(|t| t.status == TestStatus::Pending)?;
        test.status = TestStatus::Running;
        test.attempt += 1;
        let id = test.id;
        self.current = Some(id);

        debug_assert!(self.running_count() <= 1);
        log::debug!("Diagnostic {} running", id);
        Some(id)
    }

    /// Validate an answer and build the gateway request. A test that needs
    /// node context but has none goes straight to `error` with a synthetic
    /// failing result.
    pub fn begin_submission(
        &mut self,
        test_id: Uuid,
        user_input: &str,
    ) -> Result<PendingEvaluation, SubmitError> {
        let test = self.get_mut(test_id).ok_or(SubmitError::NotFound(test_id))?;

        if test.status != TestStatus::Running {
            return Err(SubmitError::NotRunning(test.status));
        }
        if test.prompt.trim().is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        if user_input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        test.user_input = user_input.to_string();

        if test.level.requires_node_context() && test.node_context.is_none() {
            log::warn!("Diagnostic {} submitted without node context", test_id);
            test.status = TestStatus::Error;
            test.result = Some(EvaluationResult::failure(
                "Could not grade this answer: the node it refers to is unavailable.",
            ));
            return Err(SubmitError::MissingContext);
        }

        Ok(PendingEvaluation {
            test_id,
            attempt: test.attempt,
            request: EvaluationRequest {
                node_context: test.node_context.clone(),
                prompt: test.prompt.clone(),
                user_input: test.user_input.clone(),
                level: test.level,
            },
        })
    }

    /// Apply a gateway outcome. Ignored unless the test is still running the
    /// attempt the request was made for. A passed node-level test marks the
    /// node understood.
    pub fn complete_submission(
        &mut self,
        pending: &PendingEvaluation,
        outcome: Result<EvaluationResult, GatewayError>,
        tracker: &mut ProgressTracker,
        now: DateTime<Utc>,
    ) -> SubmissionOutcome {
        let Some(test) = self.get_mut(pending.test_id) else {
            log::info!("Dropping result for removed diagnostic {}", pending.test_id);
            return SubmissionOutcome::Discarded;
        };
        if test.status != TestStatus::Running || test.attempt != pending.attempt {
            log::info!(
                "Dropping late result for diagnostic {} ({:?})",
                test.id,
                test.status
            );
            return SubmissionOutcome::Discarded;
        }

        match outcome {
            Ok(result) => {
                let passed = result.is_pass;
                let score = result.normalized_score();
                test.result = Some(result);
                test.status = TestStatus::Completed;

                if passed && test.level == EvaluationLevel::Node {
                    if let Some(ctx) = &test.node_context {
                        if let Err(e) = tracker.update_node_status(
                            &ctx.module_id,
                            ctx.domain_index,
                            ctx.node_index,
                            NodeStatus::Understood,
                            true,
                            true,
                            now,
                            Some(score),
                        ) {
                            log::warn!("Could not record diagnostic pass for {}: {}", ctx.title, e);
                        }
                    }
                }
                SubmissionOutcome::Completed { passed }
            }
            Err(e) => {
                let message = format!("Evaluation failed: {}", e);
                test.result = Some(EvaluationResult::failure(message.clone()));
                test.status = TestStatus::Error;
                SubmissionOutcome::Failed { message }
            }
        }
    }

    /// Submit an answer for a running test and wait for the grade
    pub async fn submit(
        &mut self,
        test_id: Uuid,
        user_input: &str,
        gateway: &dyn EvaluationGateway,
        policy: &GatewayPolicy,
        tracker: &mut ProgressTracker,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let pending = self.begin_submission(test_id, user_input)?;
        let outcome = policy.evaluate(gateway, &pending.request).await;
        Ok(self.complete_submission(&pending, outcome, tracker, now))
    }

    /// Back out of a running test, or drop any test with `Discard`
    pub fn cancel(&mut self, test_id: Uuid, mode: CancelMode) -> bool {
        match mode {
            CancelMode::Requeue => {
                let Some(test) = self.get_mut(test_id) else {
                    return false;
                };
                if test.status != TestStatus::Running {
                    return false;
                }
                test.reset();
                log::debug!("Diagnostic {} requeued", test_id);
                true
            }
            CancelMode::Discard => {
                let Some(pos) = self.tests.iter().position(|t| t.id == test_id) else {
                    return false;
                };
                if self.current == Some(test_id) {
                    self.advance();
                }
                self.tests.remove(pos);
                log::debug!("Diagnostic {} discarded", test_id);
                true
            }
        }
    }

    /// Put a failed test back in the queue
    pub fn retry(&mut self, test_id: Uuid) -> bool {
        match self.get_mut(test_id) {
            Some(test) if test.status == TestStatus::Error => {
                test.reset();
                true
            }
            _ => false,
        }
    }

    /// Move the current pointer to the next pending test after it. When
    /// there is none the pointer is cleared and the queue goes idle.
    pub fn advance(&mut self) -> Option<Uuid> {
        let start = self
            .current
            .and_then(|id| self.tests.iter().position(|t| t.id == id))
            .map(|pos| pos + 1)
            .unwrap_or(0);

        self.current = self.tests[start.min(self.tests.len())..]
            .iter()
            .find(|t| t.status == TestStatus::Pending)
            .map(|t| t.id);
        self.current
    }

    pub fn clear(&mut self) {
        self.tests.clear();
        self.current = None;
    }
}

/// Representative node for a diagnostic: the node itself, or the first node
/// of the target domain/module, or of the first core module for system tests
fn resolve_node<'a>(
    level: EvaluationLevel,
    target_id: Option<&str>,
    catalog: &'a dyn ContentProvider,
) -> Option<(String, String, usize, usize, &'a ContentNode)> {
    match level {
        EvaluationLevel::Node => {
            let loc = catalog.locate_node(target_id?)?;
            let node = catalog.node(&loc.module_id, loc.domain_index, loc.node_index)?;
            Some((loc.module_id, loc.domain_id, loc.domain_index, loc.node_index, node))
        }
        EvaluationLevel::Domain => {
            let target = target_id?;
            catalog.modules().iter().find_map(|module| {
                let (d, domain) = module.domain(target)?;
                let node = domain.nodes.first()?;
                Some((module.id.clone(), domain.id.clone(), d, 0, node))
            })
        }
        EvaluationLevel::Module => first_node_of(catalog.module(target_id?)?),
        EvaluationLevel::System => first_node_of(catalog.first_of_type(ModuleType::Core)?),
    }
}

fn first_node_of(
    module: &crate::content::ContentModule,
) -> Option<(String, String, usize, usize, &ContentNode)> {
    let (d, n, node) = module.first_node()?;
    Some((module.id.clone(), module.domains[d].id.clone(), d, n, node))
}

fn fallback_prompt(level: EvaluationLevel, title: Option<&str>) -> String {
    match (level, title) {
        (EvaluationLevel::System, _) => {
            "Summarize the core ideas you have learned so far and how they fit together.".to_string()
        }
        (_, Some(title)) => format!("Explain the key ideas of {} in your own words.", title),
        (_, None) => "Explain what you know about this topic in your own words.".to_string(),
    }
}
