//! Session manager
//!
//! Owns everything a running session needs: content, progress, the
//! diagnostic queue, the interaction state and its context. Collaborators
//! are injected at construction so tests can build independent sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use uuid::Uuid;

use super::chronicle::{ChronicleLoader, ChronicleRun, DungeonLoad};
use super::review::{ReviewError, ReviewItem, ReviewOutcome, ReviewSession};
use super::state::{transition, Event, InteractionState};
use super::view::{resolve_view, ReadingSession, SessionContext, View};
use crate::config::{ReviewConfig, TutorConfig};
use crate::content::ContentProvider;
use crate::diagnostics::{
    CancelMode, DiagnosticQueue, PendingEvaluation, SubmissionOutcome, SubmitError,
};
use crate::gateway::{
    EvaluationGateway, EvaluationLevel, EvaluationRequest, EvaluationResult, GatewayError,
    GatewayPolicy, NodeContext,
};
use crate::progress::{
    ModuleStatus, NodeStatus, ProgressError, ProgressMutation, ProgressTracker, SessionCursor,
};
use crate::scheduler::{
    derive_review_candidates, summarize_module, ModuleSummary, ReviewCandidate, ReviewFilters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub struct SessionManager {
    catalog: Arc<dyn ContentProvider>,
    tracker: ProgressTracker,
    diagnostics: DiagnosticQueue,
    state: InteractionState,
    context: SessionContext,
    review: Option<ReviewSession>,
    gateway: Arc<dyn EvaluationGateway>,
    chronicle_loader: Option<Arc<dyn ChronicleLoader>>,
    policy: GatewayPolicy,
    review_config: ReviewConfig,
    rng: StdRng,
    notifications: Vec<Notification>,
}

impl SessionManager {
    pub fn new(
        catalog: Arc<dyn ContentProvider>,
        tracker: ProgressTracker,
        gateway: Arc<dyn EvaluationGateway>,
        config: &TutorConfig,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            catalog,
            tracker,
            diagnostics: DiagnosticQueue::new(),
            state: InteractionState::Initial,
            context: SessionContext::default(),
            review: None,
            gateway,
            chronicle_loader: None,
            policy: GatewayPolicy::from(&config.gateway),
            review_config: config.review.clone(),
            rng,
            notifications: Vec::new(),
        }
    }

    pub fn with_chronicle_loader(mut self, loader: Arc<dyn ChronicleLoader>) -> Self {
        self.chronicle_loader = Some(loader);
        self
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn view(&self) -> View {
        resolve_view(self.state, &self.context)
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    // ---- Navigation ----

    /// Apply an event and return the view for the resulting state.
    /// Entry and exit side effects run here, never inside `transition`.
    pub fn dispatch(&mut self, event: Event) -> View {
        let previous = self.state;
        let next = transition(previous, event);

        if next != previous {
            log::debug!("Interaction {} -> {}", previous, next);

            if previous == InteractionState::Reviewing {
                self.review = None;
            }
            if previous == InteractionState::Reading {
                self.context.active_reading_session = None;
            }
            if next == InteractionState::Chronicle
                && self.chronicle_loader.is_some()
                && self.context.chronicle.needs_load()
            {
                self.context.chronicle.load = DungeonLoad::Loading;
            }
            self.state = next;
        }

        self.view()
    }

    pub fn set_active_run(&mut self, run: Option<ChronicleRun>) {
        self.context.chronicle.active_run = run;
        self.context.chronicle.load = DungeonLoad::NotLoaded;
    }

    /// Load the active run's dungeon. Also used to retry a failed load.
    /// Returns whether the dungeon is loaded afterwards.
    pub async fn load_chronicle(&mut self) -> bool {
        if self.state != InteractionState::Chronicle {
            return false;
        }
        let Some(run) = self.context.chronicle.active_run.clone() else {
            return false;
        };
        if self.context.chronicle.load == DungeonLoad::Loaded {
            return true;
        }
        let Some(loader) = self.chronicle_loader.clone() else {
            log::warn!("No chronicle loader configured for run {}", run.run_id);
            return false;
        };

        self.context.chronicle.load = DungeonLoad::Loading;
        match loader.load_dungeon(&run).await {
            Ok(()) => {
                log::info!("Loaded dungeon {} for run {}", run.dungeon_id, run.run_id);
                self.context.chronicle.load = DungeonLoad::Loaded;
                true
            }
            Err(message) => {
                log::warn!("Failed to load dungeon {}: {}", run.dungeon_id, message);
                self.notify(
                    NotificationLevel::Warning,
                    format!("Could not load the dungeon: {}", message),
                );
                self.context.chronicle.load = DungeonLoad::Failed(message);
                false
            }
        }
    }

    // ---- Cursor ----

    /// Restore a persisted cursor. An unknown state is logged and reset.
    pub fn restore_cursor(&mut self, cursor: &SessionCursor) {
        self.state = InteractionState::restore(&cursor.interaction_state);
        self.context.current_module = cursor.current_module.clone();
        self.context.current_domain = cursor.current_domain.clone();
        self.context.current_node = cursor.current_node.clone();
    }

    pub fn cursor(&self) -> SessionCursor {
        SessionCursor {
            interaction_state: self.state.to_string(),
            current_module: self.context.current_module.clone(),
            current_domain: self.context.current_domain.clone(),
            current_node: self.context.current_node.clone(),
        }
    }

    // ---- Selection ----

    /// Select the node to learn. Progress for the module is created on
    /// first reference.
    pub fn select_node(
        &mut self,
        module_id: &str,
        domain_id: &str,
        node_id: &str,
    ) -> Result<(), ProgressError> {
        self.tracker.ensure_module(self.catalog.as_ref(), module_id)?;
        if self.tracker.get_node(module_id, domain_id, node_id).is_none() {
            return Err(ProgressError::UnknownNode {
                module_id: module_id.to_string(),
                domain_id: domain_id.to_string(),
                node_id: node_id.to_string(),
            });
        }

        self.context.current_module = Some(module_id.to_string());
        self.context.current_domain = Some(domain_id.to_string());
        self.context.current_node = Some(node_id.to_string());
        Ok(())
    }

    /// Open a reading session on the selected node. An open session is kept.
    pub fn start_reading(&mut self, now: DateTime<Utc>) -> View {
        if self.state != InteractionState::Reading
            && transition(self.state, Event::OpenReading) == InteractionState::Reading
        {
            self.context.active_reading_session =
                self.context.current_node.clone().map(|node_id| ReadingSession {
                    id: Uuid::new_v4(),
                    node_id,
                    started_at: now,
                });
        }
        self.dispatch(Event::OpenReading)
    }

    // ---- Review ----

    pub fn review_candidates(
        &mut self,
        now: DateTime<Utc>,
        filters: &ReviewFilters,
    ) -> Vec<ReviewCandidate> {
        derive_review_candidates(self.tracker.snapshot(), now, filters, &mut self.rng)
    }

    /// Enter review mode with the top candidates from the configured filters
    pub fn start_review(&mut self, now: DateTime<Utc>) -> View {
        if transition(self.state, Event::OpenReviewing) != InteractionState::Reviewing {
            return self.view();
        }

        let filters = self.review_config.filters();
        let candidates = self.review_candidates(now, &filters);
        let session = ReviewSession::from_candidates(candidates, self.catalog.as_ref());
        if session.is_done() {
            self.notify(NotificationLevel::Info, "Nothing is due for review.");
        }
        log::info!("Review started with {} items", session.remaining());

        let view = self.dispatch(Event::OpenReviewing);
        self.review = Some(session);
        view
    }

    pub fn review_session(&self) -> Option<&ReviewSession> {
        self.review.as_ref()
    }

    pub fn current_review_item(&self) -> Option<&ReviewItem> {
        self.review.as_ref()?.current()
    }

    /// Grade an answer to the current review item. A pass marks the node
    /// understood and a fail flags it for review, both with the normalized
    /// score as the new strength. When grading fails the item stays current.
    pub async fn submit_review_answer(
        &mut self,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, ReviewError> {
        if self.state != InteractionState::Reviewing {
            return Err(ReviewError::NotReviewing);
        }
        let item = self
            .current_review_item()
            .cloned()
            .ok_or(ReviewError::NoActiveItem)?;
        if answer.trim().is_empty() {
            return Err(ReviewError::EmptyAnswer);
        }

        let candidate = &item.candidate;
        let Some(progress) = self
            .tracker
            .node_at(&candidate.module_id, candidate.domain_index, candidate.node_index)
            .cloned()
        else {
            log::warn!("Review item {} has no progress, dropping it", candidate.node_id);
            if let Some(review) = self.review.as_mut() {
                review.complete_current();
            }
            return Err(ReviewError::MissingContext(candidate.node_id.clone()));
        };

        let request = EvaluationRequest {
            node_context: Some(NodeContext {
                module_id: candidate.module_id.clone(),
                domain_id: candidate.domain_id.clone(),
                domain_index: candidate.domain_index,
                node_index: candidate.node_index,
                title: item.title.clone(),
                progress: progress.clone(),
            }),
            prompt: item.prompt.clone(),
            user_input: answer.to_string(),
            level: EvaluationLevel::Node,
        };

        let result = match self.policy.evaluate(self.gateway.as_ref(), &request).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Could not grade your answer: {}", e);
                self.notify(NotificationLevel::Warning, message.clone());
                return Ok(ReviewOutcome::GatewayFailed { message });
            }
        };

        let passed = result.is_pass;
        let score = result.normalized_score();
        let status = if passed {
            NodeStatus::Understood
        } else {
            NodeStatus::NeedsReview
        };

        let strength = match self.tracker.update_node_status(
            &candidate.module_id,
            candidate.domain_index,
            candidate.node_index,
            status,
            true,
            progress.understood || passed,
            now,
            Some(score),
        ) {
            Ok(node) => node.strength(),
            Err(e) => {
                log::warn!("Could not record review of {}: {}", candidate.node_id, e);
                score
            }
        };

        if let Some(review) = self.review.as_mut() {
            review.complete_current();
        }

        let node_id = candidate.node_id.clone();
        Ok(if passed {
            ReviewOutcome::Passed { node_id, strength }
        } else {
            ReviewOutcome::Failed { node_id, strength }
        })
    }

    pub fn skip_review_item(&mut self) -> bool {
        self.review.as_mut().is_some_and(ReviewSession::skip)
    }

    // ---- Diagnostics ----

    pub fn enqueue_diagnostic(&mut self, level: EvaluationLevel, target_id: Option<&str>) -> Option<Uuid> {
        self.diagnostics
            .enqueue(level, target_id, self.catalog.as_ref(), &self.tracker)
    }

    pub fn run_next_diagnostic(&mut self) -> Option<Uuid> {
        self.diagnostics.run_next()
    }

    /// Submit an answer to a running diagnostic and wait for the grade
    pub async fn submit_diagnostic(
        &mut self,
        test_id: Uuid,
        user_input: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let outcome = self
            .diagnostics
            .submit(
                test_id,
                user_input,
                self.gateway.as_ref(),
                &self.policy,
                &mut self.tracker,
                now,
            )
            .await;
        self.notify_submission(&outcome);
        outcome
    }

    /// First half of a split submission, for hosts that run the gateway
    /// call themselves
    pub fn begin_diagnostic_submission(
        &mut self,
        test_id: Uuid,
        user_input: &str,
    ) -> Result<PendingEvaluation, SubmitError> {
        let pending = self.diagnostics.begin_submission(test_id, user_input);
        if let Err(SubmitError::MissingContext) = &pending {
            self.notify(
                NotificationLevel::Warning,
                SubmitError::MissingContext.to_string(),
            );
        }
        pending
    }

    pub fn complete_diagnostic_submission(
        &mut self,
        pending: &PendingEvaluation,
        outcome: Result<EvaluationResult, GatewayError>,
        now: DateTime<Utc>,
    ) -> SubmissionOutcome {
        let outcome = self
            .diagnostics
            .complete_submission(pending, outcome, &mut self.tracker, now);
        self.notify_submission(&Ok(outcome.clone()));
        outcome
    }

    pub fn cancel_diagnostic(&mut self, test_id: Uuid, mode: CancelMode) -> bool {
        self.diagnostics.cancel(test_id, mode)
    }

    pub fn retry_diagnostic(&mut self, test_id: Uuid) -> bool {
        self.diagnostics.retry(test_id)
    }

    pub fn advance_diagnostics(&mut self) -> Option<Uuid> {
        self.diagnostics.advance()
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    fn notify_submission(&mut self, outcome: &Result<SubmissionOutcome, SubmitError>) {
        match outcome {
            Ok(SubmissionOutcome::Failed { message }) => {
                self.notify(NotificationLevel::Warning, message.clone());
            }
            Err(SubmitError::MissingContext) => {
                self.notify(
                    NotificationLevel::Warning,
                    SubmitError::MissingContext.to_string(),
                );
            }
            _ => {}
        }
    }

    // ---- Modules ----

    pub fn set_module_status(&mut self, module_id: &str, status: ModuleStatus) -> Result<(), ProgressError> {
        let result = self.tracker.set_module_status(module_id, status);
        if let Err(e) = &result {
            self.notify(NotificationLevel::Error, e.to_string());
        }
        result
    }

    pub fn remove_module(&mut self, module_id: &str) -> Result<(), ProgressError> {
        let result = self.tracker.remove_module(module_id);
        if let Err(e) = &result {
            self.notify(NotificationLevel::Error, e.to_string());
        }
        result
    }

    pub fn status_summaries(&self, now: DateTime<Utc>) -> Vec<ModuleSummary> {
        self.tracker
            .snapshot()
            .modules
            .iter()
            .map(|module| summarize_module(module, now))
            .collect()
    }

    // ---- Outputs ----

    pub fn take_mutations(&mut self) -> Vec<ProgressMutation> {
        self.tracker.take_mutations()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
            created_at: Utc::now(),
        });
    }
}
