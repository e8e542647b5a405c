//! What the presentation layer should render for a state
//!
//! Modes that need context (`learning`, `reading`) check it on entry. When
//! it is missing they resolve to a recoverable error view that only offers
//! a reset to `initial`; the interaction state itself is not changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chronicle::{ChronicleState, DungeonLoad};
use super::state::InteractionState;

/// An open reading session on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: Uuid,
    pub node_id: String,
    pub started_at: DateTime<Utc>,
}

/// Selection and sub-mode state the controller carries between events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub current_module: Option<String>,
    pub current_domain: Option<String>,
    pub current_node: Option<String>,
    pub active_reading_session: Option<ReadingSession>,
    #[serde(default)]
    pub chronicle: ChronicleState,
}

/// Sub-view of the chronicle mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChronicleView {
    NoActiveRun,
    Loading,
    Ready { dungeon_id: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Learning {
        module_id: String,
        domain_id: Option<String>,
        node_id: String,
    },
    Reading {
        session: ReadingSession,
        module_id: String,
        domain_id: String,
        node_id: String,
    },
    Chronicle(ChronicleView),
    Reviewing,
    Diagnosing,
    StatusViewing,
    Admin,
    ExploreInfinite,
    Finished,
    /// Degraded view for a guarded mode entered without its context. The
    /// only action it offers is a reset to `initial`.
    MissingContext {
        state: InteractionState,
        missing: Vec<String>,
    },
}

impl View {
    pub fn is_degraded(&self) -> bool {
        matches!(self, View::MissingContext { .. })
    }
}

pub fn resolve_view(state: InteractionState, ctx: &SessionContext) -> View {
    match state {
        InteractionState::Initial => View::Dashboard,
        InteractionState::Learning => {
            match (&ctx.current_module, &ctx.current_node) {
                (Some(module_id), Some(node_id)) => View::Learning {
                    module_id: module_id.clone(),
                    domain_id: ctx.current_domain.clone(),
                    node_id: node_id.clone(),
                },
                _ => missing_context(state, ctx),
            }
        }
        InteractionState::Reading => match (
            &ctx.active_reading_session,
            &ctx.current_module,
            &ctx.current_domain,
            &ctx.current_node,
        ) {
            (Some(session), Some(module_id), Some(domain_id), Some(node_id)) => View::Reading {
                session: session.clone(),
                module_id: module_id.clone(),
                domain_id: domain_id.clone(),
                node_id: node_id.clone(),
            },
            _ => missing_context(state, ctx),
        },
        InteractionState::Chronicle => View::Chronicle(chronicle_view(&ctx.chronicle)),
        InteractionState::Reviewing => View::Reviewing,
        InteractionState::Diagnosing => View::Diagnosing,
        InteractionState::StatusViewing => View::StatusViewing,
        InteractionState::Admin => View::Admin,
        InteractionState::ExploreInfinite => View::ExploreInfinite,
        InteractionState::Finished => View::Finished,
    }
}

fn chronicle_view(chronicle: &ChronicleState) -> ChronicleView {
    let Some(run) = &chronicle.active_run else {
        return ChronicleView::NoActiveRun;
    };
    match &chronicle.load {
        DungeonLoad::Loaded => ChronicleView::Ready {
            dungeon_id: run.dungeon_id.clone(),
        },
        DungeonLoad::Failed(message) => ChronicleView::Failed {
            message: message.clone(),
        },
        DungeonLoad::NotLoaded | DungeonLoad::Loading => ChronicleView::Loading,
    }
}

fn missing_context(state: InteractionState, ctx: &SessionContext) -> View {
    let mut missing = Vec::new();
    if state == InteractionState::Reading && ctx.active_reading_session.is_none() {
        missing.push("reading session".to_string());
    }
    if ctx.current_module.is_none() {
        missing.push("module".to_string());
    }
    if state == InteractionState::Reading && ctx.current_domain.is_none() {
        missing.push("domain".to_string());
    }
    if ctx.current_node.is_none() {
        missing.push("node".to_string());
    }

    log::warn!("Entered {} without {}", state, missing.join(", "));
    View::MissingContext { state, missing }
}
