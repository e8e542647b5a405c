//! Interaction state machine
//!
//! `initial` is the hub: every mode is entered from it and every mode
//! returns to it on `Exit`. Learning may hand over to reading, and both can
//! finish a module. Events that make no sense in the current state leave it
//! unchanged, so `transition` is defined for every input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Initial,
    Learning,
    Chronicle,
    Admin,
    Reviewing,
    Diagnosing,
    StatusViewing,
    ExploreInfinite,
    Reading,
    Finished,
}

impl InteractionState {
    pub const ALL: [InteractionState; 10] = [
        InteractionState::Initial,
        InteractionState::Learning,
        InteractionState::Chronicle,
        InteractionState::Admin,
        InteractionState::Reviewing,
        InteractionState::Diagnosing,
        InteractionState::StatusViewing,
        InteractionState::ExploreInfinite,
        InteractionState::Reading,
        InteractionState::Finished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionState::Initial => "initial",
            InteractionState::Learning => "learning",
            InteractionState::Chronicle => "chronicle",
            InteractionState::Admin => "admin",
            InteractionState::Reviewing => "reviewing",
            InteractionState::Diagnosing => "diagnosing",
            InteractionState::StatusViewing => "status_viewing",
            InteractionState::ExploreInfinite => "explore_infinite",
            InteractionState::Reading => "reading",
            InteractionState::Finished => "finished",
        }
    }

    /// Parse a persisted state, resetting unknown values to `initial`
    pub fn restore(raw: &str) -> Self {
        match raw.parse() {
            Ok(state) => state,
            Err(e) => {
                log::error!("{}; resetting to initial", e);
                InteractionState::Initial
            }
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown interaction state: {0:?}")]
pub struct UnknownState(pub String);

impl FromStr for InteractionState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// User actions that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    OpenLearning,
    OpenReading,
    OpenChronicle,
    OpenAdmin,
    OpenReviewing,
    OpenDiagnosing,
    OpenStatus,
    OpenExploreInfinite,
    /// The module in progress was completed
    SessionFinished,
    Exit,
}

/// Next state for an event. Total: unknown combinations are no-ops.
pub fn transition(current: InteractionState, event: Event) -> InteractionState {
    use InteractionState as S;

    match (current, event) {
        (_, Event::Exit) => S::Initial,

        (S::Initial, Event::OpenLearning) => S::Learning,
        (S::Initial | S::Learning, Event::OpenReading) => S::Reading,
        (S::Initial, Event::OpenChronicle) => S::Chronicle,
        (S::Initial, Event::OpenAdmin) => S::Admin,
        (S::Initial, Event::OpenReviewing) => S::Reviewing,
        (S::Initial, Event::OpenDiagnosing) => S::Diagnosing,
        (S::Initial, Event::OpenStatus) => S::StatusViewing,
        (S::Initial, Event::OpenExploreInfinite) => S::ExploreInfinite,

        (S::Learning | S::Reading, Event::SessionFinished) => S::Finished,

        (state, event) => {
            log::debug!("Ignoring {:?} in state {}", event, state);
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: [Event; 10] = [
        Event::OpenLearning,
        Event::OpenReading,
        Event::OpenChronicle,
        Event::OpenAdmin,
        Event::OpenReviewing,
        Event::OpenDiagnosing,
        Event::OpenStatus,
        Event::OpenExploreInfinite,
        Event::SessionFinished,
        Event::Exit,
    ];

    #[test]
    fn test_exit_returns_home_from_everywhere() {
        for state in InteractionState::ALL {
            assert_eq!(transition(state, Event::Exit), InteractionState::Initial);
        }
    }

    #[test]
    fn test_star_topology() {
        let spokes = [
            (Event::OpenDiagnosing, InteractionState::Diagnosing),
            (Event::OpenReviewing, InteractionState::Reviewing),
            (Event::OpenStatus, InteractionState::StatusViewing),
            (Event::OpenAdmin, InteractionState::Admin),
            (Event::OpenExploreInfinite, InteractionState::ExploreInfinite),
        ];
        for (event, spoke) in spokes {
            assert_eq!(transition(InteractionState::Initial, event), spoke);
            // no spoke-to-spoke moves
            for (other, _) in spokes {
                if other != event {
                    assert_eq!(transition(spoke, other), spoke);
                }
            }
        }
    }

    #[test]
    fn test_finished_only_leaves_to_initial() {
        assert_eq!(transition(InteractionState::Learning, Event::SessionFinished), InteractionState::Finished);
        for event in EVENTS {
            let next = transition(InteractionState::Finished, event);
            assert!(next == InteractionState::Finished || next == InteractionState::Initial);
        }
    }

    #[test]
    fn test_transition_is_total() {
        for state in InteractionState::ALL {
            for event in EVENTS {
                let next = transition(state, event);
                assert!(InteractionState::ALL.contains(&next));
            }
        }
    }

    #[test]
    fn test_parse_round_trip_and_restore() {
        for state in InteractionState::ALL {
            assert_eq!(state.as_str().parse::<InteractionState>().unwrap(), state);
        }
        assert_eq!(InteractionState::restore("status_viewing"), InteractionState::StatusViewing);
        assert_eq!(InteractionState::restore("warp_drive"), InteractionState::Initial);
        assert!("Learning".parse::<InteractionState>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&InteractionState::ExploreInfinite).unwrap();
        assert_eq!(json, "\"explore_infinite\"");
    }
}
