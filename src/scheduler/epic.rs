//! EPIC review components
//!
//! A review re-tests a node in one of four styles: Explain, Probe,
//! Implement or Connect. The style is drawn at random with fixed weights.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::content::ContentNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpicComponent {
    Explain,
    Probe,
    Implement,
    Connect,
}

impl EpicComponent {
    /// Draw order and weights; weights sum to 1
    pub const WEIGHTED: [(EpicComponent, f64); 4] = [
        (EpicComponent::Probe, 0.4),
        (EpicComponent::Explain, 0.3),
        (EpicComponent::Implement, 0.2),
        (EpicComponent::Connect, 0.1),
    ];

    pub fn weight(self) -> f64 {
        Self::WEIGHTED
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }
}

/// Weighted draw of a review component from the given random source
pub fn choose_epic_component<R: Rng + ?Sized>(rng: &mut R) -> EpicComponent {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (component, weight) in EpicComponent::WEIGHTED {
        cumulative += weight;
        if roll < cumulative {
            return component;
        }
    }
    // roll can land on the float remainder above the last cumulative bound
    EpicComponent::Connect
}

/// Prompt for reviewing a node in the given style. Falls back to the
/// node's explain prompt, then to a generic prompt naming the node.
pub fn review_prompt(component: EpicComponent, node: &ContentNode) -> String {
    let specific = match component {
        EpicComponent::Explain => node.explain(),
        EpicComponent::Probe => node.probe(),
        EpicComponent::Implement => node.implement(),
        EpicComponent::Connect => node.connect(),
    };

    specific
        .or_else(|| node.explain())
        .map(str::to_string)
        .unwrap_or_else(|| generic_prompt(component, &node.title))
}

fn generic_prompt(component: EpicComponent, title: &str) -> String {
    match component {
        EpicComponent::Explain => format!("Explain {} in your own words.", title),
        EpicComponent::Probe => format!("What is the most important idea behind {}?", title),
        EpicComponent::Implement => format!("Describe how you would apply {} to a concrete problem.", title),
        EpicComponent::Connect => format!("How does {} relate to what you already know?", title),
    }
}
