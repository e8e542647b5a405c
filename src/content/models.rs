//! Data models for authored content

use serde::{Deserialize, Serialize};

/// Kind of module, used for library rules and system-level diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    /// Foundational module, cannot be removed from the library
    Core,
    Pillar,
    #[default]
    Auxiliary,
    Challenge,
}

/// A module is an ordered collection of domains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentModule {
    pub id: String,
    pub title: String,
    #[serde(default, rename = "type")]
    pub module_type: ModuleType,
    #[serde(default)]
    pub domains: Vec<ContentDomain>,
}

impl ContentModule {
    /// First node of the first domain, used as a representative context
    pub fn first_node(&self) -> Option<(usize, usize, &ContentNode)> {
        self.domains
            .iter()
            .enumerate()
            .find_map(|(d, domain)| domain.nodes.first().map(|node| (d, 0, node)))
    }

    pub fn domain(&self, domain_id: &str) -> Option<(usize, &ContentDomain)> {
        self.domains
            .iter()
            .enumerate()
            .find(|(_, d)| d.id == domain_id)
    }
}

/// A grouping of nodes inside a module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDomain {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<ContentNode>,
}

/// The atomic learning unit, with the default prompts used for review
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probe_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implement_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_prompt: Option<String>,
    #[serde(default)]
    pub review_hint: String,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Explain prompt, ignoring blank strings
    pub fn explain(&self) -> Option<&str> {
        non_blank(self.explain_prompt.as_deref())
    }

    /// Probe prompt, falling back to the first probe question
    pub fn probe(&self) -> Option<&str> {
        non_blank(self.probe_prompt.as_deref())
            .or_else(|| non_blank(self.probe_questions.first().map(String::as_str)))
    }

    pub fn implement(&self) -> Option<&str> {
        non_blank(self.implement_prompt.as_deref())
    }

    pub fn connect(&self) -> Option<&str> {
        non_blank(self.connect_prompt.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
