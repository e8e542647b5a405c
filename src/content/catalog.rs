//! Content catalog loading and lookup
//!
//! Catalog file layout:
//! ```json
//! { "modules": [ { "id": "...", "type": "core", "domains": [ { "nodes": [...] } ] } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::*;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Position of a node inside the module/domain hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    pub module_id: String,
    pub domain_id: String,
    pub domain_index: usize,
    pub node_index: usize,
}

/// Read-only access to authored content
pub trait ContentProvider: Send + Sync {
    /// All modules in catalog order
    fn modules(&self) -> &[ContentModule];

    fn module(&self, module_id: &str) -> Option<&ContentModule> {
        self.modules().iter().find(|m| m.id == module_id)
    }

    fn node(&self, module_id: &str, domain_index: usize, node_index: usize) -> Option<&ContentNode> {
        self.module(module_id)?
            .domains
            .get(domain_index)?
            .nodes
            .get(node_index)
    }

    /// Find where a node lives. Node ids are expected to be unique across the
    /// catalog; the first match wins otherwise.
    fn locate_node(&self, node_id: &str) -> Option<NodeLocation> {
        self.modules().iter().find_map(|module| {
            module.domains.iter().enumerate().find_map(|(d, domain)| {
                domain
                    .nodes
                    .iter()
                    .position(|n| n.id == node_id)
                    .map(|n| NodeLocation {
                        module_id: module.id.clone(),
                        domain_id: domain.id.clone(),
                        domain_index: d,
                        node_index: n,
                    })
            })
        })
    }

    /// First module of the given type in catalog order
    fn first_of_type(&self, module_type: ModuleType) -> Option<&ContentModule> {
        self.modules().iter().find(|m| m.module_type == module_type)
    }
}

/// In-memory catalog, usually loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    modules: Vec<ContentModule>,
}

impl Catalog {
    pub fn new(modules: Vec<ContentModule>) -> Self {
        Self { modules }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// Load a catalog from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        log::info!(
            "Loaded content catalog from {} ({} modules)",
            path.display(),
            catalog.modules.len()
        );
        Ok(catalog)
    }

    pub fn require_module(&self, module_id: &str) -> Result<&ContentModule> {
        self.module(module_id)
            .ok_or_else(|| ContentError::ModuleNotFound(module_id.to_string()))
    }
}

impl ContentProvider for Catalog {
    fn modules(&self) -> &[ContentModule] {
        &self.modules
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_catalog() -> Catalog {
        Catalog::from_json_str(
            r#"{
                "modules": [
                    {
                        "id": "algebra",
                        "title": "Algebra",
                        "type": "pillar",
                        "domains": [
                            {
                                "id": "linear",
                                "title": "Linear equations",
                                "nodes": [
                                    { "id": "slope", "title": "Slope", "explainPrompt": "Explain slope." },
                                    { "id": "intercept", "title": "Intercept", "probeQuestions": ["Where does the line cross y?"] }
                                ]
                            }
                        ]
                    },
                    {
                        "id": "foundations",
                        "title": "Foundations",
                        "type": "core",
                        "domains": [
                            { "id": "empty", "title": "Empty", "nodes": [] },
                            {
                                "id": "sets",
                                "title": "Sets",
                                "nodes": [
                                    { "id": "union", "title": "Union", "implementPrompt": "Implement union." }
                                ]
                            }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_locate_node() {
        let catalog = sample_catalog();
        let loc = catalog.locate_node("union").unwrap();
        assert_eq!(loc.module_id, "foundations");
        assert_eq!(loc.domain_id, "sets");
        assert_eq!(loc.domain_index, 1);
        assert_eq!(loc.node_index, 0);
        assert!(catalog.locate_node("missing").is_none());
    }

    #[test]
    fn test_first_node_skips_empty_domains() {
        let catalog = sample_catalog();
        let module = catalog.module("foundations").unwrap();
        let (d, n, node) = module.first_node().unwrap();
        assert_eq!((d, n), (1, 0));
        assert_eq!(node.id, "union");
    }

    #[test]
    fn test_first_of_type() {
        let catalog = sample_catalog();
        assert_eq!(catalog.first_of_type(ModuleType::Core).unwrap().id, "foundations");
        assert!(catalog.first_of_type(ModuleType::Challenge).is_none());
    }

    #[test]
    fn test_probe_falls_back_to_questions() {
        let catalog = sample_catalog();
        let node = catalog.node("algebra", 0, 1).unwrap();
        assert_eq!(node.probe(), Some("Where does the line cross y?"));
        assert_eq!(node.explain(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, serde_json::to_string(&sample_catalog()).unwrap()).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.modules().len(), 2);
        assert!(catalog.require_module("nope").is_err());
    }
}
