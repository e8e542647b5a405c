//! Progress tracker
//!
//! Owns the mutable per-user state. `update_node_status` is the single
//! mutation point for node status and strength; every mutation is also
//! queued in an outbox for external persistence.

use chrono::{DateTime, Utc};

use super::models::*;
use super::storage::{ProgressError, Result};
use crate::content::{ContentProvider, ModuleType};

pub struct ProgressTracker {
    snapshot: ProgressSnapshot,
    outbox: Vec<ProgressMutation>,
}

impl ProgressTracker {
    /// Build progress for every catalog module, carrying over persisted state
    pub fn hydrate(catalog: &dyn ContentProvider, persisted: Option<ProgressSnapshot>) -> Self {
        let persisted = persisted.unwrap_or_default();
        let modules = catalog
            .modules()
            .iter()
            .map(|module| {
                let mut progress = ModuleProgress::from_content(module);
                if let Some(saved) = persisted.module(&module.id) {
                    progress.merge_persisted(saved);
                }
                progress
            })
            .collect::<Vec<_>>();

        log::debug!("Hydrated progress for {} modules", modules.len());

        Self {
            snapshot: ProgressSnapshot { modules },
            outbox: Vec::new(),
        }
    }

    /// Tracker over an existing snapshot, without a catalog
    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            snapshot,
            outbox: Vec::new(),
        }
    }

    /// Make sure a module has progress, creating it from content on first reference
    pub fn ensure_module(
        &mut self,
        catalog: &dyn ContentProvider,
        module_id: &str,
    ) -> Result<&ModuleProgress> {
        if self.snapshot.module(module_id).is_none() {
            let content = catalog
                .module(module_id)
                .ok_or_else(|| ProgressError::ModuleNotFound(module_id.to_string()))?;
            self.snapshot
                .modules
                .push(ModuleProgress::from_content(content));
            log::info!("Created progress for module {}", module_id);
        }
        self.snapshot
            .module(module_id)
            .ok_or_else(|| ProgressError::ModuleNotFound(module_id.to_string()))
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    pub fn module(&self, module_id: &str) -> Option<&ModuleProgress> {
        self.snapshot.module(module_id)
    }

    /// Look a node up by ids
    pub fn get_node(&self, module_id: &str, domain_id: &str, node_id: &str) -> Option<&NodeProgress> {
        self.snapshot
            .module(module_id)?
            .domains
            .iter()
            .find(|d| d.id == domain_id)?
            .nodes
            .iter()
            .find(|n| n.id == node_id)
    }

    /// Look a node up by position
    pub fn node_at(&self, module_id: &str, domain_index: usize, node_index: usize) -> Option<&NodeProgress> {
        self.snapshot
            .module(module_id)?
            .domains
            .get(domain_index)?
            .nodes
            .get(node_index)
    }

    /// Update a node's status and, when a score is given, its memory strength.
    /// The timestamp becomes the node's `last_reviewed`.
    #[allow(clippy::too_many_arguments)]
    pub fn update_node_status(
        &mut self,
        module_id: &str,
        domain_index: usize,
        node_index: usize,
        status: NodeStatus,
        familiar: bool,
        understood: bool,
        timestamp: DateTime<Utc>,
        score: Option<f64>,
    ) -> Result<&NodeProgress> {
        let not_found = || ProgressError::NodeNotFound {
            module_id: module_id.to_string(),
            domain_index,
            node_index,
        };

        let node = self
            .snapshot
            .module_mut(module_id)
            .ok_or_else(not_found)?
            .domains
            .get_mut(domain_index)
            .ok_or_else(not_found)?
            .nodes
            .get_mut(node_index)
            .ok_or_else(not_found)?;

        node.status = status;
        node.familiar = familiar;
        node.understood = understood;
        node.last_reviewed = Some(timestamp);
        if let Some(score) = score {
            node.memory_strength = Some(clamp_strength(score));
        }

        log::debug!(
            "Node {} in {} -> {:?} (strength {:?})",
            node.id,
            module_id,
            status,
            node.memory_strength
        );

        let updated = node.clone();
        self.outbox.push(ProgressMutation::NodeUpdated {
            module_id: module_id.to_string(),
            domain_index,
            node_index,
            node: updated,
        });

        self.node_at(module_id, domain_index, node_index)
            .ok_or_else(not_found)
    }

    pub fn set_module_status(&mut self, module_id: &str, status: ModuleStatus) -> Result<()> {
        let module = self
            .snapshot
            .module_mut(module_id)
            .ok_or_else(|| ProgressError::ModuleNotFound(module_id.to_string()))?;

        if module.status != status {
            log::info!("Module {}: {:?} -> {:?}", module_id, module.status, status);
        }
        module.status = status;

        self.outbox.push(ProgressMutation::ModuleStatusChanged {
            module_id: module_id.to_string(),
            status,
        });
        Ok(())
    }

    /// Remove a module from the library. Modules are never deleted, only
    /// demoted to `new`; node progress is kept. Core modules are rejected.
    pub fn remove_module(&mut self, module_id: &str) -> Result<()> {
        let module_type = self
            .snapshot
            .module(module_id)
            .ok_or_else(|| ProgressError::ModuleNotFound(module_id.to_string()))?
            .module_type;

        if module_type == ModuleType::Core {
            log::warn!("Refusing to remove core module {}", module_id);
            return Err(ProgressError::CoreModuleRemoval(module_id.to_string()));
        }

        self.set_module_status(module_id, ModuleStatus::New)
    }

    /// Drain pending mutations for the persistence layer
    pub fn take_mutations(&mut self) -> Vec<ProgressMutation> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::catalog::tests::sample_catalog;
    use chrono::TimeZone;

    fn tracker() -> ProgressTracker {
        ProgressTracker::hydrate(&sample_catalog(), None)
    }

    #[test]
    fn test_hydrate_builds_all_modules() {
        let tracker = tracker();
        assert_eq!(tracker.snapshot().modules.len(), 2);
        let node = tracker.get_node("algebra", "linear", "slope").unwrap();
        assert_eq!(node.status, NodeStatus::New);
        assert!(node.memory_strength.is_none());
        assert!(node.last_reviewed.is_none());
    }

    #[test]
    fn test_hydrate_merges_persisted_by_node_id() {
        let mut saved = ModuleProgress::from_content(sample_catalog().module("algebra").unwrap());
        saved.status = ModuleStatus::Installed;
        saved.domains[0].nodes[1].understood = true;
        saved.domains[0].nodes[1].memory_strength = Some(70.0);

        let snapshot = ProgressSnapshot { modules: vec![saved] };
        let tracker = ProgressTracker::hydrate(&sample_catalog(), Some(snapshot));

        assert_eq!(tracker.module("algebra").unwrap().status, ModuleStatus::Installed);
        let node = tracker.get_node("algebra", "linear", "intercept").unwrap();
        assert!(node.understood);
        assert_eq!(node.memory_strength, Some(70.0));
    }

    #[test]
    fn test_hydrate_clamps_persisted_strength() {
        let mut saved = ModuleProgress::from_content(sample_catalog().module("algebra").unwrap());
        saved.domains[0].nodes[0].memory_strength = Some(150.0);
        saved.domains[0].nodes[1].memory_strength = Some(-20.0);

        let snapshot = ProgressSnapshot { modules: vec![saved] };
        let tracker = ProgressTracker::hydrate(&sample_catalog(), Some(snapshot));

        assert_eq!(tracker.get_node("algebra", "linear", "slope").unwrap().memory_strength, Some(100.0));
        assert_eq!(tracker.get_node("algebra", "linear", "intercept").unwrap().memory_strength, Some(0.0));
    }

    #[test]
    fn test_update_node_status_clamps_and_records() {
        let mut tracker = tracker();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let node = tracker
            .update_node_status("algebra", 0, 0, NodeStatus::Understood, true, true, at, Some(140.0))
            .unwrap();
        assert_eq!(node.memory_strength, Some(100.0));
        assert_eq!(node.last_reviewed, Some(at));

        tracker
            .update_node_status("algebra", 0, 0, NodeStatus::NeedsReview, true, true, at, Some(-5.0))
            .unwrap();
        assert_eq!(tracker.node_at("algebra", 0, 0).unwrap().memory_strength, Some(0.0));

        let mutations = tracker.take_mutations();
        assert_eq!(mutations.len(), 2);
        assert!(tracker.take_mutations().is_empty());
    }

    #[test]
    fn test_update_without_score_keeps_strength() {
        let mut tracker = tracker();
        let at = Utc::now();
        tracker
            .update_node_status("algebra", 0, 0, NodeStatus::Understood, true, true, at, Some(55.0))
            .unwrap();
        let node = tracker
            .update_node_status("algebra", 0, 0, NodeStatus::Familiar, true, false, at, None)
            .unwrap();
        assert_eq!(node.memory_strength, Some(55.0));
    }

    #[test]
    fn test_update_unknown_node_fails() {
        let mut tracker = tracker();
        let result =
            tracker.update_node_status("algebra", 0, 9, NodeStatus::Understood, true, true, Utc::now(), None);
        assert!(matches!(result, Err(ProgressError::NodeNotFound { .. })));
        assert!(tracker.take_mutations().is_empty());
    }

    #[test]
    fn test_remove_module_rejects_core() {
        let mut tracker = tracker();
        assert!(matches!(
            tracker.remove_module("foundations"),
            Err(ProgressError::CoreModuleRemoval(_))
        ));

        tracker.set_module_status("algebra", ModuleStatus::Installed).unwrap();
        tracker.remove_module("algebra").unwrap();
        assert_eq!(tracker.module("algebra").unwrap().status, ModuleStatus::New);
    }

    #[test]
    fn test_ensure_module_creates_on_first_reference() {
        let mut tracker = ProgressTracker::from_snapshot(ProgressSnapshot::default());
        let catalog = sample_catalog();

        let module = tracker.ensure_module(&catalog, "foundations").unwrap();
        assert_eq!(module.domains.len(), 2);
        assert!(tracker.ensure_module(&catalog, "missing").is_err());
        assert_eq!(tracker.snapshot().modules.len(), 1);
    }
}
