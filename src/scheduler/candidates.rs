//! Review candidate derivation
//!
//! Candidates are derived on demand from a progress snapshot and never
//! stored. Only learned nodes (understood, or flagged for review) are
//! scheduled; untouched nodes belong to first learning, not review.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::algorithm::{classify, due_date, effective_strength, priority_score};
use super::epic::{choose_epic_component, EpicComponent};
use crate::progress::{ModuleProgress, ModuleStatus, NodeStatus, ProgressSnapshot};

/// A node proposed for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCandidate {
    pub node_id: String,
    pub module_id: String,
    pub domain_id: String,
    pub domain_index: usize,
    pub node_index: usize,
    pub current_memory_strength: f64,
    pub due_date: DateTime<Utc>,
    pub is_due: bool,
    pub is_due_today: bool,
    pub is_due_this_week: bool,
    pub priority_score: f64,
    pub chosen_epic_component: EpicComponent,
}

/// Which candidates to keep, by due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewWindow {
    All,
    #[default]
    Due,
    Today,
    Week,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilters {
    #[serde(default)]
    pub module_id: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub window: ReviewWindow,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ReviewFilters {
    pub fn all() -> Self {
        Self {
            window: ReviewWindow::All,
            ..Default::default()
        }
    }
}

/// Derive review candidates, highest priority first. Ties keep snapshot
/// order. The EPIC component is drawn for each returned candidate in order.
pub fn derive_review_candidates<R: Rng + ?Sized>(
    snapshot: &ProgressSnapshot,
    now: DateTime<Utc>,
    filters: &ReviewFilters,
    rng: &mut R,
) -> Vec<ReviewCandidate> {
    let mut scored = Vec::new();

    for module in &snapshot.modules {
        if filters.module_id.as_deref().is_some_and(|id| id != module.id) {
            continue;
        }
        for (d, domain) in module.domains.iter().enumerate() {
            if filters.domain_id.as_deref().is_some_and(|id| id != domain.id) {
                continue;
            }
            for (n, node) in domain.nodes.iter().enumerate() {
                if !node.is_review_eligible() {
                    continue;
                }

                let due = due_date(node);
                let flags = classify(due, now);
                let keep = match filters.window {
                    ReviewWindow::All => true,
                    ReviewWindow::Due => flags.is_due,
                    ReviewWindow::Today => flags.is_due_today,
                    ReviewWindow::Week => flags.is_due_this_week,
                };
                if !keep {
                    continue;
                }

                scored.push((
                    priority_score(node, now),
                    module.id.as_str(),
                    domain.id.as_str(),
                    d,
                    n,
                    node,
                    due,
                    flags,
                ));
            }
        }
    }

    // sort_by is stable, so equal scores keep snapshot order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    if let Some(limit) = filters.limit {
        scored.truncate(limit);
    }

    scored
        .into_iter()
        .map(|(score, module_id, domain_id, d, n, node, due, flags)| ReviewCandidate {
            node_id: node.id.clone(),
            module_id: module_id.to_string(),
            domain_id: domain_id.to_string(),
            domain_index: d,
            node_index: n,
            current_memory_strength: effective_strength(node, now),
            due_date: due,
            is_due: flags.is_due,
            is_due_today: flags.is_due_today,
            is_due_this_week: flags.is_due_this_week,
            priority_score: score,
            chosen_epic_component: choose_epic_component(rng),
        })
        .collect()
}

/// Per-module progress overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub module_id: String,
    pub title: String,
    pub status: ModuleStatus,
    pub total_nodes: usize,
    pub new_nodes: usize,
    pub familiar_nodes: usize,
    pub understood_nodes: usize,
    pub needs_review_nodes: usize,
    pub due_nodes: usize,
    /// Mean effective strength over reviewed nodes, `None` when none were reviewed
    pub average_strength: Option<f64>,
}

pub fn summarize_module(module: &ModuleProgress, now: DateTime<Utc>) -> ModuleSummary {
    let mut summary = ModuleSummary {
        module_id: module.id.clone(),
        title: module.title.clone(),
        status: module.status,
        total_nodes: 0,
        new_nodes: 0,
        familiar_nodes: 0,
        understood_nodes: 0,
        needs_review_nodes: 0,
        due_nodes: 0,
        average_strength: None,
    };

    let mut strength_total = 0.0;
    let mut reviewed = 0usize;

    for (_, _, node) in module.nodes() {
        summary.total_nodes += 1;
        match node.status {
            NodeStatus::New => summary.new_nodes += 1,
            NodeStatus::Familiar => summary.familiar_nodes += 1,
            NodeStatus::Understood => summary.understood_nodes += 1,
            NodeStatus::NeedsReview => summary.needs_review_nodes += 1,
        }
        if node.is_review_eligible() && classify(due_date(node), now).is_due {
            summary.due_nodes += 1;
        }
        if node.last_reviewed.is_some() {
            strength_total += effective_strength(node, now);
            reviewed += 1;
        }
    }

    if reviewed > 0 {
        summary.average_strength = Some(strength_total / reviewed as f64);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::catalog::tests::sample_catalog;
    use crate::content::ContentProvider;
    use crate::progress::ProgressTracker;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 15, 30, 0).unwrap()
    }

    fn tracker_with_reviews() -> ProgressTracker {
        let mut tracker = ProgressTracker::hydrate(&sample_catalog(), None);
        // slope: strong, reviewed yesterday -> not due
        tracker
            .update_node_status("algebra", 0, 0, NodeStatus::Understood, true, true, now() - Duration::days(1), Some(95.0))
            .unwrap();
        // intercept: weak, reviewed 10 days ago -> overdue
        tracker
            .update_node_status("algebra", 0, 1, NodeStatus::Understood, true, true, now() - Duration::days(10), Some(30.0))
            .unwrap();
        // union: flagged for review
        tracker
            .update_node_status("foundations", 1, 0, NodeStatus::NeedsReview, true, false, now() - Duration::days(5), Some(60.0))
            .unwrap();
        tracker
    }

    #[test]
    fn test_untouched_nodes_are_never_candidates() {
        let tracker = ProgressTracker::hydrate(&sample_catalog(), None);
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = derive_review_candidates(tracker.snapshot(), now(), &ReviewFilters::all(), &mut rng);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_candidates_sorted_by_priority() {
        let tracker = tracker_with_reviews();
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = derive_review_candidates(tracker.snapshot(), now(), &ReviewFilters::all(), &mut rng);

        let ids: Vec<_> = candidates.iter().map(|c| c.node_id.as_str()).collect();
        assert_eq!(ids, vec!["intercept", "union", "slope"]);
        assert!(candidates.windows(2).all(|w| w[0].priority_score >= w[1].priority_score));
    }

    #[test]
    fn test_due_window_filters() {
        let tracker = tracker_with_reviews();
        let mut rng = StdRng::seed_from_u64(1);
        let due = derive_review_candidates(tracker.snapshot(), now(), &ReviewFilters::default(), &mut rng);
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|c| c.is_due));

        let filters = ReviewFilters {
            module_id: Some("algebra".to_string()),
            window: ReviewWindow::All,
            limit: Some(1),
            ..Default::default()
        };
        let limited = derive_review_candidates(tracker.snapshot(), now(), &filters, &mut rng);
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].node_id, "intercept");
        assert_eq!(limited[0].domain_id, "linear");
    }

    #[test]
    fn test_equal_scores_keep_snapshot_order() {
        let mut tracker = ProgressTracker::hydrate(&sample_catalog(), None);
        let at = now() - Duration::days(2);
        for n in 0..2 {
            tracker
                .update_node_status("algebra", 0, n, NodeStatus::Understood, true, true, at, Some(50.0))
                .unwrap();
        }
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = derive_review_candidates(tracker.snapshot(), now(), &ReviewFilters::all(), &mut rng);
        assert_eq!(candidates[0].priority_score, candidates[1].priority_score);
        assert_eq!(candidates[0].node_id, "slope");
        assert_eq!(candidates[1].node_id, "intercept");
    }

    #[test]
    fn test_derivation_is_deterministic_for_seed() {
        let tracker = tracker_with_reviews();
        let first = derive_review_candidates(
            tracker.snapshot(),
            now(),
            &ReviewFilters::all(),
            &mut StdRng::seed_from_u64(9),
        );
        let second = derive_review_candidates(
            tracker.snapshot(),
            now(),
            &ReviewFilters::all(),
            &mut StdRng::seed_from_u64(9),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_module() {
        let tracker = tracker_with_reviews();
        let summary = summarize_module(tracker.module("algebra").unwrap(), now());
        assert_eq!(summary.total_nodes, 2);
        assert_eq!(summary.understood_nodes, 2);
        assert_eq!(summary.due_nodes, 1);
        // slope 95 - 0.1, intercept 30 - 20
        let expected = ((95.0 - 0.1) + 10.0) / 2.0;
        assert!((summary.average_strength.unwrap() - expected).abs() < 1e-9);

        let fresh = summarize_module(
            &ModuleProgress::from_content(sample_catalog().module("foundations").unwrap()),
            now(),
        );
        assert_eq!(fresh.new_nodes, 1);
        assert!(fresh.average_strength.is_none());
    }
}
