use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::tree::ElementTree;

/// Elements currently eligible for matching, in the order they became
/// visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    order: Vec<ElementId>,
    members: HashSet<ElementId>,
}

impl VisibleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial visible set of a scenario: its root elements.
    pub fn from_roots(tree: &ElementTree) -> Self {
        let mut set = Self::new();
        for &id in tree.roots() {
            set.insert(id);
        }
        set
    }

    /// Add one element. Returns `false` if it was already visible.
    pub fn insert(&mut self, id: ElementId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    /// Make the children of `id` visible. Returns only the ids that were not
    /// visible before; revealing the same element twice is a no-op.
    pub fn reveal(&mut self, tree: &ElementTree, id: ElementId) -> Vec<ElementId> {
        tree.children(id)
            .iter()
            .copied()
            .filter(|&child| self.insert(child))
            .collect()
    }

    /// Whether `id` is visible.
    pub fn contains(&self, id: ElementId) -> bool {
        self.members.contains(&id)
    }

    /// Visible ids in the order they became visible.
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.order.iter().copied()
    }

    /// Visible ids as a slice, same order as [`iter`](Self::iter).
    pub fn as_slice(&self) -> &[ElementId] {
        &self.order
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Visit timestamps per element for one attempt. An element with no entry
/// is unvisited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLog {
    visits: BTreeMap<ElementId, Vec<DateTime<Utc>>>,
}

impl VisitLog {
    /// A log with no visits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visit to `id` at `at`.
    pub fn record(&mut self, id: ElementId, at: DateTime<Utc>) {
        self.visits.entry(id).or_default().push(at);
    }

    /// Whether `id` has at least one visit.
    pub fn is_visited(&self, id: ElementId) -> bool {
        self.visits.get(&id).is_some_and(|v| !v.is_empty())
    }

    /// Timestamps of every visit to `id`, oldest first.
    pub fn visits(&self, id: ElementId) -> &[DateTime<Utc>] {
        self.visits.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct elements visited.
    pub fn visited_count(&self) -> usize {
        self.visits.values().filter(|v| !v.is_empty()).count()
    }
}
