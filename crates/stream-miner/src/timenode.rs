//! Temporal node sets: which entity is present during which windows.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::interval::Interval;
use crate::types::{LabelSet, NodeId, Time};

/// One entity's validity window, with the labels attached to it.
///
/// Identity is `(node, interval)`; labels are metadata.
#[derive(Debug, Clone)]
pub struct TimeNode {
    pub node: NodeId,
    pub interval: Interval,
    pub label: LabelSet,
}

impl TimeNode {
    pub fn new(node: impl Into<NodeId>, interval: Interval, label: LabelSet) -> Self {
        Self {
            node: node.into(),
            interval,
            label,
        }
    }

    /// A window without labels.
    pub fn bare(node: impl Into<NodeId>, interval: Interval) -> Self {
        Self::new(node, interval, LabelSet::new())
    }
}

impl PartialEq for TimeNode {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.interval == other.interval
    }
}

impl Eq for TimeNode {}

impl Hash for TimeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
        self.interval.hash(state);
    }
}

impl fmt::Display for TimeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.node, self.interval)
    }
}

/// Canonical temporal set.
///
/// For every entity the stored intervals are sorted, pairwise disjoint and
/// never touch: inserting an interval that meets stored ones merges them into
/// a single window whose label is the union of the merged labels.
#[derive(Debug, Clone, Default)]
pub struct TimeNodeSet {
    elements: BTreeMap<NodeId, Vec<(Interval, LabelSet)>>,
}

impl TimeNodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window, keeping the per-entity intervals maximal.
    pub fn add(&mut self, x: TimeNode) {
        let windows = self.elements.entry(x.node).or_default();

        if let Some((_, label)) = windows
            .iter_mut()
            .find(|(stored, _)| x.interval.included(stored))
        {
            label.extend(x.label);
            return;
        }

        let mut merged = x.interval;
        let mut label = x.label;
        windows.retain(|(stored, stored_label)| {
            if stored.intersects(&x.interval) {
                merged = merged.cover(stored);
                label.extend(stored_label.iter().cloned());
                false
            } else {
                true
            }
        });

        let at = windows.partition_point(|(stored, _)| stored.begin() < merged.begin());
        windows.insert(at, (merged, label));
    }

    /// Convenience wrapper around [`TimeNodeSet::add`].
    pub fn insert(&mut self, node: impl Into<NodeId>, interval: Interval, label: LabelSet) {
        self.add(TimeNode::new(node, interval, label));
    }

    /// Per-entity pairwise intersection. Labels follow `self`.
    pub fn intersection(&self, other: &TimeNodeSet) -> TimeNodeSet {
        let mut result = TimeNodeSet::new();
        for (node, windows) in &self.elements {
            let Some(other_windows) = other.elements.get(node) else {
                continue;
            };
            for (i, label) in windows {
                for (j, _) in other_windows {
                    if let Some(common) = i.intersect(j) {
                        result.insert(node.clone(), common, label.clone());
                    }
                }
            }
        }
        result
    }

    pub fn union(&self, other: &TimeNodeSet) -> TimeNodeSet {
        let mut result = self.clone();
        for x in other.iter() {
            result.add(x);
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeNode> + '_ {
        self.elements.iter().flat_map(|(node, windows)| {
            windows
                .iter()
                .map(move |(interval, label)| TimeNode::new(node.clone(), *interval, label.clone()))
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.elements.keys()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.elements.contains_key(node)
    }

    /// The maximal windows stored for `node`, sorted by begin.
    pub fn windows(&self, node: &str) -> &[(Interval, LabelSet)] {
        self.elements.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of maximal windows, summed over entities.
    pub fn len(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total covered duration.
    pub fn measure(&self) -> Time {
        self.elements
            .values()
            .flatten()
            .map(|(interval, _)| interval.length())
            .sum()
    }
}

impl PartialEq for TimeNodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.elements.iter().all(|(node, windows)| {
                let theirs = other.windows(node);
                windows.len() == theirs.len()
                    && windows.iter().zip(theirs).all(|((a, _), (b, _))| a == b)
            })
    }
}

impl Eq for TimeNodeSet {}

impl FromIterator<TimeNode> for TimeNodeSet {
    fn from_iter<I: IntoIterator<Item = TimeNode>>(iter: I) -> Self {
        let mut set = TimeNodeSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<TimeNode> for TimeNodeSet {
    fn extend<I: IntoIterator<Item = TimeNode>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl fmt::Display for TimeNodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|x| x.to_string()).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
