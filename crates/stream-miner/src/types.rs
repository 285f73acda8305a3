//! Core identifiers, shared containers, and the error type.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Entity identifier (a vertex of the stream graph).
pub type NodeId = String;

/// A single descriptive label.
pub type Label = String;

/// An ordered set of labels.
pub type LabelSet = BTreeSet<Label>;

/// Timestamps are integral instants.
pub type Time = i64;

/// Build a [`LabelSet`] from anything yielding string-likes.
pub fn label_set<I, S>(labels: I) -> LabelSet
where
    I: IntoIterator<Item = S>,
    S: Into<Label>,
{
    labels.into_iter().map(Into::into).collect()
}

/// One side of a bipartite stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// A value that is either flat or split into a left and a right part.
///
/// Used for node sets (`V`), label universes (`I`) and pattern languages.
/// On the wire the flat form is a plain JSON array and the split form an
/// object with `left` and `right` keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sided<T> {
    Mono(T),
    Bi { left: T, right: T },
}

impl<T: Default> Default for Sided<T> {
    fn default() -> Self {
        Sided::Mono(T::default())
    }
}

impl<T> Sided<T> {
    /// Whether this is the split (bipartite) form.
    pub fn is_bi(&self) -> bool {
        matches!(self, Sided::Bi { .. })
    }

    /// Borrow one side. The flat form has no sides.
    pub fn side(&self, side: Side) -> Option<&T> {
        match (self, side) {
            (Sided::Mono(_), _) => None,
            (Sided::Bi { left, .. }, Side::Left) => Some(left),
            (Sided::Bi { right, .. }, Side::Right) => Some(right),
        }
    }

    /// Apply `f` to every part, keeping the shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Sided<U> {
        match self {
            Sided::Mono(all) => Sided::Mono(f(all)),
            Sided::Bi { left, right } => Sided::Bi {
                left: f(left),
                right: f(right),
            },
        }
    }

    /// Same shape, filled with defaults.
    pub fn empty_like<U: Default>(&self) -> Sided<U> {
        match self {
            Sided::Mono(_) => Sided::Mono(U::default()),
            Sided::Bi { .. } => Sided::Bi {
                left: U::default(),
                right: U::default(),
            },
        }
    }
}

/// A single extension candidate: a label, tagged with its side for
/// bipartite languages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub side: Option<Side>,
    pub label: Label,
}

impl Item {
    pub fn mono(label: impl Into<Label>) -> Self {
        Self {
            side: None,
            label: label.into(),
        }
    }

    pub fn sided(side: Side, label: impl Into<Label>) -> Self {
        Self {
            side: Some(side),
            label: label.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Some(side) => write!(f, "{side}:{}", self.label),
            None => f.write_str(&self.label),
        }
    }
}

/// Observation window of a stream (`T` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeBounds {
    pub alpha: Time,
    pub omega: Time,
}

impl TimeBounds {
    pub fn new(alpha: Time, omega: Time) -> Self {
        Self { alpha, omega }
    }

    /// Widen the bounds so they cover `interval`.
    pub fn cover(&mut self, interval: &Interval) {
        self.alpha = self.alpha.min(interval.begin());
        self.omega = self.omega.max(interval.end());
    }
}

/// Errors that can occur while building streams or mining patterns.
#[derive(thiserror::Error, Debug)]
pub enum MinerError {
    #[error("Invalid interval: begin {begin} is after end {end}")]
    InvalidInterval { begin: Time, end: Time },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Node {node} cannot be placed on the {side} side")]
    SideConflict { node: NodeId, side: Side },

    #[error("Unbalanced event list for node {0}")]
    UnbalancedEvents(NodeId),

    #[error("Label {label} is not part of the {side} label universe")]
    Language { label: Label, side: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type MinerResult<T> = Result<T, MinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sided_wire_shapes() {
        let mono: Sided<Vec<String>> = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(mono, Sided::Mono(vec!["a".to_string(), "b".to_string()]));

        let bi: Sided<Vec<String>> =
            serde_json::from_str(r#"{"left":["a"],"right":["x"]}"#).unwrap();
        assert!(bi.is_bi());
        assert_eq!(bi.side(Side::Right), Some(&vec!["x".to_string()]));
        assert_eq!(
            serde_json::to_string(&bi).unwrap(),
            r#"{"left":["a"],"right":["x"]}"#
        );
    }

    #[test]
    fn test_item_ordering_puts_left_first() {
        let mut items = vec![
            Item::sided(Side::Right, "a"),
            Item::sided(Side::Left, "z"),
            Item::sided(Side::Left, "b"),
        ];
        items.sort();
        assert_eq!(items[0], Item::sided(Side::Left, "b"));
        assert_eq!(items[2], Item::sided(Side::Right, "a"));
        assert_eq!(items[0].to_string(), "left:b");
    }

    #[test]
    fn test_bounds_cover() {
        let mut bounds = TimeBounds::new(2, 4);
        bounds.cover(&Interval::new(0, 9).unwrap());
        assert_eq!(bounds, TimeBounds::new(0, 9));
    }
}
