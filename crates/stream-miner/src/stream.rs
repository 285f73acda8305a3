//! The stream graph: a labeled, time-varying interaction multigraph.
//!
//! A [`Stream`] keeps three views of the same links:
//! - `links`: the ordered link list (`E`),
//! - `degrees`: per-entity chronological open/close events,
//! - `times`: per-pair interaction history.
//!
//! Streams are built once and then restricted into independent child streams
//! with [`Stream::substream`]; children own copies of everything they hold.

use std::collections::{BTreeMap, BTreeSet};

use crate::interval::Interval;
use crate::timenode::{TimeNode, TimeNodeSet};
use crate::types::{Label, LabelSet, MinerError, MinerResult, NodeId, Side, Sided, Time, TimeBounds};

/// A timed, labeled interaction between `u` and `v`.
///
/// `label_u` and `label_v` are the labels attributed to each endpoint for the
/// duration of the link (`label.left` / `label.right` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub u: NodeId,
    pub v: NodeId,
    pub interval: Interval,
    pub label_u: LabelSet,
    pub label_v: LabelSet,
}

impl Link {
    pub fn new(
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        interval: Interval,
        label_u: LabelSet,
        label_v: LabelSet,
    ) -> Self {
        Self {
            u: u.into(),
            v: v.into(),
            interval,
            label_u,
            label_v,
        }
    }

    fn truncated(&self, interval: Interval) -> Self {
        Self {
            interval,
            ..self.clone()
        }
    }
}

/// `+1` when a link opens, `-1` when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Open,
    Close,
}

impl EventKind {
    pub fn delta(self) -> i8 {
        match self {
            EventKind::Open => 1,
            EventKind::Close => -1,
        }
    }
}

/// One entry of an entity's chronological event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub neighbour: NodeId,
    pub time: Time,
    pub kind: EventKind,
    pub label: LabelSet,
}

impl Event {
    /// Sweep order: by time, opens before closes, then by neighbour.
    pub fn sort_key(&self) -> (Time, EventKind, &str) {
        (self.time, self.kind, self.neighbour.as_str())
    }
}

/// One recorded interaction between a pair, oriented towards the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub interval: Interval,
    pub label_a: LabelSet,
    pub label_b: LabelSet,
}

/// Pair history entry, stored with labels in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PairContact {
    interval: Interval,
    label_lo: LabelSet,
    label_hi: LabelSet,
}

fn pair_key(a: &str, b: &str) -> (NodeId, NodeId) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// The event-stream multigraph.
#[derive(Debug, Clone)]
pub struct Stream {
    /// Unset until given explicitly or until the first link arrives.
    bounds: Option<TimeBounds>,
    nodes: Sided<BTreeSet<NodeId>>,
    universe: Sided<LabelSet>,
    links: Vec<Link>,
    degrees: BTreeMap<NodeId, Vec<Event>>,
    times: BTreeMap<(NodeId, NodeId), Vec<PairContact>>,
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream {
    /// Empty stream over a flat node set and a flat label universe.
    pub fn new() -> Self {
        Self::with_layout(Sided::Mono(BTreeSet::new()), Sided::Mono(LabelSet::new()))
    }

    /// Empty bipartite stream: `u` endpoints on the left, `v` on the right,
    /// with a `{left, right}` label universe.
    pub fn bipartite() -> Self {
        Self::with_layout(
            Sided::Bi {
                left: BTreeSet::new(),
                right: BTreeSet::new(),
            },
            Sided::Bi {
                left: LabelSet::new(),
                right: LabelSet::new(),
            },
        )
    }

    fn with_layout(nodes: Sided<BTreeSet<NodeId>>, universe: Sided<LabelSet>) -> Self {
        Self {
            bounds: None,
            nodes,
            universe,
            links: Vec::new(),
            degrees: BTreeMap::new(),
            times: BTreeMap::new(),
        }
    }

    /// Same layout, bounds and universe, no nodes and no links.
    fn empty_child(&self) -> Self {
        Self {
            bounds: self.bounds,
            nodes: self.nodes.empty_like(),
            universe: self.universe.clone(),
            links: Vec::new(),
            degrees: BTreeMap::new(),
            times: BTreeMap::new(),
        }
    }

    /// Observation window. A stream without bounds and without links
    /// reports `[0, 0]`.
    pub fn bounds(&self) -> TimeBounds {
        self.bounds.unwrap_or_default()
    }

    pub fn set_bounds(&mut self, bounds: TimeBounds) {
        self.bounds = Some(bounds);
    }

    pub fn universe(&self) -> &Sided<LabelSet> {
        &self.universe
    }

    pub fn set_universe(&mut self, universe: Sided<LabelSet>) {
        self.universe = universe;
    }

    /// Replace the label universe with the labels actually carried by links,
    /// keeping its shape.
    pub fn infer_universe(&mut self) {
        let mut universe = self.universe.empty_like::<LabelSet>();
        for link in &self.links {
            match &mut universe {
                Sided::Mono(all) => {
                    all.extend(link.label_u.iter().cloned());
                    all.extend(link.label_v.iter().cloned());
                }
                Sided::Bi { left, right } => {
                    left.extend(link.label_u.iter().cloned());
                    right.extend(link.label_v.iter().cloned());
                }
            }
        }
        self.universe = universe;
    }

    pub fn node_set(&self) -> &Sided<BTreeSet<NodeId>> {
        &self.nodes
    }

    pub fn is_bipartite(&self) -> bool {
        self.nodes.is_bi()
    }

    /// All entities, left side first for bipartite streams.
    pub fn nodes(&self) -> Box<dyn Iterator<Item = &NodeId> + '_> {
        match &self.nodes {
            Sided::Mono(all) => Box::new(all.iter()),
            Sided::Bi { left, right } => Box::new(left.iter().chain(right.iter())),
        }
    }

    pub fn node_count(&self) -> usize {
        match &self.nodes {
            Sided::Mono(all) => all.len(),
            Sided::Bi { left, right } => left.len() + right.len(),
        }
    }

    pub fn contains_node(&self, node: &str) -> bool {
        match &self.nodes {
            Sided::Mono(all) => all.contains(node),
            Sided::Bi { left, right } => left.contains(node) || right.contains(node),
        }
    }

    /// Which side `node` sits on. `None` for flat streams and unknown nodes.
    pub fn side_of(&self, node: &str) -> Option<Side> {
        match &self.nodes {
            Sided::Mono(_) => None,
            Sided::Bi { left, right } => {
                if left.contains(node) {
                    Some(Side::Left)
                } else if right.contains(node) {
                    Some(Side::Right)
                } else {
                    None
                }
            }
        }
    }

    /// Register an entity. `side` is required for bipartite streams and
    /// ignored for flat ones.
    pub fn insert_node(&mut self, node: impl Into<NodeId>, side: Option<Side>) -> MinerResult<()> {
        let node = node.into();
        match (&mut self.nodes, side) {
            (Sided::Mono(all), _) => {
                all.insert(node);
            }
            (Sided::Bi { .. }, None) => {
                return Err(MinerError::InvalidInput(format!(
                    "Node {node} needs a side in a bipartite stream"
                )));
            }
            (Sided::Bi { left, right }, Some(side)) => {
                let (own, other) = match side {
                    Side::Left => (left, right),
                    Side::Right => (right, left),
                };
                if other.contains(&node) {
                    return Err(MinerError::SideConflict { node, side });
                }
                own.insert(node);
            }
        }
        Ok(())
    }

    /// Record a link, registering its endpoints (`u` left, `v` right in
    /// bipartite streams) and widening the bounds to cover it. The first
    /// link of a stream without bounds sets them to its own interval.
    pub fn add_link(&mut self, link: Link) -> MinerResult<()> {
        let (side_u, side_v) = if self.is_bipartite() {
            (Some(Side::Left), Some(Side::Right))
        } else {
            (None, None)
        };
        self.insert_node(link.u.clone(), side_u)?;
        self.insert_node(link.v.clone(), side_v)?;
        self.bounds
            .get_or_insert(TimeBounds::new(link.interval.begin(), link.interval.end()))
            .cover(&link.interval);
        self.push_link(link);
        Ok(())
    }

    pub fn add_links<I: IntoIterator<Item = Link>>(&mut self, links: I) -> MinerResult<()> {
        for link in links {
            self.add_link(link)?;
        }
        Ok(())
    }

    /// Update all three views. Endpoints must already be registered.
    fn push_link(&mut self, link: Link) {
        let (b, e) = (link.interval.begin(), link.interval.end());

        let events_u = self.degrees.entry(link.u.clone()).or_default();
        events_u.push(Event {
            neighbour: link.v.clone(),
            time: b,
            kind: EventKind::Open,
            label: link.label_u.clone(),
        });
        events_u.push(Event {
            neighbour: link.v.clone(),
            time: e,
            kind: EventKind::Close,
            label: link.label_u.clone(),
        });

        let events_v = self.degrees.entry(link.v.clone()).or_default();
        events_v.push(Event {
            neighbour: link.u.clone(),
            time: b,
            kind: EventKind::Open,
            label: link.label_v.clone(),
        });
        events_v.push(Event {
            neighbour: link.u.clone(),
            time: e,
            kind: EventKind::Close,
            label: link.label_v.clone(),
        });

        let (label_lo, label_hi) = if link.u <= link.v {
            (link.label_u.clone(), link.label_v.clone())
        } else {
            (link.label_v.clone(), link.label_u.clone())
        };
        self.times
            .entry(pair_key(&link.u, &link.v))
            .or_default()
            .push(PairContact {
                interval: link.interval,
                label_lo,
                label_hi,
            });

        self.links.push(link);
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Chronological event list of `node`, in insertion order.
    pub fn events(&self, node: &str) -> MinerResult<&[Event]> {
        if !self.contains_node(node) {
            return Err(MinerError::UnknownNode(node.to_string()));
        }
        Ok(self.degrees.get(node).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Event list of `node` in sweep order.
    pub fn sorted_events(&self, node: &str) -> MinerResult<Vec<&Event>> {
        let mut events: Vec<&Event> = self.events(node)?.iter().collect();
        events.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(events)
    }

    /// Every entity ever linked to `node`, irrespective of time.
    pub fn neighbours(&self, node: &str) -> MinerResult<BTreeSet<NodeId>> {
        Ok(self
            .events(node)?
            .iter()
            .map(|event| event.neighbour.clone())
            .collect())
    }

    /// All interactions recorded between `a` and `b`, labels oriented as
    /// `(label of a, label of b)`.
    pub fn contacts(&self, a: &str, b: &str) -> Vec<Contact> {
        let Some(history) = self.times.get(&pair_key(a, b)) else {
            return Vec::new();
        };
        history
            .iter()
            .map(|c| {
                let (label_a, label_b) = if a <= b {
                    (c.label_lo.clone(), c.label_hi.clone())
                } else {
                    (c.label_hi.clone(), c.label_lo.clone())
                };
                Contact {
                    interval: c.interval,
                    label_a,
                    label_b,
                }
            })
            .collect()
    }

    /// Labels active for `x.node` over `x.interval`.
    ///
    /// Walks the entity's open/close pairs and collects the label recorded at
    /// every open whose close leaves the query fully nested inside
    /// (`open <= begin` and `end <= close`, both inclusive).
    pub fn label(&self, x: &TimeNode) -> MinerResult<LabelSet> {
        let mut labels = LabelSet::new();
        // Each link pushes its open and its close next to each other.
        for pair in self.events(&x.node)?.chunks(2) {
            let [open, close] = pair else {
                return Err(MinerError::UnbalancedEvents(x.node.clone()));
            };
            if open.kind != EventKind::Open
                || close.kind != EventKind::Close
                || open.neighbour != close.neighbour
            {
                return Err(MinerError::UnbalancedEvents(x.node.clone()));
            }
            if open.time <= x.interval.begin() && x.interval.end() <= close.time {
                labels.extend(open.label.iter().cloned());
            }
        }
        Ok(labels)
    }

    /// Presence windows of every entity (`W`), labeled with the labels the
    /// entity carries on the covering links.
    pub fn presence(&self) -> TimeNodeSet {
        let mut windows = TimeNodeSet::new();
        for link in &self.links {
            windows.insert(link.u.clone(), link.interval, link.label_u.clone());
            windows.insert(link.v.clone(), link.interval, link.label_v.clone());
        }
        windows
    }

    /// Number of distinct entities present in the links.
    pub fn support_size(&self) -> usize {
        let mut present: BTreeSet<&str> = BTreeSet::new();
        for link in &self.links {
            present.insert(&link.u);
            present.insert(&link.v);
        }
        present.len()
    }

    /// Labels carried by the links, on the given side, or on both sides when
    /// `side` is `None`.
    pub fn labels_on(&self, side: Option<Side>) -> LabelSet {
        let mut labels = LabelSet::new();
        for link in &self.links {
            if side != Some(Side::Right) {
                labels.extend(link.label_u.iter().cloned());
            }
            if side != Some(Side::Left) {
                labels.extend(link.label_v.iter().cloned());
            }
        }
        labels
    }

    /// Copy of this stream keeping only the links accepted by `keep`.
    pub fn filter_links<F: Fn(&Link) -> bool>(&self, keep: F) -> Stream {
        let mut child = self.empty_child();
        child.nodes = self.nodes.clone();
        for link in self.links.iter().filter(|link| keep(link)) {
            child.push_link(link.clone());
        }
        child
    }

    /// Sub-stream induced by the windows `w1 ∪ w2`.
    ///
    /// Entities of the windows that belong to this stream are kept on their
    /// side. Every link whose endpoints are both kept is truncated to the
    /// parts where both endpoints are inside their windows; a link may split
    /// into several pieces and disjoint links are dropped.
    pub fn substream(&self, w1: &TimeNodeSet, w2: &TimeNodeSet) -> Stream {
        let windows = w1.union(w2);
        let mut child = self.empty_child();

        for node in windows.nodes() {
            if !self.contains_node(node) {
                continue;
            }
            match (&mut child.nodes, self.side_of(node)) {
                (Sided::Mono(all), _) => {
                    all.insert(node.clone());
                }
                (Sided::Bi { left, .. }, Some(Side::Left)) => {
                    left.insert(node.clone());
                }
                (Sided::Bi { right, .. }, Some(Side::Right)) => {
                    right.insert(node.clone());
                }
                (Sided::Bi { .. }, None) => {}
            }
        }

        for link in &self.links {
            if !child.contains_node(&link.u) || !child.contains_node(&link.v) {
                continue;
            }
            for piece in truncations(link, &windows) {
                child.push_link(link.truncated(piece));
            }
        }
        child
    }

    /// All labels on a side of the universe.
    pub fn universe_side(&self, side: Option<Side>) -> Option<&LabelSet> {
        match (side, &self.universe) {
            (None, Sided::Mono(all)) => Some(all),
            (Some(side), universe) => universe.side(side),
            (None, Sided::Bi { .. }) => None,
        }
    }

    /// Whether `label` belongs to the universe on `side`.
    pub fn knows_label(&self, label: &Label, side: Option<Side>) -> bool {
        self.universe_side(side)
            .is_some_and(|labels| labels.contains(label))
    }
}

/// Parts of `link` during which both endpoints are inside `windows`.
fn truncations(link: &Link, windows: &TimeNodeSet) -> Vec<Interval> {
    let mut pieces = Vec::new();
    for (wu, _) in windows.windows(&link.u) {
        let Some(on_u) = link.interval.intersect(wu) else {
            continue;
        };
        for (wv, _) in windows.windows(&link.v) {
            if let Some(piece) = on_u.intersect(wv) {
                pieces.push(piece);
            }
        }
    }
    pieces
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        if self.bounds != other.bounds
            || self.nodes != other.nodes
            || self.universe != other.universe
            || self.links.len() != other.links.len()
        {
            return false;
        }
        let mut mine: Vec<&Link> = self.links.iter().collect();
        let mut theirs: Vec<&Link> = other.links.iter().collect();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}

impl Eq for Stream {}
