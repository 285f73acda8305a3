//! Structural density closures over streams.
//!
//! A [`CoreProperty`] decides, for one stream, during which windows each
//! entity satisfies its density predicate. [`interior`] peels a stream down to
//! the unique maximal sub-stream in which the predicate holds for every entity
//! at every retained instant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::interval::Interval;
use crate::stream::{Event, Stream};
use crate::timenode::TimeNodeSet;
use crate::types::{LabelSet, MinerError, MinerResult, NodeId, Side};

/// A temporal density predicate.
pub trait CoreProperty: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// One sweep over `stream`: every window during which an entity is kept.
    fn retain(&self, stream: &Stream) -> MinerResult<TimeNodeSet>;
}

/// Windows during which `node` has at least `threshold` distinct live
/// neighbours.
///
/// `events` must be in sweep order (see [`Event::sort_key`]). A close without
/// a matching open, or an open left dangling at the end, is a data-integrity
/// violation.
pub fn dense_windows(node: &str, events: &[&Event], threshold: usize) -> MinerResult<Vec<Interval>> {
    let mut live: BTreeMap<&str, i64> = BTreeMap::new();
    let mut since = None;
    let mut windows = Vec::new();

    for event in events {
        let count = live.entry(event.neighbour.as_str()).or_insert(0);
        *count += i64::from(event.kind.delta());
        if *count < 0 {
            return Err(MinerError::UnbalancedEvents(node.to_string()));
        }
        if *count == 0 {
            live.remove(event.neighbour.as_str());
        }

        let dense = live.len() >= threshold;
        match (dense, since) {
            (true, None) => since = Some(event.time),
            (false, Some(start)) => {
                windows.push(Interval::new(start, event.time)?);
                since = None;
            }
            _ => {}
        }
    }

    if !live.is_empty() || since.is_some() {
        return Err(MinerError::UnbalancedEvents(node.to_string()));
    }
    Ok(windows)
}

/// Union of the labels `node` carries on contacts overlapping `window`.
fn window_label(
    stream: &Stream,
    node: &str,
    neighbours: &BTreeSet<NodeId>,
    window: &Interval,
) -> LabelSet {
    let mut label = LabelSet::new();
    for neighbour in neighbours {
        for contact in stream.contacts(node, neighbour) {
            if contact.interval.intersects(window) {
                label.extend(contact.label_a);
            }
        }
    }
    label
}

/// Star/satellite closure for flat streams.
///
/// A star is an entity with at least `threshold` live neighbours; every
/// neighbour in contact with a star during one of its star windows is kept as
/// a satellite for the overlapping part of the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarSat {
    threshold: usize,
}

impl StarSat {
    pub fn new(threshold: usize) -> MinerResult<Self> {
        if threshold == 0 {
            return Err(MinerError::Config("StarSat threshold must be at least 1".into()));
        }
        Ok(Self { threshold })
    }
}

impl CoreProperty for StarSat {
    fn name(&self) -> &'static str {
        "StarSat"
    }

    fn retain(&self, stream: &Stream) -> MinerResult<TimeNodeSet> {
        let mut retained = TimeNodeSet::new();

        for node in stream.nodes() {
            let stars = dense_windows(node, &stream.sorted_events(node)?, self.threshold)?;
            if stars.is_empty() {
                continue;
            }
            let neighbours = stream.neighbours(node)?;

            for star in stars {
                retained.insert(
                    node.clone(),
                    star,
                    window_label(stream, node, &neighbours, &star),
                );
                for satellite in &neighbours {
                    for contact in stream.contacts(node, satellite) {
                        if let Some(overlap) = contact.interval.intersect(&star) {
                            retained.insert(satellite.clone(), overlap, contact.label_b);
                        }
                    }
                }
            }
        }
        Ok(retained)
    }
}

/// Hub/authority core for bipartite streams: left entities (hubs) need `hubs`
/// live neighbours, right entities (authorities) need `authorities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BhaCore {
    hubs: usize,
    authorities: usize,
}

impl BhaCore {
    pub fn new(hubs: usize, authorities: usize) -> MinerResult<Self> {
        if hubs == 0 || authorities == 0 {
            return Err(MinerError::Config(
                "BHACore thresholds must be at least 1".into(),
            ));
        }
        Ok(Self { hubs, authorities })
    }

    pub fn threshold_for(&self, side: Side) -> usize {
        match side {
            Side::Left => self.hubs,
            Side::Right => self.authorities,
        }
    }
}

impl CoreProperty for BhaCore {
    fn name(&self) -> &'static str {
        "BHACore"
    }

    fn retain(&self, stream: &Stream) -> MinerResult<TimeNodeSet> {
        if !stream.is_bipartite() {
            return Err(MinerError::InvalidInput(
                "BHACore requires a bipartite stream".into(),
            ));
        }
        let mut retained = TimeNodeSet::new();

        for node in stream.nodes() {
            let side = stream
                .side_of(node)
                .ok_or_else(|| MinerError::UnknownNode(node.clone()))?;
            let windows = dense_windows(node, &stream.sorted_events(node)?, self.threshold_for(side))?;
            if windows.is_empty() {
                continue;
            }
            let neighbours = stream.neighbours(node)?;
            for window in windows {
                retained.insert(
                    node.clone(),
                    window,
                    window_label(stream, node, &neighbours, &window),
                );
            }
        }
        Ok(retained)
    }
}

/// Maximal sub-stream of `stream` closed under `core`.
///
/// Sweeps, restricts the stream to the retained windows, and repeats until a
/// restriction leaves the stream unchanged. Each round can only shrink the
/// retained windows, so the loop terminates.
pub fn interior(stream: &Stream, core: &dyn CoreProperty) -> MinerResult<Stream> {
    let mut current = stream.clone();
    let mut rounds = 0usize;

    loop {
        rounds += 1;
        let retained = core.retain(&current)?;
        let next = current.substream(&retained, &retained);
        tracing::trace!(
            "{} round {rounds}: {} windows kept, {} -> {} links",
            core.name(),
            retained.len(),
            current.link_count(),
            next.link_count()
        );
        if next == current {
            break;
        }
        current = next;
    }

    tracing::debug!(
        "{} interior reached after {rounds} rounds: {} of {} links, {} entities",
        core.name(),
        current.link_count(),
        stream.link_count(),
        current.support_size()
    );
    Ok(current)
}
