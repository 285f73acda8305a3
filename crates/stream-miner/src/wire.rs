//! JSON wire format for streams and mined patterns.
//!
//! ```json
//! {"T": {"alpha": 0, "omega": 10},
//!  "V": ["u", "v"] | {"left": [...], "right": [...]},
//!  "I": ["a", "b"] | {"left": [...], "right": [...]},
//!  "E": [{"u": "u", "v": "v", "b": 1, "e": 5,
//!         "label": {"left": ["a"], "right": ["b"]}}]}
//! ```

use std::io::{BufRead, Read, Write};

use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::miner::MinedPattern;
use crate::pattern::Lang;
use crate::stream::{Link, Stream};
use crate::types::{Label, LabelSet, MinerError, MinerResult, NodeId, Side, Sided, Time, TimeBounds};

/// Serialized stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStream {
    #[serde(rename = "T")]
    pub bounds: TimeBounds,
    #[serde(rename = "V")]
    pub nodes: Sided<Vec<NodeId>>,
    #[serde(rename = "I")]
    pub universe: Sided<Vec<Label>>,
    #[serde(rename = "E", default)]
    pub links: Vec<WireLink>,
}

/// Serialized link. `label.left` belongs to `u`, `label.right` to `v`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLink {
    pub u: NodeId,
    pub v: NodeId,
    pub b: Time,
    pub e: Time,
    #[serde(default)]
    pub label: WireLabels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLabels {
    #[serde(default)]
    pub left: Vec<Label>,
    #[serde(default)]
    pub right: Vec<Label>,
}

/// Build a [`Stream`] from its wire form.
///
/// `V` and `I` must share the same shape. Every link endpoint must be listed
/// in `V`, on the left (`u`) or right (`v`) side for bipartite streams, and
/// every link must lie within `T`.
pub fn load(wire: &WireStream) -> MinerResult<Stream> {
    let mut stream = match (&wire.nodes, &wire.universe) {
        (Sided::Mono(nodes), Sided::Mono(_)) => {
            let mut stream = Stream::new();
            for node in nodes {
                stream.insert_node(node.clone(), None)?;
            }
            stream
        }
        (Sided::Bi { left, right }, Sided::Bi { .. }) => {
            let mut stream = Stream::bipartite();
            for node in left {
                stream.insert_node(node.clone(), Some(Side::Left))?;
            }
            for node in right {
                stream.insert_node(node.clone(), Some(Side::Right))?;
            }
            stream
        }
        _ => {
            return Err(MinerError::InvalidInput(
                "V and I must both be flat lists or both be {left, right}".into(),
            ));
        }
    };
    stream.set_bounds(wire.bounds);
    stream.set_universe(wire.universe.map(|labels| labels.iter().cloned().collect::<LabelSet>()));

    let bipartite = stream.is_bipartite();
    for link in &wire.links {
        for (node, side) in [(&link.u, Side::Left), (&link.v, Side::Right)] {
            if !stream.contains_node(node) {
                return Err(MinerError::UnknownNode(node.clone()));
            }
            if bipartite && stream.side_of(node) != Some(side) {
                return Err(MinerError::SideConflict {
                    node: node.clone(),
                    side,
                });
            }
        }
        let interval = Interval::new(link.b, link.e)?;
        if interval.begin() < wire.bounds.alpha || interval.end() > wire.bounds.omega {
            return Err(MinerError::InvalidInput(format!(
                "Link {}-{} {interval} lies outside T [{}, {}]",
                link.u, link.v, wire.bounds.alpha, wire.bounds.omega
            )));
        }
        stream.add_link(Link::new(
            link.u.clone(),
            link.v.clone(),
            interval,
            link.label.left.iter().cloned().collect(),
            link.label.right.iter().cloned().collect(),
        ))?;
    }

    tracing::debug!(
        "Loaded stream: {} entities, {} links",
        stream.node_count(),
        stream.link_count()
    );
    Ok(stream)
}

impl Stream {
    /// Wire form of this stream. Node and label lists come out sorted; links
    /// keep their order.
    pub fn to_wire(&self) -> WireStream {
        WireStream {
            bounds: self.bounds(),
            nodes: self.node_set().map(|nodes| nodes.iter().cloned().collect()),
            universe: self.universe().map(|labels| labels.iter().cloned().collect()),
            links: self
                .links()
                .iter()
                .map(|link| WireLink {
                    u: link.u.clone(),
                    v: link.v.clone(),
                    b: link.interval.begin(),
                    e: link.interval.end(),
                    label: WireLabels {
                        left: link.label_u.iter().cloned().collect(),
                        right: link.label_v.iter().cloned().collect(),
                    },
                })
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> MinerResult<Stream> {
        let wire: WireStream = serde_json::from_str(json)?;
        load(&wire)
    }
}

/// Read a stream from any reader.
pub fn read_from<R: Read>(reader: R) -> MinerResult<Stream> {
    let wire: WireStream = serde_json::from_reader(reader)?;
    load(&wire)
}

/// Write a stream to any writer.
pub fn write_to<W: Write>(stream: &Stream, writer: &mut W) -> MinerResult<()> {
    serde_json::to_writer(&mut *writer, &stream.to_wire())?;
    Ok(())
}

/// Output record of one mined pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub lang: Sided<Vec<Label>>,
    pub support_set: WireStream,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Sided<Vec<Label>>>,
}

fn lang_to_wire(lang: &Lang) -> Sided<Vec<Label>> {
    lang.map(|labels| labels.iter().cloned().collect())
}

impl MinedPattern {
    pub fn to_record(&self) -> PatternRecord {
        PatternRecord {
            lang: lang_to_wire(&self.pattern.lang),
            support_set: self.pattern.support_set.to_wire(),
            parent: self.parent.as_ref().map(lang_to_wire),
        }
    }
}

/// Write one JSON record per line.
pub fn write_records<W: Write>(patterns: &[MinedPattern], writer: &mut W) -> MinerResult<()> {
    for mined in patterns {
        serde_json::to_writer(&mut *writer, &mined.to_record())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read records written by [`write_records`]. Blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> MinerResult<Vec<PatternRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
