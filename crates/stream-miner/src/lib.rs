//! StreamMiner: closed pattern mining over labeled stream graphs.

pub mod config;
pub mod interval;
pub mod miner;
pub mod pattern;
pub mod property;
pub mod similarity;
pub mod stream;
pub mod timenode;
pub mod types;
pub mod wire;

pub use config::{CoreConfig, MinerConfig};
pub use interval::{Interval, IntervalUnion};
pub use miner::{mine, MinedPattern, Miner};
pub use pattern::{closure, extent, intent, restrict, Lang, Pattern};
pub use property::{interior, BhaCore, CoreProperty, StarSat};
pub use similarity::{jaccard, most_similar, SimilarityMatch};
pub use stream::{Contact, Event, EventKind, Link, Stream};
pub use timenode::{TimeNode, TimeNodeSet};
pub use types::*;
pub use wire::{load, read_from, write_records, write_to, PatternRecord, WireStream};
