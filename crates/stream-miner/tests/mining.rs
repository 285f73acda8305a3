//! End-to-end mining tests over wire fixtures.

use std::collections::BTreeSet;

use proptest::prelude::*;

use stream_miner::wire::{read_records, write_records};
use stream_miner::*;

// ─────────────────────── helpers ───────────────────────

const CHANGING_NEIGHBOURS: &str = include_str!("fixtures/changing_neighbours.json");
const HUBS_AUTHORITIES: &str = include_str!("fixtures/hubs_authorities.json");

fn iv(b: Time, e: Time) -> Interval {
    Interval::new(b, e).unwrap()
}

fn windows(items: &[(&str, Time, Time)]) -> TimeNodeSet {
    items
        .iter()
        .map(|(n, b, e)| TimeNode::bare(*n, iv(*b, *e)))
        .collect()
}

fn mono(labels: &[&str]) -> Lang {
    Sided::Mono(label_set(labels.iter().copied()))
}

fn bi(left: &[&str], right: &[&str]) -> Lang {
    Sided::Bi {
        left: label_set(left.iter().copied()),
        right: label_set(right.iter().copied()),
    }
}

/// Every emitted pattern is a fixed point of the closure and languages are
/// never repeated.
fn assert_closed_and_unique(stream: &Stream, core: &dyn CoreProperty, found: &[MinedPattern]) {
    let mut seen = BTreeSet::new();
    for mined in found {
        assert!(seen.insert(mined.pattern.lang.clone()), "duplicate {:?}", mined.pattern.lang);
        let again = closure(&mined.pattern.lang, stream, core).unwrap();
        assert_eq!(again, mined.pattern);
    }
}

// ─────────────────────── flat streams ───────────────────────

#[test]
fn test_changing_neighbours_closure() {
    let stream = Stream::from_json_str(CHANGING_NEIGHBOURS).unwrap();
    let core = StarSat::new(2).unwrap();

    let closed = interior(&stream, &core).unwrap();
    assert_eq!(closed.presence(), windows(&[("u", 1, 3), ("v", 1, 3), ("x", 1, 3)]));
    assert_eq!(intent(&closed), mono(&["a", "b", "c"]));
}

#[test]
fn test_changing_neighbours_patterns() {
    let stream = Stream::from_json_str(CHANGING_NEIGHBOURS).unwrap();
    let core = StarSat::new(2).unwrap();
    let found = mine(&stream, &core, 2).unwrap();

    // Extending with d leaves the single u-v contact, which is not dense.
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pattern.lang, mono(&["a", "b", "c"]));
    assert_eq!(found[0].pattern.support(), 3);
    assert_eq!(found[0].parent, None);
    assert_closed_and_unique(&stream, &core, &found);
}

#[test]
fn test_threshold_one_keeps_the_long_contact() {
    let stream = Stream::from_json_str(CHANGING_NEIGHBOURS).unwrap();
    let core = StarSat::new(1).unwrap();
    let found = mine(&stream, &core, 2).unwrap();

    let langs: Vec<Lang> = found.iter().map(|m| m.pattern.lang.clone()).collect();
    assert_eq!(langs, vec![mono(&["a", "b", "c"]), mono(&["a", "b", "c", "d"])]);
    assert_eq!(
        found[1].pattern.support_set.presence(),
        windows(&[("u", 1, 5), ("v", 1, 5)])
    );
    assert_closed_and_unique(&stream, &core, &found);
}

// ─────────────────────── bipartite streams ───────────────────────

#[test]
fn test_hubs_authorities_patterns() {
    let stream = Stream::from_json_str(HUBS_AUTHORITIES).unwrap();
    let core = BhaCore::new(1, 2).unwrap();
    let found = mine(&stream, &core, 3).unwrap();

    let langs: Vec<Lang> = found.iter().map(|m| m.pattern.lang.clone()).collect();
    assert_eq!(
        langs,
        vec![bi(&["a"], &["x"]), bi(&["a", "b"], &["x"]), bi(&["a"], &["x", "y"])]
    );
    assert_eq!(found[0].pattern.support(), 5);
    assert_eq!(found[1].parent, Some(bi(&["a"], &["x"])));
    assert_eq!(found[2].parent, Some(bi(&["a"], &["x"])));

    assert_eq!(
        found[1].pattern.support_set.presence(),
        windows(&[("u1", 2, 8), ("u2", 2, 8), ("w2", 2, 8)])
    );
    assert_eq!(
        found[2].pattern.support_set.presence(),
        windows(&[("u1", 2, 8), ("u2", 2, 8), ("w1", 2, 8)])
    );
    assert!(found.iter().all(|m| m.pattern.is_bipartite()));
    assert_closed_and_unique(&stream, &core, &found);
}

#[test]
fn test_label_outside_universe_is_fatal() {
    let mut wire: WireStream = serde_json::from_str(HUBS_AUTHORITIES).unwrap();
    wire.universe = Sided::Bi {
        left: vec!["a".into(), "b".into(), "c".into()],
        right: vec!["x".into()],
    };
    let stream = load(&wire).unwrap();
    let core = BhaCore::new(1, 2).unwrap();

    let err = mine(&stream, &core, 3).unwrap_err();
    assert!(matches!(err, MinerError::Language { ref label, ref side } if label == "y" && side == "right"));
}

#[test]
fn test_star_sat_on_bipartite_stream() {
    let stream = Stream::from_json_str(HUBS_AUTHORITIES).unwrap();
    let found = mine(&stream, &StarSat::new(2).unwrap(), 2).unwrap();
    assert!(!found.is_empty());
    assert!(found[0].pattern.is_bipartite());
}

// ─────────────────────── configuration & output ───────────────────────

#[test]
fn test_miner_from_config() {
    let stream = Stream::from_json_str(HUBS_AUTHORITIES).unwrap();
    let config = MinerConfig::from_json_str(
        r#"{"min_support": 3, "core": {"kind": "bha_core", "hubs": 1, "authorities": 2}}"#,
    )
    .unwrap();
    let core = config.core.build().unwrap();
    let found = Miner::new(core.as_ref(), config).run(&stream).unwrap();
    assert_eq!(found.len(), 3);
}

#[test]
fn test_pattern_records_as_json_lines() {
    let stream = Stream::from_json_str(HUBS_AUTHORITIES).unwrap();
    let core = BhaCore::new(1, 2).unwrap();
    let found = mine(&stream, &core, 3).unwrap();

    let mut buf = Vec::new();
    write_records(&found, &mut buf).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(!text.lines().next().unwrap().contains("parent"));

    let records = read_records(buf.as_slice()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].parent, Some(Sided::Bi { left: vec!["a".into()], right: vec!["x".into()] }));
    let support = load(&records[2].support_set).unwrap();
    assert_eq!(support, found[2].pattern.support_set);
}

// ─────────────────────── properties ───────────────────────

fn arb_labeled_stream() -> impl Strategy<Value = Stream> {
    let nodes = vec!["a", "b", "c", "d", "e"];
    let labels = prop::sample::subsequence(vec!["p", "q", "r"], 1..=3);
    prop::collection::vec(
        (
            prop::sample::select(nodes.clone()),
            prop::sample::select(nodes),
            0i64..12,
            1i64..6,
            labels,
        ),
        1..10,
    )
    .prop_map(|raw| {
        let mut stream = Stream::new();
        for (u, v, b, len, labels) in raw {
            if u == v {
                continue;
            }
            let labels = label_set(labels);
            stream
                .add_link(Link::new(u, v, iv(b, b + len), labels.clone(), labels))
                .unwrap();
        }
        stream.infer_universe();
        stream
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_patterns_are_closed_unique_and_supported(stream in arb_labeled_stream()) {
        let core = StarSat::new(2).unwrap();
        let found = mine(&stream, &core, 2).unwrap();

        let mut seen = BTreeSet::new();
        for mined in &found {
            prop_assert!(mined.pattern.support() >= 2);
            prop_assert!(seen.insert(mined.pattern.lang.clone()));
            let again = closure(&mined.pattern.lang, &stream, &core).unwrap();
            prop_assert_eq!(&again.lang, &mined.pattern.lang);
        }
    }
}
