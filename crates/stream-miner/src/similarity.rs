//! Temporal neighbourhood similarity between entities.

use crate::stream::Stream;
use crate::timenode::TimeNodeSet;
use crate::types::{MinerResult, NodeId};

/// A ranked entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub node: NodeId,
    pub similarity: f64,
}

/// Who `node` interacts with, and when.
pub fn neighbourhood(stream: &Stream, node: &str) -> MinerResult<TimeNodeSet> {
    let mut windows = TimeNodeSet::new();
    for neighbour in stream.neighbours(node)? {
        for contact in stream.contacts(node, &neighbour) {
            windows.insert(neighbour.clone(), contact.interval, contact.label_b);
        }
    }
    Ok(windows)
}

fn ratio(a: &TimeNodeSet, b: &TimeNodeSet) -> f64 {
    let union = a.union(b).measure();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).measure() as f64 / union as f64
}

/// Temporal Jaccard index of two neighbourhoods: shared contact time over
/// total contact time. Zero when neither entity has any contact duration.
pub fn jaccard(stream: &Stream, u: &str, v: &str) -> MinerResult<f64> {
    Ok(ratio(&neighbourhood(stream, u)?, &neighbourhood(stream, v)?))
}

/// Find the top-k entities whose neighbourhood is closest to `node`'s.
pub fn most_similar(
    stream: &Stream,
    node: &str,
    top_k: usize,
    min_similarity: f64,
) -> MinerResult<Vec<SimilarityMatch>> {
    let own = neighbourhood(stream, node)?;
    let mut matches = Vec::new();
    for other in stream.nodes().filter(|other| other.as_str() != node) {
        let similarity = ratio(&own, &neighbourhood(stream, other)?);
        if similarity >= min_similarity {
            matches.push(SimilarityMatch {
                node: other.clone(),
                similarity,
            });
        }
    }

    matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(top_k);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use crate::stream::Link;
    use crate::types::LabelSet;

    fn shared_hub() -> Stream {
        let mut s = Stream::new();
        for (u, v, b, e) in [("a", "c", 0, 10), ("b", "c", 0, 10), ("a", "d", 0, 4), ("b", "d", 6, 10)] {
            s.add_link(Link::new(u, v, Interval::new(b, e).unwrap(), LabelSet::new(), LabelSet::new()))
                .unwrap();
        }
        s.insert_node("lonely", None).unwrap();
        s
    }

    #[test]
    fn test_jaccard_identical() {
        let s = shared_hub();
        assert!((jaccard(&s, "a", "a").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let s = shared_hub();
        assert!((jaccard(&s, "a", "b").unwrap() - 10.0 / 18.0).abs() < 1e-9);
        assert!((jaccard(&s, "c", "d").unwrap() - 0.4).abs() < 1e-9);
        assert_eq!(jaccard(&s, "a", "c").unwrap(), 0.0);
    }

    #[test]
    fn test_jaccard_without_contacts_is_zero() {
        let s = shared_hub();
        assert_eq!(jaccard(&s, "lonely", "lonely").unwrap(), 0.0);
        assert!(jaccard(&s, "a", "nobody").is_err());
    }

    #[test]
    fn test_most_similar_ranks_and_truncates() {
        let s = shared_hub();
        let matches = most_similar(&s, "a", 5, 0.1).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].node, "b");

        let all = most_similar(&s, "c", 2, 0.0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].node, "d");
    }
}
