//! Closed patterns and the Galois operators between label sets and supports.

use std::collections::BTreeSet;

use crate::property::{interior, CoreProperty};
use crate::stream::{Link, Stream};
use crate::timenode::TimeNodeSet;
use crate::types::{Item, LabelSet, MinerError, MinerResult, Side, Sided};

/// A pattern language: one label set for flat streams, one per side for
/// bipartite ones.
pub type Lang = Sided<LabelSet>;

impl Sided<LabelSet> {
    /// Whether `link` carries every label of the language on the right
    /// endpoint(s).
    pub fn admits(&self, link: &Link) -> bool {
        match self {
            Sided::Mono(q) => q.is_subset(&link.label_u) && q.is_subset(&link.label_v),
            Sided::Bi { left, right } => {
                left.is_subset(&link.label_u) && right.is_subset(&link.label_v)
            }
        }
    }

    /// The language extended with one item.
    pub fn add(&self, item: &Item) -> MinerResult<Lang> {
        let mut extended = self.clone();
        match (&mut extended, item.side) {
            (Sided::Mono(all), None) => {
                all.insert(item.label.clone());
            }
            (Sided::Bi { left, .. }, Some(Side::Left)) => {
                left.insert(item.label.clone());
            }
            (Sided::Bi { right, .. }, Some(Side::Right)) => {
                right.insert(item.label.clone());
            }
            _ => {
                return Err(MinerError::InvalidInput(format!(
                    "Item {item} does not fit the pattern layout"
                )));
            }
        }
        Ok(extended)
    }

    /// Every label of the language as an extension item.
    pub fn items(&self) -> BTreeSet<Item> {
        match self {
            Sided::Mono(all) => all.iter().map(Item::mono).collect(),
            Sided::Bi { left, right } => left
                .iter()
                .map(|l| Item::sided(Side::Left, l))
                .chain(right.iter().map(|l| Item::sided(Side::Right, l)))
                .collect(),
        }
    }

    /// Extension candidates: labels observed in `support` that are neither in
    /// the language nor in `excluded`.
    ///
    /// For bipartite languages every observed label must belong to the
    /// universe of its side.
    pub fn minus(&self, support: &Stream, excluded: &BTreeSet<Item>) -> MinerResult<BTreeSet<Item>> {
        let observed: Vec<Item> = match self {
            Sided::Mono(_) => support.labels_on(None).into_iter().map(Item::mono).collect(),
            Sided::Bi { .. } => {
                let mut items = Vec::new();
                for side in [Side::Left, Side::Right] {
                    for label in support.labels_on(Some(side)) {
                        if !support.knows_label(&label, Some(side)) {
                            return Err(MinerError::Language {
                                label,
                                side: side.to_string(),
                            });
                        }
                        items.push(Item::sided(side, label));
                    }
                }
                items
            }
        };

        let own = self.items();
        Ok(observed
            .into_iter()
            .filter(|item| !own.contains(item) && !excluded.contains(item))
            .collect())
    }

    /// Whether any label of the language appears in `excluded`.
    pub fn shares_any(&self, excluded: &BTreeSet<Item>) -> bool {
        self.items().iter().any(|item| excluded.contains(item))
    }

    /// All labels across sides.
    pub fn elements(&self) -> LabelSet {
        match self {
            Sided::Mono(all) => all.clone(),
            Sided::Bi { left, right } => left.union(right).cloned().collect(),
        }
    }
}

/// Labels shared by every occurrence in `support`.
///
/// An empty support yields the empty language, never the universe. The
/// shape (flat or per side) follows the stream's label universe.
pub fn intent(support: &Stream) -> Lang {
    let mut links = support.links().iter();
    let Some(first) = links.next() else {
        return support.universe().empty_like();
    };

    match support.universe() {
        Sided::Mono(_) => {
            let mut common: LabelSet = first.label_u.intersection(&first.label_v).cloned().collect();
            for link in links {
                common.retain(|l| link.label_u.contains(l) && link.label_v.contains(l));
            }
            Sided::Mono(common)
        }
        Sided::Bi { .. } => {
            let mut left = first.label_u.clone();
            let mut right = first.label_v.clone();
            for link in links {
                left.retain(|l| link.label_u.contains(l));
                right.retain(|l| link.label_v.contains(l));
            }
            Sided::Bi { left, right }
        }
    }
}

/// Occurrences of `lang` in `stream`: every `(entity, link interval)` whose
/// own label on the link carries the language, checked against the entity's
/// side for bipartite languages.
pub fn extent(lang: &Lang, stream: &Stream) -> TimeNodeSet {
    let (for_u, for_v) = match lang {
        Sided::Mono(q) => (q, q),
        Sided::Bi { left, right } => (left, right),
    };
    let mut windows = TimeNodeSet::new();
    for link in stream.links() {
        if for_u.is_subset(&link.label_u) {
            windows.insert(link.u.clone(), link.interval, link.label_u.clone());
        }
        if for_v.is_subset(&link.label_v) {
            windows.insert(link.v.clone(), link.interval, link.label_v.clone());
        }
    }
    windows
}

/// `stream` cut down to the links admitted by `lang` (both endpoints are
/// occurrences), within the stream's own presence.
pub fn restrict(lang: &Lang, stream: &Stream) -> Stream {
    let windows = extent(lang, stream).intersection(&stream.presence());
    stream
        .filter_links(|link| lang.admits(link))
        .substream(&windows, &windows)
}

/// A closed label set with its maximal dense support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub lang: Lang,
    pub support_set: Stream,
}

impl Pattern {
    /// Number of entities in the support.
    pub fn support(&self) -> usize {
        self.support_set.support_size()
    }

    pub fn is_bipartite(&self) -> bool {
        self.lang.is_bi()
    }

    pub fn elements(&self) -> LabelSet {
        self.lang.elements()
    }
}

/// `intent(interior(restrict(lang)))` together with the support it came from.
pub fn closure(lang: &Lang, stream: &Stream, core: &dyn CoreProperty) -> MinerResult<Pattern> {
    let support_set = interior(&restrict(lang, stream), core)?;
    Ok(Pattern {
        lang: intent(&support_set),
        support_set,
    })
}
