//! Depth-first enumeration of closed patterns.
//!
//! Every branch works on its own copy of the pattern and of the exclusion
//! list (`EL`): labels already explored at a level are forbidden to the
//! siblings that follow, so each closed pattern is reached exactly once.

use std::collections::BTreeSet;

use crate::config::MinerConfig;
use crate::pattern::{closure, intent, Lang, Pattern};
use crate::property::{interior, CoreProperty};
use crate::stream::Stream;
use crate::types::{Item, MinerResult};

/// A pattern as emitted by the search, with the language of the pattern it
/// was extended from (`None` for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedPattern {
    pub pattern: Pattern,
    pub parent: Option<Lang>,
}

/// Closed-pattern miner for one closure strategy.
pub struct Miner<'a> {
    core: &'a dyn CoreProperty,
    config: MinerConfig,
}

#[derive(Default)]
struct Search {
    found: Vec<MinedPattern>,
    depth_cut: bool,
}

impl<'a> Miner<'a> {
    /// Mine with `core`. `config.core` is not consulted here; use
    /// [`CoreConfig::build`](crate::config::CoreConfig::build) to get a core
    /// from a configuration.
    pub fn new(core: &'a dyn CoreProperty, config: MinerConfig) -> Self {
        Self { core, config }
    }

    /// Enumerate every closed pattern of `stream` whose support reaches
    /// `min_support`, parents before children.
    pub fn run(&self, stream: &Stream) -> MinerResult<Vec<MinedPattern>> {
        self.config.validate_search()?;
        tracing::info!(
            "Mining {} links over {} entities with {} (min_support {})",
            stream.link_count(),
            stream.node_count(),
            self.core.name(),
            self.config.min_support
        );

        let support_set = interior(stream, self.core)?;
        if support_set.support_size() < self.config.min_support {
            tracing::info!(
                "Root support {} is below min_support, nothing to mine",
                support_set.support_size()
            );
            return Ok(Vec::new());
        }
        let root = Pattern {
            lang: intent(&support_set),
            support_set,
        };

        let mut search = Search::default();
        self.enumerate(root, None, BTreeSet::new(), 0, &mut search)?;

        if self.budget_spent(&search) {
            tracing::warn!(
                "Search stopped after {} patterns (max_patterns)",
                search.found.len()
            );
        }
        if search.depth_cut {
            tracing::warn!("Search was cut at depth {:?} (max_depth)", self.config.max_depth);
        }
        tracing::info!("Mined {} closed patterns", search.found.len());
        Ok(search.found)
    }

    fn budget_spent(&self, search: &Search) -> bool {
        self.config
            .max_patterns
            .is_some_and(|max| search.found.len() >= max)
    }

    fn enumerate(
        &self,
        pattern: Pattern,
        parent: Option<Lang>,
        mut excluded: BTreeSet<Item>,
        depth: usize,
        search: &mut Search,
    ) -> MinerResult<()> {
        if self.budget_spent(search) {
            return Ok(());
        }
        tracing::debug!(
            "Pattern {:?} at depth {depth}, support {}",
            pattern.lang,
            pattern.support()
        );
        search.found.push(MinedPattern {
            pattern: pattern.clone(),
            parent,
        });

        let candidates = pattern.lang.minus(&pattern.support_set, &excluded)?;
        if candidates.is_empty() {
            return Ok(());
        }
        if self.config.max_depth.is_some_and(|max| depth >= max) {
            search.depth_cut = true;
            return Ok(());
        }

        for candidate in candidates {
            if self.budget_spent(search) {
                break;
            }
            let extended = pattern.lang.add(&candidate)?;
            let child = closure(&extended, &pattern.support_set, self.core)?;

            if child.support() < self.config.min_support {
                tracing::debug!(
                    "Pruned {candidate}: support {} below {}",
                    child.support(),
                    self.config.min_support
                );
            } else if child.lang == pattern.lang || child.lang.shares_any(&excluded) {
                tracing::debug!("Dropped {candidate}: closes onto a visited pattern");
            } else {
                self.enumerate(
                    child,
                    Some(pattern.lang.clone()),
                    excluded.clone(),
                    depth + 1,
                    search,
                )?;
            }
            excluded.insert(candidate);
        }
        Ok(())
    }
}

/// Mine `stream` with default bounds and the given minimum support.
pub fn mine(stream: &Stream, core: &dyn CoreProperty, min_support: usize) -> MinerResult<Vec<MinedPattern>> {
    Miner::new(core, MinerConfig::with_min_support(min_support)).run(stream)
}
