//! Inference trail: which atoms licensed each derived link.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::atom::AtomId;

/// How many trail entries the chainer keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailRetention {
    /// Keep every entry for the chainer's lifetime.
    #[default]
    Unbounded,
    /// Keep at most `max_entries`, evicting the least recently derived link.
    Bounded { max_entries: usize },
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u64,
    inputs: Vec<AtomId>,
}

/// Derived link → supporting atoms. The most recent derivation wins.
///
/// Overwrites leave a stale `(link, generation)` pair in `order`. Stale pairs
/// are skipped on read and dropped once they outnumber the live ones.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    entries: HashMap<AtomId, Entry>,
    /// Derived links with the generation they were recorded at, least recent
    /// first.
    order: VecDeque<(AtomId, u64)>,
    next_generation: u64,
    retention: TrailRetention,
}

impl Trail {
    pub fn new(retention: TrailRetention) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_generation: 0,
            retention,
        }
    }

    /// Record (or overwrite) the support of `link`. Returns evicted links.
    pub fn record(&mut self, link: AtomId, inputs: Vec<AtomId>) -> Vec<AtomId> {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.entries.insert(link, Entry { generation, inputs });
        self.order.push_back((link, generation));

        let mut evicted = Vec::new();
        if let TrailRetention::Bounded { max_entries } = self.retention {
            while self.entries.len() > max_entries {
                let Some((oldest, generation)) = self.order.pop_front() else {
                    break;
                };
                if self.is_live(oldest, generation) {
                    self.entries.remove(&oldest);
                    evicted.push(oldest);
                }
            }
        }

        if self.order.len() > 2 * self.entries.len().max(8) {
            let entries = &self.entries;
            self.order
                .retain(|&(link, generation)| entries.get(&link).is_some_and(|e| e.generation == generation));
        }
        evicted
    }

    fn is_live(&self, link: AtomId, generation: u64) -> bool {
        self.entries
            .get(&link)
            .is_some_and(|entry| entry.generation == generation)
    }

    pub fn get(&self, link: AtomId) -> Option<&[AtomId]> {
        self.entries.get(&link).map(|entry| entry.inputs.as_slice())
    }

    pub fn contains(&self, link: AtomId) -> bool {
        self.entries.contains_key(&link)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retention(&self) -> TrailRetention {
        self.retention
    }

    /// Entries in derivation order, least recent first.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &[AtomId])> + '_ {
        self.order.iter().filter_map(|&(link, generation)| {
            self.entries
                .get(&link)
                .filter(|entry| entry.generation == generation)
                .map(|entry| (link, entry.inputs.as_slice()))
        })
    }
}
