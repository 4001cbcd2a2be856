//! In-memory atom space with type and link indices.
//!
//! Uses `DashMap` for the atom table and its secondary indices so the store
//! can be shared between agents behind an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::atom::{Atom, AtomId, AtomType, TruthValue};
use crate::error::GraphError;

use super::{AtomSpace, GraphResult};

/// In-memory [`AtomSpace`].
///
/// Node and link creation are idempotent. Short-term importance accumulates
/// through [`AtomSpace::stimulate`] and orders the attentional focus.
pub struct MemoryAtomSpace {
    atoms: DashMap<AtomId, Atom>,
    /// (type, name) → node id.
    node_index: DashMap<(AtomType, String), AtomId>,
    /// (type, outgoing) → link id.
    link_index: DashMap<(AtomType, Vec<AtomId>), AtomId>,
    /// type → ids in creation order.
    type_index: DashMap<AtomType, Vec<AtomId>>,
    importance: DashMap<AtomId, f32>,
    next_id: AtomicU64,
}

impl MemoryAtomSpace {
    /// Create an empty atom space.
    pub fn new() -> Self {
        Self {
            atoms: DashMap::new(),
            node_index: DashMap::new(),
            link_index: DashMap::new(),
            type_index: DashMap::new(),
            importance: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of atoms (nodes and links).
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the space holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Create (or fetch) a link and set its truth value in one call.
    pub fn add_link(
        &self,
        atom_type: AtomType,
        outgoing: &[AtomId],
        truth: TruthValue,
    ) -> GraphResult<AtomId> {
        let id = self.link(atom_type, outgoing)?;
        self.set_truth_value(id, truth)?;
        Ok(id)
    }

    /// Current short-term importance of an atom.
    pub fn importance(&self, id: AtomId) -> f32 {
        self.importance.get(&id).map(|v| *v).unwrap_or(0.0)
    }

    fn allocate(&self) -> AtomId {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and only grows.
        AtomId::new(raw).unwrap_or_else(|| unreachable!("atom id counter wrapped"))
    }

    fn insert(&self, atom_type: AtomType, name: Option<String>, outgoing: Vec<AtomId>) -> AtomId {
        let id = self.allocate();
        self.atoms.insert(
            id,
            Atom {
                id,
                atom_type,
                name,
                outgoing,
                truth: TruthValue::DEFAULT,
            },
        );
        self.type_index.entry(atom_type).or_default().push(id);
        id
    }
}

impl Default for MemoryAtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomSpace for MemoryAtomSpace {
    fn add_node(&self, atom_type: AtomType, name: &str) -> AtomId {
        *self
            .node_index
            .entry((atom_type, name.to_string()))
            .or_insert_with(|| self.insert(atom_type, Some(name.to_string()), Vec::new()))
    }

    fn link(&self, atom_type: AtomType, outgoing: &[AtomId]) -> GraphResult<AtomId> {
        if !atom_type.is_link() {
            return Err(GraphError::NotALinkType {
                atom_type: atom_type.to_string(),
            });
        }
        if outgoing.is_empty() {
            return Err(GraphError::EmptyLink {
                link_type: atom_type.to_string(),
            });
        }
        if let Some(missing) = outgoing.iter().find(|id| !self.atoms.contains_key(id)) {
            return Err(GraphError::UnknownAtom {
                atom_id: missing.get(),
            });
        }

        Ok(*self
            .link_index
            .entry((atom_type, outgoing.to_vec()))
            .or_insert_with(|| self.insert(atom_type, None, outgoing.to_vec())))
    }

    fn find_link(&self, atom_type: AtomType, outgoing: &[AtomId]) -> Option<AtomId> {
        self.link_index
            .get(&(atom_type, outgoing.to_vec()))
            .map(|id| *id.value())
    }

    fn get(&self, id: AtomId) -> Option<Atom> {
        self.atoms.get(&id).map(|a| a.value().clone())
    }

    fn truth_value(&self, id: AtomId) -> GraphResult<TruthValue> {
        self.atoms
            .get(&id)
            .map(|a| a.truth)
            .ok_or(GraphError::UnknownAtom { atom_id: id.get() })
    }

    fn set_truth_value(&self, id: AtomId, truth: TruthValue) -> GraphResult<()> {
        let mut atom = self
            .atoms
            .get_mut(&id)
            .ok_or(GraphError::UnknownAtom { atom_id: id.get() })?;
        atom.truth = truth;
        Ok(())
    }

    fn atoms_of_type(&self, atom_type: AtomType) -> Vec<AtomId> {
        self.type_index
            .get(&atom_type)
            .map(|ids| ids.value().clone())
            .unwrap_or_default()
    }

    fn attentional_focus(&self, limit: usize) -> Vec<AtomId> {
        let mut ranked: Vec<(AtomId, f32)> = self
            .importance
            .iter()
            .map(|e| (*e.key(), *e.value()))
            .filter(|(_, sti)| *sti > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(limit).map(|(id, _)| id).collect()
    }

    fn stimulate(&self, id: AtomId, amount: f32) {
        if self.atoms.contains_key(&id) {
            *self.importance.entry(id).or_insert(0.0) += amount;
        }
    }
}
