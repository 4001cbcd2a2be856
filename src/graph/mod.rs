//! Graph interface: the capability surface the chainer needs from a knowledge
//! graph store.
//!
//! The store itself (persistence, type hierarchy, attention dynamics) is an
//! external collaborator. The chainer only creates or fetches typed links,
//! reads and writes truth values, and enumerates atoms by type. All methods
//! take `&self`: the store is the one shared mutable resource and owns its own
//! locking discipline.
//!
//! [`MemoryAtomSpace`] is an in-memory implementation used by the binary and
//! the tests.

pub mod memory;

pub use memory::MemoryAtomSpace;

use crate::atom::{Atom, AtomId, AtomType, TruthValue};
use crate::error::GraphError;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Capability interface over a knowledge graph store.
pub trait AtomSpace: Send + Sync {
    /// Create a node, or return the existing node with the same type and name.
    fn add_node(&self, atom_type: AtomType, name: &str) -> AtomId;

    /// Create a link, or return the existing link with identical type and
    /// outgoing set.
    fn link(&self, atom_type: AtomType, outgoing: &[AtomId]) -> GraphResult<AtomId>;

    /// Look up an existing link without creating it.
    fn find_link(&self, atom_type: AtomType, outgoing: &[AtomId]) -> Option<AtomId>;

    /// Fetch a snapshot of an atom.
    fn get(&self, id: AtomId) -> Option<Atom>;

    /// Read an atom's truth value.
    fn truth_value(&self, id: AtomId) -> GraphResult<TruthValue>;

    /// Overwrite an atom's truth value.
    fn set_truth_value(&self, id: AtomId, truth: TruthValue) -> GraphResult<()>;

    /// All atoms of the given type, in creation order.
    fn atoms_of_type(&self, atom_type: AtomType) -> Vec<AtomId>;

    /// The most important atoms, highest first. Diagnostic only.
    fn attentional_focus(&self, _limit: usize) -> Vec<AtomId> {
        Vec::new()
    }

    /// Give an atom a short-term importance boost. Stores without attention
    /// dynamics ignore it.
    fn stimulate(&self, _id: AtomId, _amount: f32) {}
}

/// Render an atom as an s-expression, e.g. `(BeforeLink (ConceptNode "X") (ConceptNode "Y"))`.
pub fn describe(space: &dyn AtomSpace, id: AtomId) -> String {
    match space.get(id) {
        None => format!("(? {id})"),
        Some(atom) if atom.is_link() => {
            let members: Vec<String> = atom.outgoing.iter().map(|&m| describe(space, m)).collect();
            format!("({} {})", atom.atom_type, members.join(" "))
        }
        Some(atom) => format!(
            "({} \"{}\")",
            atom.atom_type,
            atom.name.as_deref().unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_renders_nested_links() {
        let space = MemoryAtomSpace::new();
        let x = space.add_node(AtomType::ConceptNode, "X");
        let t = space.add_node(AtomType::NumberNode, "5");
        let at = space.link(AtomType::AtTimeLink, &[t, x]).unwrap();
        assert_eq!(
            describe(&space, at),
            "(AtTimeLink (NumberNode \"5\") (ConceptNode \"X\"))"
        );
    }
}
