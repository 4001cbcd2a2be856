// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # pln-chainer
//!
//! A forward-chaining probabilistic inference engine over a typed knowledge
//! graph, with temporal reasoning built on Allen's interval algebra.
//!
//! ## Architecture
//!
//! - **Atoms** (`atom`, `graph`): typed nodes and links with truth values,
//!   behind the [`graph::AtomSpace`] capability trait
//! - **Patterns** (`pattern`): link templates with variables and a
//!   backtracking matcher
//! - **Rules** (`rule`, `composition`): immutable rule descriptions, including
//!   rules generated from an Allen composition table
//! - **Formulas** (`formula`): pluggable truth-value functions
//! - **Chainer** (`chainer`): one rule application per step, with a
//!   provenance trail
//! - **Agent** (`agent`): runs the chainer periodically with a rule profile
//!
//! ## Library usage
//!
//! ```
//! use pln_chainer::atom::{AtomType, TruthValue};
//! use pln_chainer::chainer::{Chainer, ChainerConfig};
//! use pln_chainer::graph::{AtomSpace, MemoryAtomSpace};
//! use pln_chainer::rule::inheritance::deduction_rule;
//!
//! let space = MemoryAtomSpace::new();
//! let cat = space.add_node(AtomType::ConceptNode, "cat");
//! let mammal = space.add_node(AtomType::ConceptNode, "mammal");
//! let animal = space.add_node(AtomType::ConceptNode, "animal");
//! space.add_link(AtomType::InheritanceLink, &[cat, mammal], TruthValue::new(0.9, 10.0))?;
//! space.add_link(AtomType::InheritanceLink, &[mammal, animal], TruthValue::new(0.95, 20.0))?;
//!
//! let mut chainer = Chainer::new(ChainerConfig::default());
//! let rule = deduction_rule(chainer.variables())?;
//! chainer.add_rule(rule);
//!
//! assert!(chainer.forward_step(&space)?.is_fired());
//! assert!(space.find_link(AtomType::InheritanceLink, &[cat, animal]).is_some());
//! # Ok::<(), pln_chainer::error::PlnError>(())
//! ```

pub mod agent;
pub mod allen;
pub mod atom;
pub mod chainer;
pub mod composition;
pub mod error;
pub mod facts;
pub mod formula;
pub mod graph;
pub mod pattern;
pub mod rule;
