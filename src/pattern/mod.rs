//! Link templates with logic variables.
//!
//! A [`Pattern`] is a typed link whose members are concrete atoms, variables,
//! or nested patterns. Patterns never live in the graph: matching one against
//! a link yields [`Bindings`], and instantiating one under bindings creates
//! (or fetches) the concrete link through the [`AtomSpace`].

pub mod matcher;

pub use matcher::{BacktrackingMatcher, PatternMatcher};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::atom::{AtomId, AtomType};
use crate::error::{PlnResult, RuleError};
use crate::graph::AtomSpace;

/// An unbound slot in a pattern, scoped to the rule that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(u32);

impl Variable {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$v{}", self.0)
    }
}

/// Allocates fresh variables for rule construction.
///
/// Variables only need to be unique within one rule; sharing a pool across
/// rules is harmless.
#[derive(Debug, Default)]
pub struct VariablePool {
    next: u32,
}

impl VariablePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a variable no other caller of this pool has seen.
    pub fn new_variable(&mut self) -> Variable {
        let v = Variable(self.next);
        self.next += 1;
        v
    }

    /// Number of variables handed out so far.
    pub fn allocated(&self) -> usize {
        self.next as usize
    }
}

/// Variable → atom assignment.
pub type Bindings = BTreeMap<Variable, AtomId>;

/// One member of a pattern's outgoing set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Variable),
    Atom(AtomId),
    Link(Pattern),
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Self::Variable(v)
    }
}

impl From<AtomId> for Term {
    fn from(id: AtomId) -> Self {
        Self::Atom(id)
    }
}

impl From<Pattern> for Term {
    fn from(p: Pattern) -> Self {
        Self::Link(p)
    }
}

/// A link template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub link_type: AtomType,
    pub outgoing: Vec<Term>,
}

impl Pattern {
    pub fn new(link_type: AtomType, outgoing: Vec<Term>) -> Self {
        Self {
            link_type,
            outgoing,
        }
    }

    /// A flat pattern whose members are all variables.
    pub fn over(link_type: AtomType, variables: &[Variable]) -> Self {
        Self::new(link_type, variables.iter().copied().map(Term::from).collect())
    }

    /// Every variable occurring in this pattern, nested patterns included.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        for term in &self.outgoing {
            match term {
                Term::Variable(v) => {
                    out.insert(*v);
                }
                Term::Atom(_) => {}
                Term::Link(inner) => inner.collect_variables(out),
            }
        }
    }

    /// Match this pattern against a concrete atom, extending `bindings`.
    ///
    /// Returns `None` when the atom's type or arity differ, a concrete member
    /// differs, or a variable is already bound to a different atom.
    pub fn match_atom(
        &self,
        space: &dyn AtomSpace,
        atom: AtomId,
        bindings: &Bindings,
    ) -> Option<Bindings> {
        let atom = space.get(atom)?;
        if atom.atom_type != self.link_type || atom.outgoing.len() != self.outgoing.len() {
            return None;
        }

        let mut extended = bindings.clone();
        for (term, &member) in self.outgoing.iter().zip(&atom.outgoing) {
            match term {
                Term::Atom(id) => {
                    if *id != member {
                        return None;
                    }
                }
                Term::Variable(v) => match extended.get(v) {
                    Some(&bound) if bound != member => return None,
                    Some(_) => {}
                    None => {
                        extended.insert(*v, member);
                    }
                },
                Term::Link(inner) => {
                    extended = inner.match_atom(space, member, &extended)?;
                }
            }
        }
        Some(extended)
    }

    /// Match this pattern against a link with no prior bindings.
    pub fn match_link(&self, space: &dyn AtomSpace, link: AtomId) -> Option<Bindings> {
        self.match_atom(space, link, &Bindings::new())
    }

    /// Create (or fetch) the concrete link this pattern denotes under `bindings`.
    pub fn instantiate(&self, space: &dyn AtomSpace, bindings: &Bindings) -> PlnResult<AtomId> {
        let mut members = Vec::with_capacity(self.outgoing.len());
        for term in &self.outgoing {
            let id = match term {
                Term::Atom(id) => *id,
                Term::Variable(v) => *bindings.get(v).ok_or_else(|| RuleError::UnboundVariable {
                    variable: v.to_string(),
                })?,
                Term::Link(inner) => inner.instantiate(space, bindings)?,
            };
            members.push(id);
        }
        Ok(space.link(self.link_type, &members)?)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.link_type)?;
        for term in &self.outgoing {
            match term {
                Term::Variable(v) => write!(f, " {v}")?,
                Term::Atom(id) => write!(f, " {id}")?,
                Term::Link(inner) => write!(f, " {inner}")?,
            }
        }
        write!(f, ")")
    }
}

/// One way a rule's input patterns ground in the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub bindings: Bindings,
    /// The atom each input pattern matched, in pattern order.
    pub groundings: Vec<AtomId>,
}
