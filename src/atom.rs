//! Core atom types: identities, type tags, and truth values.
//!
//! An [`Atom`] is either a node (named leaf) or a link (a typed, ordered tuple
//! of other atoms). Atoms are owned by an [`crate::graph::AtomSpace`]; rules and
//! the chainer only ever hold [`AtomId`]s.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Unique, niche-optimized identifier for an atom.
///
/// Uses `NonZeroU64` so that `Option<AtomId>` is the same size as `AtomId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct AtomId(NonZeroU64);

impl AtomId {
    /// Create an `AtomId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(AtomId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for AtomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atom:{}", self.0)
    }
}

/// Type tag of an atom.
///
/// Node types name leaves; link types name relations. The thirteen Allen
/// relation links are listed in composition-table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AtomType {
    ConceptNode,
    NumberNode,
    PredicateNode,
    AtTimeLink,
    InheritanceLink,
    AndLink,
    AttractionLink,
    PredictiveAttractionLink,
    BeforeLink,
    MeetsLink,
    OverlapsLink,
    FinishedByLink,
    ContainsLink,
    StartsLink,
    EqualsLink,
    StartedByLink,
    DuringLink,
    FinishesLink,
    OverlappedByLink,
    MetByLink,
    AfterLink,
}

impl AtomType {
    /// Every atom type, nodes first.
    pub const ALL: [AtomType; 21] = [
        Self::ConceptNode,
        Self::NumberNode,
        Self::PredicateNode,
        Self::AtTimeLink,
        Self::InheritanceLink,
        Self::AndLink,
        Self::AttractionLink,
        Self::PredictiveAttractionLink,
        Self::BeforeLink,
        Self::MeetsLink,
        Self::OverlapsLink,
        Self::FinishedByLink,
        Self::ContainsLink,
        Self::StartsLink,
        Self::EqualsLink,
        Self::StartedByLink,
        Self::DuringLink,
        Self::FinishesLink,
        Self::OverlappedByLink,
        Self::MetByLink,
        Self::AfterLink,
    ];

    /// The type name, e.g. `"BeforeLink"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ConceptNode => "ConceptNode",
            Self::NumberNode => "NumberNode",
            Self::PredicateNode => "PredicateNode",
            Self::AtTimeLink => "AtTimeLink",
            Self::InheritanceLink => "InheritanceLink",
            Self::AndLink => "AndLink",
            Self::AttractionLink => "AttractionLink",
            Self::PredictiveAttractionLink => "PredictiveAttractionLink",
            Self::BeforeLink => "BeforeLink",
            Self::MeetsLink => "MeetsLink",
            Self::OverlapsLink => "OverlapsLink",
            Self::FinishedByLink => "FinishedByLink",
            Self::ContainsLink => "ContainsLink",
            Self::StartsLink => "StartsLink",
            Self::EqualsLink => "EqualsLink",
            Self::StartedByLink => "StartedByLink",
            Self::DuringLink => "DuringLink",
            Self::FinishesLink => "FinishesLink",
            Self::OverlappedByLink => "OverlappedByLink",
            Self::MetByLink => "MetByLink",
            Self::AfterLink => "AfterLink",
        }
    }

    /// Look a type up by its name. Case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name.trim())
    }

    /// Returns `true` for link types.
    pub fn is_link(self) -> bool {
        !matches!(
            self,
            Self::ConceptNode | Self::NumberNode | Self::PredicateNode
        )
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A (strength, count) belief attached to an atom.
///
/// `count` stands in for a confidence measure: the amount of evidence behind
/// `strength`. It is not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    /// Strength in [0.0, 1.0].
    pub strength: f64,
    /// Evidence count, >= 0.
    pub count: f64,
}

impl TruthValue {
    /// Truth value of a freshly created atom.
    pub const DEFAULT: TruthValue = TruthValue {
        strength: 0.0,
        count: 0.0,
    };

    /// Create a truth value, clamping strength to [0, 1] and count to >= 0.
    pub fn new(strength: f64, count: f64) -> Self {
        Self {
            strength: if strength.is_nan() {
                0.0
            } else {
                strength.clamp(0.0, 1.0)
            },
            count: if count.is_nan() { 0.0 } else { count.max(0.0) },
        }
    }

    /// Replace the count, keeping strength.
    pub fn with_count(self, count: f64) -> Self {
        Self::new(self.strength, count)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for TruthValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:.4}, {:.2}>", self.strength, self.count)
    }
}

/// An atom as stored in an atom space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub atom_type: AtomType,
    /// Node name. `None` for links.
    pub name: Option<String>,
    /// Outgoing set. Empty for nodes.
    pub outgoing: Vec<AtomId>,
    pub truth: TruthValue,
}

impl Atom {
    /// Returns `true` if this atom is a link.
    pub fn is_link(&self) -> bool {
        self.atom_type.is_link()
    }
}
