//! Allen's thirteen interval relations.
//!
//! Each relation has a single-character code used by the composition table
//! and a link type in the atom space. [`AllenRelation::COLUMN_ORDER`] is the
//! fixed column order of the composition table.

use serde::{Deserialize, Serialize};

use crate::atom::AtomType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AllenRelation {
    /// `p`: X ends before Y starts.
    Before,
    /// `m`: X ends exactly where Y starts.
    Meets,
    /// `o`: X starts first and ends inside Y.
    Overlaps,
    /// `F`: X starts first, both end together.
    FinishedBy,
    /// `D`: Y lies strictly inside X.
    Contains,
    /// `s`: both start together, X ends first.
    Starts,
    /// `e`: same start and end.
    Equals,
    /// `S`: both start together, Y ends first.
    StartedBy,
    /// `d`: X lies strictly inside Y.
    During,
    /// `f`: Y starts first, both end together.
    Finishes,
    /// `O`: Y starts first and ends inside X.
    OverlappedBy,
    /// `M`: Y ends exactly where X starts.
    MetBy,
    /// `P`: Y ends before X starts.
    After,
}

impl AllenRelation {
    /// Composition table column order: `p m o F D s e S d f O M P`.
    pub const COLUMN_ORDER: [AllenRelation; 13] = [
        Self::Before,
        Self::Meets,
        Self::Overlaps,
        Self::FinishedBy,
        Self::Contains,
        Self::Starts,
        Self::Equals,
        Self::StartedBy,
        Self::During,
        Self::Finishes,
        Self::OverlappedBy,
        Self::MetBy,
        Self::After,
    ];

    /// Single-character relation code.
    pub fn code(self) -> char {
        match self {
            Self::Before => 'p',
            Self::Meets => 'm',
            Self::Overlaps => 'o',
            Self::FinishedBy => 'F',
            Self::Contains => 'D',
            Self::Starts => 's',
            Self::Equals => 'e',
            Self::StartedBy => 'S',
            Self::During => 'd',
            Self::Finishes => 'f',
            Self::OverlappedBy => 'O',
            Self::MetBy => 'M',
            Self::After => 'P',
        }
    }

    /// Inverse of [`AllenRelation::code`]. `None` for anything outside the 13 codes.
    pub fn from_code(code: char) -> Option<Self> {
        Self::COLUMN_ORDER.into_iter().find(|r| r.code() == code)
    }

    /// The link type asserting this relation.
    pub fn link_type(self) -> AtomType {
        match self {
            Self::Before => AtomType::BeforeLink,
            Self::Meets => AtomType::MeetsLink,
            Self::Overlaps => AtomType::OverlapsLink,
            Self::FinishedBy => AtomType::FinishedByLink,
            Self::Contains => AtomType::ContainsLink,
            Self::Starts => AtomType::StartsLink,
            Self::Equals => AtomType::EqualsLink,
            Self::StartedBy => AtomType::StartedByLink,
            Self::During => AtomType::DuringLink,
            Self::Finishes => AtomType::FinishesLink,
            Self::OverlappedBy => AtomType::OverlappedByLink,
            Self::MetBy => AtomType::MetByLink,
            Self::After => AtomType::AfterLink,
        }
    }

    /// The relation a link type asserts, if it is one of the thirteen.
    pub fn from_link_type(link_type: AtomType) -> Option<Self> {
        Self::COLUMN_ORDER
            .into_iter()
            .find(|r| r.link_type() == link_type)
    }

    /// The converse relation: `X r Y` iff `Y r.inverse() X`.
    pub fn inverse(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::Meets => Self::MetBy,
            Self::Overlaps => Self::OverlappedBy,
            Self::FinishedBy => Self::Finishes,
            Self::Contains => Self::During,
            Self::Starts => Self::StartedBy,
            Self::Equals => Self::Equals,
            Self::StartedBy => Self::Starts,
            Self::During => Self::Contains,
            Self::Finishes => Self::FinishedBy,
            Self::OverlappedBy => Self::Overlaps,
            Self::MetBy => Self::Meets,
            Self::After => Self::Before,
        }
    }

    /// Classify the relation between two closed intervals `[x0, x1]` and `[y0, y1]`.
    ///
    /// Degenerate (point) intervals are accepted; equality checks win over
    /// the ordering checks, so two identical points are `Equals`.
    pub fn between(x: (i64, i64), y: (i64, i64)) -> Self {
        let (x0, x1) = (x.0.min(x.1), x.0.max(x.1));
        let (y0, y1) = (y.0.min(y.1), y.0.max(y.1));

        if x0 == y0 && x1 == y1 {
            Self::Equals
        } else if x1 < y0 {
            Self::Before
        } else if y1 < x0 {
            Self::After
        } else if x0 == y0 {
            if x1 < y1 { Self::Starts } else { Self::StartedBy }
        } else if x1 == y1 {
            if x0 > y0 { Self::Finishes } else { Self::FinishedBy }
        } else if x1 == y0 {
            Self::Meets
        } else if y1 == x0 {
            Self::MetBy
        } else if x0 > y0 && x1 < y1 {
            Self::During
        } else if x0 < y0 && x1 > y1 {
            Self::Contains
        } else if x0 < y0 {
            Self::Overlaps
        } else {
            Self::OverlappedBy
        }
    }
}

impl std::fmt::Display for AllenRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
