//! Binding search: finds every way a conjunction of patterns grounds in the graph.

use crate::graph::AtomSpace;

use super::{Match, Pattern};

/// The pattern-matching collaborator.
///
/// Given a rule's input patterns, return every consistent grounding. Order of
/// the returned matches is significant: the chainer's default binding policy
/// takes the first one.
pub trait PatternMatcher: Send + Sync {
    fn find_matches(&self, space: &dyn AtomSpace, patterns: &[Pattern]) -> Vec<Match>;
}

/// Clause-by-clause matcher over the store's type index.
///
/// Starts from the candidates of the first pattern and extends each partial
/// match with every candidate of the next pattern that agrees on shared
/// variables.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingMatcher {
    /// Stop after this many complete matches. `None` for no cap.
    pub max_matches: Option<usize>,
}

impl BacktrackingMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_matches(max_matches: usize) -> Self {
        Self {
            max_matches: Some(max_matches),
        }
    }
}

impl PatternMatcher for BacktrackingMatcher {
    fn find_matches(&self, space: &dyn AtomSpace, patterns: &[Pattern]) -> Vec<Match> {
        if patterns.is_empty() {
            return Vec::new();
        }

        let mut partials = vec![Match::default()];
        for pattern in patterns {
            let candidates = space.atoms_of_type(pattern.link_type);
            let mut extended = Vec::new();
            for partial in &partials {
                for &candidate in &candidates {
                    if let Some(bindings) = pattern.match_atom(space, candidate, &partial.bindings) {
                        let mut groundings = partial.groundings.clone();
                        groundings.push(candidate);
                        extended.push(Match {
                            bindings,
                            groundings,
                        });
                    }
                }
            }
            partials = extended;
            if partials.is_empty() {
                break;
            }
        }

        if let Some(cap) = self.max_matches {
            partials.truncate(cap);
        }
        partials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomType;
    use crate::graph::MemoryAtomSpace;
    use crate::pattern::{Bindings, VariablePool};

    #[test]
    fn chain_join_binds_shared_variable() {
        let space = MemoryAtomSpace::new();
        let [a, b, c, d] = ["A", "B", "C", "D"].map(|n| space.add_node(AtomType::ConceptNode, n));
        let ab = space.link(AtomType::BeforeLink, &[a, b]).unwrap();
        let bc = space.link(AtomType::BeforeLink, &[b, c]).unwrap();
        space.link(AtomType::BeforeLink, &[d, a]).unwrap();

        let mut pool = VariablePool::new();
        let (x, y, z) = (pool.new_variable(), pool.new_variable(), pool.new_variable());
        let patterns = [
            Pattern::over(AtomType::BeforeLink, &[x, y]),
            Pattern::over(AtomType::BeforeLink, &[y, z]),
        ];
        let matches = BacktrackingMatcher::new().find_matches(&space, &patterns);

        // (D,A)+(A,B) and (A,B)+(B,C)
        assert_eq!(matches.len(), 2);
        let abc = matches.iter().find(|m| m.groundings == vec![ab, bc]).unwrap();
        assert_eq!(abc.bindings, Bindings::from([(x, a), (y, b), (z, c)]));
    }

    #[test]
    fn no_candidates_means_no_matches() {
        let space = MemoryAtomSpace::new();
        let mut pool = VariablePool::new();
        let (x, y) = (pool.new_variable(), pool.new_variable());
        let patterns = [Pattern::over(AtomType::MeetsLink, &[x, y])];
        assert!(BacktrackingMatcher::new().find_matches(&space, &patterns).is_empty());
        assert!(BacktrackingMatcher::new().find_matches(&space, &[]).is_empty());
    }

    #[test]
    fn max_matches_caps_results() {
        let space = MemoryAtomSpace::new();
        let nodes: Vec<_> = (0..5)
            .map(|i| space.add_node(AtomType::ConceptNode, &format!("n{i}")))
            .collect();
        for pair in nodes.windows(2) {
            space.link(AtomType::BeforeLink, pair).unwrap();
        }
        let mut pool = VariablePool::new();
        let (x, y) = (pool.new_variable(), pool.new_variable());
        let patterns = [Pattern::over(AtomType::BeforeLink, &[x, y])];
        let matches = BacktrackingMatcher::with_max_matches(2).find_matches(&space, &patterns);
        assert_eq!(matches.len(), 2);
    }
}
