//! Temporal rules: relation evaluation from timestamps, transitivity, and
//! predictive attraction.

use std::sync::Arc;

use crate::allen::AllenRelation;
use crate::atom::AtomType;
use crate::error::RuleResult;
use crate::formula::{DeductionFormula, Formula, IdentityFormula, IntervalFormula};
use crate::pattern::{Pattern, VariablePool};

use super::{InputMode, Rule, RuleBuilder};

/// Relations that get an evaluation rule and a transitivity rule.
pub const EVALUATED_RELATIONS: [AllenRelation; 7] = [
    AllenRelation::Before,
    AllenRelation::Overlaps,
    AllenRelation::During,
    AllenRelation::Meets,
    AllenRelation::Starts,
    AllenRelation::Finishes,
    AllenRelation::Equals,
];

/// Evaluate a binary temporal relation between two entities from their
/// `AtTimeLink` observations.
///
/// Inputs `AtTimeLink(ta, A)` and `AtTimeLink(tb, B)`; output `R(A, B)`.
/// The output is built from the matched entities, so it is always bound.
/// A and B must differ.
pub fn temporal_rule(
    variables: &mut VariablePool,
    relation: AllenRelation,
    formula: Arc<dyn Formula>,
) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();
    let ta = variables.new_variable();
    let tb = variables.new_variable();

    RuleBuilder::new()
        .name_suffix("EvaluationRule")
        .input(Pattern::over(AtomType::AtTimeLink, &[ta, a]))
        .input(Pattern::over(AtomType::AtTimeLink, &[tb, b]))
        .output(Pattern::over(relation.link_type(), &[a, b]))
        .formula(formula)
        .input_mode(InputMode::TemporalDistribution)
        .distinct(a, b)
        .build()
}

/// `T(A, B)` and `T(B, C)` yield `T(A, C)`.
///
/// The default formula is deduction, which is not validated for temporal
/// relations.
pub fn transitivity_rule(
    variables: &mut VariablePool,
    link_type: AtomType,
    formula: Arc<dyn Formula>,
) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();
    let c = variables.new_variable();

    RuleBuilder::new()
        .name_suffix("TransitivityRule")
        .input(Pattern::over(link_type, &[a, b]))
        .input(Pattern::over(link_type, &[b, c]))
        .output(Pattern::over(link_type, &[a, c]))
        .formula(formula)
        .build()
}

/// `AndLink(AttractionLink(A, B), BeforeLink(A, B))` yields
/// `PredictiveAttractionLink(A, B)`.
pub fn predictive_attraction_rule(variables: &mut VariablePool) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();

    RuleBuilder::new()
        .named("PredictiveAttractionRule")
        .input(Pattern::new(
            AtomType::AndLink,
            vec![
                Pattern::over(AtomType::AttractionLink, &[a, b]).into(),
                Pattern::over(AtomType::BeforeLink, &[a, b]).into(),
            ],
        ))
        .output(Pattern::over(AtomType::PredictiveAttractionLink, &[a, b]))
        .formula(Arc::new(IdentityFormula))
        .build()
}

/// One evaluation rule and one transitivity rule per relation in
/// [`EVALUATED_RELATIONS`].
pub fn create_temporal_rules(variables: &mut VariablePool) -> RuleResult<Vec<Rule>> {
    let mut rules = Vec::with_capacity(EVALUATED_RELATIONS.len() * 2);
    for relation in EVALUATED_RELATIONS {
        rules.push(temporal_rule(
            variables,
            relation,
            Arc::new(IntervalFormula::new(relation)),
        )?);
    }
    for relation in EVALUATED_RELATIONS {
        rules.push(transitivity_rule(
            variables,
            relation.link_type(),
            Arc::new(DeductionFormula::default()),
        )?);
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    #[test]
    fn temporal_rule_shape() {
        let mut pool = VariablePool::new();
        let rule = temporal_rule(
            &mut pool,
            AllenRelation::Before,
            Arc::new(IntervalFormula::new(AllenRelation::Before)),
        )
        .unwrap();
        assert_eq!(rule.name(), "BeforeLinkEvaluationRule");
        assert_eq!(rule.inputs().len(), 2);
        assert_eq!(rule.outputs().len(), 1);
        assert_eq!(rule.input_mode(), InputMode::TemporalDistribution);
        assert!(rule.probabilistic_inputs());
        assert_eq!(pool.allocated(), 4);
    }

    /// The shape where the output names a target no input binds is a
    /// known-invalid configuration and must not build.
    #[test]
    fn unbound_target_variant_is_rejected() {
        let mut pool = VariablePool::new();
        let (a, b, ta, tb, target) = (
            pool.new_variable(),
            pool.new_variable(),
            pool.new_variable(),
            pool.new_variable(),
            pool.new_variable(),
        );
        let err = RuleBuilder::new()
            .name_suffix("EvaluationRule")
            .input(Pattern::over(AtomType::AtTimeLink, &[ta, a]))
            .input(Pattern::over(AtomType::AtTimeLink, &[tb, b]))
            .output(Pattern::over(AtomType::BeforeLink, &[a, target]))
            .build()
            .unwrap_err();
        match err {
            RuleError::UnboundOutputVariable { rule, variable } => {
                assert_eq!(rule, "BeforeLinkEvaluationRule");
                assert_eq!(variable, target.to_string());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transitivity_names_follow_link_type() {
        let mut pool = VariablePool::new();
        let rule = transitivity_rule(
            &mut pool,
            AtomType::DuringLink,
            Arc::new(DeductionFormula::default()),
        )
        .unwrap();
        assert_eq!(rule.name(), "DuringLinkTransitivityRule");
    }

    #[test]
    fn temporal_rule_set_has_fourteen_distinct_rules() {
        let mut pool = VariablePool::new();
        let rules = create_temporal_rules(&mut pool).unwrap();
        assert_eq!(rules.len(), 14);
        let mut names: Vec<&str> = rules.iter().map(Rule::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn predictive_attraction_nests_inputs() {
        let mut pool = VariablePool::new();
        let rule = predictive_attraction_rule(&mut pool).unwrap();
        assert_eq!(rule.inputs().len(), 1);
        assert_eq!(rule.inputs()[0].variables().len(), 2);
    }
}
