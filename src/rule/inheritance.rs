//! Deduction and inversion over `InheritanceLink`.

use std::sync::Arc;

use crate::atom::AtomType;
use crate::error::RuleResult;
use crate::formula::{DeductionFormula, InversionFormula};
use crate::pattern::{Pattern, VariablePool};

use super::{Rule, RuleBuilder};

/// `Inheritance(A, B)` and `Inheritance(B, C)` yield `Inheritance(A, C)`.
pub fn deduction_rule(variables: &mut VariablePool) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();
    let c = variables.new_variable();

    RuleBuilder::new()
        .named("DeductionRule")
        .input(Pattern::over(AtomType::InheritanceLink, &[a, b]))
        .input(Pattern::over(AtomType::InheritanceLink, &[b, c]))
        .output(Pattern::over(AtomType::InheritanceLink, &[a, c]))
        .formula(Arc::new(DeductionFormula::default()))
        .distinct(a, c)
        .build()
}

/// `Inheritance(A, B)` yields `Inheritance(B, A)`.
pub fn inversion_rule(variables: &mut VariablePool) -> RuleResult<Rule> {
    let a = variables.new_variable();
    let b = variables.new_variable();

    RuleBuilder::new()
        .named("InversionRule")
        .input(Pattern::over(AtomType::InheritanceLink, &[a, b]))
        .output(Pattern::over(AtomType::InheritanceLink, &[b, a]))
        .formula(Arc::new(InversionFormula::default()))
        .distinct(a, b)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_build_with_fresh_variables() {
        let mut pool = VariablePool::new();
        let deduction = deduction_rule(&mut pool).unwrap();
        let inversion = inversion_rule(&mut pool).unwrap();
        assert_eq!(pool.allocated(), 5);
        assert_eq!(deduction.name(), "DeductionRule");
        assert_eq!(inversion.name(), "InversionRule");
        assert!(deduction.probabilistic_inputs());
        assert!(deduction
            .inputs()
            .iter()
            .all(|p| p.link_type == AtomType::InheritanceLink));
    }
}
