//! Inference rules: input patterns, output patterns, and a truth-value formula.
//!
//! Rules are data. They are assembled with [`RuleBuilder`], which rejects any
//! rule whose outputs mention a variable no input binds, so a malformed rule
//! fails at construction rather than at match time.
//!
//! Built-in families live in the submodules:
//! - [`temporal`]: temporal evaluation, transitivity, predictive attraction
//! - [`inheritance`]: deduction and inversion over `InheritanceLink`
//! - [`crate::composition`]: Allen composition rules from the table

pub mod inheritance;
pub mod temporal;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{RuleError, RuleResult};
use crate::formula::Formula;
use crate::pattern::{Match, Pattern, Variable, VariablePool};

/// How the chainer gathers formula inputs for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// One truth value per matched input atom.
    #[default]
    Truth,
    /// One time distribution per input pattern, aggregated over every match
    /// that agrees with the chosen one on the output variables. Each input
    /// pattern's first member must be a time node.
    TemporalDistribution,
}

/// A validated inference rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    inputs: Vec<Pattern>,
    outputs: Vec<Pattern>,
    formula: Option<Arc<dyn Formula>>,
    probabilistic_inputs: bool,
    input_mode: InputMode,
    distinct: Vec<(Variable, Variable)>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Pattern] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Pattern] {
        &self.outputs
    }

    /// `None` means structural only: outputs are asserted, no truth is computed.
    pub fn formula(&self) -> Option<&Arc<dyn Formula>> {
        self.formula.as_ref()
    }

    /// Whether the formula sees the inputs' own strengths. When unset every
    /// input is treated as certain (strength 1, membership 1).
    pub fn probabilistic_inputs(&self) -> bool {
        self.probabilistic_inputs
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Variables occurring in any output pattern.
    pub fn output_variables(&self) -> BTreeSet<Variable> {
        self.outputs.iter().flat_map(Pattern::variables).collect()
    }

    /// Whether a match satisfies the rule's distinct-variable constraints.
    pub fn admits(&self, m: &Match) -> bool {
        self.distinct
            .iter()
            .all(|(a, b)| m.bindings.get(a) != m.bindings.get(b))
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |ps: &[Pattern]| ps.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        write!(
            f,
            "{}: {} => {}",
            self.name,
            join(&self.inputs),
            join(&self.outputs)
        )
    }
}

/// Builder for [`Rule`].
///
/// When no explicit name is given, the name is derived from the output link
/// types plus a suffix, e.g. `BeforeLinkTransitivityRule`.
pub struct RuleBuilder {
    name: Option<String>,
    suffix: &'static str,
    inputs: Vec<Pattern>,
    outputs: Vec<Pattern>,
    formula: Option<Arc<dyn Formula>>,
    probabilistic_inputs: bool,
    input_mode: InputMode,
    distinct: Vec<(Variable, Variable)>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            suffix: "Rule",
            inputs: Vec::new(),
            outputs: Vec::new(),
            formula: None,
            probabilistic_inputs: true,
            input_mode: InputMode::Truth,
            distinct: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Suffix for the derived name. Ignored when [`RuleBuilder::named`] is set.
    pub fn name_suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn input(mut self, pattern: Pattern) -> Self {
        self.inputs.push(pattern);
        self
    }

    pub fn output(mut self, pattern: Pattern) -> Self {
        self.outputs.push(pattern);
        self
    }

    pub fn outputs(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.outputs.extend(patterns);
        self
    }

    pub fn formula(mut self, formula: Arc<dyn Formula>) -> Self {
        self.formula = Some(formula);
        self
    }

    /// Defaults to `true`.
    pub fn probabilistic_inputs(mut self, probabilistic: bool) -> Self {
        self.probabilistic_inputs = probabilistic;
        self
    }

    pub fn input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    /// Require `a` and `b` to bind different atoms.
    pub fn distinct(mut self, a: Variable, b: Variable) -> Self {
        self.distinct.push((a, b));
        self
    }

    /// Validate and build the rule.
    pub fn build(self) -> RuleResult<Rule> {
        let name = self.name.unwrap_or_else(|| {
            let mut types: Vec<&str> = Vec::new();
            for p in &self.outputs {
                let t = p.link_type.name();
                if !types.contains(&t) {
                    types.push(t);
                }
            }
            format!("{}{}", types.concat(), self.suffix)
        });

        if self.inputs.is_empty() {
            return Err(RuleError::NoInputs { rule: name });
        }
        if self.outputs.is_empty() {
            return Err(RuleError::NoOutputs { rule: name });
        }

        let bound: BTreeSet<Variable> = self.inputs.iter().flat_map(Pattern::variables).collect();
        for output in &self.outputs {
            if let Some(v) = output.variables().into_iter().find(|v| !bound.contains(v)) {
                return Err(RuleError::UnboundOutputVariable {
                    rule: name,
                    variable: v.to_string(),
                });
            }
        }
        if let Some(v) = self
            .distinct
            .iter()
            .flat_map(|(a, b)| [*a, *b])
            .find(|v| !bound.contains(v))
        {
            return Err(RuleError::UnboundDistinctVariable {
                rule: name,
                variable: v.to_string(),
            });
        }

        Ok(Rule {
            name,
            inputs: self.inputs,
            outputs: self.outputs,
            formula: self.formula,
            probabilistic_inputs: self.probabilistic_inputs,
            input_mode: self.input_mode,
            distinct: self.distinct,
        })
    }
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable, ordered snapshot of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Accumulates rules built against one shared [`VariablePool`].
///
/// ```
/// use pln_chainer::rule::RuleSetBuilder;
/// use pln_chainer::rule::inheritance::{deduction_rule, inversion_rule};
///
/// let rules = RuleSetBuilder::new()
///     .add(inversion_rule)
///     .unwrap()
///     .add(deduction_rule)
///     .unwrap()
///     .build();
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    variables: VariablePool,
    rules: Vec<Rule>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one rule with the shared variable pool and append it.
    pub fn add<F>(mut self, build: F) -> RuleResult<Self>
    where
        F: FnOnce(&mut VariablePool) -> RuleResult<Rule>,
    {
        let rule = build(&mut self.variables)?;
        self.rules.push(rule);
        Ok(self)
    }

    /// Build several rules with the shared variable pool and append them.
    pub fn extend<F>(mut self, build: F) -> RuleResult<Self>
    where
        F: FnOnce(&mut VariablePool) -> RuleResult<Vec<Rule>>,
    {
        let rules = build(&mut self.variables)?;
        self.rules.extend(rules);
        Ok(self)
    }

    /// Freeze the accumulated rules.
    pub fn build(self) -> RuleSet {
        RuleSet {
            rules: self.rules.into(),
        }
    }
}
