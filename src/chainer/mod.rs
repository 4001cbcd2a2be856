//! Forward chainer: one rule application per step, with a provenance trail.
//!
//! Each [`Chainer::forward_step`] is a complete attempt. It matches every rule
//! against the current graph, picks an applicable rule and one of its matches,
//! computes the derived truth value, asserts the outputs through the
//! [`AtomSpace`], and records which atoms licensed them. Nothing carries over
//! between steps except the rule set and the trail; the next step
//! rediscovers all relevant facts from scratch.
//!
//! A step that finds nothing to fire returns [`StepOutcome::Inapplicable`].
//! That is a normal result, not an error.

pub mod config;
pub mod trail;

pub use config::{BindingSelection, ChainerConfig, RuleSelection};
pub use trail::{Trail, TrailRetention};

use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::atom::{AtomId, TruthValue};
use crate::error::{GraphError, PlnError, PlnResult};
use crate::formula::{FormulaError, FormulaInput, TemporalDistribution};
use crate::graph::{AtomSpace, GraphResult};
use crate::pattern::{BacktrackingMatcher, Match, PatternMatcher, VariablePool};
use crate::rule::{InputMode, Rule, RuleSet};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A rule application that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub rule: String,
    /// Output links, in the rule's output order.
    pub outputs: Vec<AtomId>,
    /// Atoms that licensed the outputs.
    pub inputs: Vec<AtomId>,
    /// Truth attached to every output. `None` for structural rules.
    pub truth: Option<TruthValue>,
}

/// Result of one forward step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Fired(Inference),
    /// No rule had a usable match this step.
    Inapplicable,
}

impl StepOutcome {
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    pub fn inference(&self) -> Option<&Inference> {
        match self {
            Self::Fired(inference) => Some(inference),
            Self::Inapplicable => None,
        }
    }
}

/// Result of a multi-step run.
#[derive(Debug, Clone, Default)]
pub struct ChainReport {
    pub inferences: Vec<Inference>,
    /// Steps attempted, including a final inapplicable one.
    pub steps: usize,
    /// Whether the run stopped because a step found nothing to fire.
    pub exhausted: bool,
    /// Per-rule firing counts.
    pub rule_stats: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Chainer
// ---------------------------------------------------------------------------

/// Forward-chaining engine.
pub struct Chainer {
    config: ChainerConfig,
    rules: Vec<Rule>,
    variables: VariablePool,
    matcher: Box<dyn PatternMatcher>,
    trail: Trail,
    rng: StdRng,
    /// Round-robin cursor: index of the rule after the last one fired.
    next_rule: usize,
}

impl Chainer {
    pub fn new(config: ChainerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            trail: Trail::new(config.trail_retention),
            config,
            rules: Vec::new(),
            variables: VariablePool::new(),
            matcher: Box::new(BacktrackingMatcher::new()),
            rng,
            next_rule: 0,
        }
    }

    /// Create a chainer preloaded with a rule set snapshot.
    pub fn with_rule_set(config: ChainerConfig, rules: &RuleSet) -> Self {
        let mut chainer = Self::new(config);
        chainer.add_rules(rules.rules().iter().cloned());
        chainer
    }

    /// Replace the pattern-matching collaborator.
    pub fn with_matcher(mut self, matcher: impl PatternMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Variable pool for building rules against this chainer.
    pub fn variables(&mut self) -> &mut VariablePool {
        &mut self.variables
    }

    pub fn add_rule(&mut self, rule: Rule) {
        tracing::debug!(rule = %rule.name(), "registered rule");
        self.rules.push(rule);
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn config(&self) -> &ChainerConfig {
        &self.config
    }

    /// Attempt one rule application.
    ///
    /// A rule whose formula rejects its inputs is skipped and another
    /// applicable rule is tried, at most once per registered rule.
    pub fn forward_step(&mut self, space: &dyn AtomSpace) -> PlnResult<StepOutcome> {
        let mut candidates: Vec<(usize, Vec<Match>)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let matches: Vec<Match> = self
                    .matcher
                    .find_matches(space, rule.inputs())
                    .into_iter()
                    .filter(|m| rule.admits(m))
                    .collect();
                (!matches.is_empty()).then_some((index, matches))
            })
            .collect();

        for _ in 0..self.rules.len() {
            let Some(pick) = self.select_rule(&candidates) else {
                break;
            };
            let (rule_index, matches) = candidates.remove(pick);
            match self.fire(rule_index, &matches, space) {
                Ok(inference) => {
                    self.next_rule = rule_index + 1;
                    return Ok(StepOutcome::Fired(inference));
                }
                Err(PlnError::Formula(e)) => {
                    tracing::warn!(
                        rule = %self.rules[rule_index].name(),
                        error = %e,
                        "formula rejected inputs, trying another rule"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(rules = self.rules.len(), "no applicable rule this step");
        Ok(StepOutcome::Inapplicable)
    }

    /// Step up to `config.max_steps` times, stopping at the first inapplicable step.
    pub fn run(&mut self, space: &dyn AtomSpace) -> PlnResult<ChainReport> {
        self.run_for(space, self.config.max_steps)
    }

    /// Step up to `max_steps` times, stopping at the first inapplicable step.
    pub fn run_for(&mut self, space: &dyn AtomSpace, max_steps: usize) -> PlnResult<ChainReport> {
        let mut report = ChainReport::default();
        for _ in 0..max_steps {
            report.steps += 1;
            match self.forward_step(space)? {
                StepOutcome::Fired(inference) => {
                    *report.rule_stats.entry(inference.rule.clone()).or_insert(0) += 1;
                    report.inferences.push(inference);
                }
                StepOutcome::Inapplicable => {
                    report.exhausted = true;
                    break;
                }
            }
        }
        Ok(report)
    }

    fn select_rule(&mut self, candidates: &[(usize, Vec<Match>)]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(match self.config.rule_selection {
            RuleSelection::Uniform => self.rng.gen_range(0..candidates.len()),
            RuleSelection::FirstApplicable => 0,
            RuleSelection::RoundRobin => candidates
                .iter()
                .position(|(index, _)| *index >= self.next_rule)
                .unwrap_or(0),
        })
    }

    fn fire(
        &mut self,
        rule_index: usize,
        matches: &[Match],
        space: &dyn AtomSpace,
    ) -> PlnResult<Inference> {
        let rule = &self.rules[rule_index];
        let chosen = choose_match(
            matches,
            space,
            self.config.binding_selection,
            &mut self.rng,
        )?;

        let (inputs, formula_inputs, tuples) = match rule.input_mode() {
            InputMode::Truth => {
                let truths = chosen
                    .groundings
                    .iter()
                    .map(|&id| input_truth(rule, space, id).map(FormulaInput::Truth))
                    .collect::<GraphResult<Vec<_>>>()?;
                (chosen.groundings.clone(), truths, None)
            }
            InputMode::TemporalDistribution => {
                let (inputs, dists, tuples) = temporal_inputs(rule, chosen, matches, space)?;
                (inputs, dists, Some(tuples))
            }
        };

        // Computed before any output is asserted so a rejected formula leaves
        // the graph untouched.
        let truth = match rule.formula() {
            Some(formula) => {
                let tv = formula.apply(&formula_inputs)?;
                Some(match tuples {
                    Some(n) => tv.with_count(n as f64),
                    None => tv,
                })
            }
            None => None,
        };

        let mut outputs = Vec::with_capacity(rule.outputs().len());
        for pattern in rule.outputs() {
            let link = pattern.instantiate(space, &chosen.bindings)?;
            if let Some(tv) = truth {
                space.set_truth_value(link, tv)?;
            }
            outputs.push(link);
        }

        if self.config.stimulate_atoms {
            for &id in inputs.iter().chain(&outputs) {
                space.stimulate(id, self.config.stimulus);
            }
        }

        for &link in &outputs {
            for evicted in self.trail.record(link, inputs.clone()) {
                tracing::debug!(link = %evicted, "evicted trail entry");
            }
        }

        tracing::info!(
            rule = %rule.name(),
            outputs = outputs.len(),
            inputs = inputs.len(),
            "rule fired"
        );

        Ok(Inference {
            rule: rule.name().to_string(),
            outputs,
            inputs,
            truth,
        })
    }
}

/// Product of the input strengths of a match.
fn match_weight(m: &Match, space: &dyn AtomSpace) -> GraphResult<f64> {
    m.groundings.iter().try_fold(1.0, |acc, &id| {
        space.truth_value(id).map(|tv| acc * tv.strength)
    })
}

fn choose_match<'m>(
    matches: &'m [Match],
    space: &dyn AtomSpace,
    policy: BindingSelection,
    rng: &mut StdRng,
) -> PlnResult<&'m Match> {
    let index = match policy {
        BindingSelection::First => 0,
        BindingSelection::Random => rng.gen_range(0..matches.len()),
        BindingSelection::HighestTruth => {
            let mut best = (0, f64::NEG_INFINITY);
            for (index, m) in matches.iter().enumerate() {
                let weight = match_weight(m, space)?;
                if weight > best.1 {
                    best = (index, weight);
                }
            }
            best.0
        }
        BindingSelection::Weighted => {
            let weights = matches
                .iter()
                .map(|m| match_weight(m, space))
                .collect::<GraphResult<Vec<f64>>>()?;
            WeightedIndex::new(&weights)
                .map(|dist| dist.sample(rng))
                .unwrap_or(0)
        }
    };
    Ok(&matches[index])
}

/// Truth of one input as the formula sees it: its own value, or certain
/// (strength 1, same count) when the rule does not weight its inputs.
fn input_truth(rule: &Rule, space: &dyn AtomSpace, id: AtomId) -> GraphResult<TruthValue> {
    let tv = space.truth_value(id)?;
    Ok(if rule.probabilistic_inputs() {
        tv
    } else {
        TruthValue::new(1.0, tv.count)
    })
}

/// Aggregate every match that agrees with `chosen` on the output variables
/// into one time distribution per input pattern.
///
/// Returns the distinct input atoms, the distributions, and the number of
/// matched tuples.
fn temporal_inputs(
    rule: &Rule,
    chosen: &Match,
    matches: &[Match],
    space: &dyn AtomSpace,
) -> PlnResult<(Vec<AtomId>, Vec<FormulaInput>, usize)> {
    let keys = rule.output_variables();
    let group: Vec<&Match> = matches
        .iter()
        .filter(|m| keys.iter().all(|v| m.bindings.get(v) == chosen.bindings.get(v)))
        .collect();

    let mut dists = vec![TemporalDistribution::new(); rule.inputs().len()];
    let mut inputs = Vec::new();
    for m in &group {
        for (dist, &link) in dists.iter_mut().zip(&m.groundings) {
            let atom = space.get(link).ok_or(GraphError::UnknownAtom {
                atom_id: link.get(),
            })?;
            let name = atom
                .outgoing
                .first()
                .and_then(|&t| space.get(t))
                .and_then(|t| t.name)
                .unwrap_or_default();
            let time: i64 = name
                .trim()
                .parse()
                .map_err(|_| FormulaError::InvalidTime { name: name.clone() })?;
            let membership = if rule.probabilistic_inputs() {
                atom.truth.strength
            } else {
                1.0
            };
            dist.insert(time, membership);
            if !inputs.contains(&link) {
                inputs.push(link);
            }
        }
    }

    Ok((
        inputs,
        dists.into_iter().map(FormulaInput::Distribution).collect(),
        group.len(),
    ))
}
