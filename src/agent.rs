//! Forward inference agent: registers a rule profile and runs one forward
//! step per cycle, reporting what it concluded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atom::AtomId;
use crate::chainer::{Chainer, ChainerConfig, Inference, StepOutcome};
use crate::composition::{CompositionTable, create_composition_rules};
use crate::error::{ConfigError, ConfigResult, PlnResult};
use crate::graph::{AtomSpace, describe};
use crate::rule::inheritance::{deduction_rule, inversion_rule};
use crate::rule::temporal::{create_temporal_rules, predictive_attraction_rule};

/// Which rule family the agent registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleProfile {
    /// Inversion and deduction over inheritance.
    #[default]
    Pln,
    /// Temporal evaluation, transitivity, Allen composition and predictive
    /// attraction.
    Temporal,
}

/// Agent configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub chainer: ChainerConfig,
    pub rule_profile: RuleProfile,
    /// Atoms listed from the attentional focus per report (default: 10).
    pub focus_report_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chainer: ChainerConfig::default(),
            rule_profile: RuleProfile::Pln,
            focus_report_size: 10,
        }
    }
}

impl AgentConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// What one agent cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepReport {
    Fired {
        step: usize,
        inference: Inference,
        /// Full trail snapshot, least recent first.
        trail: Vec<(AtomId, Vec<AtomId>)>,
        focus: Vec<AtomId>,
    },
    NoInference {
        step: usize,
        focus: Vec<AtomId>,
    },
}

impl StepReport {
    pub fn step(&self) -> usize {
        match self {
            Self::Fired { step, .. } | Self::NoInference { step, .. } => *step,
        }
    }

    pub fn inference(&self) -> Option<&Inference> {
        match self {
            Self::Fired { inference, .. } => Some(inference),
            Self::NoInference { .. } => None,
        }
    }

    /// Human-readable rendering against the graph the step ran on.
    pub fn render(&self, space: &dyn AtomSpace) -> String {
        let mut out = String::new();
        let focus = match self {
            Self::Fired {
                step,
                inference,
                trail,
                focus,
            } => {
                out.push_str(&format!("step {step}: {}\n", inference.rule));
                for &output in &inference.outputs {
                    match inference.truth {
                        Some(tv) => out.push_str(&format!("  => {} {tv}\n", describe(space, output))),
                        None => out.push_str(&format!("  => {}\n", describe(space, output))),
                    }
                }
                out.push_str("trail:\n");
                for (link, inputs) in trail {
                    let inputs: Vec<String> = inputs.iter().map(|&i| describe(space, i)).collect();
                    out.push_str(&format!("  {} <= {}\n", describe(space, *link), inputs.join(", ")));
                }
                focus
            }
            Self::NoInference { step, focus } => {
                out.push_str(&format!("step {step}: no inference\n"));
                focus
            }
        };
        if !focus.is_empty() {
            out.push_str("attentional focus:\n");
            for &id in focus {
                out.push_str(&format!("  {}\n", describe(space, id)));
            }
        }
        out
    }
}

/// Periodic forward-chaining agent.
pub struct ForwardInferenceAgent {
    config: AgentConfig,
    chainer: Chainer,
    steps: usize,
}

impl ForwardInferenceAgent {
    /// Build an agent, using the bundled composition table for the temporal
    /// profile.
    pub fn new(config: AgentConfig) -> PlnResult<Self> {
        match config.rule_profile {
            RuleProfile::Pln => Self::build(config, None),
            RuleProfile::Temporal => {
                let table = CompositionTable::allen()?;
                Self::build(config, Some(&table))
            }
        }
    }

    /// Build an agent with an explicit composition table.
    pub fn with_table(config: AgentConfig, table: &CompositionTable) -> PlnResult<Self> {
        Self::build(config, Some(table))
    }

    fn build(config: AgentConfig, table: Option<&CompositionTable>) -> PlnResult<Self> {
        let mut chainer = Chainer::new(config.chainer.clone());
        match config.rule_profile {
            RuleProfile::Pln => {
                let inversion = inversion_rule(chainer.variables())?;
                let deduction = deduction_rule(chainer.variables())?;
                chainer.add_rules([inversion, deduction]);
            }
            RuleProfile::Temporal => {
                let temporal = create_temporal_rules(chainer.variables())?;
                chainer.add_rules(temporal);
                if let Some(table) = table {
                    let composition = create_composition_rules(chainer.variables(), table)?;
                    chainer.add_rules(composition);
                }
                let predictive = predictive_attraction_rule(chainer.variables())?;
                chainer.add_rule(predictive);
            }
        }

        tracing::info!(
            profile = ?config.rule_profile,
            rules = chainer.rules().len(),
            "forward inference agent ready"
        );
        Ok(Self {
            config,
            chainer,
            steps: 0,
        })
    }

    pub fn chainer(&self) -> &Chainer {
        &self.chainer
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Cycles run so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run one forward step and report the result.
    pub fn run(&mut self, space: &dyn AtomSpace) -> PlnResult<StepReport> {
        self.steps += 1;
        let step = self.steps;
        let outcome = self.chainer.forward_step(space)?;
        let focus = space.attentional_focus(self.config.focus_report_size);

        Ok(match outcome {
            StepOutcome::Fired(inference) => {
                for &output in &inference.outputs {
                    tracing::info!(step, rule = %inference.rule, conclusion = %describe(space, output), "inference");
                }
                let trail = self
                    .chainer
                    .trail()
                    .iter()
                    .map(|(link, inputs)| (link, inputs.to_vec()))
                    .collect();
                StepReport::Fired {
                    step,
                    inference,
                    trail,
                    focus,
                }
            }
            StepOutcome::Inapplicable => {
                tracing::info!(step, "no inference");
                StepReport::NoInference { step, focus }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{AtomType, TruthValue};
    use crate::chainer::RuleSelection;
    use crate::graph::MemoryAtomSpace;

    fn seeded(profile: RuleProfile) -> AgentConfig {
        AgentConfig {
            chainer: ChainerConfig {
                seed: Some(3),
                ..Default::default()
            },
            rule_profile: profile,
            ..Default::default()
        }
    }

    #[test]
    fn pln_profile_registers_inversion_then_deduction() {
        let agent = ForwardInferenceAgent::new(seeded(RuleProfile::Pln)).unwrap();
        let names: Vec<&str> = agent.chainer().rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["InversionRule", "DeductionRule"]);
    }

    #[test]
    fn temporal_profile_registers_every_family() {
        let agent = ForwardInferenceAgent::new(seeded(RuleProfile::Temporal)).unwrap();
        // 14 temporal rules, 169 composition rules, predictive attraction.
        assert_eq!(agent.chainer().rules().len(), 184);
    }

    #[test]
    fn empty_graph_reports_no_inference() {
        let space = MemoryAtomSpace::new();
        let mut agent = ForwardInferenceAgent::new(seeded(RuleProfile::Pln)).unwrap();
        let report = agent.run(&space).unwrap();
        assert_eq!(report, StepReport::NoInference { step: 1, focus: vec![] });
        assert_eq!(report.render(&space), "step 1: no inference\n");
    }

    #[test]
    fn inversion_fires_and_renders() {
        let space = MemoryAtomSpace::new();
        let cat = space.add_node(AtomType::ConceptNode, "cat");
        let animal = space.add_node(AtomType::ConceptNode, "animal");
        space
            .add_link(AtomType::InheritanceLink, &[cat, animal], TruthValue::new(0.9, 10.0))
            .unwrap();

        let mut config = seeded(RuleProfile::Pln);
        config.chainer.rule_selection = RuleSelection::FirstApplicable;
        let mut agent = ForwardInferenceAgent::new(config).unwrap();
        let report = agent.run(&space).unwrap();

        let inference = report.inference().unwrap();
        assert_eq!(inference.rule, "InversionRule");
        let rendered = report.render(&space);
        assert!(rendered.starts_with("step 1: InversionRule\n"));
        assert!(rendered.contains(
            "=> (InheritanceLink (ConceptNode \"animal\") (ConceptNode \"cat\")) <0.9000, 10.00>"
        ));
        assert!(rendered.contains("trail:\n"));
        assert_eq!(agent.steps(), 1);
    }
}
