//! End-to-end tests: facts in, agent and chainer steps, derived links and
//! trail out.

use std::io::Write;
use std::sync::Arc;

use pln_chainer::agent::{AgentConfig, ForwardInferenceAgent, RuleProfile, StepReport};
use pln_chainer::allen::AllenRelation;
use pln_chainer::atom::{AtomType, TruthValue};
use pln_chainer::chainer::{
    BindingSelection, Chainer, ChainerConfig, RuleSelection, TrailRetention,
};
use pln_chainer::composition::{ALLEN_TABLE, CompositionTable};
use pln_chainer::error::{PlnError, TableError};
use pln_chainer::facts::parse_facts;
use pln_chainer::formula::DeductionFormula;
use pln_chainer::graph::{AtomSpace, MemoryAtomSpace};
use pln_chainer::rule::inheritance::{deduction_rule, inversion_rule};
use pln_chainer::rule::temporal::transitivity_rule;
use pln_chainer::rule::RuleSetBuilder;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn first_applicable(profile: RuleProfile) -> AgentConfig {
    AgentConfig {
        chainer: ChainerConfig {
            rule_selection: RuleSelection::FirstApplicable,
            seed: Some(1),
            ..Default::default()
        },
        rule_profile: profile,
        ..Default::default()
    }
}

#[test]
fn temporal_agent_derives_before_from_timestamps() {
    let space = MemoryAtomSpace::new();
    parse_facts(
        r#"{"links": [
            {"type": "AtTimeLink", "outgoing": ["5", "X"], "strength": 0.9},
            {"type": "AtTimeLink", "outgoing": ["8", "Y"], "strength": 0.7}
        ]}"#,
    )
    .unwrap()
    .assert_into(&space)
    .unwrap();

    let mut agent = ForwardInferenceAgent::new(first_applicable(RuleProfile::Temporal)).unwrap();
    let report = agent.run(&space).unwrap();

    let inference = report.inference().unwrap().clone();
    assert_eq!(inference.rule, "BeforeLinkEvaluationRule");
    let x = space.add_node(AtomType::ConceptNode, "X");
    let y = space.add_node(AtomType::ConceptNode, "Y");
    let before = space.find_link(AtomType::BeforeLink, &[x, y]).unwrap();
    let tv = space.truth_value(before).unwrap();
    assert!((tv.strength - 0.63).abs() < 1e-12);
    assert_eq!(tv.count, 1.0);

    match report {
        StepReport::Fired { trail, .. } => {
            assert_eq!(trail.len(), 1);
            assert_eq!(trail[0].0, before);
            assert_eq!(trail[0].1, inference.inputs);
        }
        StepReport::NoInference { .. } => unreachable!(),
    }
}

#[test]
fn pln_rules_alternate_and_deduce() {
    let space = MemoryAtomSpace::new();
    let cat = space.add_node(AtomType::ConceptNode, "cat");
    let mammal = space.add_node(AtomType::ConceptNode, "mammal");
    let animal = space.add_node(AtomType::ConceptNode, "animal");
    let cm = space
        .add_link(AtomType::InheritanceLink, &[cat, mammal], TruthValue::new(0.9, 10.0))
        .unwrap();
    let ma = space
        .add_link(AtomType::InheritanceLink, &[mammal, animal], TruthValue::new(0.95, 20.0))
        .unwrap();

    let rules = RuleSetBuilder::new()
        .add(inversion_rule)
        .unwrap()
        .add(deduction_rule)
        .unwrap()
        .build();
    let mut chainer = Chainer::with_rule_set(
        ChainerConfig {
            rule_selection: RuleSelection::RoundRobin,
            seed: Some(9),
            ..Default::default()
        },
        &rules,
    );

    let report = chainer.run_for(&space, 2).unwrap();
    assert_eq!(report.steps, 2);
    assert_eq!(report.rule_stats.get("InversionRule"), Some(&1));
    assert_eq!(report.rule_stats.get("DeductionRule"), Some(&1));

    let ca = space
        .find_link(AtomType::InheritanceLink, &[cat, animal])
        .unwrap();
    assert_eq!(chainer.trail().get(ca), Some(&[cm, ma][..]));
    let tv = space.truth_value(ca).unwrap();
    assert_eq!(tv.count, 10.0);
    assert!(tv.strength > 0.0 && tv.strength <= 1.0);
}

#[test]
fn agent_reports_no_inference_without_facts() {
    let space = MemoryAtomSpace::new();
    let mut agent = ForwardInferenceAgent::new(first_applicable(RuleProfile::Temporal)).unwrap();
    for step in 1..=3 {
        let report = agent.run(&space).unwrap();
        assert_eq!(report.step(), step);
        assert!(report.inference().is_none());
    }
    assert!(agent.chainer().trail().is_empty());
    assert!(space.is_empty());
}

#[test]
fn table_file_round_trips_bundled_table() {
    let file = write_temp(ALLEN_TABLE);
    let loaded = CompositionTable::load(file.path()).unwrap();
    assert_eq!(loaded, CompositionTable::allen().unwrap());
}

#[test]
fn custom_table_drives_agent_rules() {
    let codes: Vec<String> = AllenRelation::COLUMN_ORDER
        .iter()
        .map(|r| r.code().to_string())
        .collect();
    let mut text = format!("\t{}\n", codes.join("\t"));
    for row in AllenRelation::COLUMN_ORDER {
        text.push(row.code());
        if row == AllenRelation::Meets {
            text.push_str("\t(p)");
            text.push_str(&"\t()".repeat(12));
        } else {
            text.push_str(&"\t()".repeat(13));
        }
        text.push('\n');
    }
    let file = write_temp(&text);

    let table = CompositionTable::load(file.path()).unwrap();
    let agent =
        ForwardInferenceAgent::with_table(first_applicable(RuleProfile::Temporal), &table).unwrap();
    let names: Vec<&str> = agent.chainer().rules().iter().map(|r| r.name()).collect();
    assert_eq!(names.len(), 16);
    assert!(names.contains(&"TemporalCompositionRule (MeetsLink).(BeforeLink) = (BeforeLink)"));
}

#[test]
fn table_missing_rows_is_rejected() {
    let partial: Vec<&str> = ALLEN_TABLE.lines().take(13).collect();
    let file = write_temp(&partial.join("\n"));
    let err = CompositionTable::load(file.path()).unwrap_err();
    assert!(matches!(err, TableError::MissingRows { ref missing } if missing == "P"));
}

#[test]
fn malformed_table_surfaces_as_table_error() {
    let file = write_temp("header\np\t(p)\n");
    let err = CompositionTable::load(file.path()).unwrap_err();
    assert!(matches!(err, TableError::ColumnCount { line: 2, .. }));
    let wrapped: PlnError = err.into();
    assert!(wrapped.is_configuration());
}

#[test]
fn agent_config_loads_from_toml() {
    let file = write_temp(
        r#"
        rule_profile = "temporal"
        focus_report_size = 3

        [chainer]
        stimulate_atoms = true
        rule_selection = "first_applicable"
        seed = 5
        "#,
    );
    let config = AgentConfig::load(file.path()).unwrap();
    assert_eq!(config.rule_profile, RuleProfile::Temporal);
    assert_eq!(config.focus_report_size, 3);
    assert!(config.chainer.stimulate_atoms);
    assert_eq!(config.chainer.rule_selection, RuleSelection::FirstApplicable);
    assert_eq!(config.chainer.seed, Some(5));
    assert_eq!(config.chainer.max_steps, 100);
}

#[test]
fn stimulated_agent_reports_focus() {
    let space = MemoryAtomSpace::new();
    parse_facts(
        r#"{"links": [
            {"type": "AtTimeLink", "outgoing": ["1", "X"], "strength": 1.0},
            {"type": "AtTimeLink", "outgoing": ["2", "Y"], "strength": 1.0}
        ]}"#,
    )
    .unwrap()
    .assert_into(&space)
    .unwrap();

    let mut config = first_applicable(RuleProfile::Temporal);
    config.chainer.stimulate_atoms = true;
    config.focus_report_size = 2;
    let mut agent = ForwardInferenceAgent::new(config).unwrap();

    match agent.run(&space).unwrap() {
        StepReport::Fired { focus, .. } => assert_eq!(focus.len(), 2),
        StepReport::NoInference { .. } => panic!("evaluation should fire"),
    }
}

#[test]
fn bounded_trail_evicts_old_derivations() {
    let space = MemoryAtomSpace::new();
    let nodes: Vec<_> = (0..6)
        .map(|i| space.add_node(AtomType::ConceptNode, &format!("n{i}")))
        .collect();
    for pair in nodes.windows(2) {
        space
            .add_link(AtomType::BeforeLink, pair, TruthValue::new(1.0, 1.0))
            .unwrap();
    }

    let mut chainer = Chainer::new(ChainerConfig {
        rule_selection: RuleSelection::FirstApplicable,
        binding_selection: BindingSelection::Random,
        trail_retention: TrailRetention::Bounded { max_entries: 2 },
        seed: Some(4),
        ..Default::default()
    });
    let rule = transitivity_rule(
        chainer.variables(),
        AtomType::BeforeLink,
        Arc::new(DeductionFormula::default()),
    )
    .unwrap();
    chainer.add_rule(rule);

    chainer.run_for(&space, 20).unwrap();
    assert!(chainer.trail().len() <= 2);
    assert!(space.atoms_of_type(AtomType::BeforeLink).len() > 5);
}
