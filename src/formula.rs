//! Truth-value formulas.
//!
//! A formula is a pure function from the truth of a rule's inputs to the truth
//! of its outputs. Rules hold formulas as `Arc<dyn Formula>` so any
//! implementation can be plugged in. The formulas bundled here are simple,
//! deterministic placeholders; none of them is calibrated.

use std::collections::BTreeMap;
use std::fmt::Debug;

use miette::Diagnostic;
use thiserror::Error;

use crate::allen::AllenRelation;
use crate::atom::TruthValue;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised when a formula is handed inputs it cannot combine.
///
/// The chainer treats these as "this rule does not apply this step" and
/// retries with another rule.
#[derive(Debug, Error, Diagnostic)]
pub enum FormulaError {
    #[error("formula {formula} expects {expected} inputs, got {found}")]
    #[diagnostic(
        code(pln::formula::arity),
        help("The rule's input pattern count must match the formula's arity.")
    )]
    Arity {
        formula: String,
        expected: usize,
        found: usize,
    },

    #[error("formula {formula} expects {expected} inputs")]
    #[diagnostic(
        code(pln::formula::unsupported_input),
        help(
            "Truth-value formulas take plain truth values; temporal formulas take \
             time distributions. Check the rule's input mode."
        )
    )]
    UnsupportedInput { formula: String, expected: String },

    #[error("formula {formula} received an empty time distribution")]
    #[diagnostic(
        code(pln::formula::empty_distribution),
        help("Each entity needs at least one AtTimeLink before it can be compared.")
    )]
    EmptyDistribution { formula: String },

    #[error("time node \"{name}\" is not an integer timestamp")]
    #[diagnostic(
        code(pln::formula::invalid_time),
        help("The first member of an AtTimeLink must be a node named by an integer.")
    )]
    InvalidTime { name: String },
}

/// Result type for formula application.
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Timestamp → fuzzy membership of an entity at that time.
pub type TemporalDistribution = BTreeMap<i64, f64>;

/// One formula argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaInput {
    Truth(TruthValue),
    Distribution(TemporalDistribution),
}

/// A pluggable truth-value formula.
pub trait Formula: Send + Sync + Debug {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Combine the inputs into one truth value. Must be deterministic.
    fn apply(&self, inputs: &[FormulaInput]) -> FormulaResult<TruthValue>;
}

fn truths<const N: usize>(formula: &str, inputs: &[FormulaInput]) -> FormulaResult<[TruthValue; N]> {
    if inputs.len() != N {
        return Err(FormulaError::Arity {
            formula: formula.to_string(),
            expected: N,
            found: inputs.len(),
        });
    }
    let mut out = [TruthValue::DEFAULT; N];
    for (slot, input) in out.iter_mut().zip(inputs) {
        match input {
            FormulaInput::Truth(tv) => *slot = *tv,
            FormulaInput::Distribution(_) => {
                return Err(FormulaError::UnsupportedInput {
                    formula: formula.to_string(),
                    expected: "truth-value".into(),
                });
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Bundled formulas
// ---------------------------------------------------------------------------

/// Independence-based deduction: from A→B and B→C estimate A→C.
///
/// `s_ac = s_ab·s_bc + (1 − s_ab)(p_c − p_b·s_bc)/(1 − p_b)`, with both term
/// probabilities fixed to `term_probability` since the rule only sees link
/// truth values. The count is the weaker of the two input counts.
/// Used for temporal transitivity too, where it is knowingly the wrong formula.
#[derive(Debug, Clone)]
pub struct DeductionFormula {
    pub term_probability: f64,
}

impl Default for DeductionFormula {
    fn default() -> Self {
        Self {
            term_probability: 0.5,
        }
    }
}

impl Formula for DeductionFormula {
    fn name(&self) -> &str {
        "deduction"
    }

    fn apply(&self, inputs: &[FormulaInput]) -> FormulaResult<TruthValue> {
        let [ab, bc] = truths::<2>(self.name(), inputs)?;
        let p = self.term_probability.clamp(0.0, 0.999_999);
        let strength = ab.strength * bc.strength
            + (1.0 - ab.strength) * (p - p * bc.strength) / (1.0 - p);
        Ok(TruthValue::new(strength, ab.count.min(bc.count)))
    }
}

/// Bayes inversion: from A→B estimate B→A as `s_ab · p_a / p_b`.
#[derive(Debug, Clone)]
pub struct InversionFormula {
    pub source_probability: f64,
    pub target_probability: f64,
}

impl Default for InversionFormula {
    fn default() -> Self {
        Self {
            source_probability: 0.5,
            target_probability: 0.5,
        }
    }
}

impl Formula for InversionFormula {
    fn name(&self) -> &str {
        "inversion"
    }

    fn apply(&self, inputs: &[FormulaInput]) -> FormulaResult<TruthValue> {
        let [ab] = truths::<1>(self.name(), inputs)?;
        let ratio = if self.target_probability > 0.0 {
            self.source_probability / self.target_probability
        } else {
            1.0
        };
        Ok(TruthValue::new(ab.strength * ratio, ab.count))
    }
}

/// Passes the single input through unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityFormula;

impl Formula for IdentityFormula {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&self, inputs: &[FormulaInput]) -> FormulaResult<TruthValue> {
        let [tv] = truths::<1>(self.name(), inputs)?;
        Ok(tv)
    }
}

/// Evaluates one Allen relation between two time distributions.
///
/// Each distribution is read as a crisp interval spanning its earliest and
/// latest timestamps, with membership equal to its mean value. Strength is the
/// product of both memberships when the intervals stand in `relation`, zero
/// otherwise. The returned count is 1; the chainer replaces it with the number
/// of observations aggregated.
#[derive(Debug, Clone)]
pub struct IntervalFormula {
    pub relation: AllenRelation,
    name: String,
}

impl IntervalFormula {
    pub fn new(relation: AllenRelation) -> Self {
        Self {
            relation,
            name: format!("{}-interval", relation.link_type()),
        }
    }

    fn interval(&self, dist: &TemporalDistribution) -> FormulaResult<((i64, i64), f64)> {
        let (Some((&start, _)), Some((&end, _))) = (dist.first_key_value(), dist.last_key_value())
        else {
            return Err(FormulaError::EmptyDistribution {
                formula: self.name.clone(),
            });
        };
        let membership = dist.values().sum::<f64>() / dist.len() as f64;
        Ok(((start, end), membership))
    }
}

impl Formula for IntervalFormula {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, inputs: &[FormulaInput]) -> FormulaResult<TruthValue> {
        let (first, second) = match inputs {
            [FormulaInput::Distribution(a), FormulaInput::Distribution(b)] => (a, b),
            [_, _] => {
                return Err(FormulaError::UnsupportedInput {
                    formula: self.name.clone(),
                    expected: "time-distribution".into(),
                });
            }
            _ => {
                return Err(FormulaError::Arity {
                    formula: self.name.clone(),
                    expected: 2,
                    found: inputs.len(),
                });
            }
        };

        let (x, mx) = self.interval(first)?;
        let (y, my) = self.interval(second)?;
        let strength = if AllenRelation::between(x, y) == self.relation {
            mx * my
        } else {
            0.0
        };
        Ok(TruthValue::new(strength, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(s: f64, n: f64) -> FormulaInput {
        FormulaInput::Truth(TruthValue::new(s, n))
    }

    fn dist(points: &[(i64, f64)]) -> FormulaInput {
        FormulaInput::Distribution(points.iter().copied().collect())
    }

    #[test]
    fn deduction_is_deterministic() {
        let f = DeductionFormula::default();
        let inputs = [tv(0.8, 4.0), tv(0.9, 2.0)];
        let first = f.apply(&inputs).unwrap();
        let second = f.apply(&inputs).unwrap();
        assert_eq!(first.strength.to_bits(), second.strength.to_bits());
        // 0.8·0.9 + 0.2·0.1 = 0.74
        assert!((first.strength - 0.74).abs() < 1e-12);
        assert_eq!(first.count, 2.0);
    }

    #[test]
    fn deduction_rejects_wrong_arity() {
        let f = DeductionFormula::default();
        assert!(matches!(
            f.apply(&[tv(0.5, 1.0)]),
            Err(FormulaError::Arity {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn truth_formulas_reject_distributions() {
        let f = IdentityFormula;
        assert!(matches!(
            f.apply(&[dist(&[(1, 1.0)])]),
            Err(FormulaError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn inversion_scales_by_term_ratio() {
        let f = InversionFormula {
            source_probability: 0.2,
            target_probability: 0.4,
        };
        let out = f.apply(&[tv(0.8, 3.0)]).unwrap();
        assert!((out.strength - 0.4).abs() < 1e-12);
        assert_eq!(out.count, 3.0);
    }

    #[test]
    fn interval_before_multiplies_memberships() {
        let f = IntervalFormula::new(AllenRelation::Before);
        let out = f.apply(&[dist(&[(5, 0.9)]), dist(&[(8, 0.7)])]).unwrap();
        assert!((out.strength - 0.63).abs() < 1e-12);
    }

    #[test]
    fn interval_mismatch_is_zero() {
        let f = IntervalFormula::new(AllenRelation::After);
        let out = f.apply(&[dist(&[(5, 0.9)]), dist(&[(8, 0.7)])]).unwrap();
        assert_eq!(out.strength, 0.0);
    }

    #[test]
    fn interval_spans_distribution_support() {
        let f = IntervalFormula::new(AllenRelation::Overlaps);
        let out = f
            .apply(&[dist(&[(0, 1.0), (10, 0.5)]), dist(&[(5, 1.0), (15, 1.0)])])
            .unwrap();
        assert!((out.strength - 0.75).abs() < 1e-12);
    }

    #[test]
    fn interval_rejects_truth_inputs_and_empty_distributions() {
        let f = IntervalFormula::new(AllenRelation::Before);
        assert!(matches!(
            f.apply(&[tv(1.0, 1.0), tv(1.0, 1.0)]),
            Err(FormulaError::UnsupportedInput { .. })
        ));
        assert!(matches!(
            f.apply(&[dist(&[]), dist(&[(1, 1.0)])]),
            Err(FormulaError::EmptyDistribution { .. })
        ));
        assert!(matches!(
            f.apply(&[dist(&[(1, 1.0)])]),
            Err(FormulaError::Arity { .. })
        ));
    }
}
