use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use miette::Diagnostic;
use thiserror::Error;

use crate::ops::Base;
use crate::outcome::{Outcome, OutcomeClass, Symbol};

/// Anything that can be used as the outcome of a [`Distribution`].
pub trait OutcomeKey: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> OutcomeKey for T {}

/// A finite probability distribution: unique outcomes, positionally aligned with a pmf.
///
/// The pmf is stored in the representation given by [`Distribution::base`]. Construction
/// validates that outcomes are unique and that the pmf is normalized. Two crate-internal
/// paths write the pmf without validation: the fast mixing path, whose inputs are a caller
/// contract, and the simplex grid, whose points are normalized by construction and converted
/// to the template's base.
#[derive(Debug, Clone)]
pub struct Distribution<O: OutcomeKey> {
    outcomes: Vec<O>,
    pmf: Vec<f64>,
    base: Base,
    // Position of each outcome in `outcomes`.
    index: HashMap<O, usize>,
}

/// A distribution over tuples or strings of symbols.
pub type JointDistribution = Distribution<Outcome>;

/// A distribution over single symbols.
pub type ScalarDistribution = Distribution<Symbol>;

impl<O: OutcomeKey> PartialEq for Distribution<O> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.outcomes == other.outcomes && self.pmf == other.pmf
    }
}

impl<O: OutcomeKey> Distribution<O> {
    pub fn new(outcomes: Vec<O>, pmf: Vec<f64>, base: Base) -> Result<Self, ProbabilityError> {
        if outcomes.len() != pmf.len() {
            return Err(ProbabilityError::LengthMismatch {
                what: "pmf entries",
                expected: outcomes.len(),
                found: pmf.len(),
            });
        }
        let index = build_index(&outcomes)?;
        base.validate_pmf(&pmf)?;
        Ok(Self {
            outcomes,
            pmf,
            base,
            index,
        })
    }

    pub fn outcomes(&self) -> &[O] {
        &self.outcomes
    }

    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }

    /// Direct access to the pmf, skipping validation. Only used where the caller contract
    /// guarantees a valid result.
    pub(crate) fn pmf_mut(&mut self) -> &mut [f64] {
        &mut self.pmf
    }

    pub fn base(&self) -> Base {
        self.base
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn contains(&self, outcome: &O) -> bool {
        self.index.contains_key(outcome)
    }

    /// The mass of `outcome`, in this distribution's base, or `None` if it is not in the
    /// sample space.
    pub fn get(&self, outcome: &O) -> Option<f64> {
        self.index.get(outcome).map(|&i| self.pmf[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&O, f64)> {
        self.outcomes.iter().zip(self.pmf.iter().copied())
    }

    /// Replaces the pmf. The new pmf must have one entry per outcome and be valid in the
    /// current base.
    pub fn set_pmf(&mut self, pmf: Vec<f64>) -> Result<(), ProbabilityError> {
        if pmf.len() != self.outcomes.len() {
            return Err(ProbabilityError::LengthMismatch {
                what: "pmf entries",
                expected: self.outcomes.len(),
                found: pmf.len(),
            });
        }
        self.base.validate_pmf(&pmf)?;
        self.pmf = pmf;
        Ok(())
    }

    /// Returns the same distribution with its pmf expressed in `base`.
    pub fn to_base(&self, base: Base) -> Result<Self, ProbabilityError> {
        base.validate()?;
        let pmf = self
            .pmf
            .iter()
            .map(|&p| base.from_linear(self.base.to_linear(p)))
            .collect();
        Ok(Self {
            pmf,
            base,
            ..self.clone()
        })
    }

    /// Compares two distributions as mappings from outcomes to linear probabilities.
    ///
    /// Outcome order is ignored, and an outcome missing from one side counts as zero mass.
    pub fn is_approx_equal(&self, other: &Self, tolerance: f64) -> bool {
        let mass = |d: &Self, outcome: &O| d.get(outcome).map_or(0.0, |p| d.base.to_linear(p));
        self.outcomes
            .iter()
            .chain(other.outcomes.iter())
            .all(|outcome| (mass(self, outcome) - mass(other, outcome)).abs() <= tolerance)
    }
}

impl Distribution<Outcome> {
    /// Returns the length of outcomes in this distribution, or an error if the distribution
    /// is empty or has inconsistent outcome lengths.
    pub fn outcome_length(&self) -> Result<usize, ProbabilityError> {
        let first_outcome = self.outcomes.first().ok_or(ProbabilityError::NoOutcomes)?;
        for outcome in &self.outcomes {
            if outcome.len() != first_outcome.len() {
                return Err(ProbabilityError::InconsistentOutcomeSize {
                    first_outcome: first_outcome.clone(),
                    second_outcome: outcome.clone(),
                });
            }
        }
        Ok(first_outcome.len())
    }

    /// Returns the class shared by every outcome of this distribution.
    pub fn outcome_class(&self) -> Result<OutcomeClass, ProbabilityError> {
        let class = self
            .outcomes
            .first()
            .ok_or(ProbabilityError::NoOutcomes)?
            .class();
        if self.outcomes.iter().any(|outcome| outcome.class() != class) {
            return Err(ProbabilityError::MixedOutcomeClasses);
        }
        Ok(class)
    }
}

fn build_index<O: OutcomeKey>(outcomes: &[O]) -> Result<HashMap<O, usize>, ProbabilityError> {
    let mut index = HashMap::with_capacity(outcomes.len());
    for (i, outcome) in outcomes.iter().enumerate() {
        if index.insert(outcome.clone(), i).is_some() {
            return Err(ProbabilityError::DuplicateOutcome {
                outcome: format!("{:?}", outcome),
            });
        }
    }
    Ok(index)
}

#[derive(Debug, Diagnostic, Error)]
pub enum ProbabilityError {
    #[error("Empty input")]
    NoDistributions,

    #[error("This distribution has no outcomes. This is generally an error.")]
    NoOutcomes,

    #[error("A sample space must contain at least one outcome")]
    EmptySampleSpace,

    #[error("This distribution does not have a consistent outcome size")]
    InconsistentOutcomeSize {
        first_outcome: Outcome,
        second_outcome: Outcome,
    },

    #[error("This distribution mixes tuple and text outcomes")]
    MixedOutcomeClasses,

    #[error("Expected {expected} {what}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Probabilities sum to {total}, not 1")]
    InvalidNormalization { total: f64 },

    #[error("Entry {index} ({value}) is not a valid probability")]
    InvalidProbability { index: usize, value: f64 },

    #[error("Outcome {outcome} is missing from distribution {index}")]
    #[diagnostic(help("Mix with a merged sample space to treat missing outcomes as zero mass."))]
    IncompatibleOutcome { outcome: String, index: usize },

    #[error("Distribution {index} has a pmf of length {found}, expected {expected}")]
    #[diagnostic(help("The fast mixing path requires identically laid out distributions."))]
    ShapeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Distribution {index} is in base {found}, expected base {expected}")]
    BaseMismatch {
        index: usize,
        expected: Base,
        found: Base,
    },

    #[error("Expected {expected} {what}, found {found}")]
    ArityMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Outcome {outcome} appears more than once")]
    DuplicateOutcome { outcome: String },

    #[error("A partition with {classes} classes cannot be rendered with {max} symbols")]
    AlphabetExhausted { classes: usize, max: usize },

    #[error("Outcome {outcome} is not covered by the mapping")]
    MissingOutcome { outcome: Outcome },

    #[error("Symbol {symbol} cannot appear in a text outcome")]
    InvalidSymbol { symbol: Symbol },

    #[error("Cannot join a {left:?} outcome with a {right:?} outcome")]
    OutcomeClassMismatch {
        left: OutcomeClass,
        right: OutcomeClass,
    },

    #[error("Mapped value {symbol} is not an outcome fragment")]
    #[diagnostic(help("Build the mapping with `force` to wrap bare symbols."))]
    InvalidFragment { symbol: Symbol },

    #[error("Inserting a random variable at position {index} is not supported")]
    #[diagnostic(help("New random variables can only be appended."))]
    UnsupportedInsertIndex { index: usize },

    #[error("Index {index} is out of range for outcomes of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    #[error("'{digit}' is not a hexadecimal digit")]
    InvalidHexDigit { digit: char },

    #[error("Concentration parameter {index} ({value}) must be finite and positive")]
    InvalidConcentration { index: usize, value: f64 },

    #[error("Every gamma variate of the Dirichlet draw was zero")]
    #[diagnostic(help("Very small concentration parameters can underflow; try larger ones."))]
    DegenerateSample,

    #[error("A grid with {base}^{depth} subdivisions cannot be enumerated")]
    #[diagnostic(help("The number of subdivisions must be positive and fit in a usize."))]
    InvalidGrid { base: usize, depth: u32 },

    #[error("{base} is not a valid logarithm base")]
    #[diagnostic(help("A log base must be finite, positive and different from 1."))]
    InvalidBase { base: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coin() -> JointDistribution {
        Distribution::new(
            vec![Outcome::text("H"), Outcome::text("T")],
            vec![0.25, 0.75],
            Base::Linear,
        )
        .unwrap()
    }

    #[test]
    fn test_new_and_lookup() {
        let d = coin();
        assert_eq!(d.len(), 2);
        assert!(d.contains(&Outcome::text("H")));
        assert_eq!(d.get(&Outcome::text("T")), Some(0.75));
        assert_eq!(d.get(&Outcome::text("X")), None);
        assert_eq!(
            d.iter().collect::<Vec<_>>(),
            vec![(&Outcome::text("H"), 0.25), (&Outcome::text("T"), 0.75)]
        );
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = Distribution::new(
            vec![Outcome::text("H"), Outcome::text("H")],
            vec![0.5, 0.5],
            Base::Linear,
        );
        assert!(matches!(
            result,
            Err(ProbabilityError::DuplicateOutcome { .. })
        ));
    }

    #[test]
    fn test_new_rejects_bad_pmf() {
        assert!(matches!(
            Distribution::new(vec![1, 2], vec![0.5], Base::Linear),
            Err(ProbabilityError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Distribution::new(vec![1, 2], vec![0.5, 0.6], Base::Linear),
            Err(ProbabilityError::InvalidNormalization { .. })
        ));
    }

    #[test]
    fn test_set_pmf() {
        let mut d = coin();
        d.set_pmf(vec![0.5, 0.5]).unwrap();
        assert_eq!(d.pmf(), &[0.5, 0.5]);
        assert!(d.set_pmf(vec![1.0]).is_err());
        assert!(d.set_pmf(vec![0.9, 0.9]).is_err());
        assert_eq!(d.pmf(), &[0.5, 0.5]);
    }

    #[test]
    fn test_to_base_round_trip() {
        let d = coin();
        let logged = d.to_base(Base::log2()).unwrap();
        assert_relative_eq!(logged.pmf()[0], -2.0);
        assert_eq!(logged.base(), Base::log2());
        let back = logged.to_base(Base::Linear).unwrap();
        assert!(back.is_approx_equal(&d, 1e-12));
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(matches!(
            coin().to_base(Base::Log(1.0)),
            Err(ProbabilityError::InvalidBase { .. })
        ));
        assert!(matches!(
            Distribution::new(vec![Outcome::text("H")], vec![0.0], Base::Log(-2.0)),
            Err(ProbabilityError::InvalidBase { .. })
        ));
    }

    #[test]
    fn test_is_approx_equal_ignores_order_and_zeros() {
        let d = coin();
        let reordered = Distribution::new(
            vec![Outcome::text("T"), Outcome::text("X"), Outcome::text("H")],
            vec![0.75, 0.0, 0.25],
            Base::Linear,
        )
        .unwrap();
        assert!(d.is_approx_equal(&reordered, 1e-12));

        let fair = Distribution::new(
            vec![Outcome::text("H"), Outcome::text("T")],
            vec![0.5, 0.5],
            Base::Linear,
        )
        .unwrap();
        assert!(!d.is_approx_equal(&fair, 1e-12));
    }

    #[test]
    fn test_outcome_length() {
        let d = Distribution::new(
            vec![Outcome::ints(&[0, 1]), Outcome::ints(&[1, 0])],
            vec![0.5, 0.5],
            Base::Linear,
        )
        .unwrap();
        assert_eq!(d.outcome_length().unwrap(), 2);
        assert_eq!(d.outcome_class().unwrap(), OutcomeClass::Tuple);
    }

    #[test]
    fn test_outcome_length_inconsistent() {
        let d = Distribution::new(
            vec![Outcome::ints(&[0, 1]), Outcome::ints(&[1])],
            vec![0.5, 0.5],
            Base::Linear,
        )
        .unwrap();
        assert!(matches!(
            d.outcome_length(),
            Err(ProbabilityError::InconsistentOutcomeSize { .. })
        ));
    }

    #[test]
    fn test_outcome_class_mixed() {
        let d = Distribution::new(
            vec![Outcome::ints(&[0]), Outcome::text("1")],
            vec![0.5, 0.5],
            Base::Linear,
        )
        .unwrap();
        assert!(matches!(
            d.outcome_class(),
            Err(ProbabilityError::MixedOutcomeClasses)
        ));
    }
}
