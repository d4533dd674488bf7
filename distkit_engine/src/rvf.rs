//! Random-variable functions: new coordinates derived deterministically from existing outcomes.
//!
//! A random-variable function maps an outcome to an outcome fragment of the same class.
//! [`insert_rvf`] appends the fragments of one or more functions to every outcome, which
//! adds random variables to a joint distribution without changing its pmf.

use std::collections::{HashMap, HashSet};

use crate::outcome::{Outcome, OutcomeClass, Symbol, MAX_INT_SYMBOLS};
use crate::probability::{Distribution, JointDistribution, OutcomeKey, ProbabilityError};

/// Symbols used to render partition classes of text outcomes.
const PARTITION_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A deterministic function from an outcome to an outcome fragment.
pub trait RvFunction {
    fn apply(&self, outcome: &Outcome) -> Result<Outcome, ProbabilityError>;
}

impl<F> RvFunction for F
where
    F: Fn(&Outcome) -> Result<Outcome, ProbabilityError>,
{
    fn apply(&self, outcome: &Outcome) -> Result<Outcome, ProbabilityError> {
        self(outcome)
    }
}

/// A relabeling of outcomes, used by [`modify_outcomes`].
pub trait OutcomeMap<O, P> {
    fn map_outcome(&self, outcome: &O) -> P;
}

impl<O, P, F> OutcomeMap<O, P> for F
where
    F: Fn(&O) -> P,
{
    fn map_outcome(&self, outcome: &O) -> P {
        self(outcome)
    }
}

/// Returns `dist` with every outcome replaced by `transform(outcome)`.
///
/// The pmf and base are unchanged. `transform` must be injective on the outcomes of `dist`;
/// if two outcomes collide the result fails with [`ProbabilityError::DuplicateOutcome`].
pub fn modify_outcomes<O, P, F>(
    dist: &Distribution<O>,
    transform: &F,
) -> Result<Distribution<P>, ProbabilityError>
where
    O: OutcomeKey,
    P: OutcomeKey,
    F: OutcomeMap<O, P> + ?Sized,
{
    let outcomes = dist
        .outcomes()
        .iter()
        .map(|outcome| transform.map_outcome(outcome))
        .collect();
    Distribution::new(outcomes, dist.pmf().to_vec(), dist.base())
}

/// Where [`insert_rvf_at`] places the new random variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    End,
    Position(usize),
}

/// Appends the outputs of `funcs`, in order, to every outcome of `dist`.
///
/// Each function must be deterministic given the outcome it receives; otherwise the result
/// does not describe a joint distribution of the old and new random variables.
pub fn insert_rvf(
    dist: &JointDistribution,
    funcs: &[&dyn RvFunction],
) -> Result<JointDistribution, ProbabilityError> {
    insert_rvf_at(dist, funcs, InsertAt::End)
}

/// Like [`insert_rvf`], with an explicit insertion point. Only [`InsertAt::End`] is supported.
pub fn insert_rvf_at(
    dist: &JointDistribution,
    funcs: &[&dyn RvFunction],
    at: InsertAt,
) -> Result<JointDistribution, ProbabilityError> {
    if let InsertAt::Position(index) = at {
        return Err(ProbabilityError::UnsupportedInsertIndex { index });
    }
    let class = dist.outcome_class()?;
    let mut outcomes = Vec::with_capacity(dist.len());
    for outcome in dist.outcomes() {
        let mut tail = Vec::new();
        for func in funcs {
            tail.extend(func.apply(outcome)?.symbols());
        }
        outcomes.push(outcome.concat(&class.construct(tail)?)?);
    }
    Distribution::new(outcomes, dist.pmf().to_vec(), dist.base())
}

/// A value of a mapping-based random variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedValue {
    Symbol(Symbol),
    Fragment(Outcome),
}

impl From<Symbol> for MappedValue {
    fn from(value: Symbol) -> Self {
        MappedValue::Symbol(value)
    }
}

impl From<i32> for MappedValue {
    fn from(value: i32) -> Self {
        MappedValue::Symbol(Symbol::Int(value))
    }
}

impl From<char> for MappedValue {
    fn from(value: char) -> Self {
        MappedValue::Symbol(Symbol::Char(value))
    }
}

impl From<Outcome> for MappedValue {
    fn from(value: Outcome) -> Self {
        MappedValue::Fragment(value)
    }
}

impl From<&str> for MappedValue {
    fn from(value: &str) -> Self {
        MappedValue::Fragment(Outcome::text(value))
    }
}

/// Builds random-variable functions whose outputs match the outcomes of a reference
/// distribution.
#[derive(Debug, Clone, Copy)]
pub struct RvFunctions {
    class: OutcomeClass,
    length: usize,
}

impl RvFunctions {
    pub fn new(dist: &JointDistribution) -> Result<Self, ProbabilityError> {
        Ok(Self {
            class: dist.outcome_class()?,
            length: dist.outcome_length()?,
        })
    }

    pub fn class(&self) -> OutcomeClass {
        self.class
    }

    /// The length of the reference outcomes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Boolean XOR of two positions: true when the symbols at `indices` differ.
    pub fn xor(&self, indices: [usize; 2]) -> Xor {
        Xor {
            class: self.class,
            indices,
        }
    }

    /// A random variable given by looking the outcome up in `mapping`.
    ///
    /// With `force`, bare symbols become one-symbol fragments and fragments are rebuilt in the
    /// reference class. Without it, every value must already be a fragment.
    pub fn from_mapping(
        &self,
        mapping: HashMap<Outcome, MappedValue>,
        force: bool,
    ) -> Result<MappingFunction, ProbabilityError> {
        let mut values = HashMap::with_capacity(mapping.len());
        for (outcome, value) in mapping {
            let fragment = match (value, force) {
                (MappedValue::Fragment(fragment), false) => fragment,
                (MappedValue::Fragment(fragment), true) => {
                    self.class.construct(fragment.symbols())?
                }
                (MappedValue::Symbol(symbol), true) => self.class.construct(vec![symbol])?,
                (MappedValue::Symbol(symbol), false) => {
                    return Err(ProbabilityError::InvalidFragment { symbol })
                }
            };
            values.insert(outcome, fragment);
        }
        Ok(MappingFunction { mapping: values })
    }

    /// A random variable whose value is the index of the partition class containing the
    /// outcome.
    ///
    /// For text outcomes the index is rendered as a single character, so at most 62 classes
    /// are supported. Tuple outcomes use [`Symbol::Int`] and are limited to
    /// [`MAX_INT_SYMBOLS`] classes. The partition is expected to cover the sample space without overlaps.
    pub fn from_partition(
        &self,
        partition: &[Vec<Outcome>],
    ) -> Result<MappingFunction, ProbabilityError> {
        let max = match self.class {
            OutcomeClass::Text => PARTITION_ALPHABET.len(),
            OutcomeClass::Tuple => MAX_INT_SYMBOLS,
        };
        if partition.len() > max {
            return Err(ProbabilityError::AlphabetExhausted {
                classes: partition.len(),
                max,
            });
        }
        let mut mapping = HashMap::new();
        for (symbol, class) in self.partition_symbols().zip(partition) {
            for outcome in class {
                mapping.insert(outcome.clone(), MappedValue::Symbol(symbol));
            }
        }
        self.from_mapping(mapping, true)
    }

    fn partition_symbols(&self) -> Box<dyn Iterator<Item = Symbol>> {
        match self.class {
            OutcomeClass::Text => Box::new(PARTITION_ALPHABET.chars().map(Symbol::Char)),
            OutcomeClass::Tuple => Box::new((0..=i32::MAX).map(Symbol::Int)),
        }
    }

    /// A boolean random variable that is true exactly on the listed outcomes.
    ///
    /// Each character of `hexes` is a hexadecimal digit whose binary expansion, zero-padded to
    /// the reference length, is an outcome of `0`/`1` symbols. Every other outcome maps to
    /// false. Digits only carry four bits, so for outcomes longer than four symbols only the
    /// outcomes whose leading symbols are all `0` can be listed.
    pub fn from_hexes(&self, hexes: &str) -> Result<HexFunction, ProbabilityError> {
        if self.length > 4 {
            log::warn!(
                "hexadecimal digits cannot describe every outcome of length {}",
                self.length
            );
        }
        let mut truthy = HashSet::new();
        for digit in hexes.chars() {
            let value = digit
                .to_digit(16)
                .ok_or(ProbabilityError::InvalidHexDigit { digit })?;
            let bits = format!("{:0width$b}", value, width = self.length);
            let symbols = bits
                .chars()
                .map(|bit| match self.class {
                    OutcomeClass::Text => Symbol::Char(bit),
                    OutcomeClass::Tuple => Symbol::Int(i32::from(bit == '1')),
                })
                .collect();
            truthy.insert(self.class.construct(symbols)?);
        }
        Ok(HexFunction {
            class: self.class,
            truthy,
        })
    }
}

/// See [`RvFunctions::xor`].
#[derive(Debug, Clone)]
pub struct Xor {
    class: OutcomeClass,
    indices: [usize; 2],
}

impl RvFunction for Xor {
    fn apply(&self, outcome: &Outcome) -> Result<Outcome, ProbabilityError> {
        let [first, second] = self.indices.map(|index| {
            outcome.symbol(index).ok_or(ProbabilityError::IndexOutOfRange {
                index,
                length: outcome.len(),
            })
        });
        Ok(self.class.boolean(first? != second?))
    }
}

/// See [`RvFunctions::from_mapping`].
#[derive(Debug, Clone)]
pub struct MappingFunction {
    mapping: HashMap<Outcome, Outcome>,
}

impl RvFunction for MappingFunction {
    fn apply(&self, outcome: &Outcome) -> Result<Outcome, ProbabilityError> {
        self.mapping
            .get(outcome)
            .cloned()
            .ok_or_else(|| ProbabilityError::MissingOutcome {
                outcome: outcome.clone(),
            })
    }
}

/// See [`RvFunctions::from_hexes`].
#[derive(Debug, Clone)]
pub struct HexFunction {
    class: OutcomeClass,
    truthy: HashSet<Outcome>,
}

impl RvFunction for HexFunction {
    fn apply(&self, outcome: &Outcome) -> Result<Outcome, ProbabilityError> {
        Ok(self.class.boolean(self.truthy.contains(outcome)))
    }
}
