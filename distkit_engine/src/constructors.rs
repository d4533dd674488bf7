//! Constructors for canonical distributions: uniform and Dirichlet-sampled.

use rand::RngCore;

use crate::ops::Base;
use crate::outcome::{Outcome, Symbol, MAX_INT_SYMBOLS};
use crate::probability::{Distribution, JointDistribution, ProbabilityError, ScalarDistribution};
use crate::random::dirichlet;

/// The outcomes of a scalar distribution: either `0..n`, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSpace {
    Count(usize),
    Outcomes(Vec<Symbol>),
}

impl SampleSpace {
    pub fn len(&self) -> usize {
        match self {
            SampleSpace::Count(n) => *n,
            SampleSpace::Outcomes(outcomes) => outcomes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_outcomes(self) -> Result<Vec<Symbol>, ProbabilityError> {
        match self {
            SampleSpace::Count(n) => standard_alphabet(n),
            SampleSpace::Outcomes(outcomes) => Ok(outcomes),
        }
    }
}

/// The per-position alphabets of a joint distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alphabet {
    /// Every position uses `0..k`.
    Size(usize),
    /// One alphabet per position. A single alphabet is used for every position.
    PerPosition(Vec<Vec<Symbol>>),
}

/// The symbols `0..size`.
fn standard_alphabet(size: usize) -> Result<Vec<Symbol>, ProbabilityError> {
    if size > MAX_INT_SYMBOLS {
        return Err(ProbabilityError::AlphabetExhausted {
            classes: size,
            max: MAX_INT_SYMBOLS,
        });
    }
    Ok((0..=i32::MAX).take(size).map(Symbol::Int).collect())
}

/// Returns a uniform distribution over the given sample space, in linear base.
#[allow(clippy::cast_precision_loss)]
pub fn uniform_scalar(space: SampleSpace) -> Result<ScalarDistribution, ProbabilityError> {
    if space.is_empty() {
        return Err(ProbabilityError::EmptySampleSpace);
    }
    let outcomes = space.into_outcomes()?;
    let pmf = vec![1.0 / outcomes.len() as f64; outcomes.len()];
    Distribution::new(outcomes, pmf, Base::Linear)
}

/// Returns a uniform distribution over outcomes of length `outcome_length`.
///
/// Outcomes are tuples, listed in product order: the rightmost position varies fastest.
#[allow(clippy::cast_precision_loss)]
pub fn uniform(
    outcome_length: usize,
    alphabet: Alphabet,
) -> Result<JointDistribution, ProbabilityError> {
    let alphabets = match alphabet {
        Alphabet::Size(size) => vec![standard_alphabet(size)?; outcome_length],
        Alphabet::PerPosition(alphabets) if alphabets.len() == 1 => {
            vec![alphabets[0].clone(); outcome_length]
        }
        Alphabet::PerPosition(alphabets) if alphabets.len() == outcome_length => alphabets,
        Alphabet::PerPosition(alphabets) => {
            return Err(ProbabilityError::ArityMismatch {
                what: "alphabets",
                expected: outcome_length,
                found: alphabets.len(),
            })
        }
    };

    let outcomes = ProductIterator::new(&alphabets)
        .map(Outcome::Tuple)
        .collect::<Vec<_>>();
    if outcomes.is_empty() {
        return Err(ProbabilityError::EmptySampleSpace);
    }
    let pmf = vec![1.0 / outcomes.len() as f64; outcomes.len()];
    Distribution::new(outcomes, pmf, Base::Linear)
}

/// Returns a scalar distribution whose pmf is drawn from `Dirichlet(concentration)`.
///
/// The concentration defaults to all ones, which samples uniformly from the simplex.
pub fn random_scalar(
    space: SampleSpace,
    concentration: Option<&[f64]>,
    rng: Option<&mut dyn RngCore>,
) -> Result<ScalarDistribution, ProbabilityError> {
    let mut d = uniform_scalar(space)?;
    let pmf = draw_pmf(d.len(), concentration, rng)?;
    d.set_pmf(pmf)?;
    Ok(d)
}

/// Returns a joint distribution whose pmf is drawn from `Dirichlet(concentration)`.
///
/// There is one concentration parameter per outcome of `uniform(outcome_length, alphabet)`.
pub fn random(
    outcome_length: usize,
    alphabet: Alphabet,
    concentration: Option<&[f64]>,
    rng: Option<&mut dyn RngCore>,
) -> Result<JointDistribution, ProbabilityError> {
    let mut d = uniform(outcome_length, alphabet)?;
    let pmf = draw_pmf(d.len(), concentration, rng)?;
    d.set_pmf(pmf)?;
    Ok(d)
}

fn draw_pmf(
    len: usize,
    concentration: Option<&[f64]>,
    rng: Option<&mut dyn RngCore>,
) -> Result<Vec<f64>, ProbabilityError> {
    match concentration {
        Some(alpha) if alpha.len() != len => Err(ProbabilityError::ArityMismatch {
            what: "concentration parameters",
            expected: len,
            found: alpha.len(),
        }),
        Some(alpha) => dirichlet(alpha, rng),
        None => dirichlet(&vec![1.0; len], rng),
    }
}

/// Iterator over the cartesian product of several alphabets, rightmost position fastest.
struct ProductIterator<'a> {
    alphabets: &'a [Vec<Symbol>],
    positions: Vec<usize>,
    // Whether we're finished; if true, then |positions| may contain invalid indices.
    done: bool,
}

impl<'a> ProductIterator<'a> {
    fn new(alphabets: &'a [Vec<Symbol>]) -> Self {
        Self {
            alphabets,
            positions: vec![0; alphabets.len()],
            done: alphabets.iter().any(|alphabet| alphabet.is_empty()),
        }
    }

    fn advance_position(&mut self) {
        let mut position_index = self.positions.len();
        while position_index > 0 {
            position_index -= 1;
            self.positions[position_index] += 1;
            if self.positions[position_index] < self.alphabets[position_index].len() {
                return;
            }
            self.positions[position_index] = 0;
        }
        // Every position wrapped around.
        self.done = true;
    }
}

impl<'a> Iterator for ProductIterator<'a> {
    type Item = Vec<Symbol>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let outcome = self
            .positions
            .iter()
            .zip(self.alphabets)
            .map(|(&i, alphabet)| alphabet[i])
            .collect();
        self.advance_position();
        Some(outcome)
    }
}
