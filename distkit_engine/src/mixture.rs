//! Mixtures of distributions: `sum_i w_i d_i`.
//!
//! [`mix`] handles arbitrary sample spaces and looks every outcome up in every input.
//! [`mix_fast`] assumes the inputs are laid out identically and works directly on the pmf
//! vectors.

use std::collections::HashSet;

use crate::ops::Base;
use crate::probability::{Distribution, OutcomeKey, ProbabilityError};

/// How [`mix`] treats inputs whose sample spaces differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixSpace {
    /// Every input must contain every outcome; a missing one is an error.
    Shared,
    /// The sample space is the union of the inputs'; a missing outcome has zero mass.
    Merged,
}

/// Creates the mixture distribution `sum_i weights[i] * dists[i]`.
///
/// The weights are probabilities in the base shared by all `dists`. The result has the same
/// base. Outcomes appear in order of first appearance across the inputs.
pub fn mix<O: OutcomeKey>(
    dists: &[Distribution<O>],
    weights: &[f64],
    space: MixSpace,
) -> Result<Distribution<O>, ProbabilityError> {
    let base = check_inputs(dists, weights)?;
    base.validate_pmf(weights)?;

    let mut seen = HashSet::new();
    let outcomes = dists
        .iter()
        .flat_map(|d| d.outcomes().iter())
        .filter(|outcome| seen.insert(*outcome))
        .cloned()
        .collect::<Vec<_>>();
    log::debug!(
        "mixing {} distributions over {} outcomes",
        dists.len(),
        outcomes.len()
    );

    let mut terms = Vec::with_capacity(dists.len());
    let mut pmf = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        terms.clear();
        for (index, (dist, &weight)) in dists.iter().zip(weights).enumerate() {
            let term = match (dist.get(outcome), space) {
                (Some(p), _) => base.mult(weight, p),
                (None, MixSpace::Merged) => base.zero(),
                (None, MixSpace::Shared) => {
                    return Err(ProbabilityError::IncompatibleOutcome {
                        outcome: format!("{:?}", outcome),
                        index,
                    })
                }
            };
            terms.push(term);
        }
        pmf.push(base.add_reduce(&terms));
    }
    Distribution::new(outcomes, pmf, base)
}

/// Like [`mix`], but works on the pmf vectors directly.
///
/// Every distribution must list the same outcomes in the same order. Only the pmf lengths
/// are checked; inputs that have equal lengths but different outcomes give a meaningless
/// result. The outcomes of the result are those of `dists[0]`.
pub fn mix_fast<O: OutcomeKey>(
    dists: &[Distribution<O>],
    weights: &[f64],
) -> Result<Distribution<O>, ProbabilityError> {
    let base = check_inputs(dists, weights)?;
    let expected = dists[0].pmf().len();
    for (index, dist) in dists.iter().enumerate() {
        if dist.pmf().len() != expected {
            return Err(ProbabilityError::ShapeMismatch {
                index,
                expected,
                found: dist.pmf().len(),
            });
        }
    }
    base.validate_pmf(weights)?;

    let mut mixed = dists[0].clone();
    base.mult_inplace(mixed.pmf_mut(), weights[0]);
    let mut scaled = Vec::with_capacity(mixed.len());
    for (dist, &weight) in dists.iter().zip(weights).skip(1) {
        scaled.clear();
        scaled.extend(dist.pmf().iter().map(|&p| base.mult(p, weight)));
        base.add_inplace(mixed.pmf_mut(), &scaled);
    }
    Ok(mixed)
}

/// Checks the input counts and bases common to both mixing paths, and returns the shared base.
fn check_inputs<O: OutcomeKey>(
    dists: &[Distribution<O>],
    weights: &[f64],
) -> Result<Base, ProbabilityError> {
    let first = dists.first().ok_or(ProbabilityError::NoDistributions)?;
    if dists.len() != weights.len() {
        return Err(ProbabilityError::LengthMismatch {
            what: "weights",
            expected: dists.len(),
            found: weights.len(),
        });
    }
    let base = first.base();
    if let Some((index, dist)) = dists.iter().enumerate().find(|(_, d)| d.base() != base) {
        return Err(ProbabilityError::BaseMismatch {
            index,
            expected: base,
            found: dist.base(),
        });
    }
    Ok(base)
}
