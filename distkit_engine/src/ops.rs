//! Arithmetic on probability values in a chosen representation.
//!
//! A pmf is stored either as plain probabilities ([`Base::Linear`]) or as logarithms of
//! probabilities in some base ([`Base::Log`]). Every operation that combines masses goes
//! through the methods here, so callers never need to know which representation is in use.

use crate::probability::ProbabilityError;

/// Absolute tolerance used when checking that a pmf sums to one.
pub const ABSOLUTE_TOLERANCE: f64 = 1e-9;
/// Relative tolerance used when checking that a pmf sums to one.
pub const RELATIVE_TOLERANCE: f64 = 1e-7;

/// The numeric representation of the entries of a pmf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Base {
    /// Entries are probabilities in `[0, 1]`.
    Linear,
    /// Entries are `log_b(p)` for the given `b`. `b` must be positive and different from 1.
    Log(f64),
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base::Linear => write!(f, "linear"),
            Base::Log(b) if *b == std::f64::consts::E => write!(f, "e"),
            Base::Log(b) => write!(f, "{}", b),
        }
    }
}

impl Base {
    pub fn log2() -> Self {
        Base::Log(2.0)
    }

    pub fn natural() -> Self {
        Base::Log(std::f64::consts::E)
    }

    /// The representation of probability 0.
    pub fn zero(self) -> f64 {
        match self {
            Base::Linear => 0.0,
            Base::Log(_) => f64::NEG_INFINITY,
        }
    }

    /// The representation of probability 1.
    pub fn one(self) -> f64 {
        match self {
            Base::Linear => 1.0,
            Base::Log(_) => 0.0,
        }
    }

    pub fn is_log(self) -> bool {
        matches!(self, Base::Log(_))
    }

    /// Converts a value in this representation to a plain probability.
    pub fn to_linear(self, value: f64) -> f64 {
        match self {
            Base::Linear => value,
            Base::Log(b) => b.powf(value),
        }
    }

    /// Converts a plain probability to this representation. `0` maps to `-inf` in log space.
    pub fn from_linear(self, probability: f64) -> f64 {
        match self {
            Base::Linear => probability,
            Base::Log(b) => probability.log(b),
        }
    }

    /// The product of two probabilities.
    pub fn mult(self, a: f64, b: f64) -> f64 {
        match self {
            Base::Linear => a * b,
            Base::Log(_) => a + b,
        }
    }

    /// The sum of two probabilities.
    pub fn add(self, a: f64, b: f64) -> f64 {
        match self {
            Base::Linear => a + b,
            Base::Log(_) => self.add_reduce(&[a, b]),
        }
    }

    /// The sum of all the given probabilities. Returns [`Base::zero`] for an empty slice.
    pub fn add_reduce(self, values: &[f64]) -> f64 {
        match self {
            Base::Linear => values.iter().sum(),
            Base::Log(b) => {
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if max == f64::NEG_INFINITY {
                    return f64::NEG_INFINITY;
                }
                // Shift by the largest term so the powers stay in range.
                let shifted: f64 = values.iter().map(|&v| b.powf(v - max)).sum();
                max + shifted.log(b)
            }
        }
    }

    /// Multiplies every entry of `values` by `weight`, in place.
    pub fn mult_inplace(self, values: &mut [f64], weight: f64) {
        for value in values.iter_mut() {
            *value = self.mult(*value, weight);
        }
    }

    /// Adds `other` to `acc` entrywise, in place. Both slices must have the same length.
    pub fn add_inplace(self, acc: &mut [f64], other: &[f64]) {
        debug_assert_eq!(acc.len(), other.len(), "add_inplace on slices of different lengths");
        for (a, &o) in acc.iter_mut().zip(other) {
            *a = self.add(*a, o);
        }
    }

    /// Checks that this is a usable representation: a log base must be finite, positive and
    /// different from 1.
    pub fn validate(self) -> Result<(), ProbabilityError> {
        match self {
            Base::Linear => Ok(()),
            Base::Log(b) if b.is_finite() && b > 0.0 && b != 1.0 => Ok(()),
            Base::Log(base) => Err(ProbabilityError::InvalidBase { base }),
        }
    }

    /// Checks that `pmf` is a valid probability mass function in this representation.
    ///
    /// The base is checked first, then normalization, then each entry.
    pub fn validate_pmf(self, pmf: &[f64]) -> Result<(), ProbabilityError> {
        self.validate()?;
        let total: f64 = pmf.iter().map(|&p| self.to_linear(p)).sum();
        let tolerance = ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE;
        if (total - 1.0).abs() > tolerance || total.is_nan() {
            return Err(ProbabilityError::InvalidNormalization { total });
        }
        for (index, &value) in pmf.iter().enumerate() {
            let p = self.to_linear(value);
            if !(-tolerance..=1.0 + tolerance).contains(&p) {
                return Err(ProbabilityError::InvalidProbability { index, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_arithmetic() {
        let base = Base::Linear;
        assert_relative_eq!(base.mult(0.5, 0.25), 0.125);
        assert_relative_eq!(base.add(0.5, 0.25), 0.75);
        assert_relative_eq!(base.add_reduce(&[0.1, 0.2, 0.3]), 0.6);
        assert_eq!(base.add_reduce(&[]), 0.0);
    }

    #[test]
    fn test_log_arithmetic_matches_linear() {
        let base = Base::log2();
        let a = base.from_linear(0.5);
        let b = base.from_linear(0.25);
        assert_relative_eq!(base.to_linear(base.mult(a, b)), 0.125);
        assert_relative_eq!(base.to_linear(base.add(a, b)), 0.75);
        assert_relative_eq!(
            base.to_linear(base.add_reduce(&[a, b, base.from_linear(0.25)])),
            1.0
        );
    }

    #[test]
    fn test_log_zero_is_absorbing() {
        let base = Base::natural();
        assert_eq!(base.from_linear(0.0), f64::NEG_INFINITY);
        assert_eq!(base.add_reduce(&[base.zero(), base.zero()]), base.zero());
        assert_relative_eq!(base.add(base.zero(), -1.0), -1.0);
        assert_eq!(base.mult(base.zero(), -1.0), base.zero());
    }

    #[test]
    fn test_inplace_operations() {
        let base = Base::Linear;
        let mut values = vec![0.2, 0.8];
        base.mult_inplace(&mut values, 0.5);
        base.add_inplace(&mut values, &[0.25, 0.25]);
        assert_relative_eq!(values[0], 0.35);
        assert_relative_eq!(values[1], 0.65);
    }

    #[test]
    fn test_validate_pmf() {
        assert!(Base::Linear.validate_pmf(&[0.25, 0.75]).is_ok());
        assert!(Base::log2().validate_pmf(&[-1.0, -1.0]).is_ok());
        assert!(Base::log2()
            .validate_pmf(&[0.0, f64::NEG_INFINITY])
            .is_ok());
    }

    #[test]
    fn test_validate_pmf_normalization() {
        assert!(matches!(
            Base::Linear.validate_pmf(&[0.5, 0.6]),
            Err(ProbabilityError::InvalidNormalization { .. })
        ));
        assert!(matches!(
            Base::Linear.validate_pmf(&[f64::NAN, 1.0]),
            Err(ProbabilityError::InvalidNormalization { .. })
        ));
        assert!(matches!(
            Base::Linear.validate_pmf(&[]),
            Err(ProbabilityError::InvalidNormalization { .. })
        ));
    }

    #[test]
    fn test_invalid_log_bases() {
        assert!(Base::Linear.validate().is_ok());
        assert!(Base::log2().validate().is_ok());
        assert!(Base::Log(0.5).validate().is_ok());
        for b in [1.0, 0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Base::Log(b).validate(),
                Err(ProbabilityError::InvalidBase { .. })
            ));
        }
        // Every entry of a base-1 pmf would read as probability 1.
        assert!(matches!(
            Base::Log(1.0).validate_pmf(&[0.0]),
            Err(ProbabilityError::InvalidBase { .. })
        ));
    }

    #[test]
    fn test_validate_pmf_infinite_total() {
        assert!(matches!(
            Base::Linear.validate_pmf(&[f64::INFINITY, 0.0]),
            Err(ProbabilityError::InvalidNormalization { .. })
        ));
    }

    #[test]
    fn test_validate_pmf_range() {
        assert!(matches!(
            Base::Linear.validate_pmf(&[1.5, -0.5]),
            Err(ProbabilityError::InvalidProbability { index: 0, .. })
        ));
    }
}
