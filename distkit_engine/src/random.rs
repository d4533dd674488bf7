//! The default random source and Dirichlet draws.
//!
//! Functions that need randomness take an `Option<&mut dyn RngCore>`. `None` means the
//! process-wide default source, which is created on first use and shared afterwards.

use std::sync::{Mutex, PoisonError};

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution as _, Gamma};

use crate::probability::ProbabilityError;

/// Environment variable holding a `u64` seed for the default random source.
pub const SEED_VARIABLE: &str = "DISTKIT_SEED";

lazy_static! {
    static ref DEFAULT_RNG: Mutex<StdRng> = Mutex::new(initial_rng());
}

fn initial_rng() -> StdRng {
    match std::env::var(SEED_VARIABLE)
        .ok()
        .and_then(|seed| seed.trim().parse::<u64>().ok())
    {
        Some(seed) => {
            log::trace!("seeding the default random source with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

/// Resets the default random source to a known state.
pub fn reseed_default_rng(seed: u64) {
    *DEFAULT_RNG.lock().unwrap_or_else(PoisonError::into_inner) = StdRng::seed_from_u64(seed);
}

/// Runs `f` with the default random source.
pub fn with_default_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut rng = DEFAULT_RNG.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut rng)
}

/// Draws one probability vector from `Dirichlet(alpha)`, using `rng` or the default source.
pub fn dirichlet(
    alpha: &[f64],
    rng: Option<&mut dyn RngCore>,
) -> Result<Vec<f64>, ProbabilityError> {
    match rng {
        Some(rng) => sample_dirichlet(alpha, rng),
        None => with_default_rng(|rng| sample_dirichlet(alpha, rng)),
    }
}

/// Normalizes independent `Gamma(alpha_i, 1)` variates.
fn sample_dirichlet<R: Rng + ?Sized>(
    alpha: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>, ProbabilityError> {
    let mut draws = Vec::with_capacity(alpha.len());
    for (index, &value) in alpha.iter().enumerate() {
        let gamma = Gamma::new(value, 1.0)
            .ok()
            .filter(|_| value.is_finite() && value > 0.0)
            .ok_or(ProbabilityError::InvalidConcentration { index, value })?;
        draws.push(gamma.sample(rng));
    }
    let total: f64 = draws.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(ProbabilityError::DegenerateSample);
    }
    for draw in draws.iter_mut() {
        *draw /= total;
    }
    Ok(draws)
}
