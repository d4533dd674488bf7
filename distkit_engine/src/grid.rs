//! Enumeration of distributions on a regular grid over the probability simplex.
//!
//! With `n = base^depth`, the grid consists of every vector `(k_1 / n, ..., k_L / n)` where
//! the `k_i` are non-negative integers summing to `n`. There are `binom(n + L - 1, L - 1)`
//! such points.

use std::rc::Rc;

use malachite::num::arithmetic::traits::DivExact;
use malachite::num::basic::traits::One;
use malachite::num::conversion::traits::RoundingFrom;
use malachite::{rounding_modes::RoundingMode, Natural, Rational};

use crate::constructors::{random_scalar, SampleSpace};
use crate::outcome::Symbol;
use crate::probability::{Distribution, OutcomeKey, ProbabilityError, ScalarDistribution};

/// Iterator over the compositions of `total` into `parts` non-negative parts.
///
/// Compositions are enumerated by "stars and bars": the `parts - 1` bars are placed among
/// `total + parts - 1` slots, and placements are visited in lexicographic order. As a
/// result the first part increases slowest, starting from 0.
#[derive(Debug, Clone)]
pub struct Compositions {
    total: usize,
    parts: usize,
    bars: Vec<usize>,
    // Whether we're finished; if true, then |bars| may contain invalid positions.
    done: bool,
}

impl Compositions {
    pub fn new(total: usize, parts: usize) -> Self {
        Self {
            total,
            parts,
            bars: (0..parts.saturating_sub(1)).collect(),
            done: parts == 0,
        }
    }

    fn slots(&self) -> usize {
        self.total + self.parts - 1
    }

    fn current(&self) -> Vec<usize> {
        let mut composition = Vec::with_capacity(self.parts);
        let mut previous = None;
        for &bar in &self.bars {
            composition.push(match previous {
                None => bar,
                Some(p) => bar - p - 1,
            });
            previous = Some(bar);
        }
        composition.push(match previous {
            None => self.total,
            Some(p) => self.slots() - p - 1,
        });
        composition
    }

    fn advance_bars(&mut self) {
        let bar_count = self.bars.len();
        let slots = self.slots();
        // Find the rightmost bar that can still move right.
        let movable = (0..bar_count)
            .rev()
            .find(|&i| self.bars[i] < slots - bar_count + i);
        match movable {
            Some(i) => {
                self.bars[i] += 1;
                for j in i + 1..bar_count {
                    self.bars[j] = self.bars[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
    }
}

impl Iterator for Compositions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let composition = self.current();
        self.advance_bars();
        Some(composition)
    }
}

/// Normalized compositions: every composition of `total` into `parts` parts, divided by
/// `total`. Yields nothing when `total` is zero.
pub fn slots(total: usize, parts: usize) -> impl Iterator<Item = Vec<f64>> {
    let denominator = Natural::from(total);
    let compositions = (total > 0).then(|| Compositions::new(total, parts));
    compositions.into_iter().flatten().map(move |composition| {
        composition
            .into_iter()
            .map(|k| {
                f64::rounding_from(
                    Rational::from_naturals(Natural::from(k), denominator.clone()),
                    RoundingMode::Nearest,
                )
                .0
            })
            .collect()
    })
}

/// Calculate binomial coefficient n choose k.
///
/// Panics if k > n.
fn binom(n: usize, k: usize) -> Natural {
    let k = k.min(n - k);
    let mut result = Natural::ONE;
    for i in 1..=k {
        // After this step, result == binom(n - k + i, i), so the division is exact.
        result = (result * Natural::from(n - k + i)).div_exact(Natural::from(i));
    }
    result
}

/// The points of a regular grid over the `(length - 1)`-simplex, as plain probability vectors.
pub struct SimplexGrid {
    length: usize,
    total: usize,
    points: Box<dyn Iterator<Item = Vec<f64>>>,
}

impl std::fmt::Debug for SimplexGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexGrid")
            .field("length", &self.length)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// Returns the grid over the `(length - 1)`-simplex with `base^depth` subdivisions per axis.
pub fn simplex_grid(length: usize, depth: u32, base: usize) -> Result<SimplexGrid, ProbabilityError> {
    SimplexGrid::new(length, depth, base)
}

impl SimplexGrid {
    pub fn new(length: usize, depth: u32, base: usize) -> Result<Self, ProbabilityError> {
        if length == 0 {
            return Err(ProbabilityError::EmptySampleSpace);
        }
        let total = base
            .checked_pow(depth)
            .filter(|&total| total > 0 && total.checked_add(length).is_some())
            .ok_or(ProbabilityError::InvalidGrid { base, depth })?;
        let grid = Self {
            length,
            total,
            points: Box::new(slots(total, length)),
        };
        log::debug!(
            "simplex grid with {} subdivisions over {} outcomes has {} points",
            total,
            length,
            grid.cardinality()
        );
        Ok(grid)
    }

    /// The number of points on a fresh grid with these parameters.
    pub fn cardinality(&self) -> Natural {
        binom(self.total + self.length - 1, self.length - 1)
    }

    /// The number of entries of every grid point.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Turns the grid into one over distributions, each a copy of `template` with its pmf
    /// set to a grid point. `template` must have one outcome per grid coordinate.
    pub fn with_template<O: OutcomeKey>(
        self,
        template: Distribution<O>,
        mode: GridMode,
    ) -> Result<DistributionGrid<O>, ProbabilityError> {
        if template.pmf().len() != self.length {
            return Err(ProbabilityError::ArityMismatch {
                what: "template outcomes",
                expected: self.length,
                found: template.pmf().len(),
            });
        }
        Ok(DistributionGrid {
            points: self,
            template: Rc::new(template),
            mode,
        })
    }

    /// Like [`SimplexGrid::with_template`], with a template over the outcomes `0..length`,
    /// drawn from the default random source.
    pub fn with_default_template(
        self,
        mode: GridMode,
    ) -> Result<DistributionGrid<Symbol>, ProbabilityError> {
        let template: ScalarDistribution =
            random_scalar(SampleSpace::Count(self.length), None, None)?;
        self.with_template(template, mode)
    }
}

impl Iterator for SimplexGrid {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.points.next()
    }
}

/// How a [`DistributionGrid`] produces its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Every item is an independent copy of the template.
    CopyEach,
    /// Items share one buffer whose pmf is overwritten at every step. If the previous item is
    /// still alive when the grid advances, the buffer is copied first, so the held item never
    /// changes under the caller.
    ReuseBuffer,
}

/// Distributions placed on the points of a [`SimplexGrid`].
#[derive(Debug)]
pub struct DistributionGrid<O: OutcomeKey> {
    points: SimplexGrid,
    template: Rc<Distribution<O>>,
    mode: GridMode,
}

impl<O: OutcomeKey> DistributionGrid<O> {
    pub fn mode(&self) -> GridMode {
        self.mode
    }
}

impl<O: OutcomeKey> Iterator for DistributionGrid<O> {
    type Item = Rc<Distribution<O>>;

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.points.next()?;
        match self.mode {
            GridMode::CopyEach => {
                let mut d = (*self.template).clone();
                write_point(&mut d, &point);
                Some(Rc::new(d))
            }
            GridMode::ReuseBuffer => {
                write_point(Rc::make_mut(&mut self.template), &point);
                Some(Rc::clone(&self.template))
            }
        }
    }
}

/// Overwrites the pmf of `dist` with a grid point, converted to the base of `dist`.
fn write_point<O: OutcomeKey>(dist: &mut Distribution<O>, point: &[f64]) {
    let base = dist.base();
    for (entry, &p) in dist.pmf_mut().iter_mut().zip(point) {
        *entry = base.from_linear(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Base;
    use crate::outcome::Outcome;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_binom() {
        assert_eq!(binom(0, 0), 1);
        assert_eq!(binom(4, 1), 4);
        assert_eq!(binom(10, 5), 252);
        assert_eq!(binom(20, 10), 184756);
        assert_eq!(binom(100, 100), 1);
    }

    #[test]
    fn test_compositions_two_parts() {
        let compositions = Compositions::new(4, 2).collect::<Vec<_>>();
        assert_eq!(
            compositions,
            vec![vec![0, 4], vec![1, 3], vec![2, 2], vec![3, 1], vec![4, 0]]
        );
    }

    #[test]
    fn test_compositions_three_parts() {
        let compositions = Compositions::new(2, 3).collect::<Vec<_>>();
        assert_eq!(
            compositions,
            vec![
                vec![0, 0, 2],
                vec![0, 1, 1],
                vec![0, 2, 0],
                vec![1, 0, 1],
                vec![1, 1, 0],
                vec![2, 0, 0],
            ]
        );
    }

    #[test]
    fn test_compositions_edge_cases() {
        assert_eq!(Compositions::new(3, 1).collect::<Vec<_>>(), vec![vec![3]]);
        assert_eq!(Compositions::new(0, 3).collect::<Vec<_>>(), vec![vec![0, 0, 0]]);
        assert_eq!(Compositions::new(3, 0).count(), 0);
    }

    #[test]
    fn test_slots_with_zero_total() {
        assert_eq!(slots(0, 2).count(), 0);
        assert_eq!(slots(0, 0).count(), 0);
        assert_eq!(
            slots(2, 2).collect::<Vec<_>>(),
            vec![vec![0.0, 1.0], vec![0.5, 0.5], vec![1.0, 0.0]]
        );
    }

    #[test]
    fn test_simplex_grid_plain_vectors() {
        let points = simplex_grid(2, 2, 2).unwrap().collect::<Vec<_>>();
        assert_eq!(
            points,
            vec![
                vec![0.0, 1.0],
                vec![0.25, 0.75],
                vec![0.5, 0.5],
                vec![0.75, 0.25],
                vec![1.0, 0.0],
            ]
        );
    }

    #[test]
    fn test_simplex_grid_cardinality() {
        for (length, depth, base) in [(2, 2, 2), (3, 2, 2), (4, 1, 3), (3, 0, 2)] {
            let grid = simplex_grid(length, depth, base).unwrap();
            let expected = grid.cardinality();
            assert_eq!(Natural::from(grid.count()), expected);
        }
        assert_eq!(simplex_grid(3, 2, 2).unwrap().cardinality(), 15);
    }

    #[test]
    fn test_simplex_grid_points_are_normalized() {
        for point in simplex_grid(4, 2, 3).unwrap() {
            assert_eq!(point.len(), 4);
            assert_relative_eq!(point.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_simplex_grid_errors() {
        assert!(matches!(
            simplex_grid(0, 2, 2),
            Err(ProbabilityError::EmptySampleSpace)
        ));
        assert!(matches!(
            simplex_grid(2, 200, 2),
            Err(ProbabilityError::InvalidGrid { .. })
        ));
        assert!(matches!(
            simplex_grid(2, 3, 0),
            Err(ProbabilityError::InvalidGrid { .. })
        ));
    }

    fn coin() -> Distribution<Outcome> {
        Distribution::new(
            vec![Outcome::text("H"), Outcome::text("T")],
            vec![0.5, 0.5],
            Base::Linear,
        )
        .unwrap()
    }

    #[test]
    fn test_distribution_grid_copy_each() {
        let grid = simplex_grid(2, 1, 2)
            .unwrap()
            .with_template(coin(), GridMode::CopyEach)
            .unwrap();
        let dists = grid.collect::<Vec<_>>();
        assert_eq!(dists.len(), 3);
        assert_eq!(dists[0].pmf(), &[0.0, 1.0]);
        assert_eq!(dists[1].pmf(), &[0.5, 0.5]);
        assert_eq!(dists[2].pmf(), &[1.0, 0.0]);
        assert_eq!(dists[2].outcomes(), coin().outcomes());
        assert!(!Rc::ptr_eq(&dists[0], &dists[1]));
    }

    #[test]
    fn test_distribution_grid_reuse_buffer() {
        let mut grid = simplex_grid(2, 2, 2)
            .unwrap()
            .with_template(coin(), GridMode::ReuseBuffer)
            .unwrap();
        let first = grid.next().unwrap();
        let first_ptr = Rc::as_ptr(&first);
        drop(first);
        let second = grid.next().unwrap();
        // The previous item was released, so the same buffer is reused.
        assert_eq!(Rc::as_ptr(&second), first_ptr);
        assert_eq!(second.pmf(), &[0.25, 0.75]);

        // A held item is never overwritten.
        let third = grid.next().unwrap();
        assert_eq!(second.pmf(), &[0.25, 0.75]);
        assert_eq!(third.pmf(), &[0.5, 0.5]);
    }

    #[test]
    fn test_distribution_grid_log_template() {
        for mode in [GridMode::CopyEach, GridMode::ReuseBuffer] {
            let template = coin().to_base(Base::log2()).unwrap();
            let grid = simplex_grid(2, 2, 2)
                .unwrap()
                .with_template(template, mode)
                .unwrap();
            let mut count = 0;
            for d in grid {
                assert_eq!(d.base(), Base::log2());
                assert!(d.base().validate_pmf(d.pmf()).is_ok());
                count += 1;
            }
            assert_eq!(count, 5);
        }

        let mut grid = simplex_grid(2, 2, 2)
            .unwrap()
            .with_template(coin().to_base(Base::log2()).unwrap(), GridMode::CopyEach)
            .unwrap();
        let first = grid.next().unwrap();
        assert_eq!(first.pmf()[0], f64::NEG_INFINITY);
        assert_eq!(first.pmf()[1], 0.0);
        let second = grid.next().unwrap();
        assert_relative_eq!(second.pmf()[0], -2.0);
        assert_relative_eq!(second.to_base(Base::Linear).unwrap().pmf()[1], 0.75);
    }

    #[test]
    fn test_distribution_grid_template_arity() {
        let result = simplex_grid(3, 1, 2)
            .unwrap()
            .with_template(coin(), GridMode::CopyEach);
        assert!(matches!(
            result,
            Err(ProbabilityError::ArityMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_distribution_grid_default_template() {
        let mut grid = simplex_grid(3, 1, 2)
            .unwrap()
            .with_default_template(GridMode::CopyEach)
            .unwrap();
        let first = grid.next().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first.pmf(), &[0.0, 0.0, 1.0]);
        assert_eq!(grid.count(), 5);
    }
}
