pub mod constructors;
pub mod grid;
pub mod mixture;
pub mod ops;
pub mod outcome;
pub mod output;
pub mod probability;
pub mod random;
pub mod rvf;

pub use probability::{Distribution, JointDistribution, ProbabilityError, ScalarDistribution};
