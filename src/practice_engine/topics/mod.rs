//! Problem generators grouped by strand.
//!
//! Every public generator follows the same signature:
//!
//! ```ignore
//! pub fn generate_<name><R: Rng>(
//!     rng: &mut R,
//!     tier: Tier,
//!     problem_id: String,
//! ) -> Problem
//! ```
//!
//! The dispatcher in `generator.rs` routes to these by [`ProblemKind`].
//!
//! [`ProblemKind`]: crate::practice_engine::models::ProblemKind

/// DA (decimal addition), DD (distributive decomposition)
pub mod arithmetic;
/// QP (quotient pair selection)
pub mod division;
/// FD (fraction to decimal), SH (shaded fraction), SF (simplify), FC (compare)
pub mod fractions;
/// RD (rectangle dimensions), TA (triangle missing angle)
pub mod geometry;
