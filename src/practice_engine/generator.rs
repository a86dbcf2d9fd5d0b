use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::debug;

use crate::practice_engine::{
    models::{GenerateRequest, Problem, ProblemKind, Tier},
    topics,
};

/// Problem id from kind prefix + the next rng word, e.g. `QP-9C01A7F3`.
fn make_problem_id(kind: ProblemKind, rng: &mut impl RngCore) -> String {
    format!("{}-{:08X}", kind.prefix(), rng.next_u32())
}

/// Core dispatch: routes to the generator for `kind`.
///
/// All randomness comes from `rng`, so the same stream always yields the same
/// problem.
pub fn generate_problem<R: Rng>(kind: ProblemKind, tier: Tier, rng: &mut R) -> Problem {
    let problem_id = make_problem_id(kind, rng);

    let problem = match kind {
        ProblemKind::DecimalAddition =>
            topics::arithmetic::generate_decimal_addition(rng, tier, problem_id),

        ProblemKind::DistributiveDecomposition =>
            topics::arithmetic::generate_distributive(rng, tier, problem_id),

        ProblemKind::QuotientPairSelection =>
            topics::division::generate_quotient_pairs(rng, tier, problem_id),

        ProblemKind::FractionToDecimal =>
            topics::fractions::generate_fraction_to_decimal(rng, tier, problem_id),

        ProblemKind::ShadedFraction =>
            topics::fractions::generate_shaded_fraction(rng, tier, problem_id),

        ProblemKind::SimplifyFraction =>
            topics::fractions::generate_simplify(rng, tier, problem_id),

        ProblemKind::FractionComparison =>
            topics::fractions::generate_comparison(rng, tier, problem_id),

        ProblemKind::RectangleDimensions =>
            topics::geometry::generate_rectangle(rng, tier, problem_id),

        ProblemKind::TriangleMissingAngle =>
            topics::geometry::generate_triangle(rng, tier, problem_id),
    };

    debug!(target: "math_drill_gen", id = %problem.id, %kind, tier, "generated problem");
    problem
}

/// Host entry point: seed an rng (or draw entropy) and generate one problem.
pub fn generate(request: GenerateRequest) -> Problem {
    let mut rng: StdRng = match request.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    generate_problem(request.kind, request.tier, &mut rng)
}
