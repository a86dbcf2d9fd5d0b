use std::collections::BTreeSet;

use rand::Rng;
use crate::practice_engine::{
    helpers::problem,
    models::{DifficultyLevel, ExpectedAnswer, Operands, Problem, ProblemKind, Prompt, Tier},
    sampling::{sample_or_else, shuffle, DEFAULT_RETRY_BUDGET},
};

// ---------------------------------------------------------------------------
// QP: quotient pair selection
// ---------------------------------------------------------------------------

struct PoolSpec {
    divisor: i64,
    size: usize,
    max: i64,
}

fn pool_spec<R: Rng>(rng: &mut R, level: DifficultyLevel) -> PoolSpec {
    match level {
        DifficultyLevel::Beginner     => PoolSpec { divisor: rng.gen_range(2..=5), size: 5, max: 50 },
        DifficultyLevel::Intermediate => PoolSpec { divisor: rng.gen_range(3..=9), size: 6, max: 100 },
        DifficultyLevel::Advanced     => PoolSpec { divisor: rng.gen_range(6..=12), size: 8, max: 144 },
    }
}

/// Build an option pool holding `n_multiples` distinct multiples of `divisor`
/// and enough distinct non-multiples to reach `size`.
///
/// Non-multiples come from rejection sampling with `budget` draws each. When a
/// draw budget is exhausted the next free number just above the smallest
/// multiple (`m + 1`, `m + 2`, ... skipping multiples) is used instead.
///
/// Returns `(pool, multiples)`; the pool is shuffled, the multiples sorted.
pub fn build_pool<R: Rng>(
    rng: &mut R, divisor: i64, size: usize, max: i64, n_multiples: usize, budget: u32,
) -> (Vec<i64>, Vec<i64>) {
    let mut ks: Vec<i64> = (1..=max / divisor).collect();
    shuffle(rng, &mut ks);
    let mut multiples: Vec<i64> = ks.into_iter().take(n_multiples).map(|k| k * divisor).collect();
    multiples.sort_unstable();

    let mut pool = multiples.clone();
    let anchor = multiples.first().copied().unwrap_or(divisor);
    while pool.len() < size {
        let taken = pool.clone();
        let distractor = sample_or_else(
            rng,
            "distractor must not divide evenly",
            budget,
            |r| r.gen_range(2..=max),
            |v| v % divisor != 0 && !taken.contains(v),
            || {
                (0i64..)
                    .flat_map(|k| (1..divisor).map(move |r| anchor + k * divisor + r))
                    .find(|v| !taken.contains(v))
                    .unwrap_or(anchor + 1)
            },
        );
        pool.push(distractor);
    }
    shuffle(rng, &mut pool);
    (pool, multiples)
}

pub fn generate_quotient_pairs<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let spec = pool_spec(rng, DifficultyLevel::from_tier(tier));
    // At least one multiple, and at least one slot left for a non-multiple.
    let n_multiples = rng.gen_range(1..=spec.size / 2);
    let (pool, multiples) = build_pool(
        rng, spec.divisor, spec.size, spec.max, n_multiples, DEFAULT_RETRY_BUDGET,
    );
    build_quotient_pairs(problem_id, tier, spec.divisor, pool, multiples)
}

/// Fixed-operand constructor; `None` when `divisor` is zero.
pub fn quotient_pairs(
    problem_id: String, tier: Tier, divisor: i64, pool: Vec<i64>, multiples: Vec<i64>,
) -> Option<Problem> {
    (divisor != 0).then(|| build_quotient_pairs(problem_id, tier, divisor, pool, multiples))
}

fn build_quotient_pairs(
    problem_id: String, tier: Tier, divisor: i64, pool: Vec<i64>, multiples: Vec<i64>,
) -> Problem {
    let quotients: Vec<i64> = multiples.iter().map(|m| m / divisor).collect();
    let mut non_multiples: Vec<i64> = pool.iter().copied().filter(|v| v % divisor != 0).collect();
    non_multiples.sort_unstable();

    let pool_text = pool.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    let prompt = Prompt::new(
        "Which of these numbers can be divided by {divisor} with no remainder? {pool}",
    )
    .bind("divisor", divisor)
    .bind("pool", pool_text);

    let expected = ExpectedAnswer::UnorderedSet(multiples.iter().copied().collect::<BTreeSet<_>>());
    let operands = Operands::new()
        .with("divisor", divisor)
        .with("pool", pool)
        .with("multiples", multiples)
        .with("quotients", quotients)
        .with("non_multiples", non_multiples);

    problem(problem_id, ProblemKind::QuotientPairSelection, tier, prompt, operands, expected)
}
