//! Bounded rejection sampling and shuffling shared by the generators.
//!
//! Any generator that searches for operands satisfying a constraint goes
//! through [`try_sample`]. It draws at most `budget` candidates and reports
//! [`GenerationError::ConstraintUnsatisfiable`] when none pass, so the caller
//! can switch to a deterministic fallback construction instead of looping.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Retry budget used by the built-in generators.
pub const DEFAULT_RETRY_BUDGET: u32 = 32;

/// Internal to generation; always resolved by a fallback and never shown to
/// the learner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("constraint `{constraint}` not satisfied after {attempts} attempts")]
    ConstraintUnsatisfiable { constraint: &'static str, attempts: u32 },
}

/// Draw candidates until one passes `accept`, giving up after `budget` draws.
pub fn try_sample<R, T, G, A>(
    rng: &mut R,
    constraint: &'static str,
    budget: u32,
    mut candidate: G,
    mut accept: A,
) -> Result<T, GenerationError>
where
    R: Rng + ?Sized,
    G: FnMut(&mut R) -> T,
    A: FnMut(&T) -> bool,
{
    for _ in 0..budget {
        let value = candidate(rng);
        if accept(&value) {
            return Ok(value);
        }
    }
    Err(GenerationError::ConstraintUnsatisfiable { constraint, attempts: budget })
}

/// [`try_sample`], falling back to `fallback` when the budget runs out.
pub fn sample_or_else<R, T, G, A, F>(
    rng: &mut R,
    constraint: &'static str,
    budget: u32,
    candidate: G,
    accept: A,
    fallback: F,
) -> T
where
    R: Rng + ?Sized,
    G: FnMut(&mut R) -> T,
    A: FnMut(&T) -> bool,
    F: FnOnce() -> T,
{
    try_sample(rng, constraint, budget, candidate, accept).unwrap_or_else(|err| {
        debug!(target: "math_drill_gen", error = %err, "using fallback construction");
        fallback()
    })
}

/// In-place Fisher-Yates shuffle driven only by `rng`.
pub fn shuffle<R: Rng + ?Sized, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Pick one element of a non-empty slice.
pub fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, pool: &[T]) -> T {
    pool[rng.gen_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn returns_first_accepted_candidate() {
        let mut rng = StdRng::seed_from_u64(42);
        let v = try_sample(&mut rng, "even", 64, |r| r.gen_range(0..100u32), |v| v % 2 == 0);
        assert!(matches!(v, Ok(n) if n % 2 == 0));
    }

    #[test]
    fn exhausted_budget_reports_unsatisfiable() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = try_sample(&mut rng, "impossible", 5, |r| r.gen_range(0..10u32), |_| false);
        assert_eq!(
            err,
            Err(GenerationError::ConstraintUnsatisfiable { constraint: "impossible", attempts: 5 })
        );
    }

    #[test]
    fn fallback_is_used_when_nothing_passes() {
        let mut rng = StdRng::seed_from_u64(7);
        let v = sample_or_else(&mut rng, "impossible", 3, |r| r.gen_range(0..10u32), |_| false, || 99);
        assert_eq!(v, 99);
    }

    #[test]
    fn shuffle_is_deterministic_with_seed() {
        let make = |seed: u64| -> Vec<u32> {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut items: Vec<u32> = (0..20).collect();
            shuffle(&mut rng, &mut items);
            items
        };
        assert_eq!(make(99), make(99));
        assert_ne!(make(99), make(100));

        let mut sorted = make(99);
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
