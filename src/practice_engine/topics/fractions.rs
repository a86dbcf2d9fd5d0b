use rand::Rng;
use crate::practice_engine::{
    helpers::{exact_text, is_terminating, problem, rounded_quotient, tolerant},
    models::{
        gcd, Decimal, DifficultyLevel, ExpectedAnswer, Fraction, Operands, Problem, ProblemKind,
        Prompt, Tier,
    },
    sampling::{pick, sample_or_else, DEFAULT_RETRY_BUDGET},
};

// ---------------------------------------------------------------------------
// FD: fraction to decimal
// ---------------------------------------------------------------------------

const TERMINATING_EASY: &[i64] = &[2, 4, 5, 10];
const TERMINATING_HARD: &[i64] = &[8, 20, 25, 50];
const REPEATING: &[i64] = &[3, 6, 7, 9, 11, 12];

/// Digits kept when a repeating decimal is rounded.
const ROUNDED_PLACES: u32 = 3;

pub fn generate_fraction_to_decimal<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let level = DifficultyLevel::from_tier(tier);
    let denominator = match level {
        DifficultyLevel::Beginner     => pick(rng, TERMINATING_EASY),
        DifficultyLevel::Intermediate => pick(rng, TERMINATING_HARD),
        DifficultyLevel::Advanced     => pick(rng, REPEATING),
    };
    let numerator = if level == DifficultyLevel::Advanced {
        // 3/6 or 9/12 would terminate; 1/d never does for these denominators.
        sample_or_else(
            rng,
            "fraction must not terminate",
            DEFAULT_RETRY_BUDGET,
            |r| r.gen_range(1..denominator),
            |n| !is_terminating(*n, denominator),
            || 1,
        )
    } else {
        rng.gen_range(1..denominator)
    };
    build_fraction_to_decimal(problem_id, tier, numerator, denominator)
}

/// Fixed-operand constructor; `None` when `denominator` is zero.
pub fn fraction_to_decimal(
    problem_id: String, tier: Tier, numerator: i64, denominator: i64,
) -> Option<Problem> {
    (denominator != 0).then(|| build_fraction_to_decimal(problem_id, tier, numerator, denominator))
}

fn build_fraction_to_decimal(problem_id: String, tier: Tier, numerator: i64, denominator: i64) -> Problem {
    let mut operands = Operands::new()
        .with("numerator", numerator)
        .with("denominator", denominator);

    let (prompt, expected) = match power_of_ten_scale(denominator) {
        Some((places, scale_factor)) => {
            let decimal = Decimal::new(numerator * scale_factor, places);
            operands = operands
                .with("scale_factor", scale_factor)
                .with("power_of_ten", 10i64.pow(places))
                .with("scaled_numerator", numerator * scale_factor)
                .with("decimal", decimal);
            let prompt = Prompt::new("Write {fraction} as a decimal.")
                .bind("fraction", Fraction { numerator, denominator });
            (prompt, tolerant(decimal.to_f64(), 0.0001))
        }
        None => {
            let rounded = Decimal::new(
                rounded_quotient(numerator, denominator, ROUNDED_PLACES),
                ROUNDED_PLACES,
            );
            let long_division = Decimal::new(
                numerator * 10i64.pow(ROUNDED_PLACES + 1) / denominator,
                ROUNDED_PLACES + 1,
            );
            operands = operands
                .with("long_division", long_division)
                .with("rounded", rounded)
                .with("places", i64::from(ROUNDED_PLACES));
            let prompt = Prompt::new("Write {fraction} as a decimal rounded to {places} decimal places.")
                .bind("fraction", Fraction { numerator, denominator })
                .bind("places", ROUNDED_PLACES);
            (prompt, tolerant(rounded.to_f64(), 0.0005))
        }
    };

    problem(problem_id, ProblemKind::FractionToDecimal, tier, prompt, operands, expected)
}

/// `(places, factor)` with `denominator * factor == 10^places`, if one exists
/// within four places.
fn power_of_ten_scale(denominator: i64) -> Option<(u32, i64)> {
    (1..=4u32).find_map(|places| {
        let power = 10i64.pow(places);
        (power % denominator == 0).then(|| (places, power / denominator))
    })
}

// ---------------------------------------------------------------------------
// SH: shaded fraction
// ---------------------------------------------------------------------------

pub fn generate_shaded_fraction<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let (parts, shaded) = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner => {
            let parts = rng.gen_range(2..=6);
            (parts, rng.gen_range(1..parts))
        }
        DifficultyLevel::Intermediate => {
            let parts = rng.gen_range(4..=12);
            (parts, rng.gen_range(1..parts))
        }
        DifficultyLevel::Advanced => {
            // Always simplifiable: scale a smaller fraction up.
            let base = rng.gen_range(2..=8);
            let k = rng.gen_range(2..=3);
            (base * k, rng.gen_range(1..base) * k)
        }
    };
    shaded_fraction(problem_id, tier, parts, shaded)
}

pub fn shaded_fraction(problem_id: String, tier: Tier, parts: i64, shaded: i64) -> Problem {
    let as_written = Fraction { numerator: shaded, denominator: parts };
    let prompt = Prompt::new(
        "A bar is split into {parts} equal parts and {shaded} of them are shaded. \
         What fraction of the bar is shaded?",
    )
    .bind("parts", parts)
    .bind("shaded", shaded);
    let operands = Operands::new()
        .with("parts", parts)
        .with("shaded", shaded)
        .with("common_factor", gcd(shaded, parts))
        .with("simplest", as_written.reduced());

    problem(
        problem_id, ProblemKind::ShadedFraction, tier,
        prompt, operands, ExpectedAnswer::FractionEquivalence(as_written),
    )
}

// ---------------------------------------------------------------------------
// SF: simplify fraction
// ---------------------------------------------------------------------------

pub fn generate_simplify<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let (denominators, multipliers) = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner     => (2..=5, 2..=3),
        DifficultyLevel::Intermediate => (3..=9, 2..=6),
        DifficultyLevel::Advanced     => (5..=12, 4..=12),
    };
    let q: i64 = rng.gen_range(denominators);
    let p = sample_or_else(
        rng,
        "base fraction must be in lowest terms",
        DEFAULT_RETRY_BUDGET,
        |r| r.gen_range(1..q),
        |p| gcd(*p, q) == 1,
        || 1,
    );
    let k: i64 = rng.gen_range(multipliers);
    build_simplify(problem_id, tier, p * k, q * k)
}

/// Fixed-operand constructor; `None` when `denominator` is zero.
pub fn simplify_fraction(
    problem_id: String, tier: Tier, numerator: i64, denominator: i64,
) -> Option<Problem> {
    (denominator != 0).then(|| build_simplify(problem_id, tier, numerator, denominator))
}

fn build_simplify(problem_id: String, tier: Tier, numerator: i64, denominator: i64) -> Problem {
    let common = gcd(numerator, denominator).max(1);
    let simplest = Fraction { numerator, denominator }.reduced();
    let prompt = Prompt::new("Write {fraction} in its simplest form (numerator/denominator).")
        .bind("fraction", Fraction { numerator, denominator });
    let operands = Operands::new()
        .with("numerator", numerator)
        .with("denominator", denominator)
        .with("common_factor", common)
        .with("simplest", simplest);
    let expected = ExpectedAnswer::OrderedTuple {
        values: vec![simplest.numerator, simplest.denominator],
        alternates: Vec::new(),
    };

    problem(problem_id, ProblemKind::SimplifyFraction, tier, prompt, operands, expected)
}

// ---------------------------------------------------------------------------
// FC: fraction comparison
// ---------------------------------------------------------------------------

fn random_fraction<R: Rng>(rng: &mut R, max_denominator: i64) -> Fraction {
    let denominator = rng.gen_range(2..=max_denominator);
    Fraction { numerator: rng.gen_range(1..denominator), denominator }
}

fn cross(left: Fraction, right: Fraction) -> (i64, i64) {
    (left.numerator * right.denominator, right.numerator * left.denominator)
}

pub fn generate_comparison<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let level = DifficultyLevel::from_tier(tier);
    let max_denominator = match level {
        DifficultyLevel::Beginner     => 6,
        DifficultyLevel::Intermediate => 10,
        DifficultyLevel::Advanced     => 12,
    };

    let left = random_fraction(rng, max_denominator);
    let allow_equal = level != DifficultyLevel::Beginner;

    if allow_equal && rng.gen_bool(0.25) {
        let k = rng.gen_range(2..=3);
        let right = Fraction { numerator: left.numerator * k, denominator: left.denominator * k };
        return fraction_comparison(problem_id, tier, left, right);
    }

    let right = sample_or_else(
        rng,
        "denominators must differ (and values too at beginner level)",
        DEFAULT_RETRY_BUDGET,
        |r| random_fraction(r, max_denominator),
        |f| {
            let (a, b) = cross(left, *f);
            f.denominator != left.denominator && (allow_equal || a != b)
        },
        || {
            // One more part than `left` over a denominator one larger.
            let denominator = left.denominator + 1;
            Fraction { numerator: (left.numerator + 1).min(denominator - 1), denominator }
        },
    );
    fraction_comparison(problem_id, tier, left, right)
}

pub fn fraction_comparison(problem_id: String, tier: Tier, left: Fraction, right: Fraction) -> Problem {
    let (cross_left, cross_right) = cross(left, right);
    let relation = match cross_left.cmp(&cross_right) {
        std::cmp::Ordering::Less    => "<",
        std::cmp::Ordering::Equal   => "=",
        std::cmp::Ordering::Greater => ">",
    };
    let prompt = Prompt::new("Compare {left} and {right}. Answer with <, > or =.")
        .bind("left", left)
        .bind("right", right);
    let operands = Operands::new()
        .with("left", left)
        .with("right", right)
        .with("cross_left", cross_left)
        .with("cross_right", cross_right)
        .with("relation", relation);

    problem(problem_id, ProblemKind::FractionComparison, tier, prompt, operands, exact_text(relation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn terminating_fraction_records_scale_factor() {
        let p = fraction_to_decimal("FD-TEST".into(), 2, 3, 8).unwrap();
        assert_eq!(p.operands.int("scale_factor"), Some(125));
        assert_eq!(p.operands.decimal("decimal"), Some(Decimal::new(375, 3)));
        assert_eq!(p.expected, ExpectedAnswer::ScalarTolerant { value: 0.375, epsilon: 0.0001 });
    }

    #[test]
    fn repeating_fraction_is_rounded() {
        let p = fraction_to_decimal("FD-TEST".into(), 3, 5, 6).unwrap();
        assert_eq!(p.operands.decimal("rounded"), Some(Decimal::new(833, 3)));
        assert_eq!(p.operands.decimal("long_division"), Some(Decimal::new(8333, 4)));
    }

    #[test]
    fn zero_denominator_builds_nothing() {
        assert_eq!(fraction_to_decimal("FD-TEST".into(), 1, 1, 0), None);
        assert_eq!(simplify_fraction("SF-TEST".into(), 1, 4, 0), None);
        let p = simplify_fraction("SF-TEST".into(), 2, 6, 8).unwrap();
        assert_eq!(p.operands.fraction("simplest"), Some(Fraction { numerator: 3, denominator: 4 }));
    }

    #[test]
    fn advanced_fractions_never_terminate() {
        for seed in 0..100u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = generate_fraction_to_decimal(&mut rng, 3, "FD-TEST".into());
            let n = p.operands.int("numerator").unwrap();
            let d = p.operands.int("denominator").unwrap();
            assert!(0 < n && n < d);
            assert!(!is_terminating(n, d), "{n}/{d} terminates");
        }
    }

    #[test]
    fn simplify_targets_are_reducible() {
        for seed in 0..100u64 {
            for tier in 1..=3 {
                let mut rng = StdRng::seed_from_u64(seed);
                let p = generate_simplify(&mut rng, tier, "SF-TEST".into());
                let n = p.operands.int("numerator").unwrap();
                let d = p.operands.int("denominator").unwrap();
                assert!(gcd(n, d) > 1, "{n}/{d} is already simplest");
            }
        }
    }

    #[test]
    fn beginner_comparisons_are_never_equal() {
        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = generate_comparison(&mut rng, 1, "FC-TEST".into());
            assert_ne!(p.operands.text("relation"), Some("="));
            let left = p.operands.fraction("left").unwrap();
            let right = p.operands.fraction("right").unwrap();
            assert_ne!(left.denominator, right.denominator);
        }
    }
}
