use rand::Rng;
use crate::practice_engine::{
    helpers::{align, exact_int, field, problem, tolerant, trim_decimal},
    models::{
        Decimal, DifficultyLevel, ExpectedAnswer, Operands, Problem, ProblemKind, Prompt, Tier,
    },
};

// ---------------------------------------------------------------------------
// DA: decimal addition
// ---------------------------------------------------------------------------

pub fn generate_decimal_addition<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    // (places, units range) for each addend
    let ((pa, ra), (pb, rb)) = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner     => ((1, 1..=99), (1, 1..=99)),
        DifficultyLevel::Intermediate => ((2, 100..=9_999), (1, 1..=999)),
        DifficultyLevel::Advanced     => ((3, 1_000..=99_999), (2, 100..=9_999)),
    };
    let a = Decimal::new(rng.gen_range(ra), pa);
    let b = Decimal::new(rng.gen_range(rb), pb);
    decimal_addition(problem_id, tier, a, b)
}

/// Build a decimal addition problem from fixed addends.
///
/// The tolerance is one unit in the place after the last digit of the sum, so
/// `2.3 + 3.1` accepts answers within `0.01` of `5.4`.
pub fn decimal_addition(problem_id: String, tier: Tier, a: Decimal, b: Decimal) -> Problem {
    let places = a.places.max(b.places);
    let aligned_a = align(a, places);
    let aligned_b = align(b, places);
    let sum = Decimal::new(aligned_a.units + aligned_b.units, places);
    let answer = trim_decimal(sum);
    let epsilon = 10f64.powi(-(places as i32 + 1));

    let prompt = Prompt::new("What is {a} + {b}?").bind("a", a).bind("b", b);
    let operands = Operands::new()
        .with("addend_a", a)
        .with("addend_b", b)
        .with("places", i64::from(places))
        .with("aligned_a", aligned_a)
        .with("aligned_b", aligned_b)
        .with("sum", sum)
        .with("answer", answer);

    problem(
        problem_id, ProblemKind::DecimalAddition, tier,
        prompt, operands, tolerant(answer.to_f64(), epsilon),
    )
}

// ---------------------------------------------------------------------------
// DD: distributive decomposition
// ---------------------------------------------------------------------------

pub fn generate_distributive<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let (factor, round_part) = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner     => (rng.gen_range(2..=5), rng.gen_range(1..=9i64) * 10),
        DifficultyLevel::Intermediate => (rng.gen_range(6..=9), rng.gen_range(1..=9i64) * 10),
        DifficultyLevel::Advanced     => (rng.gen_range(3..=9), rng.gen_range(10..=99i64) * 10),
    };
    // Non-zero so the split always has two real parts.
    let ones_part = rng.gen_range(1..=9i64);
    distributive(problem_id, tier, factor, round_part, ones_part)
}

pub fn distributive(
    problem_id: String, tier: Tier, factor: i64, round_part: i64, ones_part: i64,
) -> Problem {
    let multiplicand = round_part + ones_part;
    let round_product = factor * round_part;
    let ones_product = factor * ones_part;
    let total = round_product + ones_product;

    let prompt = Prompt::new(
        "Work out {factor} × {multiplicand} by splitting {multiplicand} into \
         {round_part} + {ones_part}. Give {factor} × {round_part} (round_product), \
         {factor} × {ones_part} (ones_product) and the total.",
    )
    .bind("factor", factor)
    .bind("multiplicand", multiplicand)
    .bind("round_part", round_part)
    .bind("ones_part", ones_part);

    let operands = Operands::new()
        .with("factor", factor)
        .with("multiplicand", multiplicand)
        .with("round_part", round_part)
        .with("ones_part", ones_part)
        .with("round_product", round_product)
        .with("ones_product", ones_product)
        .with("total", total);

    let expected = ExpectedAnswer::MultiField(vec![
        field("round_product", exact_int(round_product)),
        field("ones_product", exact_int(ones_product)),
        field("total", exact_int(total)),
    ]);

    problem(problem_id, ProblemKind::DistributiveDecomposition, tier, prompt, operands, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fixed_addends_produce_expected_sum() {
        let p = decimal_addition("DA-TEST".into(), 1, Decimal::new(23, 1), Decimal::new(31, 1));
        assert_eq!(p.prompt.render(), "What is 2.3 + 3.1?");
        assert_eq!(p.expected, ExpectedAnswer::ScalarTolerant { value: 5.4, epsilon: 0.01 });
        assert_eq!(p.operands.decimal("answer"), Some(Decimal::new(54, 1)));
    }

    #[test]
    fn mixed_places_are_aligned() {
        let p = decimal_addition("DA-TEST".into(), 2, Decimal::new(1205, 2), Decimal::new(37, 1));
        assert_eq!(p.operands.decimal("aligned_b"), Some(Decimal::new(370, 2)));
        assert_eq!(p.operands.decimal("sum"), Some(Decimal::new(1575, 2)));
        assert_eq!(p.tolerance(), Some(0.001));
    }

    #[test]
    fn distributive_parts_add_up() {
        for seed in 0..50u64 {
            for tier in 1..=3 {
                let mut rng = StdRng::seed_from_u64(seed);
                let p = generate_distributive(&mut rng, tier, "DD-TEST".into());
                let ops = &p.operands;
                let factor = ops.int("factor").unwrap();
                let multiplicand = ops.int("multiplicand").unwrap();
                assert_eq!(ops.int("total"), Some(factor * multiplicand));
                assert_eq!(ops.int("round_part").unwrap() % 10, 0);
                assert_ne!(ops.int("ones_part"), Some(0));
            }
        }
    }
}
