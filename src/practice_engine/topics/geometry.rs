use rand::Rng;
use crate::practice_engine::{
    helpers::{exact_int, problem},
    models::{DifficultyLevel, ExpectedAnswer, Operands, Problem, ProblemKind, Prompt, Tier},
};

// ---------------------------------------------------------------------------
// RD: rectangle dimensions from area and perimeter
// ---------------------------------------------------------------------------

pub fn generate_rectangle<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let max_side = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner     => 9,
        DifficultyLevel::Intermediate => 15,
        DifficultyLevel::Advanced     => 30,
    };
    let length = rng.gen_range(2..=max_side);
    let width = rng.gen_range(1..=length);
    rectangle(problem_id, tier, length, width)
}

/// Area and perimeter fix the pair of sides, so the only other valid answer
/// is the same pair swapped.
pub fn rectangle(problem_id: String, tier: Tier, length: i64, width: i64) -> Problem {
    let area = length * width;
    let perimeter = 2 * (length + width);
    let prompt = Prompt::new(
        "A rectangle has an area of {area} square units and a perimeter of {perimeter} units. \
         What are its length and width?",
    )
    .bind("area", area)
    .bind("perimeter", perimeter);
    let operands = Operands::new()
        .with("length", length)
        .with("width", width)
        .with("area", area)
        .with("perimeter", perimeter)
        .with("half_perimeter", length + width);

    let alternates = if length == width { Vec::new() } else { vec![vec![width, length]] };
    let expected = ExpectedAnswer::OrderedTuple { values: vec![length, width], alternates };

    problem(problem_id, ProblemKind::RectangleDimensions, tier, prompt, operands, expected)
}

// ---------------------------------------------------------------------------
// TA: missing angle of a triangle
// ---------------------------------------------------------------------------

const ANGLE_SUM: i64 = 180;

pub fn generate_triangle<R: Rng>(rng: &mut R, tier: Tier, problem_id: String) -> Problem {
    let step = match DifficultyLevel::from_tier(tier) {
        DifficultyLevel::Beginner     => 10,
        DifficultyLevel::Intermediate => 5,
        DifficultyLevel::Advanced     => 1,
    };
    let slots = ANGLE_SUM / step;
    // Leave at least one step for each of the other two angles.
    let a = rng.gen_range(1..=slots - 2);
    let b = rng.gen_range(1..=slots - 1 - a);
    triangle(problem_id, tier, a * step, b * step)
}

pub fn triangle(problem_id: String, tier: Tier, angle_a: i64, angle_b: i64) -> Problem {
    let known_sum = angle_a + angle_b;
    let missing = ANGLE_SUM - known_sum;
    let prompt = Prompt::new(
        "Two angles of a triangle are {a}° and {b}°. What is the third angle in degrees?",
    )
    .bind("a", angle_a)
    .bind("b", angle_b);
    let operands = Operands::new()
        .with("angle_a", angle_a)
        .with("angle_b", angle_b)
        .with("angle_sum", ANGLE_SUM)
        .with("known_sum", known_sum)
        .with("missing", missing);

    problem(problem_id, ProblemKind::TriangleMissingAngle, tier, prompt, operands, exact_int(missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn square_has_no_alternate() {
        let p = rectangle("RD-TEST".into(), 1, 4, 4);
        assert_eq!(
            p.expected,
            ExpectedAnswer::OrderedTuple { values: vec![4, 4], alternates: vec![] }
        );
    }

    #[test]
    fn triangle_angles_respect_step_and_sum() {
        for seed in 0..100u64 {
            for (tier, step) in [(1u8, 10i64), (2, 5), (3, 1)] {
                let mut rng = StdRng::seed_from_u64(seed);
                let p = generate_triangle(&mut rng, tier, "TA-TEST".into());
                let a = p.operands.int("angle_a").unwrap();
                let b = p.operands.int("angle_b").unwrap();
                let c = p.operands.int("missing").unwrap();
                assert_eq!(a + b + c, 180);
                for angle in [a, b, c] {
                    assert!(angle >= step && angle % step == 0, "{angle} breaks step {step}");
                }
            }
        }
    }
}
