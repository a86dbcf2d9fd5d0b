//! Worked explanations rebuilt from a problem's operands.
//!
//! [`build`] reads nothing but `problem.kind` and `problem.operands`, so the
//! same problem always explains the same way and no rng is involved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::practice_engine::{
    helpers::place_name,
    models::{Decimal, Fraction, Operands, Problem, ProblemKind},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplanationError {
    #[error("{kind} problem is missing operand `{name}`")]
    MissingOperand { kind: ProblemKind, name: &'static str },
    #[error("{kind} problem has an unusable value for operand `{name}`")]
    InvalidOperand { kind: ProblemKind, name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub label: String,
    pub text: String,
}

pub type Steps = Vec<Step>;

fn step(label: &str, text: String) -> Step {
    Step { label: label.to_string(), text }
}

/// Typed operand lookup that names the missing or unusable operand on failure.
struct Inputs<'a> {
    kind: ProblemKind,
    operands: &'a Operands,
}

impl<'a> Inputs<'a> {
    fn missing(&self, name: &'static str) -> ExplanationError {
        ExplanationError::MissingOperand { kind: self.kind, name }
    }

    fn int(&self, name: &'static str) -> Result<i64, ExplanationError> {
        self.operands.int(name).ok_or_else(|| self.missing(name))
    }

    /// An integer that is later used as a divisor.
    fn nonzero(&self, name: &'static str) -> Result<i64, ExplanationError> {
        match self.int(name)? {
            0 => Err(ExplanationError::InvalidOperand { kind: self.kind, name }),
            v => Ok(v),
        }
    }

    fn decimal(&self, name: &'static str) -> Result<Decimal, ExplanationError> {
        self.operands.decimal(name).ok_or_else(|| self.missing(name))
    }

    fn fraction(&self, name: &'static str) -> Result<Fraction, ExplanationError> {
        self.operands.fraction(name).ok_or_else(|| self.missing(name))
    }

    fn list(&self, name: &'static str) -> Result<&'a [i64], ExplanationError> {
        self.operands.list(name).ok_or_else(|| self.missing(name))
    }

    fn text(&self, name: &'static str) -> Result<&'a str, ExplanationError> {
        self.operands.text(name).ok_or_else(|| self.missing(name))
    }
}

/// Ordered solution steps for `problem`.
pub fn build(problem: &Problem) -> Result<Steps, ExplanationError> {
    let inputs = Inputs { kind: problem.kind, operands: &problem.operands };
    match problem.kind {
        ProblemKind::DecimalAddition           => decimal_addition(&inputs),
        ProblemKind::DistributiveDecomposition => distributive(&inputs),
        ProblemKind::QuotientPairSelection     => quotient_pairs(&inputs),
        ProblemKind::FractionToDecimal         => fraction_to_decimal(&inputs),
        ProblemKind::ShadedFraction            => shaded_fraction(&inputs),
        ProblemKind::SimplifyFraction          => simplify(&inputs),
        ProblemKind::FractionComparison        => comparison(&inputs),
        ProblemKind::RectangleDimensions       => rectangle(&inputs),
        ProblemKind::TriangleMissingAngle      => triangle(&inputs),
    }
}

fn decimal_addition(i: &Inputs) -> Result<Steps, ExplanationError> {
    let a = i.decimal("addend_a")?;
    let b = i.decimal("addend_b")?;
    let aligned_a = i.decimal("aligned_a")?;
    let aligned_b = i.decimal("aligned_b")?;
    let sum = i.decimal("sum")?;
    let answer = i.decimal("answer")?;
    let unit = place_name(sum.places);

    let mut steps = Vec::new();
    if aligned_a != a || aligned_b != b {
        steps.push(step(
            "Line up",
            format!("Give both numbers the same number of decimal places: {aligned_a} and {aligned_b}."),
        ));
    } else {
        steps.push(step(
            "Line up",
            format!("Write {a} above {b} with the decimal points lined up."),
        ));
    }
    steps.push(step(
        "Add",
        format!(
            "Add the {unit}: {} + {} = {} {unit}.",
            aligned_a.units, aligned_b.units, sum.units
        ),
    ));
    steps.push(step("Place the point", format!("{} {unit} is {sum}.", sum.units)));
    if answer != sum {
        steps.push(step("Tidy", format!("Dropping trailing zeros, {sum} = {answer}.")));
    }
    steps.push(step("Answer", format!("{a} + {b} = {answer}")));
    Ok(steps)
}

fn distributive(i: &Inputs) -> Result<Steps, ExplanationError> {
    let factor = i.int("factor")?;
    let multiplicand = i.int("multiplicand")?;
    let round_part = i.int("round_part")?;
    let ones_part = i.int("ones_part")?;
    let round_product = i.int("round_product")?;
    let ones_product = i.int("ones_product")?;
    let total = i.int("total")?;

    Ok(vec![
        step("Split", format!("{multiplicand} = {round_part} + {ones_part}")),
        step("Multiply", format!("{factor} × {round_part} = {round_product}")),
        step("Multiply", format!("{factor} × {ones_part} = {ones_product}")),
        step("Add", format!("{round_product} + {ones_product} = {total}")),
        step("Answer", format!("{factor} × {multiplicand} = {total}")),
    ])
}

fn quotient_pairs(i: &Inputs) -> Result<Steps, ExplanationError> {
    let divisor = i.nonzero("divisor")?;
    let pool = i.list("pool")?;
    let multiples = i.list("multiples")?;

    let mut steps: Steps = pool
        .iter()
        .map(|&n| {
            let (q, r) = (n / divisor, n % divisor);
            if r == 0 {
                step("Divides", format!("{n} ÷ {divisor} = {q} exactly."))
            } else {
                step("Remainder", format!("{n} ÷ {divisor} = {q} remainder {r}."))
            }
        })
        .collect();
    let listed = multiples.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", ");
    steps.push(step("Answer", format!("Divisible by {divisor}: {listed}")));
    Ok(steps)
}

fn fraction_to_decimal(i: &Inputs) -> Result<Steps, ExplanationError> {
    let numerator = i.int("numerator")?;
    let denominator = i.nonzero("denominator")?;

    if let Ok(scale_factor) = i.int("scale_factor") {
        let power = i.int("power_of_ten")?;
        let scaled = i.int("scaled_numerator")?;
        let decimal = i.decimal("decimal")?;
        return Ok(vec![
            step(
                "Scale",
                format!("{denominator} × {scale_factor} = {power}, so multiply top and bottom by {scale_factor}."),
            ),
            step("Rewrite", format!("{numerator}/{denominator} = {scaled}/{power}")),
            step("Read off", format!("{scaled} {} = {decimal}", place_name(decimal.places))),
            step("Answer", format!("{numerator}/{denominator} = {decimal}")),
        ]);
    }

    let long_division = i.decimal("long_division")?;
    let rounded = i.decimal("rounded")?;
    let places = i.int("places")?;
    Ok(vec![
        step(
            "Divide",
            format!("{denominator} does not go into a power of ten, so divide: {numerator} ÷ {denominator} = {long_division}…"),
        ),
        step("Round", format!("Rounded to {places} decimal places: {rounded}")),
        step("Answer", format!("{numerator}/{denominator} ≈ {rounded}")),
    ])
}

fn shaded_fraction(i: &Inputs) -> Result<Steps, ExplanationError> {
    let parts = i.int("parts")?;
    let shaded = i.int("shaded")?;
    let common = i.int("common_factor")?;
    let simplest = i.fraction("simplest")?;

    let mut steps = vec![
        step("Count", format!("{shaded} of the {parts} equal parts are shaded.")),
        step("Write", format!("Shaded fraction = {shaded}/{parts}")),
    ];
    if common > 1 {
        steps.push(step(
            "Simplify",
            format!("Both numbers divide by {common}, so {shaded}/{parts} = {simplest}. Either form is correct."),
        ));
    }
    steps.push(step("Answer", format!("{simplest}")));
    Ok(steps)
}

fn simplify(i: &Inputs) -> Result<Steps, ExplanationError> {
    let numerator = i.int("numerator")?;
    let denominator = i.int("denominator")?;
    let common = i.int("common_factor")?;
    let simplest = i.fraction("simplest")?;

    Ok(vec![
        step(
            "Common factor",
            format!("The greatest number dividing both {numerator} and {denominator} is {common}."),
        ),
        step(
            "Divide",
            format!(
                "{numerator} ÷ {common} = {}, {denominator} ÷ {common} = {}",
                simplest.numerator, simplest.denominator
            ),
        ),
        step("Answer", format!("{numerator}/{denominator} = {simplest}")),
    ])
}

fn comparison(i: &Inputs) -> Result<Steps, ExplanationError> {
    let left = i.fraction("left")?;
    let right = i.fraction("right")?;
    let cross_left = i.int("cross_left")?;
    let cross_right = i.int("cross_right")?;
    let relation = i.text("relation")?;

    Ok(vec![
        step(
            "Cross-multiply",
            format!(
                "{} × {} = {cross_left} and {} × {} = {cross_right}",
                left.numerator, right.denominator, right.numerator, left.denominator
            ),
        ),
        step("Compare", format!("{cross_left} {relation} {cross_right}")),
        step("Answer", format!("{left} {relation} {right}")),
    ])
}

fn rectangle(i: &Inputs) -> Result<Steps, ExplanationError> {
    let length = i.int("length")?;
    let width = i.int("width")?;
    let area = i.int("area")?;
    let perimeter = i.int("perimeter")?;
    let half = i.int("half_perimeter")?;

    Ok(vec![
        step("Half the perimeter", format!("length + width = {perimeter} ÷ 2 = {half}")),
        step("Area", format!("length × width = {area}")),
        step(
            "Search",
            format!("The two numbers that add to {half} and multiply to {area} are {length} and {width}."),
        ),
        step("Answer", format!("length {length}, width {width}")),
    ])
}

fn triangle(i: &Inputs) -> Result<Steps, ExplanationError> {
    let a = i.int("angle_a")?;
    let b = i.int("angle_b")?;
    let total = i.int("angle_sum")?;
    let known = i.int("known_sum")?;
    let missing = i.int("missing")?;

    Ok(vec![
        step("Angle sum", format!("The angles of a triangle add up to {total}°.")),
        step("Known angles", format!("{a}° + {b}° = {known}°")),
        step("Subtract", format!("{total}° − {known}° = {missing}°")),
        step("Answer", format!("{missing}°")),
    ])
}
