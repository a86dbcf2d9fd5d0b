//! Shared builder functions used by the topic generators.
//!
//! Every generator assembles the same pieces: a prompt, a set of operands and
//! an expected answer. These helpers keep the topic files focused on the maths.

use crate::practice_engine::models::*;

/// Assemble the final [`Problem`]. This is the last call in every generator.
pub fn problem(
    id: String, kind: ProblemKind, tier: Tier,
    prompt: Prompt, operands: Operands, expected: ExpectedAnswer,
) -> Problem {
    debug_assert_eq!(expected.shape(), kind.answer_shape(), "answer shape is fixed by kind");
    Problem { id, kind, tier, prompt, operands, expected }
}

pub fn exact_int(value: i64) -> ExpectedAnswer {
    ExpectedAnswer::ScalarExact(Scalar::Int(value))
}

pub fn exact_text(value: &str) -> ExpectedAnswer {
    ExpectedAnswer::ScalarExact(Scalar::Text(value.to_string()))
}

pub fn tolerant(value: f64, epsilon: f64) -> ExpectedAnswer {
    ExpectedAnswer::ScalarTolerant { value, epsilon }
}

pub fn field(name: &str, answer: ExpectedAnswer) -> ExpectedField {
    ExpectedField { name: name.to_string(), answer }
}

/// Place-value name for `places` digits after the point.
pub fn place_name(places: u32) -> &'static str {
    match places {
        0 => "ones",
        1 => "tenths",
        2 => "hundredths",
        3 => "thousandths",
        _ => "ten-thousandths",
    }
}

/// Rewrite `d` with `places` digits after the point (`places >= d.places`).
pub fn align(d: Decimal, places: u32) -> Decimal {
    let shift = places.saturating_sub(d.places);
    Decimal::new(d.units * 10i64.pow(shift), places.max(d.places))
}

/// Drop trailing zeros after the decimal point.
pub fn trim_decimal(d: Decimal) -> Decimal {
    let mut out = d;
    while out.places > 0 && out.units % 10 == 0 {
        out = Decimal::new(out.units / 10, out.places - 1);
    }
    out
}

/// `round(numerator / denominator * 10^places)`, halves rounded up.
pub fn rounded_quotient(numerator: i64, denominator: i64, places: u32) -> i64 {
    let scaled = numerator * 10i64.pow(places);
    (2 * scaled + denominator) / (2 * denominator)
}

/// True when `numerator / denominator` has a finite decimal expansion.
pub fn is_terminating(numerator: i64, denominator: i64) -> bool {
    let mut d = Fraction { numerator, denominator }.reduced().denominator;
    for p in [2, 5] {
        while d % p == 0 {
            d /= p;
        }
    }
    d == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_pads_with_zeros() {
        assert_eq!(align(Decimal::new(31, 1), 2), Decimal::new(310, 2));
        assert_eq!(align(Decimal::new(310, 2), 1), Decimal::new(310, 2));
    }

    #[test]
    fn trim_drops_trailing_zeros() {
        assert_eq!(trim_decimal(Decimal::new(540, 2)), Decimal::new(54, 1));
        assert_eq!(trim_decimal(Decimal::new(1000, 3)), Decimal::new(1, 0));
    }

    #[test]
    fn rounding_and_termination() {
        assert_eq!(rounded_quotient(2, 3, 3), 667);
        assert_eq!(rounded_quotient(1, 3, 3), 333);
        assert!(is_terminating(3, 8));
        assert!(is_terminating(3, 6));
        assert!(!is_terminating(1, 6));
    }
}
