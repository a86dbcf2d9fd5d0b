//! Answer parsing and checking.
//!
//! [`parse`] turns a learner's raw text into the typed value the expected
//! answer asks for and fails closed with [`MalformedInput`]. [`check`] is the
//! single dispatch point that compares a parsed value against an
//! [`ExpectedAnswer`] of any shape.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::practice_engine::models::{
    AnswerShape, ExpectedAnswer, ExpectedField, Fraction, ParsedField, ParsedValue, RawAnswer,
    Scalar,
};

/// Absolute slack added to tolerant comparisons so inputs sitting exactly on
/// the boundary survive binary rounding (`|5.41 - 5.4|` is a hair over 0.01).
const BOUNDARY_SLACK: f64 = 1e-9;

/// The answer could not be read; the learner should re-enter it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedInput {
    #[error("no answer was entered")]
    Empty,
    #[error("`{0}` is not a whole number")]
    NotAnInteger(String),
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("`{0}` is not a fraction like 3/4")]
    NotAFraction(String),
    #[error("a fraction cannot have a zero denominator")]
    ZeroDenominator,
    #[error("expected {expected} values, got {found}")]
    WrongArity { expected: usize, found: usize },
    #[error("missing an answer for `{0}`")]
    MissingField(String),
    #[error("`{0}` is not one of the answer fields")]
    UnknownField(String),
    #[error("`{0}` should look like name=value")]
    BadFieldEntry(String),
    #[error("answer should be a {expected}")]
    ShapeMismatch { expected: AnswerShape },
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckDetail {
    Exact { expected: Scalar },
    Tolerance { difference: f64, epsilon: f64 },
    Fraction { submitted: Fraction, simplest: Fraction },
    /// Positions (0-based) that differ from the primary tuple.
    Tuple { mismatched_positions: Vec<usize>, matched_alternate: bool },
    Set { missed: BTreeSet<i64>, incorrect: BTreeSet<i64> },
    Fields(Vec<FieldVerdict>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVerdict {
    pub name: String,
    pub correct: bool,
    pub detail: CheckDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub detail: CheckDetail,
}

impl Verdict {
    /// `(correct fields, total fields)` for multi-field answers, `(0|1, 1)`
    /// otherwise.
    pub fn partial_credit(&self) -> (usize, usize) {
        match &self.detail {
            CheckDetail::Fields(fields) => {
                (fields.iter().filter(|f| f.correct).count(), fields.len())
            }
            _ => (usize::from(self.correct), 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `raw` into the shape `expected` asks for.
pub fn parse(raw: &RawAnswer, expected: &ExpectedAnswer) -> Result<ParsedValue, MalformedInput> {
    match (expected, raw) {
        (ExpectedAnswer::MultiField(fields), RawAnswer::Fields(entries)) => {
            parse_fields(entries, fields)
        }
        (ExpectedAnswer::MultiField(fields), RawAnswer::Text(text)) => {
            parse_fields(&split_field_text(text)?, fields)
        }
        (_, RawAnswer::Fields(_)) => Err(MalformedInput::ShapeMismatch { expected: expected.shape() }),
        (_, RawAnswer::Text(text)) => parse_text(text, expected),
    }
}

fn parse_text(text: &str, expected: &ExpectedAnswer) -> Result<ParsedValue, MalformedInput> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MalformedInput::Empty);
    }
    match expected {
        ExpectedAnswer::ScalarExact(Scalar::Int(_)) => parse_int(text).map(ParsedValue::Int),
        ExpectedAnswer::ScalarExact(Scalar::Text(_)) => Ok(ParsedValue::Text(normalize_text(text))),
        ExpectedAnswer::ScalarTolerant { .. } => parse_number(text).map(ParsedValue::Number),
        ExpectedAnswer::FractionEquivalence(_) => parse_fraction(text).map(ParsedValue::Fraction),
        ExpectedAnswer::OrderedTuple { values, .. } => {
            let items = parse_list(text)?;
            if items.len() != values.len() {
                return Err(MalformedInput::WrongArity { expected: values.len(), found: items.len() });
            }
            Ok(ParsedValue::Tuple(items))
        }
        ExpectedAnswer::UnorderedSet(_) => {
            parse_list(text).map(|items| ParsedValue::Set(items.into_iter().collect()))
        }
        ExpectedAnswer::MultiField(fields) => parse_fields(&split_field_text(text)?, fields),
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_ascii_lowercase()
}

fn parse_int(text: &str) -> Result<i64, MalformedInput> {
    let cleaned = text.trim().trim_end_matches('°').trim();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned);
    if cleaned.is_empty() {
        return Err(MalformedInput::Empty);
    }
    cleaned.parse::<i64>().map_err(|_| MalformedInput::NotAnInteger(text.to_string()))
}

fn parse_number(text: &str) -> Result<f64, MalformedInput> {
    let cleaned = text.trim();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MalformedInput::NotANumber(text.to_string())),
    }
}

/// `a/b`, or a whole number read as `n/1`.
fn parse_fraction(text: &str) -> Result<Fraction, MalformedInput> {
    let not_a_fraction = || MalformedInput::NotAFraction(text.to_string());
    let (numerator, denominator) = match text.split_once('/') {
        Some((n, d)) => (
            parse_int(n).map_err(|_| not_a_fraction())?,
            parse_int(d).map_err(|_| not_a_fraction())?,
        ),
        None => (parse_int(text).map_err(|_| not_a_fraction())?, 1),
    };
    Fraction::new(numerator, denominator).ok_or(MalformedInput::ZeroDenominator)
}

/// Whole numbers separated by commas, semicolons, slashes, `x`, `×` or
/// whitespace, optionally wrapped in brackets.
fn parse_list(text: &str) -> Result<Vec<i64>, MalformedInput> {
    let inner = text
        .trim()
        .trim_start_matches(['(', '[', '{'])
        .trim_end_matches([')', ']', '}']);
    let items: Vec<&str> = inner
        .split(|c: char| c == ',' || c == ';' || c == '/' || c == 'x' || c == '×' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err(MalformedInput::Empty);
    }
    items.into_iter().map(parse_int).collect()
}

/// `name=value` (or `name: value`) entries separated by `;` or newlines.
fn split_field_text(text: &str) -> Result<BTreeMap<String, String>, MalformedInput> {
    let mut entries = BTreeMap::new();
    for entry in text.split(|c: char| c == ';' || c == '\n').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, value) = entry
            .split_once('=')
            .or_else(|| entry.split_once(':'))
            .ok_or_else(|| MalformedInput::BadFieldEntry(entry.to_string()))?;
        entries.insert(name.trim().to_string(), value.trim().to_string());
    }
    if entries.is_empty() {
        return Err(MalformedInput::Empty);
    }
    Ok(entries)
}

fn parse_fields(
    entries: &BTreeMap<String, String>, fields: &[ExpectedField],
) -> Result<ParsedValue, MalformedInput> {
    let normalized: BTreeMap<String, &String> =
        entries.iter().map(|(k, v)| (normalize_text(k), v)).collect();

    if let Some(unknown) = normalized.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
        return Err(MalformedInput::UnknownField(unknown.clone()));
    }

    fields
        .iter()
        .map(|field| {
            let text = normalized
                .get(&field.name)
                .ok_or_else(|| MalformedInput::MissingField(field.name.clone()))?;
            let value = parse_text(text, &field.answer)?;
            Ok(ParsedField { name: field.name.clone(), value })
        })
        .collect::<Result<Vec<_>, MalformedInput>>()
        .map(ParsedValue::Fields)
}

// ---------------------------------------------------------------------------
// Checking
// ---------------------------------------------------------------------------

fn verdict(correct: bool, detail: CheckDetail) -> Verdict {
    Verdict { correct, detail }
}

/// Inclusive tolerance test: `|a - b| <= epsilon`.
pub fn within_tolerance(a: f64, b: f64, epsilon: f64) -> bool {
    // A few ulps of the operands, so the slack never grows into epsilon's range.
    let ulps = 4.0 * f64::EPSILON * a.abs().max(b.abs());
    (a - b).abs() <= epsilon + BOUNDARY_SLACK.max(ulps)
}

/// `a/b == c/d` by cross-multiplication; never divides.
pub fn fractions_equivalent(a: Fraction, b: Fraction) -> Result<bool, MalformedInput> {
    if a.denominator == 0 || b.denominator == 0 {
        return Err(MalformedInput::ZeroDenominator);
    }
    Ok(i128::from(a.numerator) * i128::from(b.denominator)
        == i128::from(b.numerator) * i128::from(a.denominator))
}

/// Compare a parsed value against the expected answer.
///
/// A value of the wrong shape is reported as [`MalformedInput::ShapeMismatch`]
/// rather than as a wrong answer.
pub fn check(submitted: &ParsedValue, expected: &ExpectedAnswer) -> Result<Verdict, MalformedInput> {
    let mismatch = || MalformedInput::ShapeMismatch { expected: expected.shape() };

    match (expected, submitted) {
        (ExpectedAnswer::ScalarExact(Scalar::Int(want)), ParsedValue::Int(got)) => Ok(verdict(
            want == got,
            CheckDetail::Exact { expected: Scalar::Int(*want) },
        )),

        (ExpectedAnswer::ScalarExact(Scalar::Text(want)), ParsedValue::Text(got)) => Ok(verdict(
            normalize_text(want) == normalize_text(got),
            CheckDetail::Exact { expected: Scalar::Text(want.clone()) },
        )),

        (ExpectedAnswer::ScalarTolerant { value, epsilon }, ParsedValue::Number(got)) => {
            Ok(verdict(
                within_tolerance(*got, *value, *epsilon),
                CheckDetail::Tolerance { difference: (got - value).abs(), epsilon: *epsilon },
            ))
        }

        (ExpectedAnswer::ScalarTolerant { value, epsilon }, ParsedValue::Int(got)) => {
            check(&ParsedValue::Number(*got as f64), &ExpectedAnswer::ScalarTolerant {
                value: *value,
                epsilon: *epsilon,
            })
        }

        (ExpectedAnswer::FractionEquivalence(want), ParsedValue::Fraction(got)) => Ok(verdict(
            fractions_equivalent(*got, *want)?,
            CheckDetail::Fraction { submitted: *got, simplest: want.reduced() },
        )),

        (ExpectedAnswer::OrderedTuple { values, alternates }, ParsedValue::Tuple(got)) => {
            if got.len() != values.len() {
                return Err(MalformedInput::WrongArity { expected: values.len(), found: got.len() });
            }
            let mismatched_positions: Vec<usize> = values
                .iter()
                .zip(got)
                .enumerate()
                .filter(|(_, (want, have))| want != have)
                .map(|(i, _)| i)
                .collect();
            let matched_alternate =
                !mismatched_positions.is_empty() && alternates.iter().any(|alt| alt == got);
            Ok(verdict(
                mismatched_positions.is_empty() || matched_alternate,
                CheckDetail::Tuple { mismatched_positions, matched_alternate },
            ))
        }

        (ExpectedAnswer::UnorderedSet(want), ParsedValue::Set(got)) => {
            let missed: BTreeSet<i64> = want.difference(got).copied().collect();
            let incorrect: BTreeSet<i64> = got.difference(want).copied().collect();
            Ok(verdict(missed.is_empty() && incorrect.is_empty(), CheckDetail::Set { missed, incorrect }))
        }

        (ExpectedAnswer::MultiField(fields), ParsedValue::Fields(got)) => {
            if let Some(extra) = got.iter().find(|g| !fields.iter().any(|f| f.name == g.name)) {
                return Err(MalformedInput::UnknownField(extra.name.clone()));
            }
            let verdicts = fields
                .iter()
                .map(|field| {
                    let submitted = got
                        .iter()
                        .find(|g| g.name == field.name)
                        .ok_or_else(|| MalformedInput::MissingField(field.name.clone()))?;
                    let v = check(&submitted.value, &field.answer)?;
                    Ok(FieldVerdict { name: field.name.clone(), correct: v.correct, detail: v.detail })
                })
                .collect::<Result<Vec<_>, MalformedInput>>()?;
            let all_correct = verdicts.iter().all(|v| v.correct);
            Ok(verdict(all_correct, CheckDetail::Fields(verdicts)))
        }

        _ => Err(mismatch()),
    }
}

/// Parse then check.
pub fn validate(
    raw: &RawAnswer, expected: &ExpectedAnswer,
) -> Result<(ParsedValue, Verdict), MalformedInput> {
    let parsed = parse(raw, expected)?;
    let verdict = check(&parsed, expected)?;
    Ok((parsed, verdict))
}
