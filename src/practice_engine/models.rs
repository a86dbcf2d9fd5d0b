use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use serde::{Deserialize, Serialize};

/// Difficulty tier as seen by the host. Bounds are activity configuration.
pub type Tier = u8;

// ---------------------------------------------------------------------------
// Difficulty levels
// ---------------------------------------------------------------------------

/// The three value ranges every generator knows how to produce.
///
/// Tiers map onto levels: anything at or below 1 is `Beginner`, 2 is
/// `Intermediate`, and 3 or above is `Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            0 | 1 => DifficultyLevel::Beginner,
            2     => DifficultyLevel::Intermediate,
            _     => DifficultyLevel::Advanced,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Beginner     => write!(f, "Beginner"),
            DifficultyLevel::Intermediate => write!(f, "Intermediate"),
            DifficultyLevel::Advanced     => write!(f, "Advanced"),
        }
    }
}

// ---------------------------------------------------------------------------
// Problem kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProblemKind {
    DecimalAddition,
    DistributiveDecomposition,
    QuotientPairSelection,
    FractionToDecimal,
    ShadedFraction,
    SimplifyFraction,
    FractionComparison,
    RectangleDimensions,
    TriangleMissingAngle,
}

impl ProblemKind {
    /// Every kind in canonical order.
    pub const ALL: [ProblemKind; 9] = [
        ProblemKind::DecimalAddition,
        ProblemKind::DistributiveDecomposition,
        ProblemKind::QuotientPairSelection,
        ProblemKind::FractionToDecimal,
        ProblemKind::ShadedFraction,
        ProblemKind::SimplifyFraction,
        ProblemKind::FractionComparison,
        ProblemKind::RectangleDimensions,
        ProblemKind::TriangleMissingAngle,
    ];

    /// Two-letter prefix used in problem ids.
    pub fn prefix(self) -> &'static str {
        match self {
            ProblemKind::DecimalAddition           => "DA",
            ProblemKind::DistributiveDecomposition => "DD",
            ProblemKind::QuotientPairSelection     => "QP",
            ProblemKind::FractionToDecimal         => "FD",
            ProblemKind::ShadedFraction            => "SH",
            ProblemKind::SimplifyFraction          => "SF",
            ProblemKind::FractionComparison        => "FC",
            ProblemKind::RectangleDimensions       => "RD",
            ProblemKind::TriangleMissingAngle      => "TA",
        }
    }

    /// The answer shape this kind always produces.
    pub fn answer_shape(self) -> AnswerShape {
        match self {
            ProblemKind::DecimalAddition           => AnswerShape::ScalarTolerant,
            ProblemKind::DistributiveDecomposition => AnswerShape::MultiField,
            ProblemKind::QuotientPairSelection     => AnswerShape::UnorderedSet,
            ProblemKind::FractionToDecimal         => AnswerShape::ScalarTolerant,
            ProblemKind::ShadedFraction            => AnswerShape::FractionEquivalence,
            ProblemKind::SimplifyFraction          => AnswerShape::OrderedTuple,
            ProblemKind::FractionComparison        => AnswerShape::ScalarExact,
            ProblemKind::RectangleDimensions       => AnswerShape::OrderedTuple,
            ProblemKind::TriangleMissingAngle      => AnswerShape::ScalarExact,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProblemKind::DecimalAddition           => "Decimal Addition",
            ProblemKind::DistributiveDecomposition => "Distributive Decomposition",
            ProblemKind::QuotientPairSelection     => "Quotient Pair Selection",
            ProblemKind::FractionToDecimal         => "Fraction to Decimal",
            ProblemKind::ShadedFraction            => "Shaded Fraction",
            ProblemKind::SimplifyFraction          => "Simplify Fraction",
            ProblemKind::FractionComparison        => "Fraction Comparison",
            ProblemKind::RectangleDimensions       => "Rectangle Dimensions",
            ProblemKind::TriangleMissingAngle      => "Triangle Missing Angle",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Operand values
// ---------------------------------------------------------------------------

/// A fraction as written by the learner or the generator.
///
/// Fields are public; the validator rejects zero denominators wherever a
/// fraction takes part in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    /// `None` when the denominator is zero.
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        (denominator != 0).then_some(Fraction { numerator, denominator })
    }

    /// Lowest terms with a positive denominator.
    pub fn reduced(self) -> Self {
        let g = gcd(self.numerator, self.denominator).max(1);
        let sign = if self.denominator < 0 { -1 } else { 1 };
        Fraction {
            numerator: sign * self.numerator / g,
            denominator: sign * self.denominator / g,
        }
    }

    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Greatest common divisor of the absolute values; `gcd(0, 0) == 0`.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// An exact decimal stored as a scaled integer: `units / 10^places`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decimal {
    pub units: i64,
    pub places: u32,
}

impl Decimal {
    pub fn new(units: i64, places: u32) -> Self {
        Decimal { units, places }
    }

    pub fn scale(self) -> i64 {
        10i64.pow(self.places)
    }

    pub fn to_f64(self) -> f64 {
        self.units as f64 / self.scale() as f64
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.places == 0 {
            return write!(f, "{}", self.units);
        }
        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        let scale = self.scale().unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / scale,
            abs % scale,
            width = self.places as usize
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperandValue {
    Int(i64),
    Decimal(Decimal),
    Fraction(Fraction),
    List(Vec<i64>),
    Text(String),
}

impl fmt::Display for OperandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandValue::Int(v)      => write!(f, "{v}"),
            OperandValue::Decimal(d)  => write!(f, "{d}"),
            OperandValue::Fraction(x) => write!(f, "{x}"),
            OperandValue::List(vs)    => {
                let items: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", items.join(", "))
            }
            OperandValue::Text(t)     => write!(f, "{t}"),
        }
    }
}

impl From<i64> for OperandValue {
    fn from(v: i64) -> Self {
        OperandValue::Int(v)
    }
}

impl From<Decimal> for OperandValue {
    fn from(v: Decimal) -> Self {
        OperandValue::Decimal(v)
    }
}

impl From<Fraction> for OperandValue {
    fn from(v: Fraction) -> Self {
        OperandValue::Fraction(v)
    }
}

impl From<Vec<i64>> for OperandValue {
    fn from(v: Vec<i64>) -> Self {
        OperandValue::List(v)
    }
}

impl From<&str> for OperandValue {
    fn from(v: &str) -> Self {
        OperandValue::Text(v.to_string())
    }
}

/// Named values a problem was derived from.
///
/// Generators record every intermediate value here so explanations can be
/// rebuilt later without touching the rng.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operands(BTreeMap<String, OperandValue>);

impl Operands {
    pub fn new() -> Self {
        Operands(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<OperandValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperandValue> {
        self.0.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(OperandValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        match self.0.get(name) {
            Some(OperandValue::Decimal(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn fraction(&self, name: &str) -> Option<Fraction> {
        match self.0.get(name) {
            Some(OperandValue::Fraction(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[i64]> {
        match self.0.get(name) {
            Some(OperandValue::List(v)) => Some(v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(OperandValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperandValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// A prompt template with `{name}` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub template: String,
    pub bindings: BTreeMap<String, String>,
}

impl Prompt {
    pub fn new(template: impl Into<String>) -> Self {
        Prompt { template: template.into(), bindings: BTreeMap::new() }
    }

    pub fn bind(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.bindings.insert(name.to_string(), value.to_string());
        self
    }

    /// Substitute every bound placeholder. Unbound placeholders are left as-is.
    pub fn render(&self) -> String {
        self.bindings.iter().fold(self.template.clone(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v)  => write!(f, "{v}"),
            Scalar::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Discriminant of [`ExpectedAnswer`], handy for dispatch and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerShape {
    ScalarExact,
    ScalarTolerant,
    FractionEquivalence,
    OrderedTuple,
    UnorderedSet,
    MultiField,
}

impl fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnswerShape::ScalarExact         => "exact value",
            AnswerShape::ScalarTolerant      => "number",
            AnswerShape::FractionEquivalence => "fraction",
            AnswerShape::OrderedTuple        => "ordered list",
            AnswerShape::UnorderedSet        => "set of numbers",
            AnswerShape::MultiField          => "named fields",
        };
        write!(f, "{}", s)
    }
}

/// One named sub-answer of a [`ExpectedAnswer::MultiField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedField {
    pub name: String,
    pub answer: ExpectedAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpectedAnswer {
    ScalarExact(Scalar),
    /// Accepted when `|submitted - value| <= epsilon`.
    ScalarTolerant { value: f64, epsilon: f64 },
    FractionEquivalence(Fraction),
    /// `alternates` lists other tuples that are equally valid.
    OrderedTuple { values: Vec<i64>, alternates: Vec<Vec<i64>> },
    UnorderedSet(BTreeSet<i64>),
    MultiField(Vec<ExpectedField>),
}

impl ExpectedAnswer {
    pub fn shape(&self) -> AnswerShape {
        match self {
            ExpectedAnswer::ScalarExact(_)           => AnswerShape::ScalarExact,
            ExpectedAnswer::ScalarTolerant { .. }    => AnswerShape::ScalarTolerant,
            ExpectedAnswer::FractionEquivalence(_)   => AnswerShape::FractionEquivalence,
            ExpectedAnswer::OrderedTuple { .. }      => AnswerShape::OrderedTuple,
            ExpectedAnswer::UnorderedSet(_)          => AnswerShape::UnorderedSet,
            ExpectedAnswer::MultiField(_)            => AnswerShape::MultiField,
        }
    }
}

/// A learner's answer before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawAnswer {
    Text(String),
    /// One text entry per named field, for hosts with several input boxes.
    Fields(BTreeMap<String, String>),
}

impl From<&str> for RawAnswer {
    fn from(s: &str) -> Self {
        RawAnswer::Text(s.to_string())
    }
}

impl From<String> for RawAnswer {
    fn from(s: String) -> Self {
        RawAnswer::Text(s)
    }
}

impl From<BTreeMap<String, String>> for RawAnswer {
    fn from(fields: BTreeMap<String, String>) -> Self {
        RawAnswer::Fields(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedField {
    pub name: String,
    pub value: ParsedValue,
}

/// A raw answer normalised into the shape the expected answer asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedValue {
    Int(i64),
    Text(String),
    Number(f64),
    Fraction(Fraction),
    Tuple(Vec<i64>),
    Set(BTreeSet<i64>),
    Fields(Vec<ParsedField>),
}

// ---------------------------------------------------------------------------
// Problem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub kind: ProblemKind,
    pub tier: Tier,
    pub prompt: Prompt,
    pub operands: Operands,
    pub expected: ExpectedAnswer,
}

impl Problem {
    /// Epsilon of a tolerant answer, if the answer is tolerant.
    pub fn tolerance(&self) -> Option<f64> {
        match &self.expected {
            ExpectedAnswer::ScalarTolerant { epsilon, .. } => Some(*epsilon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub kind: ProblemKind,
    pub tier: Tier,
    pub rng_seed: Option<u64>,
}

impl GenerateRequest {
    /// Tier 1, fresh entropy.
    pub fn new(kind: ProblemKind) -> Self {
        GenerateRequest { kind, tier: 1, rng_seed: None }
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
