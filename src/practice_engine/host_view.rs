//! JSON views for hosts that render in a browser.
//!
//! [`public_problem`] never includes the expected answer or any operand that
//! gives it away; only the values needed to draw the question are exposed.

use serde_json::{json, Value};

use crate::practice_engine::{
    error::Result,
    models::{DifficultyLevel, ExpectedAnswer, Problem, ProblemKind},
    session::{SessionState, SubmitOutcome},
};

/// Operands a host may render for each kind.
fn visible_operands(kind: ProblemKind) -> &'static [&'static str] {
    match kind {
        ProblemKind::DecimalAddition           => &["addend_a", "addend_b"],
        ProblemKind::DistributiveDecomposition => &["factor", "multiplicand", "round_part", "ones_part"],
        ProblemKind::QuotientPairSelection     => &["divisor", "pool"],
        ProblemKind::FractionToDecimal         => &["numerator", "denominator"],
        ProblemKind::ShadedFraction            => &["parts", "shaded"],
        ProblemKind::SimplifyFraction          => &["numerator", "denominator"],
        ProblemKind::FractionComparison        => &["left", "right"],
        ProblemKind::RectangleDimensions       => &["area", "perimeter"],
        ProblemKind::TriangleMissingAngle      => &["angle_a", "angle_b"],
    }
}

fn answer_fields(expected: &ExpectedAnswer) -> Vec<&str> {
    match expected {
        ExpectedAnswer::MultiField(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
        _ => Vec::new(),
    }
}

/// Problem as shown to the learner, expected answer stripped.
pub fn public_problem(problem: &Problem) -> Value {
    let operands: serde_json::Map<String, Value> = visible_operands(problem.kind)
        .iter()
        .filter_map(|name| {
            problem.operands.get(name).map(|v| (name.to_string(), Value::String(v.to_string())))
        })
        .collect();

    json!({
        "id": problem.id,
        "kind": problem.kind.to_string(),
        "tier": problem.tier,
        "level": DifficultyLevel::from_tier(problem.tier).to_string(),
        "prompt": problem.prompt.render(),
        "operands": operands,
        "answer_shape": problem.expected.shape().to_string(),
        "answer_fields": answer_fields(&problem.expected),
    })
}

/// Outcome of a submission as sent back to the host.
pub fn outcome_json(outcome: &SubmitOutcome) -> Result<Value> {
    let explanation: Vec<Value> = outcome
        .explanation
        .iter()
        .map(|s| json!({ "label": s.label, "text": s.text }))
        .collect();

    Ok(json!({
        "problem_id": outcome.problem_id,
        "correct": outcome.correct,
        "message": if outcome.correct { "Correct!" } else { "Not quite." },
        "detail": serde_json::to_value(&outcome.detail)?,
        "explanation": explanation,
        "tier_change": serde_json::to_value(outcome.tier_change)?,
    }))
}

/// Serialize a session so the host can keep it between requests.
pub fn snapshot(session: &SessionState) -> Result<String> {
    Ok(serde_json::to_string(session)?)
}

/// Inverse of [`snapshot`]; rejects snapshots whose config no longer validates.
pub fn restore(text: &str) -> Result<SessionState> {
    let session: SessionState = serde_json::from_str(text)?;
    Ok(session.revalidate()?)
}
