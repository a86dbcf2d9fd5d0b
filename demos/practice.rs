//! Runs a short seeded practice session with a simulated learner.
//!
//! ```text
//! RUST_LOG=math_drill_gen=debug cargo run --example practice
//! ```

use math_drill_gen::{
    host_view, ActivityConfig, ExpectedAnswer, Problem, SessionState,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const ACTIVITY: &str = r#"
kind = "FractionComparison"

[difficulty]
promote_after = 3
demote_after = 2
"#;

/// The learner answers correctly most of the time and otherwise guesses.
fn learner_answer(problem: &Problem, rng: &mut StdRng) -> String {
    let knows_it = rng.gen_bool(0.7);
    match &problem.expected {
        ExpectedAnswer::ScalarExact(scalar) if knows_it => scalar.to_string(),
        ExpectedAnswer::ScalarExact(_) => ["<", ">", "="][rng.gen_range(0..3)].to_string(),
        _ => String::new(),
    }
}

fn main() -> math_drill_gen::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let mut session = SessionState::new(ActivityConfig::from_toml_str(ACTIVITY)?)?;
    let mut generation = StdRng::seed_from_u64(2024);
    let mut learner = StdRng::seed_from_u64(7);

    for round in 1..=12 {
        let problem = session.ensure_problem(&mut generation).clone();
        println!("\n#{round} [tier {}] {}", problem.tier, problem.prompt);
        println!("{}", host_view::public_problem(&problem));

        let answer = learner_answer(&problem, &mut learner);
        println!("> {answer}");
        let outcome = session.submit_for(&problem.id, answer.as_str())?;
        println!("{}", if outcome.correct { "correct" } else { "not quite" });
        for step in &outcome.explanation {
            println!("  {}: {}", step.label, step.text);
        }
        if let Some(change) = outcome.tier_change {
            println!("  tier {} -> {}", change.from, change.to);
        }
        session.advance()?;
    }

    let stats = session.stats();
    println!(
        "\n{} / {} correct ({:.0}%), finished at tier {}",
        stats.correct,
        stats.attempts,
        stats.accuracy() * 100.0,
        session.current_tier()
    );
    println!("{}", host_view::snapshot(&session)?);
    Ok(())
}
