//! # math_drill_gen
//!
//! An offline, deterministic practice engine for arithmetic and geometry
//! drills.
//!
//! Every activity runs the same loop: generate a randomised problem for the
//! learner's current tier, let the host render it, check the raw answer, return
//! feedback with a worked explanation, and move the tier up or down.
//!
//! ## How it works
//!
//! 1. Build a [`SessionState`] for a [`ProblemKind`], either with the kind's
//!    default thresholds or from an [`ActivityConfig`] loaded from TOML.
//! 2. Call [`SessionState::ensure_problem`] with an rng. The generator draws
//!    operands that satisfy the kind's constraints for the current tier,
//!    falling back to a fixed construction if sampling runs out of retries.
//! 3. Pass the learner's text to [`SessionState::submit`]. Unreadable input is
//!    rejected without being counted; otherwise the result carries the verdict,
//!    the explanation steps and any tier change.
//! 4. Call [`SessionState::advance`] and repeat.
//!
//! ## Key features
//!
//! - **Deterministic**: seed the rng (or set `GenerateRequest::seed`) to
//!   reproduce a problem exactly.
//! - **Typed answers**: exact, tolerant, fraction, tuple, set and multi-field
//!   answers share one checker.
//! - **Explanations from operands**: every problem records the values its
//!   explanation needs, so explanations never re-derive or re-roll anything.
//!
//! ## Quick start
//!
//! ```rust
//! use math_drill_gen::{generate, GenerateRequest, ProblemKind, SessionState};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // One-off problem:
//! let problem = generate(GenerateRequest::new(ProblemKind::SimplifyFraction).tier(2).seed(42));
//! println!("Q: {}", problem.prompt);
//!
//! // A practice session:
//! let mut session = SessionState::for_kind(ProblemKind::TriangleMissingAngle)?;
//! let mut rng = StdRng::seed_from_u64(7);
//! let problem = session.ensure_problem(&mut rng);
//! println!("Q: {}", problem.prompt);
//!
//! let outcome = session.submit("45")?;
//! for step in &outcome.explanation {
//!     println!("{}: {}", step.label, step.text);
//! }
//! session.advance()?;
//! # Ok::<(), math_drill_gen::Error>(())
//! ```

pub mod practice_engine;

pub use practice_engine::{
    generate, generate_problem, host_view, ActivityConfig, CheckDetail, DifficultyConfig,
    DifficultyLevel, Error, ExpectedAnswer, GenerateRequest, MalformedInput, Problem, ProblemKind,
    RawAnswer, Result, SessionError, SessionState, Stats, Step, SubmitOutcome, Tier, TierChange,
};

#[cfg(test)]
mod tests;
