//! One learner's practice loop for a single activity.
//!
//! A session holds at most one pending problem. Lifecycle:
//!
//! ```text
//! ensure_problem -> submit -> advance -> ensure_problem -> ...
//!                      |
//!                      +-- MalformedInput: nothing recorded, submit again
//! ```
//!
//! Only a submission that parses is counted. The explanation is built before
//! the result is recorded, so a failed submit never leaves the controller
//! half-updated.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::practice_engine::{
    config::{ActivityConfig, ConfigError},
    difficulty::{DifficultyController, Stats, TierChange},
    explanation::{self, ExplanationError, Steps},
    generator::generate_problem,
    models::{ParsedValue, Problem, ProblemKind, RawAnswer, Tier},
    validator::{self, CheckDetail, MalformedInput},
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("no problem is pending")]
    NoPendingProblem,
    #[error("problem {problem_id} has already been answered")]
    AlreadyResolved { problem_id: String },
    #[error("problem {problem_id} has not been answered yet")]
    Unresolved { problem_id: String },
    #[error("session practises {expected}, but the problem is {found}")]
    WrongKind { expected: ProblemKind, found: ProblemKind },
    #[error("problem was built for tier {found}, but the session is at tier {expected}")]
    WrongTier { expected: Tier, found: Tier },
    #[error("answer is for problem {found}, but {expected} is pending")]
    ProblemMismatch { expected: String, found: String },
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error(transparent)]
    Explanation(#[from] ExplanationError),
}

/// The last accepted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub raw_input: RawAnswer,
    pub parsed_value: ParsedValue,
    pub correct: bool,
}

/// Everything the host needs to give feedback on one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub problem_id: String,
    pub correct: bool,
    pub detail: CheckDetail,
    pub explanation: Steps,
    pub tier_change: Option<TierChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PendingProblem {
    problem: Problem,
    resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    kind: ProblemKind,
    difficulty: DifficultyController,
    pending: Option<PendingProblem>,
    last_submission: Option<Submission>,
}

impl SessionState {
    pub fn new(config: ActivityConfig) -> Result<Self, ConfigError> {
        let difficulty = DifficultyController::new(config.difficulty, config.start_tier)?;
        Ok(SessionState { kind: config.kind, difficulty, pending: None, last_submission: None })
    }

    /// Session with the kind's default thresholds.
    pub fn for_kind(kind: ProblemKind) -> Result<Self, ConfigError> {
        Self::new(ActivityConfig::for_kind(kind))
    }

    /// Re-check a deserialized session: config must validate and the tier is
    /// re-clamped.
    pub fn revalidate(self) -> Result<Self, ConfigError> {
        let config = *self.difficulty.config();
        let state = self.difficulty.state().clone();
        let difficulty = DifficultyController::from_state(config, state)?;
        Ok(SessionState { difficulty, ..self })
    }

    /// The pending problem, generating one at the current tier if none exists.
    pub fn ensure_problem<R: Rng>(&mut self, rng: &mut R) -> &Problem {
        let (kind, tier) = (self.kind, self.difficulty.current_tier());
        let pending = self.pending.get_or_insert_with(|| PendingProblem {
            problem: generate_problem(kind, tier, rng),
            resolved: false,
        });
        &pending.problem
    }

    /// As [`ensure_problem`](Self::ensure_problem), with the host building the
    /// problem for the given tier. A problem of another kind or tier is
    /// rejected and nothing becomes pending.
    pub fn ensure_problem_with<F>(&mut self, build: F) -> Result<&Problem, SessionError>
    where
        F: FnOnce(Tier) -> Problem,
    {
        if self.pending.is_none() {
            let tier = self.difficulty.current_tier();
            let problem = build(tier);
            if problem.kind != self.kind {
                return Err(SessionError::WrongKind { expected: self.kind, found: problem.kind });
            }
            if problem.tier != tier {
                return Err(SessionError::WrongTier { expected: tier, found: problem.tier });
            }
            self.pending = Some(PendingProblem { problem, resolved: false });
        }
        self.pending().ok_or(SessionError::NoPendingProblem)
    }

    pub fn submit(&mut self, raw: impl Into<RawAnswer>) -> Result<SubmitOutcome, SessionError> {
        let raw = raw.into();
        let pending = self.pending.as_mut().ok_or(SessionError::NoPendingProblem)?;
        let problem = &pending.problem;
        if pending.resolved {
            return Err(SessionError::AlreadyResolved { problem_id: problem.id.clone() });
        }

        let (parsed, verdict) = match validator::validate(&raw, &problem.expected) {
            Ok(checked) => checked,
            Err(e) => {
                warn!(target: "math_drill_gen", id = %problem.id, error = %e, "rejected malformed answer");
                return Err(e.into());
            }
        };
        let steps = explanation::build(problem)?;

        let tier_change = self.difficulty.record_result(verdict.correct);
        pending.resolved = true;
        debug!(
            target: "math_drill_gen",
            id = %pending.problem.id,
            correct = verdict.correct,
            tier = self.difficulty.current_tier(),
            "recorded answer"
        );

        let outcome = SubmitOutcome {
            problem_id: pending.problem.id.clone(),
            correct: verdict.correct,
            detail: verdict.detail,
            explanation: steps,
            tier_change,
        };
        self.last_submission = Some(Submission { raw_input: raw, parsed_value: parsed, correct: verdict.correct });
        Ok(outcome)
    }

    /// As [`submit`](Self::submit), but only for the problem with `problem_id`.
    pub fn submit_for(
        &mut self, problem_id: &str, raw: impl Into<RawAnswer>,
    ) -> Result<SubmitOutcome, SessionError> {
        let pending = self.pending.as_ref().ok_or(SessionError::NoPendingProblem)?;
        if pending.problem.id != problem_id {
            return Err(SessionError::ProblemMismatch {
                expected: pending.problem.id.clone(),
                found: problem_id.to_string(),
            });
        }
        self.submit(raw)
    }

    /// Clear the answered problem so the next `ensure_problem` draws a new one.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match &self.pending {
            None => Err(SessionError::NoPendingProblem),
            Some(p) if !p.resolved => {
                Err(SessionError::Unresolved { problem_id: p.problem.id.clone() })
            }
            Some(_) => {
                self.pending = None;
                Ok(())
            }
        }
    }

    /// Drop the pending problem, answered or not, without recording anything.
    pub fn discard(&mut self) -> Option<Problem> {
        self.pending.take().map(|p| p.problem)
    }

    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    pub fn current_tier(&self) -> Tier {
        self.difficulty.current_tier()
    }

    pub fn stats(&self) -> Stats {
        self.difficulty.stats()
    }

    pub fn pending(&self) -> Option<&Problem> {
        self.pending.as_ref().map(|p| &p.problem)
    }

    pub fn is_resolved(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.resolved)
    }

    pub fn last_submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice_engine::{
        difficulty::{DifficultyConfig, Direction},
        models::{Decimal, ExpectedAnswer, Operands, Prompt},
        topics::{arithmetic::decimal_addition, geometry::triangle},
    };
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn addition_session(promote_after: u32) -> SessionState {
        SessionState::new(ActivityConfig {
            kind: ProblemKind::DecimalAddition,
            start_tier: 1,
            difficulty: DifficultyConfig { promote_after, ..DifficultyConfig::default() },
        })
        .unwrap()
    }

    fn pose_fixed(session: &mut SessionState, n: u32) -> String {
        session
            .ensure_problem_with(|tier| {
                decimal_addition(format!("DA-FIXED{n:03}"), tier, Decimal::new(23, 1), Decimal::new(31, 1))
            })
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn ensure_problem_keeps_the_pending_problem() {
        let mut session = SessionState::for_kind(ProblemKind::SimplifyFraction).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let first = session.ensure_problem(&mut rng).clone();
        let again = session.ensure_problem(&mut rng).clone();
        assert_eq!(first, again);
        assert_eq!(first.tier, session.current_tier());
    }

    #[test]
    fn three_correct_answers_promote() {
        let mut session = addition_session(3);
        let mut changes = Vec::new();
        for n in 0..3 {
            pose_fixed(&mut session, n);
            let outcome = session.submit("5.4").unwrap();
            assert!(outcome.correct);
            assert!(!outcome.explanation.is_empty());
            changes.push(outcome.tier_change);
            session.advance().unwrap();
        }
        assert_eq!(
            changes,
            vec![None, None, Some(TierChange { direction: Direction::Up, from: 1, to: 2 })]
        );
        assert_eq!(session.current_tier(), 2);
        assert_eq!(session.difficulty().state().consecutive_correct, 0);
        assert_eq!(session.stats(), Stats { attempts: 3, correct: 3 });
    }

    #[test]
    fn tolerance_accepts_close_answers() {
        let mut session = addition_session(3);
        pose_fixed(&mut session, 0);
        let outcome = session.submit("5.41").unwrap();
        assert!(outcome.correct);
        assert!(matches!(outcome.detail, CheckDetail::Tolerance { .. }));
    }

    #[test]
    fn malformed_input_is_not_counted() {
        let mut session = addition_session(3);
        pose_fixed(&mut session, 0);
        let before = session.difficulty().state().clone();

        let err = session.submit("five point four").unwrap_err();
        assert!(matches!(err, SessionError::Malformed(MalformedInput::NotANumber(_))));
        assert_eq!(session.difficulty().state(), &before);
        assert!(!session.is_resolved());
        assert!(session.last_submission().is_none());

        assert!(session.submit("5.4").unwrap().correct);
        assert_eq!(session.stats().attempts, 1);
    }

    #[test]
    fn double_submit_is_rejected() {
        let mut session = addition_session(3);
        let id = pose_fixed(&mut session, 0);
        session.submit("1").unwrap();
        assert_eq!(session.submit("5.4"), Err(SessionError::AlreadyResolved { problem_id: id }));
        assert_eq!(session.stats().attempts, 1);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut session = addition_session(3);
        assert_eq!(session.advance(), Err(SessionError::NoPendingProblem));
        let id = pose_fixed(&mut session, 0);
        assert_eq!(session.advance(), Err(SessionError::Unresolved { problem_id: id }));
        session.submit("5.4").unwrap();
        assert_eq!(session.advance(), Ok(()));
        assert!(session.pending().is_none());
    }

    #[test]
    fn submit_without_problem() {
        let mut session = addition_session(3);
        assert_eq!(session.submit("5.4"), Err(SessionError::NoPendingProblem));
    }

    #[test]
    fn stale_problem_id_is_rejected() {
        let mut session = addition_session(3);
        let id = pose_fixed(&mut session, 7);
        assert_eq!(
            session.submit_for("DA-OLD", "5.4"),
            Err(SessionError::ProblemMismatch { expected: id.clone(), found: "DA-OLD".into() })
        );
        assert!(session.submit_for(&id, "5.4").unwrap().correct);
    }

    #[test]
    fn discard_records_nothing() {
        let mut session = addition_session(3);
        pose_fixed(&mut session, 0);
        let dropped = session.discard().unwrap();
        assert_eq!(dropped.kind, ProblemKind::DecimalAddition);
        assert!(session.pending().is_none());
        assert_eq!(session.stats().attempts, 0);
    }

    #[test]
    fn last_submission_keeps_raw_and_parsed() {
        let mut session = addition_session(3);
        pose_fixed(&mut session, 0);
        session.submit(" 5.4 ").unwrap();
        let last = session.last_submission().unwrap();
        assert_eq!(last.raw_input, RawAnswer::Text(" 5.4 ".into()));
        assert_eq!(last.parsed_value, ParsedValue::Number(5.4));
        assert!(last.correct);
    }

    #[test]
    fn new_problems_use_the_promoted_tier() {
        let mut session = addition_session(1);
        let mut rng = StdRng::seed_from_u64(11);
        let answer = session.ensure_problem(&mut rng).operands.decimal("answer").unwrap();
        session.submit(answer.to_string()).unwrap();
        session.advance().unwrap();
        assert_eq!(session.ensure_problem(&mut rng).tier, 2);
    }

    #[test]
    fn host_problem_of_another_kind_or_tier_is_rejected() {
        let mut session = addition_session(3);
        let err = session
            .ensure_problem_with(|tier| triangle("TA-HOST".into(), tier, 60, 60))
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::WrongKind {
                expected: ProblemKind::DecimalAddition,
                found: ProblemKind::TriangleMissingAngle,
            }
        );
        let err = session
            .ensure_problem_with(|_| decimal_addition("DA-HOST".into(), 3, Decimal::new(1, 1), Decimal::new(2, 1)))
            .unwrap_err();
        assert_eq!(err, SessionError::WrongTier { expected: 1, found: 3 });
        assert!(session.pending().is_none());
    }

    #[test]
    fn unexplainable_host_problem_is_not_recorded() {
        let mut session = SessionState::for_kind(ProblemKind::QuotientPairSelection).unwrap();
        session
            .ensure_problem_with(|tier| Problem {
                id: "QP-HOST".into(),
                kind: ProblemKind::QuotientPairSelection,
                tier,
                prompt: Prompt::new("Which of 3 divide by 0?"),
                operands: Operands::new()
                    .with("divisor", 0i64)
                    .with("pool", vec![3i64])
                    .with("multiples", vec![3i64]),
                expected: ExpectedAnswer::UnorderedSet([3].into_iter().collect()),
            })
            .unwrap();

        assert_eq!(
            session.submit("3"),
            Err(SessionError::Explanation(ExplanationError::InvalidOperand {
                kind: ProblemKind::QuotientPairSelection,
                name: "divisor",
            }))
        );
        assert_eq!(session.stats().attempts, 0);
        assert!(!session.is_resolved());
    }
}
