//! Crate-level tests for `math_drill_gen`.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Determinism | Same seed → identical problem; different seeds → varied problems |
//! | Structural | Answer shape fixed per kind; id prefixes; tier recorded; prompt fully bound |
//! | Answers | The expected answer, typed back in, is always judged correct |
//! | Quotient pairs | Answers ⊆ pool, all divisible, at least one distractor |
//! | Explanations | Non-empty for every kind and tier |
//! | Sessions | Full loop over every kind; promotion with default thresholds |
//! | Entropy | `rng_seed: None` produces a valid problem (smoke test) |

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::practice_engine::{
    explanation, generate, generate_problem,
    models::{ExpectedAnswer, GenerateRequest, Problem, ProblemKind, Tier},
    validator, SessionState,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn seeded(kind: ProblemKind, tier: Tier, seed: u64) -> Problem {
    generate(GenerateRequest::new(kind).tier(tier).seed(seed))
}

fn join<'a>(values: impl Iterator<Item = &'a i64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Text a learner would type to give exactly the expected answer.
fn typed_answer(expected: &ExpectedAnswer) -> String {
    match expected {
        ExpectedAnswer::ScalarExact(scalar)          => scalar.to_string(),
        ExpectedAnswer::ScalarTolerant { value, .. } => value.to_string(),
        ExpectedAnswer::FractionEquivalence(f)       => f.to_string(),
        ExpectedAnswer::OrderedTuple { values, .. }  => join(values.iter()),
        ExpectedAnswer::UnorderedSet(values)         => join(values.iter()),
        ExpectedAnswer::MultiField(fields) => fields
            .iter()
            .map(|f| format!("{}={}", f.name, typed_answer(&f.answer)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];
const TIERS: [Tier; 3] = [1, 2, 3];

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn same_seed_produces_identical_problem() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            assert_eq!(seeded(kind, tier, 12345), seeded(kind, tier, 12345), "{kind:?} tier {tier}");
        }
    }
}

#[test]
fn different_seeds_vary() {
    for kind in ProblemKind::ALL {
        let prompts: BTreeSet<String> =
            (0..20).map(|seed| seeded(kind, 2, seed).prompt.render()).collect();
        assert!(prompts.len() > 1, "{kind:?} always renders the same prompt");
    }
}

// ── structural ───────────────────────────────────────────────────────────────

#[test]
fn answer_shape_is_fixed_per_kind() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            for seed in SEEDS {
                let p = seeded(kind, tier, seed);
                assert_eq!(p.expected.shape(), kind.answer_shape(), "{kind:?} tier {tier} seed {seed}");
            }
        }
    }
}

#[test]
fn problem_ids_carry_kind_prefix() {
    for kind in ProblemKind::ALL {
        let p = seeded(kind, 1, 42);
        let (prefix, hex) = p.id.split_once('-').unwrap();
        assert_eq!(prefix, kind.prefix());
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()), "bad id {}", p.id);
    }
}

#[test]
fn problems_record_kind_and_tier() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            let p = seeded(kind, tier, 5);
            assert_eq!(p.kind, kind);
            assert_eq!(p.tier, tier);
            assert!(!p.operands.is_empty());
        }
    }
}

#[test]
fn prompts_have_no_unbound_placeholders() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            let text = seeded(kind, tier, 77).prompt.render();
            assert!(!text.contains('{'), "{kind:?}: {text}");
        }
    }
}

#[test]
fn only_tolerant_answers_have_a_tolerance() {
    for kind in ProblemKind::ALL {
        let p = seeded(kind, 2, 3);
        let tolerant = matches!(p.expected, ExpectedAnswer::ScalarTolerant { .. });
        assert_eq!(p.tolerance().is_some(), tolerant, "{kind:?}");
    }
}

// ── quotient pairs ───────────────────────────────────────────────────────────

#[test]
fn quotient_pair_answers_are_pool_multiples() {
    for tier in TIERS {
        for seed in 0..50 {
            let p = seeded(ProblemKind::QuotientPairSelection, tier, seed);
            let divisor = p.operands.int("divisor").unwrap();
            let pool = p.operands.list("pool").unwrap();
            let ExpectedAnswer::UnorderedSet(answers) = &p.expected else {
                panic!("quotient pairs must expect a set");
            };
            assert!(!answers.is_empty());
            for a in answers {
                assert!(pool.contains(a), "{a} not in {pool:?}");
                assert_eq!(a % divisor, 0);
            }
            assert!(pool.iter().any(|v| v % divisor != 0), "no distractor in {pool:?}");
        }
    }
}

// ── answers & explanations ───────────────────────────────────────────────────

#[test]
fn expected_answer_is_accepted() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            for seed in SEEDS {
                let p = seeded(kind, tier, seed);
                let raw = typed_answer(&p.expected);
                let (_, verdict) = validator::validate(&raw.as_str().into(), &p.expected)
                    .unwrap_or_else(|e| panic!("{kind:?} rejected `{raw}`: {e}"));
                assert!(verdict.correct, "{kind:?} tier {tier}: `{raw}` judged wrong");
            }
        }
    }
}

#[test]
fn every_problem_explains_itself() {
    for kind in ProblemKind::ALL {
        for tier in TIERS {
            let p = seeded(kind, tier, 2024);
            let steps = explanation::build(&p).unwrap();
            assert!(!steps.is_empty());
            assert!(steps.iter().all(|s| !s.label.is_empty() && !s.text.is_empty()));
        }
    }
}

// ── sessions ─────────────────────────────────────────────────────────────────

#[test]
fn session_loop_runs_for_every_kind() {
    for kind in ProblemKind::ALL {
        let mut session = SessionState::for_kind(kind).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            let raw = typed_answer(&session.ensure_problem(&mut rng).expected);
            let outcome = session.submit(raw).unwrap();
            assert!(outcome.correct);
            session.advance().unwrap();
        }
        assert_eq!(session.stats().attempts, 10);
        assert_eq!(session.stats().correct, 10);
        assert_eq!(session.current_tier(), 3, "{kind:?} did not reach the top tier");
    }
}

#[test]
fn wrong_answers_walk_back_down() {
    let mut session = SessionState::for_kind(ProblemKind::TriangleMissingAngle).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..6 {
        let raw = typed_answer(&session.ensure_problem(&mut rng).expected);
        session.submit(raw).unwrap();
        session.advance().unwrap();
    }
    assert_eq!(session.current_tier(), 3);
    for _ in 0..2 {
        session.ensure_problem(&mut rng);
        assert!(!session.submit("0").unwrap().correct);
        session.advance().unwrap();
    }
    assert_eq!(session.current_tier(), 1);
}

// ── entropy ──────────────────────────────────────────────────────────────────

#[test]
fn entropy_generation_smoke_test() {
    for kind in ProblemKind::ALL {
        let p = generate(GenerateRequest::new(kind).tier(2));
        assert_eq!(p.expected.shape(), kind.answer_shape());
    }
}

// ── properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn any_seed_yields_a_consistent_problem(seed in any::<u64>(), tier in 0u8..=5, k in 0usize..9) {
        let kind = ProblemKind::ALL[k];
        let mut rng = StdRng::seed_from_u64(seed);
        let p = generate_problem(kind, tier, &mut rng);
        prop_assert_eq!(p.expected.shape(), kind.answer_shape());
        prop_assert!(explanation::build(&p).is_ok());
        let raw = typed_answer(&p.expected);
        let checked = validator::validate(&raw.as_str().into(), &p.expected);
        prop_assert!(matches!(checked, Ok((_, ref v)) if v.correct));
    }
}
