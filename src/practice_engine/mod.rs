//! Core practice engine: problem generation, answer checking, explanations and
//! difficulty tracking.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: problems, operands, expected and parsed answers |
//! | `sampling`    | Bounded rejection sampling with fallback, Fisher-Yates shuffle |
//! | `helpers`     | Builder functions and decimal/fraction arithmetic shared by topics |
//! | `topics`      | One constrained generator per problem kind |
//! | `generator`   | Entry points `generate_problem()` and `generate()` |
//! | `validator`   | Parse raw answers, compare against any expected answer shape |
//! | `explanation` | Worked steps rebuilt from a problem's operands |
//! | `difficulty`  | Tier state machine with streak and rolling-window rules |
//! | `config`      | Per-activity thresholds, TOML loading |
//! | `session`     | One learner's pending problem and submit/advance lifecycle |
//! | `host_view`   | JSON projections for browser hosts, session snapshots |
//! | `error`       | Crate-wide `Error` aggregating the per-module errors |

pub mod config;
pub mod difficulty;
pub mod error;
pub mod explanation;
pub mod generator;
pub mod helpers;
pub mod host_view;
pub mod models;
pub mod sampling;
pub mod session;
pub mod topics;
pub mod validator;

pub use config::{ActivityConfig, ConfigError};
pub use difficulty::{DifficultyConfig, DifficultyController, Direction, RollingWindow, Stats, TierChange};
pub use error::{Error, Result};
pub use explanation::{ExplanationError, Step, Steps};
pub use generator::{generate, generate_problem};
pub use models::{
    AnswerShape, Decimal, DifficultyLevel, ExpectedAnswer, Fraction, GenerateRequest,
    OperandValue, Operands, ParsedValue, Problem, ProblemKind, Prompt, RawAnswer, Tier,
};
pub use session::{SessionError, SessionState, Submission, SubmitOutcome};
pub use validator::{CheckDetail, MalformedInput, Verdict};
