//! Crate-wide error type.

use thiserror::Error;

use crate::practice_engine::{
    config::ConfigError,
    explanation::ExplanationError,
    session::SessionError,
    validator::MalformedInput,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Explanation(#[from] ExplanationError),
    #[error("invalid session snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
