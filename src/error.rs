use std::path::PathBuf;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `aios`.
///
/// Only faults that must abort a cycle live here. Action-level outcomes
/// (unsafe, dry-run, effector failure) travel as status values on
/// [`crate::types::VerifiedActionPlan`] and [`crate::types::Receipt`].
#[derive(Debug, Error)]
pub enum AiosError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Change log persistence ──────────────────────────────────────────
    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),

    // ── Event stream ────────────────────────────────────────────────────
    #[error("event sink: {0}")]
    Sink(#[from] SinkError),

    // ── Reasoner ────────────────────────────────────────────────────────
    #[error("reasoner: {0}")]
    Reasoner(#[from] ReasonerError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Persistence errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt state in {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed encoding state: {0}")]
    Encode(serde_json::Error),
}

// ─── Event sink errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed appending to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed encoding event payload: {0}")]
    Encode(#[from] serde_json::Error),
}

// ─── Reasoner errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReasonerError {
    #[error("{reasoner} gave up after {attempts} attempt(s): {cause:#}")]
    Exhausted {
        reasoner: String,
        attempts: u32,
        cause: anyhow::Error,
    },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AiosError>;
