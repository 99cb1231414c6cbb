mod rules;

pub use rules::RuleReasoner;

use crate::config::ReasonerConfig;
use crate::error::ReasonerError;
use crate::types::{ActionPlan, ChangeRecord, ObservationEvent};
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::warn;

pub type DecideFuture<'a> = Pin<Box<dyn Future<Output = Result<ActionPlan>> + Send + 'a>>;

/// Proposes the next action from the latest observation and recent change
/// history (most recent first).
pub trait Reasoner: Send + Sync {
    fn name(&self) -> &str;

    fn decide<'a>(
        &'a self,
        observation: &'a ObservationEvent,
        history: &'a [ChangeRecord],
    ) -> DecideFuture<'a>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl From<&ReasonerConfig> for RetryPolicy {
    fn from(config: &ReasonerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// No retries: a single attempt.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Ask `reasoner` for a plan, sleeping with doubling backoff between
    /// failed attempts. The first successful plan is returned unchanged.
    pub async fn decide_with_retries(
        &self,
        reasoner: &dyn Reasoner,
        observation: &ObservationEvent,
        history: &[ChangeRecord],
    ) -> std::result::Result<ActionPlan, ReasonerError> {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match reasoner.decide(observation, history).await {
                Ok(plan) => return Ok(plan),
                Err(cause) if attempt >= max_attempts => {
                    return Err(ReasonerError::Exhausted {
                        reasoner: reasoner.name().to_string(),
                        attempts: attempt,
                        cause,
                    });
                }
                Err(err) => {
                    warn!(
                        reasoner = reasoner.name(),
                        attempt,
                        max_attempts,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %format!("{err:#}"),
                        "reasoner failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
            }
        }
    }
}
