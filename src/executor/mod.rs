mod effector;
mod keys;

pub use effector::{Effector, EffectorError, LogEffector, MouseButton};
pub use keys::{Key, resolve_key, resolve_modifier};

use crate::config::ExecutorConfig;
use crate::types::{
    ActionPayload, ActionType, PayloadError, Receipt, ReceiptStatus, VerificationStatus,
    VerifiedActionPlan,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const REJECTED_MESSAGE: &str = "Action was rejected as unsafe.";
pub const DEFAULT_EFFECTOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Upper bound for any single effector call.
    pub effector_timeout: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            effector_timeout: DEFAULT_EFFECTOR_TIMEOUT,
        }
    }
}

impl From<&ExecutorConfig> for ExecutorOptions {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            effector_timeout: Duration::from_millis(config.effector_timeout_ms),
        }
    }
}

#[derive(Debug, Error)]
enum DispatchError {
    #[error("{0}")]
    Invalid(String),

    #[error("{action_type} failed: {source}")]
    Effector {
        action_type: ActionType,
        source: EffectorError,
    },
}

/// Turns a verified plan into effector calls and always answers with a
/// receipt. Only `ReadyForExecution` plans reach the effector.
pub struct ActionExecutor {
    effector: Arc<dyn Effector>,
    options: ExecutorOptions,
}

impl ActionExecutor {
    pub fn new(effector: Arc<dyn Effector>, options: ExecutorOptions) -> Self {
        Self { effector, options }
    }

    pub fn from_config(effector: Arc<dyn Effector>, config: &ExecutorConfig) -> Self {
        Self::new(effector, ExecutorOptions::from(config))
    }

    pub fn effector_name(&self) -> &str {
        self.effector.name()
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    pub async fn execute(&self, verified: &VerifiedActionPlan) -> Receipt {
        let started = Instant::now();
        let plan = &verified.action_plan;

        let (status, message) = match verified.status {
            VerificationStatus::RejectedUnsafe => {
                (ReceiptStatus::RejectedUnsafe, REJECTED_MESSAGE.to_string())
            }
            VerificationStatus::DryRunCompleted => (
                ReceiptStatus::DryRunSuccess,
                format!(
                    "Action completed successfully in dry-run mode. Preview: {}",
                    verified.actuator_preview.as_deref().unwrap_or_default()
                ),
            ),
            VerificationStatus::ReadyForExecution => match self.dispatch(verified).await {
                Ok(message) => (ReceiptStatus::Success, message),
                Err(err) => (ReceiptStatus::Failure, err.to_string()),
            },
            VerificationStatus::Pending => (
                ReceiptStatus::Failure,
                format!(
                    "Invalid VerifiedActionPlan status for execution: '{}'",
                    verified.status
                ),
            ),
        };

        let receipt = Receipt::for_plan(plan, status, message, started);
        if receipt.status == ReceiptStatus::Failure {
            warn!(
                action_id = %receipt.action_id,
                action_type = %plan.action_type,
                effector = self.effector.name(),
                message = %receipt.message,
                "action failed"
            );
        } else {
            info!(
                action_id = %receipt.action_id,
                action_type = %plan.action_type,
                status = %receipt.status,
                latency_ms = receipt.latency_ms,
                "action settled"
            );
        }
        receipt
    }

    async fn dispatch(&self, verified: &VerifiedActionPlan) -> Result<String, DispatchError> {
        let plan = &verified.action_plan;
        let payload = match &verified.payload {
            Some(payload) => payload.clone(),
            None => ActionPayload::parse(&plan.action_type, &plan.parameters)
                .map_err(|problems| rejected_parameters(&plan.action_type, &problems))?,
        };
        let action_type = payload.action_type();
        let failed = |source: EffectorError| DispatchError::Effector {
            action_type,
            source,
        };

        debug!(action_id = %plan.action_id, action_type = %action_type, "dispatching");

        match payload {
            ActionPayload::TypeText { text } => {
                if text.is_empty() {
                    return Err(DispatchError::Invalid(
                        "TypeText action missing 'text' parameter.".into(),
                    ));
                }
                let typed = text.clone();
                self.invoke("type_text", move |effector| effector.type_text(&typed))
                    .await
                    .map_err(failed)?;
                Ok(format!("Successfully typed: '{text}'"))
            }
            ActionPayload::PressKey { key, modifiers } => {
                if key.is_empty() {
                    return Err(DispatchError::Invalid(
                        "PressKey action missing 'key' parameter.".into(),
                    ));
                }
                self.press_combination(&key, &modifiers)
                    .await
                    .map_err(failed)?;
                let combination = modifiers
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(key.as_str()))
                    .collect::<Vec<_>>()
                    .join("+");
                Ok(format!("Successfully pressed key: '{combination}'"))
            }
            ActionPayload::ClickMouse {
                x,
                y,
                button,
                clicks,
            } => {
                let Some(mouse_button) = MouseButton::from_name(&button) else {
                    return Err(DispatchError::Invalid(format!(
                        "Unknown mouse button: '{button}'"
                    )));
                };
                self.invoke("move_pointer", move |effector| effector.move_pointer(x, y))
                    .await
                    .map_err(failed)?;
                self.invoke("click", move |effector| effector.click(mouse_button, clicks))
                    .await
                    .map_err(failed)?;
                Ok(format!(
                    "Successfully clicked {mouse_button} button {clicks} time(s) at ({x}, {y})"
                ))
            }
            ActionPayload::EmitLog { message } => {
                if message.is_empty() {
                    return Err(DispatchError::Invalid(
                        "EmitLog action missing 'message' parameter.".into(),
                    ));
                }
                let logged = message.clone();
                self.invoke("emit_log", move |effector| effector.emit_log(&logged))
                    .await
                    .map_err(failed)?;
                Ok(format!("Successfully logged message: '{message}'"))
            }
            ActionPayload::NoOp => Ok("No action was required or taken.".into()),
        }
    }

    /// Hold each recognised modifier, press the key, then release the held
    /// modifiers in reverse order. Release happens even if the press failed.
    async fn press_combination(&self, key: &str, modifiers: &[String]) -> Result<(), EffectorError> {
        let mut held = Vec::with_capacity(modifiers.len());
        let mut outcome = Ok(());

        for name in modifiers {
            let Some(modifier) = resolve_modifier(name) else {
                warn!(modifier = %name, "unknown modifier skipped");
                continue;
            };
            if let Err(err) = self
                .invoke("key_down", move |effector| effector.key_down(modifier))
                .await
            {
                outcome = Err(err);
                break;
            }
            held.push(modifier);
        }

        if outcome.is_ok() {
            outcome = match resolve_key(key) {
                Some(special) => {
                    self.invoke("press_key", move |effector| effector.press_key(special))
                        .await
                }
                None => {
                    let literal = key.to_string();
                    self.invoke("type_text", move |effector| effector.type_text(&literal))
                        .await
                }
            };
        }

        for modifier in held.into_iter().rev() {
            if let Err(err) = self
                .invoke("key_up", move |effector| effector.key_up(modifier))
                .await
            {
                warn!(key = %modifier, error = %err, "failed releasing modifier");
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }

        outcome
    }

    /// Run one blocking effector call on the blocking pool, bounded by the
    /// configured timeout. An expired call is abandoned, not cancelled.
    async fn invoke<F>(&self, capability: &'static str, call: F) -> Result<(), EffectorError>
    where
        F: FnOnce(&dyn Effector) -> anyhow::Result<()> + Send + 'static,
    {
        let timeout = self.options.effector_timeout;
        let effector = Arc::clone(&self.effector);
        let task = tokio::task::spawn_blocking(move || call(effector.as_ref()));
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(cause))) => Err(EffectorError::Capability { capability, cause }),
            Ok(Err(join)) => Err(EffectorError::Capability {
                capability,
                cause: anyhow::Error::new(join).context("effector call aborted"),
            }),
            Err(_) => Err(EffectorError::Timeout {
                capability,
                timeout,
            }),
        }
    }
}

fn rejected_parameters(action_type: &str, problems: &[PayloadError]) -> DispatchError {
    if problems
        .iter()
        .any(|problem| matches!(problem, PayloadError::UnknownActionType(_)))
    {
        return DispatchError::Invalid(format!(
            "Unknown action type for execution: '{action_type}'"
        ));
    }
    DispatchError::Invalid(
        problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}
