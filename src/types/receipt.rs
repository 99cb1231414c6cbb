use super::action::{ActionPayload, ActionPlan};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Safety gate state. `Pending` is the initial state; the other three are
/// terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    ReadyForExecution,
    RejectedUnsafe,
    DryRunCompleted,
}

impl VerificationStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// An action plan annotated with the safety gate's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedActionPlan {
    pub action_plan: ActionPlan,
    pub status: VerificationStatus,
    #[serde(default)]
    pub validation_messages: Vec<String>,
    /// What the effector would do (dry-run) or why nothing will happen
    /// (rejection).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actuator_preview: Option<String>,
    /// Typed parameters parsed by the gate. Never read from the wire: a
    /// decoded plan is re-parsed from `action_plan` before dispatch.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub payload: Option<ActionPayload>,
}

impl VerifiedActionPlan {
    pub fn pending(action_plan: ActionPlan) -> Self {
        Self {
            action_plan,
            status: VerificationStatus::Pending,
            validation_messages: Vec::new(),
            actuator_preview: None,
            payload: None,
        }
    }

    pub fn is_executable(&self) -> bool {
        self.status == VerificationStatus::ReadyForExecution
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Failure,
    RejectedUnsafe,
    DryRunSuccess,
}

/// Terminal outcome of one cycle's action. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub action_id: String,
    pub origin_observation_id: String,
    pub status: ReceiptStatus,
    pub message: String,
    pub latency_ms: f64,
}

impl Receipt {
    /// Build a receipt for `plan`, measuring latency from `started`.
    pub fn for_plan(
        plan: &ActionPlan,
        status: ReceiptStatus,
        message: impl Into<String>,
        started: Instant,
    ) -> Self {
        Self {
            action_id: plan.action_id.clone(),
            origin_observation_id: plan.origin_observation_id.clone(),
            status,
            message: message.into(),
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            ReceiptStatus::Success | ReceiptStatus::DryRunSuccess
        )
    }
}
