mod types;

pub use types::{DenyRule, GateMode, default_deny_rules};

use crate::config::GateConfig;
use crate::types::{ActionPayload, ActionPlan, VerificationStatus, VerifiedActionPlan};
use tracing::{info, warn};

pub const REJECTION_PREVIEW: &str = "Action rejected due to safety violations.";
pub const UNSAFE_CONSTRAINT_MESSAGE: &str =
    "Action plan explicitly marked as unsafe by agent constraints.";
pub const PERMISSIVE_AUDIT_MESSAGE: &str =
    "Safety validation bypassed: gate is in permissive mode.";

/// Policy decision point between a reasoner's proposal and the effector.
///
/// `verify` moves a plan from `Pending` to exactly one terminal status and
/// never touches the outside world.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    mode: GateMode,
    deny: Vec<DenyRule>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self {
            mode: GateMode::Strict,
            deny: default_deny_rules(),
        }
    }
}

impl SafetyGate {
    pub fn new(mode: GateMode, deny: Vec<DenyRule>) -> Self {
        if mode == GateMode::Permissive {
            warn!("safety gate constructed in permissive mode; plans will not be validated");
        }
        Self { mode, deny }
    }

    pub fn strict() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.mode, config.deny.clone())
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn deny_rules(&self) -> &[DenyRule] {
        &self.deny
    }

    pub fn verify(&self, plan: &ActionPlan) -> VerifiedActionPlan {
        let verified = match self.mode {
            GateMode::Strict => self.verify_strict(plan),
            GateMode::Permissive => Self::pass_through(plan),
        };

        if verified.status == VerificationStatus::RejectedUnsafe {
            warn!(
                action_id = %plan.action_id,
                action_type = %plan.action_type,
                reasons = ?verified.validation_messages,
                "plan rejected as unsafe"
            );
        } else {
            info!(
                action_id = %plan.action_id,
                action_type = %plan.action_type,
                status = %verified.status,
                mode = %self.mode,
                "plan verified"
            );
        }
        verified
    }

    fn verify_strict(&self, plan: &ActionPlan) -> VerifiedActionPlan {
        let mut messages = Vec::new();

        let payload = match ActionPayload::parse(&plan.action_type, &plan.parameters) {
            Ok(payload) => Some(payload),
            Err(problems) => {
                messages.extend(problems.iter().map(ToString::to_string));
                None
            }
        };

        if !plan.constraints.safety_check() {
            messages.push(UNSAFE_CONSTRAINT_MESSAGE.to_string());
        }

        for rule in self
            .deny
            .iter()
            .filter(|rule| rule.action_type == plan.action_type)
        {
            if !plan.constraints.has_override(&rule.override_key) {
                messages.push(format!(
                    "Action type '{}' is currently blacklisted for safety reasons.",
                    rule.action_type
                ));
            }
        }

        let (status, preview) = if !messages.is_empty() {
            (
                VerificationStatus::RejectedUnsafe,
                Some(REJECTION_PREVIEW.to_string()),
            )
        } else if plan.dry_run {
            (
                VerificationStatus::DryRunCompleted,
                Some(dry_run_preview(plan, payload.as_ref())),
            )
        } else {
            (VerificationStatus::ReadyForExecution, None)
        };

        settle(plan, status, messages, preview, payload)
    }

    fn pass_through(plan: &ActionPlan) -> VerifiedActionPlan {
        warn!(
            action_id = %plan.action_id,
            action_type = %plan.action_type,
            "permissive gate authorised plan without validation"
        );
        let payload = ActionPayload::parse(&plan.action_type, &plan.parameters).ok();
        settle(
            plan,
            VerificationStatus::ReadyForExecution,
            vec![PERMISSIVE_AUDIT_MESSAGE.to_string()],
            None,
            payload,
        )
    }
}

fn settle(
    plan: &ActionPlan,
    status: VerificationStatus,
    validation_messages: Vec<String>,
    actuator_preview: Option<String>,
    payload: Option<ActionPayload>,
) -> VerifiedActionPlan {
    debug_assert!(status.is_terminal());
    VerifiedActionPlan {
        status,
        validation_messages,
        actuator_preview,
        payload,
        ..VerifiedActionPlan::pending(plan.clone())
    }
}

fn dry_run_preview(plan: &ActionPlan, payload: Option<&ActionPayload>) -> String {
    match payload {
        Some(ActionPayload::TypeText { text }) => format!("Would type: '{text}'"),
        Some(ActionPayload::EmitLog { message }) => format!("Would log message: '{message}'"),
        Some(ActionPayload::NoOp) => "Would take no action.".to_string(),
        _ => format!(
            "Would attempt to execute action type '{}'.",
            plan.action_type
        ),
    }
}
