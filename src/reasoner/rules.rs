use super::{DecideFuture, Reasoner};
use crate::config::ReasonerConfig;
use crate::types::{ActionPlan, ActionType, ChangeRecord, Constraints, ObservationEvent};
use serde_json::{Map, Value, json};
use tracing::debug;

const TYPING_INTENT: &str = "Preparing to type.";
const DINO_INTENT: &str = "Play Chrome Dino Game.";
const PILOT_MARKER: &str = "System is running the pilot script";

/// Deterministic keyword rules over the current observation.
#[derive(Debug, Clone, Default)]
pub struct RuleReasoner {
    dry_run: bool,
}

impl RuleReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ReasonerConfig) -> Self {
        Self::new().with_dry_run(config.dry_run)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pure rule evaluation, shared by `decide`.
    pub fn plan_for(&self, observation: &ObservationEvent, history: &[ChangeRecord]) -> ActionPlan {
        let observed_at = observation.timestamp.to_rfc3339();
        let mut parameters = Map::new();

        let action_type = if observation.potential_intent == TYPING_INTENT {
            parameters.insert(
                "text".into(),
                Value::String(format!("Hello from AIOS! Observed at {observed_at}")),
            );
            ActionType::TypeText
        } else if observation.potential_intent == DINO_INTENT {
            parameters.insert("key".into(), json!("space"));
            parameters.insert("modifiers".into(), json!([]));
            ActionType::PressKey
        } else if observation.environment_state_summary.contains(PILOT_MARKER) {
            parameters.insert(
                "message".into(),
                Value::String(format!(
                    "AIOS agent observed pilot script running at {observed_at}"
                )),
            );
            ActionType::EmitLog
        } else {
            ActionType::NoOp
        };

        debug!(
            observation_id = %observation.observation_id,
            action_type = %action_type,
            history = history.len(),
            "rule matched"
        );

        ActionPlan::new(
            observation.observation_id.clone(),
            action_type.to_string(),
            parameters,
        )
        .with_constraint(Constraints::SAFETY_CHECK, json!(true))
        .with_dry_run(self.dry_run)
    }
}

impl Reasoner for RuleReasoner {
    fn name(&self) -> &str {
        "rules"
    }

    fn decide<'a>(
        &'a self,
        observation: &'a ObservationEvent,
        history: &'a [ChangeRecord],
    ) -> DecideFuture<'a> {
        Box::pin(async move { Ok(self.plan_for(observation, history)) })
    }
}
