use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A structured snapshot of perceived machine/UI state.
///
/// Produced by the observer/reasoner pipeline outside this crate and treated
/// as immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationEvent {
    pub observation_id: String,
    pub timestamp: DateTime<Utc>,
    pub potential_intent: String,
    pub ui_state_summary: String,
    pub environment_state_summary: String,
    /// Opaque references to raw captures (screenshots, UI trees, logs).
    #[serde(default)]
    pub raw_signal_refs: Vec<serde_json::Value>,
}

impl ObservationEvent {
    pub fn new(
        potential_intent: impl Into<String>,
        ui_state_summary: impl Into<String>,
        environment_state_summary: impl Into<String>,
    ) -> Self {
        Self {
            observation_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            potential_intent: potential_intent.into(),
            ui_state_summary: ui_state_summary.into(),
            environment_state_summary: environment_state_summary.into(),
            raw_signal_refs: Vec::new(),
        }
    }

    pub fn with_signal_ref(mut self, signal: serde_json::Value) -> Self {
        self.raw_signal_refs.push(signal);
        self
    }
}

/// A durable note that a meaningful difference was detected between two
/// consecutive observations. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub observation_id: String,
    pub timestamp: DateTime<Utc>,
    pub summary_of_change: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}
