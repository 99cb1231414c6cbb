use crate::error::SinkError;
use crate::types::{ActionPlan, ChangeRecord, ObservationEvent, Receipt, VerifiedActionPlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    Observation,
    ChangeRecord,
    ActionPlan,
    VerifiedActionPlan,
    Receipt,
}

/// One entry of the append-only event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl EventEnvelope {
    pub fn new(event_type: EventType, payload: Value) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    fn encode<T: Serialize>(event_type: EventType, payload: &T) -> Result<Self, SinkError> {
        Ok(Self::new(event_type, serde_json::to_value(payload)?))
    }

    pub fn observation(observation: &ObservationEvent) -> Result<Self, SinkError> {
        Self::encode(EventType::Observation, observation)
    }

    pub fn change_record(record: &ChangeRecord) -> Result<Self, SinkError> {
        Self::encode(EventType::ChangeRecord, record)
    }

    pub fn action_plan(plan: &ActionPlan) -> Result<Self, SinkError> {
        Self::encode(EventType::ActionPlan, plan)
    }

    pub fn verified_action_plan(verified: &VerifiedActionPlan) -> Result<Self, SinkError> {
        Self::encode(EventType::VerifiedActionPlan, verified)
    }

    pub fn receipt(receipt: &Receipt) -> Result<Self, SinkError> {
        Self::encode(EventType::Receipt, receipt)
    }
}

/// Destination for the event stream.
pub trait EventSink: Send + Sync {
    fn record(&self, envelope: &EventEnvelope) -> Result<(), SinkError>;

    fn name(&self) -> &str;
}

/// Appends one JSON envelope per line to a file.
#[derive(Debug, Clone)]
pub struct JsonlEventSink {
    path: PathBuf,
}

impl JsonlEventSink {
    /// Create the sink, making sure the parent directory exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn record(&self, envelope: &EventEnvelope) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(envelope)?;
        line.push('\n');

        let io_err = |source: std::io::Error| SinkError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;

        debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            "event recorded"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
