use crate::types::{ReceiptStatus, VerificationStatus};
use std::time::Duration;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    ObservationIngested {
        observation_id: String,
    },
    ChangeRecorded {
        observation_id: String,
        summary: String,
    },
    PlanVerified {
        action_id: String,
        action_type: String,
        status: VerificationStatus,
    },
    ActionDispatched {
        action_type: String,
        status: ReceiptStatus,
        duration: Duration,
    },
    CycleCompleted {
        observation_id: String,
        duration: Duration,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Core observability trait — implement for any backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
