use super::traits::{Observer, ObserverEvent};
use tracing::{info, warn};

/// Log-based observer — uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::ObservationIngested { observation_id } => {
                info!(observation_id = %observation_id, "observation.ingested");
            }
            ObserverEvent::ChangeRecorded {
                observation_id,
                summary,
            } => {
                info!(observation_id = %observation_id, summary = %summary, "change.recorded");
            }
            ObserverEvent::PlanVerified {
                action_id,
                action_type,
                status,
            } => {
                info!(
                    action_id = %action_id,
                    action_type = %action_type,
                    status = %status,
                    "plan.verified"
                );
            }
            ObserverEvent::ActionDispatched {
                action_type,
                status,
                duration,
            } => {
                info!(
                    action_type = %action_type,
                    status = %status,
                    duration_ms = millis(*duration),
                    "action.dispatched"
                );
            }
            ObserverEvent::CycleCompleted {
                observation_id,
                duration,
            } => {
                info!(
                    observation_id = %observation_id,
                    duration_ms = millis(*duration),
                    "cycle.completed"
                );
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
