use crate::error::Result;
use crate::events::{EventEnvelope, EventSink};
use crate::executor::ActionExecutor;
use crate::gate::SafetyGate;
use crate::memory::ChangeDetector;
use crate::observability::{NoopObserver, Observer, ObserverEvent};
use crate::reasoner::{Reasoner, RetryPolicy};
use crate::types::{ActionPlan, ChangeRecord, ObservationEvent, Receipt, VerifiedActionPlan};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Everything one cycle produced, in pipeline order.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub change: Option<ChangeRecord>,
    pub plan: ActionPlan,
    pub verified: VerifiedActionPlan,
    pub receipt: Receipt,
}

/// Observe → remember → decide → verify → act, one observation at a time.
///
/// `run_cycle` takes `&mut self`, so cycles sharing a detector never
/// overlap.
pub struct ControlLoop {
    detector: ChangeDetector,
    gate: SafetyGate,
    executor: ActionExecutor,
    reasoner: Arc<dyn Reasoner>,
    sink: Arc<dyn EventSink>,
    observer: Arc<dyn Observer>,
    history_limit: usize,
    retry: RetryPolicy,
}

impl ControlLoop {
    pub fn new(
        detector: ChangeDetector,
        gate: SafetyGate,
        executor: ActionExecutor,
        reasoner: Arc<dyn Reasoner>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            detector,
            gate,
            executor,
            reasoner,
            sink,
            observer: Arc::new(NoopObserver),
            history_limit: DEFAULT_HISTORY_LIMIT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    /// Run one full cycle for `observation`.
    ///
    /// Persistence, event sink and reasoner faults abort the cycle; action
    /// outcomes (rejection, dry-run, effector failure) are reported in the
    /// receipt instead.
    pub async fn run_cycle(&mut self, observation: ObservationEvent) -> Result<CycleReport> {
        let started = Instant::now();
        let report = self.advance(&observation).await;

        match &report {
            Ok(report) => {
                self.observer.record_event(&ObserverEvent::CycleCompleted {
                    observation_id: observation.observation_id.clone(),
                    duration: started.elapsed(),
                });
                info!(
                    observation_id = %observation.observation_id,
                    action_type = %report.plan.action_type,
                    receipt = %report.receipt.status,
                    "cycle completed"
                );
            }
            Err(err) => {
                self.observer.record_event(&ObserverEvent::Error {
                    component: "cycle".into(),
                    message: err.to_string(),
                });
            }
        }
        self.observer.flush();
        report
    }

    async fn advance(&mut self, observation: &ObservationEvent) -> Result<CycleReport> {
        self.sink.record(&EventEnvelope::observation(observation)?)?;
        self.observer.record_event(&ObserverEvent::ObservationIngested {
            observation_id: observation.observation_id.clone(),
        });

        let change = self.detector.update(observation);
        self.detector.save()?;
        if let Some(record) = &change {
            self.sink.record(&EventEnvelope::change_record(record)?)?;
            self.observer.record_event(&ObserverEvent::ChangeRecorded {
                observation_id: record.observation_id.clone(),
                summary: record.summary_of_change.clone(),
            });
        }

        let history = self.detector.query("", self.history_limit);
        let plan = self
            .retry
            .decide_with_retries(self.reasoner.as_ref(), observation, &history)
            .await?;
        self.sink.record(&EventEnvelope::action_plan(&plan)?)?;

        let verified = self.gate.verify(&plan);
        self.sink
            .record(&EventEnvelope::verified_action_plan(&verified)?)?;
        self.observer.record_event(&ObserverEvent::PlanVerified {
            action_id: plan.action_id.clone(),
            action_type: plan.action_type.clone(),
            status: verified.status,
        });

        let receipt = self.executor.execute(&verified).await;
        self.sink.record(&EventEnvelope::receipt(&receipt)?)?;
        self.observer.record_event(&ObserverEvent::ActionDispatched {
            action_type: plan.action_type.clone(),
            status: receipt.status,
            duration: Duration::from_secs_f64(receipt.latency_ms / 1000.0),
        });

        Ok(CycleReport {
            change,
            plan,
            verified,
            receipt,
        })
    }
}
