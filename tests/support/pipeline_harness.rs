#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use aios::error::SinkError;
use aios::events::{EventEnvelope, EventSink, EventType};
use aios::executor::{ActionExecutor, Effector, ExecutorOptions, Key, MouseButton};
use aios::gate::SafetyGate;
use aios::memory::{ChangeDetector, ChangeDetectorOptions};
use aios::observability::{Observer, ObserverEvent};
use aios::reasoner::{DecideFuture, Reasoner, RetryPolicy, RuleReasoner};
use aios::types::{ActionPlan, ChangeRecord, ObservationEvent};
use aios::ControlLoop;

// ── Effector ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    TypeText(String),
    KeyDown(Key),
    KeyUp(Key),
    PressKey(Key),
    MovePointer(i32, i32),
    Click(MouseButton, u32),
    EmitLog(String),
}

#[derive(Default)]
pub struct RecordingEffector {
    calls: Mutex<Vec<Call>>,
    fail_all: bool,
    stall: bool,
}

impl RecordingEffector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_all: true,
            ..Self::default()
        })
    }

    pub fn stalling() -> Arc<Self> {
        Arc::new(Self {
            stall: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.stall {
            std::thread::sleep(Duration::from_millis(600));
        }
        if self.fail_all {
            anyhow::bail!("input device unavailable");
        }
        Ok(())
    }
}

impl Effector for RecordingEffector {
    fn name(&self) -> &str {
        "recording"
    }

    fn type_text(&self, text: &str) -> anyhow::Result<()> {
        self.push(Call::TypeText(text.to_string()))
    }

    fn key_down(&self, key: Key) -> anyhow::Result<()> {
        self.push(Call::KeyDown(key))
    }

    fn key_up(&self, key: Key) -> anyhow::Result<()> {
        self.push(Call::KeyUp(key))
    }

    fn press_key(&self, key: Key) -> anyhow::Result<()> {
        self.push(Call::PressKey(key))
    }

    fn move_pointer(&self, x: i32, y: i32) -> anyhow::Result<()> {
        self.push(Call::MovePointer(x, y))
    }

    fn click(&self, button: MouseButton, clicks: u32) -> anyhow::Result<()> {
        self.push(Call::Click(button, clicks))
    }

    fn emit_log(&self, message: &str) -> anyhow::Result<()> {
        self.push(Call::EmitLog(message.to_string()))
    }
}

pub fn executor(effector: &Arc<RecordingEffector>, timeout: Duration) -> ActionExecutor {
    ActionExecutor::new(
        Arc::clone(effector) as Arc<dyn Effector>,
        ExecutorOptions {
            effector_timeout: timeout,
        },
    )
}

// ── Event sink ───────────────────────────────────────────

#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<EventEnvelope>>,
}

impl MemorySink {
    pub fn event_types(&self) -> Vec<EventType> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, envelope: &EventEnvelope) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(envelope.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ── Observer ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn names(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn record_event(&self, event: &ObserverEvent) {
        let name = match event {
            ObserverEvent::ObservationIngested { .. } => "observation_ingested",
            ObserverEvent::ChangeRecorded { .. } => "change_recorded",
            ObserverEvent::PlanVerified { .. } => "plan_verified",
            ObserverEvent::ActionDispatched { .. } => "action_dispatched",
            ObserverEvent::CycleCompleted { .. } => "cycle_completed",
            ObserverEvent::Error { .. } => "error",
        };
        self.events.lock().unwrap().push(name.to_string());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ── Reasoner ─────────────────────────────────────────────

pub struct BrokenReasoner;

impl Reasoner for BrokenReasoner {
    fn name(&self) -> &str {
        "broken"
    }

    fn decide<'a>(
        &'a self,
        _observation: &'a ObservationEvent,
        _history: &'a [ChangeRecord],
    ) -> DecideFuture<'a> {
        Box::pin(async move {
            let outcome: anyhow::Result<ActionPlan> = Err(anyhow::anyhow!("model endpoint unreachable"));
            outcome
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────

pub struct Fixture {
    pub tmp: TempDir,
    pub effector: Arc<RecordingEffector>,
    pub sink: Arc<MemorySink>,
    pub observer: Arc<RecordingObserver>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_effector(RecordingEffector::new())
    }

    pub fn with_effector(effector: Arc<RecordingEffector>) -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
            effector,
            sink: Arc::new(MemorySink::default()),
            observer: Arc::new(RecordingObserver::default()),
        }
    }

    pub fn state_path(&self) -> std::path::PathBuf {
        self.tmp.path().join("state").join("change_log.json")
    }

    pub fn detector(&self) -> ChangeDetector {
        ChangeDetector::open(self.state_path(), ChangeDetectorOptions::default()).unwrap()
    }

    pub fn control_loop(&self, reasoner: Arc<dyn Reasoner>) -> ControlLoop {
        ControlLoop::new(
            self.detector(),
            SafetyGate::strict(),
            executor(&self.effector, Duration::from_millis(100)),
            reasoner,
            Arc::clone(&self.sink) as Arc<dyn EventSink>,
        )
        .with_observer(Arc::clone(&self.observer) as Arc<dyn Observer>)
        .with_retry_policy(RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
        })
    }

    pub fn rule_loop(&self) -> ControlLoop {
        self.control_loop(Arc::new(RuleReasoner::new()))
    }
}

pub fn observation(intent: &str, ui: &str, env: &str) -> ObservationEvent {
    ObservationEvent::new(intent, ui, env)
}
