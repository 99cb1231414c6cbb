use std::sync::Arc;

use aios::AiosError;
use aios::events::EventType;
use aios::types::{ReceiptStatus, VerificationStatus};

use super::pipeline_harness::{BrokenReasoner, Call, Fixture, observation};

#[tokio::test]
async fn typing_intent_runs_end_to_end() {
    let fixture = Fixture::new();
    let mut control = fixture.rule_loop();
    let observed = observation("Preparing to type.", "Notepad is open.", "System idle.");

    let report = control.run_cycle(observed.clone()).await.unwrap();

    let change = report.change.as_ref().unwrap();
    assert!(change.summary_of_change.starts_with("Initial observation"));
    assert_eq!(report.plan.action_type, "TypeText");
    assert_eq!(report.plan.origin_observation_id, observed.observation_id);
    assert_eq!(report.verified.status, VerificationStatus::ReadyForExecution);
    assert_eq!(report.receipt.status, ReceiptStatus::Success);
    assert_eq!(report.receipt.action_id, report.plan.action_id);

    let calls = fixture.effector.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::TypeText(text) if text.starts_with("Hello from AIOS!")));

    assert_eq!(
        fixture.sink.event_types(),
        vec![
            EventType::Observation,
            EventType::ChangeRecord,
            EventType::ActionPlan,
            EventType::VerifiedActionPlan,
            EventType::Receipt,
        ]
    );
    assert_eq!(
        fixture.observer.names(),
        vec![
            "observation_ingested",
            "change_recorded",
            "plan_verified",
            "action_dispatched",
            "cycle_completed",
        ]
    );
    assert!(fixture.state_path().exists());
}

#[tokio::test]
async fn unchanged_observation_skips_change_record() {
    let fixture = Fixture::new();
    let mut control = fixture.rule_loop();

    control
        .run_cycle(observation("Browsing.", "Chrome", ""))
        .await
        .unwrap();
    let second = control
        .run_cycle(observation("Browsing.", "Chrome", ""))
        .await
        .unwrap();

    assert!(second.change.is_none());
    assert_eq!(second.plan.action_type, "NoOp");
    assert_eq!(second.receipt.status, ReceiptStatus::Success);
    assert_eq!(control.detector().len(), 1);
    let change_events = fixture
        .sink
        .event_types()
        .into_iter()
        .filter(|t| *t == EventType::ChangeRecord)
        .count();
    assert_eq!(change_events, 1);
    assert!(fixture.effector.calls().is_empty());
}

#[tokio::test]
async fn reasoner_failure_aborts_cycle_after_retries() {
    let fixture = Fixture::new();
    let mut control = fixture.control_loop(Arc::new(BrokenReasoner));

    let err = control
        .run_cycle(observation("idle", "Desktop", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, AiosError::Reasoner(_)));
    assert!(err.to_string().contains("broken gave up after 2 attempt(s)"));
    // The observation was still remembered before the reasoner ran.
    assert_eq!(fixture.detector().len(), 1);
    assert_eq!(fixture.sink.event_types().last(), Some(&EventType::ChangeRecord));
    assert_eq!(fixture.observer.names().last().map(String::as_str), Some("error"));
    assert!(fixture.effector.calls().is_empty());
}

#[tokio::test]
async fn unwritable_state_file_is_a_persistence_failure() {
    let fixture = Fixture::new();
    let mut control = fixture.rule_loop();
    // A directory squatting on the state path makes the atomic rename fail.
    std::fs::create_dir_all(fixture.state_path()).unwrap();

    let err = control
        .run_cycle(observation("Preparing to type.", "Notepad is open.", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, AiosError::Persistence(_)));
    assert_eq!(fixture.sink.event_types(), vec![EventType::Observation]);
    assert!(fixture.effector.calls().is_empty());
    assert_eq!(fixture.observer.names().last().map(String::as_str), Some("error"));
}

#[tokio::test]
async fn dino_cycle_presses_space_and_history_feeds_next_cycle() {
    let fixture = Fixture::new();
    let mut control = fixture.rule_loop().with_history_limit(1);

    control
        .run_cycle(observation("Waiting for instructions.", "Desktop", ""))
        .await
        .unwrap();
    let report = control
        .run_cycle(observation("Play Chrome Dino Game.", "Chrome Dino", ""))
        .await
        .unwrap();

    assert_eq!(report.plan.action_type, "PressKey");
    assert_eq!(
        fixture.effector.calls(),
        vec![Call::PressKey(aios::executor::Key::Space)]
    );
    let summary = &report.change.unwrap().summary_of_change;
    assert!(summary.contains("Intent changed"));
    assert!(summary.contains("UI summary changed"));
}

#[tokio::test]
async fn cycle_report_serializes_for_cli_output() {
    let fixture = Fixture::new();
    let mut control = fixture.rule_loop();

    let report = control
        .run_cycle(observation(
            "Idle.",
            "Terminal",
            "System is running the pilot script.",
        ))
        .await
        .unwrap();
    let encoded = serde_json::to_value(&report).unwrap();

    assert_eq!(encoded["plan"]["action_type"], "EmitLog");
    assert_eq!(encoded["verified"]["status"], "ready_for_execution");
    assert_eq!(encoded["receipt"]["status"], "success");
    assert!(encoded["change"].is_object());
}
