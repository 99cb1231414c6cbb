use std::time::Duration;

use aios::executor::{Key, MouseButton};
use aios::gate::{GateMode, SafetyGate, default_deny_rules};
use aios::types::{ActionPlan, ReceiptStatus};
use serde_json::{Value, json};

use super::pipeline_harness::{Call, RecordingEffector, executor};

fn plan(action_type: &str, parameters: Value) -> ActionPlan {
    ActionPlan::new("obs-42", action_type, parameters.as_object().cloned().unwrap())
        .with_constraint("safety_check", json!(true))
}

#[tokio::test]
async fn ready_click_moves_once_and_clicks_once() {
    let effector = RecordingEffector::new();
    let executor = executor(&effector, Duration::from_secs(1));
    let verified = SafetyGate::strict().verify(&plan(
        "ClickMouse",
        json!({"x": 100, "y": 200, "button": "left", "clicks": 2}),
    ));

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::Success);
    assert_eq!(receipt.origin_observation_id, "obs-42");
    assert_eq!(
        effector.calls(),
        vec![
            Call::MovePointer(100, 200),
            Call::Click(MouseButton::Left, 2)
        ]
    );
}

#[tokio::test]
async fn dry_run_never_types() {
    let effector = RecordingEffector::new();
    let executor = executor(&effector, Duration::from_secs(1));
    let verified =
        SafetyGate::strict().verify(&plan("TypeText", json!({"text": "Hi"})).with_dry_run(true));

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::DryRunSuccess);
    assert!(receipt.message.contains("Would type: 'Hi'"));
    assert!(effector.calls().is_empty());
}

#[tokio::test]
async fn rejected_plan_never_touches_effector() {
    let effector = RecordingEffector::new();
    let executor = executor(&effector, Duration::from_secs(1));
    let verified = SafetyGate::strict().verify(
        &plan("TypeText", json!({"text": "rm -rf"})).with_constraint("safety_check", json!(false)),
    );

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::RejectedUnsafe);
    assert_eq!(receipt.message, "Action was rejected as unsafe.");
    assert!(effector.calls().is_empty());
}

#[tokio::test]
async fn modifier_chord_is_balanced() {
    let effector = RecordingEffector::new();
    let executor = executor(&effector, Duration::from_secs(1));
    let verified = SafetyGate::strict().verify(&plan(
        "PressKey",
        json!({"key": "f5", "modifiers": ["cmd", "shift"]}),
    ));

    executor.execute(&verified).await;

    assert_eq!(
        effector.calls(),
        vec![
            Call::KeyDown(Key::Meta),
            Call::KeyDown(Key::Shift),
            Call::PressKey(Key::F5),
            Call::KeyUp(Key::Shift),
            Call::KeyUp(Key::Meta),
        ]
    );
}

#[tokio::test]
async fn failing_device_produces_failure_receipt() {
    let effector = RecordingEffector::failing();
    let executor = executor(&effector, Duration::from_secs(1));
    let verified = SafetyGate::strict().verify(&plan("EmitLog", json!({"message": "hello"})));

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::Failure);
    assert_eq!(receipt.message, "EmitLog failed: input device unavailable");
}

#[tokio::test]
async fn stalled_device_is_bounded_by_timeout() {
    let effector = RecordingEffector::stalling();
    let executor = executor(&effector, Duration::from_millis(20));
    let verified = SafetyGate::strict().verify(&plan("TypeText", json!({"text": "slow"})));

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::Failure);
    assert!(receipt.message.starts_with("TypeText failed: type_text timed out"));
    assert!(receipt.latency_ms < 600.0);
}

#[tokio::test]
async fn permissive_gate_lets_malformed_plan_fail_at_dispatch() {
    let effector = RecordingEffector::new();
    let executor = executor(&effector, Duration::from_secs(1));
    let gate = SafetyGate::new(GateMode::Permissive, default_deny_rules());
    let verified = gate.verify(&plan("DeleteFiles", json!({})));

    let receipt = executor.execute(&verified).await;

    assert_eq!(receipt.status, ReceiptStatus::Failure);
    assert_eq!(
        receipt.message,
        "Unknown action type for execution: 'DeleteFiles'"
    );
    assert!(effector.calls().is_empty());
}
