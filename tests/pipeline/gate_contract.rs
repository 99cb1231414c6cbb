use aios::gate::{DenyRule, GateMode, SafetyGate};
use aios::types::{ActionPlan, VerificationStatus};
use serde_json::json;

fn plan_from_wire(raw: serde_json::Value) -> ActionPlan {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn unknown_wire_action_reaches_the_gate_and_is_rejected() {
    let plan = plan_from_wire(json!({
        "action_id": "a-1",
        "origin_observation_id": "obs-1",
        "action_type": "DeleteFiles",
        "parameters": {"path": "C:\\"},
        "constraints": {"safety_check": true},
        "dry_run": false
    }));

    let verified = SafetyGate::strict().verify(&plan);

    assert_eq!(verified.status, VerificationStatus::RejectedUnsafe);
    assert_eq!(verified.validation_messages.len(), 2);
    assert!(verified.validation_messages[1].contains("blacklisted"));
}

#[test]
fn verified_plan_round_trips_through_json() {
    let plan = plan_from_wire(json!({
        "action_id": "a-2",
        "origin_observation_id": "obs-1",
        "action_type": "ClickMouse",
        "parameters": {"x": 5, "y": 6, "button": "right", "clicks": 1}
    }));

    let verified = SafetyGate::strict().verify(&plan);
    let encoded = serde_json::to_value(&verified).unwrap();

    assert_eq!(encoded["status"], "ready_for_execution");
    assert_eq!(encoded["payload"]["type"], "click_mouse");
    let decoded: aios::types::VerifiedActionPlan = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, verified);
}

#[test]
fn configured_deny_list_replaces_default() {
    let gate = SafetyGate::new(
        GateMode::Strict,
        vec![DenyRule::new("EmitLog", "allow_logging")],
    );
    let log = plan_from_wire(json!({
        "action_id": "a-3",
        "origin_observation_id": "obs-1",
        "action_type": "EmitLog",
        "parameters": {"message": "hi"}
    }));

    assert_eq!(gate.verify(&log).status, VerificationStatus::RejectedUnsafe);
    assert_eq!(gate.deny_rules().len(), 1);
}
