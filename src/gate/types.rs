use serde::{Deserialize, Serialize};

/// How strictly the gate vets plans.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GateMode {
    /// Every validation rule is enforced.
    #[default]
    Strict,
    /// Every plan is authorised for execution. Audited, never a default.
    Permissive,
}

/// An action type that is refused unless the plan's constraints carry
/// `override_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyRule {
    pub action_type: String,
    pub override_key: String,
}

impl DenyRule {
    pub fn new(action_type: impl Into<String>, override_key: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            override_key: override_key.into(),
        }
    }
}

pub fn default_deny_rules() -> Vec<DenyRule> {
    vec![DenyRule::new("DeleteFiles", "allow_delete")]
}
