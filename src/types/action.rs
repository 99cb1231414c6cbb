use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Recognised action kinds. Displayed and parsed by their PascalCase name,
/// which is also the `action_type` string on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum ActionType {
    TypeText,
    PressKey,
    ClickMouse,
    EmitLog,
    NoOp,
}

/// Agent-supplied constraints attached to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints(Map<String, Value>);

impl Constraints {
    pub const SAFETY_CHECK: &'static str = "safety_check";

    pub fn new() -> Self {
        Self(Map::new())
    }

    /// `safety_check` defaults to true; only an explicit `false` disables it.
    pub fn safety_check(&self) -> bool {
        self.0
            .get(Self::SAFETY_CHECK)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn has_override(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// A proposed action as produced by a reasoner. Kept loosely typed so that
/// unrecognised action types reach the safety gate instead of failing
/// deserialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub action_id: String,
    pub origin_observation_id: String,
    pub action_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub dry_run: bool,
}

impl ActionPlan {
    pub fn new(
        origin_observation_id: impl Into<String>,
        action_type: impl Into<String>,
        parameters: Map<String, Value>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            origin_observation_id: origin_observation_id.into(),
            action_type: action_type.into(),
            parameters,
            constraints: Constraints::new(),
            dry_run: false,
        }
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(key, value);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn recognised_type(&self) -> Option<ActionType> {
        self.action_type.parse().ok()
    }
}

/// One typed payload per action type, built from a plan's parameter map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    TypeText {
        text: String,
    },
    PressKey {
        key: String,
        #[serde(default)]
        modifiers: Vec<String>,
    },
    ClickMouse {
        x: i32,
        y: i32,
        button: String,
        clicks: u32,
    },
    EmitLog {
        message: String,
    },
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Invalid action_type: {0}")]
    UnknownActionType(String),

    #[error("{action_type} action missing required '{parameter}' parameter.")]
    MissingParameter {
        action_type: ActionType,
        parameter: &'static str,
    },

    #[error("{action_type} action has invalid '{parameter}' parameter: expected {expected}.")]
    InvalidParameter {
        action_type: ActionType,
        parameter: &'static str,
        expected: &'static str,
    },
}

impl ActionPayload {
    /// Parse a raw parameter map into a typed payload.
    ///
    /// Every missing or malformed parameter is reported, not just the first.
    pub fn parse(action_type: &str, parameters: &Map<String, Value>) -> Result<Self, Vec<PayloadError>> {
        let kind: ActionType = action_type
            .parse()
            .map_err(|_| vec![PayloadError::UnknownActionType(action_type.to_string())])?;

        let mut reader = ParameterReader::new(kind, parameters);
        let payload = match kind {
            ActionType::TypeText => reader.string("text").map(|text| Self::TypeText { text }),
            ActionType::PressKey => {
                let key = reader.string("key");
                let modifiers = reader.optional_string_list("modifiers");
                key.map(|key| Self::PressKey { key, modifiers })
            }
            ActionType::ClickMouse => {
                let x = reader.integer::<i32>("x", "an integer coordinate");
                let y = reader.integer::<i32>("y", "an integer coordinate");
                let button = reader.string("button");
                let clicks = reader.positive_count("clicks");
                match (x, y, button, clicks) {
                    (Some(x), Some(y), Some(button), Some(clicks)) => Some(Self::ClickMouse {
                        x,
                        y,
                        button,
                        clicks,
                    }),
                    _ => None,
                }
            }
            ActionType::EmitLog => reader
                .string("message")
                .map(|message| Self::EmitLog { message }),
            ActionType::NoOp => Some(Self::NoOp),
        };

        reader.finish(payload)
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Self::TypeText { .. } => ActionType::TypeText,
            Self::PressKey { .. } => ActionType::PressKey,
            Self::ClickMouse { .. } => ActionType::ClickMouse,
            Self::EmitLog { .. } => ActionType::EmitLog,
            Self::NoOp => ActionType::NoOp,
        }
    }
}

struct ParameterReader<'a> {
    action_type: ActionType,
    parameters: &'a Map<String, Value>,
    problems: Vec<PayloadError>,
}

impl<'a> ParameterReader<'a> {
    fn new(action_type: ActionType, parameters: &'a Map<String, Value>) -> Self {
        Self {
            action_type,
            parameters,
            problems: Vec::new(),
        }
    }

    fn required(&mut self, parameter: &'static str) -> Option<&'a Value> {
        match self.parameters.get(parameter) {
            None | Some(Value::Null) => {
                self.problems.push(PayloadError::MissingParameter {
                    action_type: self.action_type,
                    parameter,
                });
                None
            }
            Some(value) => Some(value),
        }
    }

    fn invalid(&mut self, parameter: &'static str, expected: &'static str) {
        self.problems.push(PayloadError::InvalidParameter {
            action_type: self.action_type,
            parameter,
            expected,
        });
    }

    fn string(&mut self, parameter: &'static str) -> Option<String> {
        let value = self.required(parameter)?;
        if let Some(text) = value.as_str() {
            Some(text.to_string())
        } else {
            self.invalid(parameter, "a string");
            None
        }
    }

    fn integer<T: TryFrom<i64>>(&mut self, parameter: &'static str, expected: &'static str) -> Option<T> {
        let value = self.required(parameter)?;
        let parsed = whole_number(value).and_then(|raw| T::try_from(raw).ok());
        if parsed.is_none() {
            self.invalid(parameter, expected);
        }
        parsed
    }

    fn positive_count(&mut self, parameter: &'static str) -> Option<u32> {
        const EXPECTED: &str = "a positive integer";
        let count = self.integer::<u32>(parameter, EXPECTED)?;
        if count == 0 {
            self.invalid(parameter, EXPECTED);
            return None;
        }
        Some(count)
    }

    fn optional_string_list(&mut self, parameter: &'static str) -> Vec<String> {
        match self.parameters.get(parameter) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(_) => {
                self.invalid(parameter, "a list of strings");
                Vec::new()
            }
        }
    }

    fn finish(self, payload: Option<ActionPayload>) -> Result<ActionPayload, Vec<PayloadError>> {
        match payload {
            Some(payload) if self.problems.is_empty() => Ok(payload),
            _ => Err(self.problems),
        }
    }
}

/// Integers, and floats with no fractional part (`10.0`), as `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(raw) = value.as_i64() {
        return Some(raw);
    }
    let raw = value.as_f64()?;
    let in_range = raw >= i64::MIN as f64 && raw < i64::MAX as f64;
    (raw.fract() == 0.0 && in_range).then(|| raw as i64)
}
