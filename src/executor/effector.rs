use super::keys::Key;
use anyhow::Result;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Physical input capabilities: keyboard, pointer and a log channel.
///
/// Calls are synchronous and may block the calling thread for as long as
/// the device needs. The executor runs each call on the blocking pool and
/// stops waiting once its timeout expires; a call that outlives the timeout
/// keeps running to completion in the background.
pub trait Effector: Send + Sync {
    /// Human-readable backend name (e.g. "log", "xdotool")
    fn name(&self) -> &str;

    /// Type `text` as a sequence of printable characters.
    fn type_text(&self, text: &str) -> Result<()>;

    fn key_down(&self, key: Key) -> Result<()>;

    fn key_up(&self, key: Key) -> Result<()>;

    /// Press and release `key`.
    fn press_key(&self, key: Key) -> Result<()>;

    fn move_pointer(&self, x: i32, y: i32) -> Result<()>;

    fn click(&self, button: MouseButton, clicks: u32) -> Result<()>;

    fn emit_log(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "middle" => Some(Self::Middle),
            _ => None,
        }
    }
}

/// Why a single capability call did not complete.
#[derive(Debug, Error)]
pub enum EffectorError {
    #[error("{capability} timed out after {} ms", .timeout.as_millis())]
    Timeout {
        capability: &'static str,
        timeout: Duration,
    },

    #[error("{cause:#}")]
    Capability {
        capability: &'static str,
        cause: anyhow::Error,
    },
}

impl EffectorError {
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Timeout { capability, .. } | Self::Capability { capability, .. } => *capability,
        }
    }
}

/// Effector that performs no input and reports every call through tracing.
/// Used when no input device is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEffector;

impl LogEffector {
    pub fn new() -> Self {
        Self
    }
}

impl Effector for LogEffector {
    fn name(&self) -> &str {
        "log"
    }

    fn type_text(&self, text: &str) -> Result<()> {
        info!(chars = text.chars().count(), "effector.type_text");
        Ok(())
    }

    fn key_down(&self, key: Key) -> Result<()> {
        info!(key = %key, "effector.key_down");
        Ok(())
    }

    fn key_up(&self, key: Key) -> Result<()> {
        info!(key = %key, "effector.key_up");
        Ok(())
    }

    fn press_key(&self, key: Key) -> Result<()> {
        info!(key = %key, "effector.press_key");
        Ok(())
    }

    fn move_pointer(&self, x: i32, y: i32) -> Result<()> {
        info!(x, y, "effector.move_pointer");
        Ok(())
    }

    fn click(&self, button: MouseButton, clicks: u32) -> Result<()> {
        info!(button = %button, clicks, "effector.click");
        Ok(())
    }

    fn emit_log(&self, message: &str) -> Result<()> {
        info!(message = %message, "effector.emit_log");
        Ok(())
    }
}
