use crate::error::ConfigError;
use crate::gate::{DenyRule, GateMode, default_deny_rules};
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gate: GateConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub reasoner: ReasonerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── Safety gate ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// "strict" | "permissive"
    #[serde(default)]
    pub mode: GateMode,
    /// Action types refused unless the plan carries the override key
    #[serde(default = "default_deny_rules")]
    pub deny: Vec<DenyRule>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: GateMode::Strict,
            deny: default_deny_rules(),
        }
    }
}

// ── Executor ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Upper bound for a single effector call
    #[serde(default = "default_effector_timeout_ms")]
    pub effector_timeout_ms: u64,
}

fn default_effector_timeout_ms() -> u64 {
    10_000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            effector_timeout_ms: default_effector_timeout_ms(),
        }
    }
}

// ── Memory ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Change log location; `~` is expanded
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Characters of each UI summary kept in change descriptions
    #[serde(default = "default_ui_preview_chars")]
    pub ui_preview_chars: usize,
    /// Change records handed to the reasoner each cycle
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_state_file() -> String {
    "~/.aios/state/change_log.json".into()
}

fn default_ui_preview_chars() -> usize {
    crate::memory::DEFAULT_UI_PREVIEW_CHARS
}

fn default_history_limit() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            ui_preview_chars: default_ui_preview_chars(),
            history_limit: default_history_limit(),
        }
    }
}

impl MemoryConfig {
    pub fn state_path(&self) -> PathBuf {
        expand_path(&self.state_file)
    }
}

// ── Event stream ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// JSONL event log location; `~` is expanded
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_log_file() -> String {
    "~/.aios/events.jsonl".into()
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

impl EventsConfig {
    pub fn log_path(&self) -> PathBuf {
        expand_path(&self.log_file)
    }
}

// ── Reasoner ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Mark every proposed plan as dry-run
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First retry delay; doubles on each further failure
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    250
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

// ── Observability ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "none" | "log"
    pub backend: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: "log".into(),
        }
    }
}

// ── Loading / saving ─────────────────────────────────────────────

const MIN_UI_PREVIEW_CHARS: usize = 4;

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

impl Config {
    /// Parse and validate the config file at `path`.
    pub fn load_from(path: &Path) -> std::result::Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Load `~/.aios/config.toml`, writing the defaults there first when it
    /// does not exist yet.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let config_path = home.join(".aios").join("config.toml");

        if config_path.exists() {
            Self::load_from(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.executor.effector_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "executor.effector_timeout_ms must be > 0".into(),
            ));
        }
        if self.memory.ui_preview_chars < MIN_UI_PREVIEW_CHARS {
            return Err(ConfigError::Validation(format!(
                "memory.ui_preview_chars must be >= {MIN_UI_PREVIEW_CHARS}"
            )));
        }
        if self.reasoner.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "reasoner.max_attempts must be >= 1".into(),
            ));
        }
        if self.memory.state_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "memory.state_file must not be empty".into(),
            ));
        }
        if self.events.log_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "events.log_file must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
