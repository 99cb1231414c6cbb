use super::persistence::{read_json, write_atomic};
use crate::error::PersistenceError;
use crate::types::{ChangeRecord, ObservationEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_UI_PREVIEW_CHARS: usize = 50;
const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDetectorOptions {
    /// Characters of each UI summary kept in change descriptions.
    pub ui_preview_chars: usize,
}

impl Default for ChangeDetectorOptions {
    fn default() -> Self {
        Self {
            ui_preview_chars: DEFAULT_UI_PREVIEW_CHARS,
        }
    }
}

/// Persisted form of the detector: the whole change log plus the comparison
/// baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeDetectorState {
    #[serde(default)]
    pub graph_updates: Vec<ChangeRecord>,
    #[serde(default)]
    pub previous_observation: Option<ObservationEvent>,
}

/// Change-tracking memory backed by a single JSON file.
///
/// Each observation is compared against the one immediately before it; only
/// meaningful differences are appended to the log. One instance owns one
/// storage location, and callers must not run two detectors against the
/// same file concurrently.
#[derive(Debug)]
pub struct ChangeDetector {
    path: PathBuf,
    options: ChangeDetectorOptions,
    state: ChangeDetectorState,
}

impl ChangeDetector {
    /// Open the change log at `path`, starting empty when nothing is stored
    /// there yet.
    pub fn open(
        path: impl Into<PathBuf>,
        options: ChangeDetectorOptions,
    ) -> Result<Self, PersistenceError> {
        let mut detector = Self {
            path: path.into(),
            options,
            state: ChangeDetectorState::default(),
        };
        detector.load()?;
        Ok(detector)
    }

    /// Replace in-memory state with what is stored on disk.
    pub fn load(&mut self) -> Result<(), PersistenceError> {
        if let Some(state) = read_json::<ChangeDetectorState>(&self.path)? {
            info!(
                path = %self.path.display(),
                records = state.graph_updates.len(),
                "change log loaded"
            );
            self.state = state;
        } else {
            debug!(path = %self.path.display(), "no change log found, starting fresh");
            self.state = ChangeDetectorState::default();
        }
        Ok(())
    }

    /// Write the full state, replacing whatever was stored before.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let json =
            serde_json::to_string_pretty(&self.state).map_err(PersistenceError::Encode)?;
        write_atomic(&self.path, &json)?;
        debug!(
            path = %self.path.display(),
            records = self.state.graph_updates.len(),
            "change log saved"
        );
        Ok(())
    }

    /// Ingest one observation, returning the change record it produced, if
    /// any. The comparison baseline always advances to `observation`.
    pub fn update(&mut self, observation: &ObservationEvent) -> Option<ChangeRecord> {
        let change = match &self.state.previous_observation {
            None => Some(self.describe_initial(observation)),
            Some(previous) => self.describe_change(previous, observation),
        };

        self.state.previous_observation = Some(observation.clone());

        let Some((summary_of_change, change_kinds)) = change else {
            debug!(observation_id = %observation.observation_id, "no meaningful change");
            return None;
        };

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "potential_intent".to_string(),
            observation.potential_intent.clone(),
        );
        metadata.insert(
            "environment_state_summary".to_string(),
            observation.environment_state_summary.clone(),
        );
        metadata.insert("change_kinds".to_string(), change_kinds.join(","));

        let record = ChangeRecord {
            observation_id: observation.observation_id.clone(),
            timestamp: Utc::now(),
            summary_of_change,
            metadata,
        };
        info!(
            observation_id = %record.observation_id,
            summary = %record.summary_of_change,
            "change recorded"
        );
        self.state.graph_updates.push(record.clone());
        Some(record)
    }

    /// Most-recent-first records whose summary contains `filter`
    /// (case-insensitive), at most `limit` of them.
    pub fn query(&self, filter: &str, limit: usize) -> Vec<ChangeRecord> {
        let needle = filter.to_lowercase();
        self.state
            .graph_updates
            .iter()
            .rev()
            .filter(|record| {
                needle.is_empty() || record.summary_of_change.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.state.graph_updates
    }

    pub fn previous_observation(&self) -> Option<&ObservationEvent> {
        self.state.previous_observation.as_ref()
    }

    pub fn state(&self) -> &ChangeDetectorState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.graph_updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.graph_updates.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn describe_initial(&self, observation: &ObservationEvent) -> (String, Vec<&'static str>) {
        let summary = format!(
            "Initial observation: Intent='{}', UI='{}'",
            observation.potential_intent,
            self.preview(&observation.ui_state_summary)
        );
        (summary, vec!["initial"])
    }

    fn describe_change(
        &self,
        previous: &ObservationEvent,
        current: &ObservationEvent,
    ) -> Option<(String, Vec<&'static str>)> {
        let mut clauses = Vec::new();
        let mut kinds = Vec::new();

        if previous.potential_intent != current.potential_intent {
            clauses.push(format!(
                "Intent changed from '{}' to '{}'.",
                previous.potential_intent, current.potential_intent
            ));
            kinds.push("intent");
        }

        if !current.ui_state_summary.is_empty()
            && previous.ui_state_summary != current.ui_state_summary
        {
            clauses.push(format!(
                "UI summary changed from '{}' to '{}'.",
                self.preview(&previous.ui_state_summary),
                self.preview(&current.ui_state_summary)
            ));
            kinds.push("ui");
        }

        if clauses.is_empty() {
            None
        } else {
            Some((clauses.join(" "), kinds))
        }
    }

    fn preview(&self, text: &str) -> String {
        truncate_with_marker(text, self.options.ui_preview_chars)
    }
}

fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
