//! Event history of a group, kept for debugging and diagnostics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::runtime::Instant;

/// Kind of event in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A group command was received
    Command,
    /// A member command was handed to the dispatcher
    Dispatch,
    /// A member reported a new state
    StateChange,
}

/// A recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: EventKind,
    /// Group name for commands, member id otherwise
    pub source: String,
    pub event: Value,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Bounded history of what happened to a group.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    latest: HashMap<EventKind, HashMap<String, Value>>,
    last_error: Option<String>,
    start_time: Instant,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self {
            latest: HashMap::new(),
            last_error: None,
            start_time: Instant::now(),
            entries: Vec::new(),
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::new()
        }
    }

    pub fn record(&mut self, kind: EventKind, source: &str, event: Value) {
        self.latest
            .entry(kind)
            .or_default()
            .insert(source.to_string(), event.clone());

        self.entries.push(HistoryEntry {
            kind,
            source: source.to_string(),
            event,
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Latest event of a kind from one source.
    pub fn latest(&self, kind: EventKind, source: &str) -> Option<&Value> {
        self.latest.get(&kind).and_then(|m| m.get(source))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
        self.entries.clear();
        self.last_error = None;
    }

    pub fn summary(&self) -> HistorySummary {
        let count = |kind: EventKind| self.entries.iter().filter(|e| e.kind == kind).count();
        HistorySummary {
            command_count: count(EventKind::Command),
            dispatch_count: count(EventKind::Dispatch),
            state_change_count: count(EventKind::StateChange),
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of a group's history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub command_count: usize,
    pub dispatch_count: usize,
    pub state_change_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_event() {
        let mut history = CommandHistory::new();
        history.record(EventKind::Command, "Living Room", json!({"power": "on"}));
        history.record(EventKind::Dispatch, "light.main", json!({"service": "turn_on"}));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.latest(EventKind::Dispatch, "light.main"),
            Some(&json!({"service": "turn_on"}))
        );
        assert_eq!(history.latest(EventKind::Dispatch, "light.other"), None);

        let summary = history.summary();
        assert_eq!(summary.command_count, 1);
        assert_eq!(summary.dispatch_count, 1);
        assert_eq!(summary.state_change_count, 0);
    }

    #[test]
    fn test_record_error() {
        let mut history = CommandHistory::new();
        history.record_error("light.main: unreachable");
        assert_eq!(history.last_error(), Some("light.main: unreachable"));

        history.clear();
        assert_eq!(history.last_error(), None);
    }

    #[test]
    fn test_max_entries() {
        let mut history = CommandHistory::with_max_entries(2);
        for i in 0..5 {
            history.record(EventKind::StateChange, &format!("light.{i}"), json!({}));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].source, "light.3");
    }
}
