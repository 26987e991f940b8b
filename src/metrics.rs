use crate::logs::LogLine;
use serde::{Deserialize, Serialize};

/// Severity of a classified diagnostic line or recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Info,
    Warning,
    Error,
    Critical,
}

/// A classified diagnostic extracted from log output. Identity is structural:
/// duplicates are allowed and kept in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u64>,
}

impl Issue {
    pub fn new(level: IssueLevel, message: impl Into<String>) -> Self {
        Issue {
            level,
            message: message.into(),
            details: None,
            occurrences: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Initial,
    Incremental,
}

/// One completed compilation reported by the dev server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEvent {
    pub target: String,
    pub duration_ms: Option<f64>,
    pub modules: Option<u64>,
    pub kind: BuildKind,
}

/// Derived totals over the build events of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub event_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_build_ms: Option<f64>,
    pub longest_target: String,
}

/// Everything the parser extracted from one log batch. `summary` is present
/// exactly when `build_events` is non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub build_events: Vec<BuildEvent>,
    pub warnings: Vec<Issue>,
    pub errors: Vec<Issue>,
    pub notes: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BuildSummary>,
    #[serde(default)]
    pub raw_logs: Vec<LogLine>,
}

impl Metrics {
    /// Untouched-input fallback for frameworks without a dedicated parser.
    pub fn passthrough(raw_logs: Vec<LogLine>) -> Self {
        Metrics {
            raw_logs,
            ..Default::default()
        }
    }

    /// Recompute the derived summary from the current build events.
    ///
    /// The first event seeds the accumulator whether or not it carries a
    /// duration; after that an event only takes over when its duration is
    /// present and strictly greater than the running maximum, so the first
    /// event wins ties and events without a duration never win.
    pub fn finalize_summary(&mut self) {
        if self.build_events.is_empty() {
            self.summary = None;
            return;
        }

        let mut longest = &self.build_events[0];
        for event in &self.build_events[1..] {
            let candidate = match event.duration_ms {
                Some(d) => d,
                None => continue,
            };
            match longest.duration_ms {
                Some(max) if candidate <= max => {}
                _ => longest = event,
            }
        }

        self.summary = Some(BuildSummary {
            event_count: self.build_events.len(),
            longest_build_ms: longest.duration_ms,
            longest_target: longest.target.clone(),
        });
    }
}
