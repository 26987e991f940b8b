use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which output stream of the dev process a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Stdout,
    Stderr,
}

/// One captured line of dev-server output. Lines are immutable once captured
/// and are always consumed in `sequence` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub source: LogSource,
    pub text: String,
    pub sequence: u64,
    pub captured_at: DateTime<Utc>,
}

impl LogLine {
    pub fn new(source: LogSource, text: impl Into<String>, sequence: u64) -> Self {
        LogLine {
            source,
            text: text.into(),
            sequence,
            captured_at: Utc::now(),
        }
    }

    pub fn stdout(text: impl Into<String>, sequence: u64) -> Self {
        Self::new(LogSource::Stdout, text, sequence)
    }

    pub fn stderr(text: impl Into<String>, sequence: u64) -> Self {
        Self::new(LogSource::Stderr, text, sequence)
    }

    /// Load a pre-captured log file as a line sequence. Every line is treated
    /// as stdout; sequence numbers follow file order.
    pub fn read_file(path: &Path) -> anyhow::Result<Vec<LogLine>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;
        Ok(Self::from_text(&content))
    }

    /// Split a raw text blob into stdout lines, preserving order.
    pub fn from_text(content: &str) -> Vec<LogLine> {
        content
            .lines()
            .enumerate()
            .map(|(i, line)| LogLine::stdout(line, i as u64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_preserves_order() {
        let lines = LogLine::from_text("first\nsecond\n\nfourth");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[0].sequence, 0);
        assert_eq!(lines[2].text, "");
        assert_eq!(lines[3].sequence, 3);
        assert!(lines.iter().all(|l| l.source == LogSource::Stdout));
    }

    #[test]
    fn test_source_serializes_lowercase() {
        let line = LogLine::stderr("boom", 7);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["source"], "stderr");
        assert_eq!(json["sequence"], 7);
    }
}
