use crate::config::Thresholds;
use crate::metrics::{Issue, Metrics};
use crate::recommend::{build_recommendations, ConfigFileStatus};
use crate::score::{score, HealthLevel};
use serde::{Deserialize, Serialize};

/// Health verdict for one analyzed run: the score, its level, the ordered
/// recommendations, and the raw issues (errors first, then warnings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: u8,
    pub level: HealthLevel,
    pub recommendations: Vec<Issue>,
    pub issues: Vec<Issue>,
}

pub fn evaluate(
    metrics: &Metrics,
    config_files: &[ConfigFileStatus],
    thresholds: &Thresholds,
) -> EvaluationResult {
    let (score_value, level) = score(metrics, thresholds);
    let recommendations = build_recommendations(metrics, config_files, thresholds);

    let mut issues = metrics.errors.clone();
    issues.extend(metrics.warnings.iter().cloned());

    EvaluationResult {
        score: score_value,
        level,
        recommendations,
        issues,
    }
}

impl EvaluationResult {
    /// One-line digest used by the text report header and the LLM prompt.
    pub fn summary_line(&self, metrics: &Metrics) -> String {
        format!(
            "{} build event(s), {} warning(s), {} error(s): score {}/100 ({})",
            metrics.build_events.len(),
            metrics.warnings.len(),
            metrics.errors.len(),
            self.score,
            self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::LogLine;
    use crate::metrics::IssueLevel;
    use crate::parser;

    fn lines(texts: &[&str]) -> Vec<LogLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| LogLine::stdout(*text, i as u64))
            .collect()
    }

    #[test]
    fn test_two_warnings_one_error_end_to_end() {
        let metrics = parser::parse(
            "next",
            lines(&[
                "- warn You have enabled experimental features.",
                "- warn Fast Refresh had to perform a full reload.",
                "Duplicate page detected. pages/a.js and pages/a.tsx both resolve to /a.",
            ]),
        );

        assert_eq!(metrics.warnings.len(), 2);
        assert_eq!(metrics.errors.len(), 1);

        let result = evaluate(&metrics, &[], &Thresholds::default());
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.recommendations[0].level, IssueLevel::Critical);
        assert_eq!(result.recommendations[1].level, IssueLevel::Warning);
        assert_eq!(result.recommendations[2].level, IssueLevel::Warning);

        // 100 - 20 - 2*5
        assert_eq!(result.score, 70);
        assert_eq!(result.level, HealthLevel::Good);
    }

    #[test]
    fn test_issues_are_errors_then_warnings() {
        let metrics = parser::parse(
            "next",
            lines(&[
                "- warn a warning before the error",
                "Duplicate page detected. /x collides.",
            ]),
        );

        let result = evaluate(&metrics, &[], &Thresholds::default());
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.issues[0].level, IssueLevel::Error);
        assert_eq!(result.issues[1].level, IssueLevel::Warning);
    }

    #[test]
    fn test_empty_run_is_excellent() {
        let metrics = parser::parse("next", Vec::new());
        let result = evaluate(&metrics, &[], &Thresholds::default());
        assert_eq!(result.score, 100);
        assert_eq!(result.level, HealthLevel::Excellent);
        assert!(result.recommendations.is_empty());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_summary_line_mentions_counts_and_level() {
        let metrics = parser::parse(
            "next",
            lines(&["- event compiled client and server successfully in 850 ms"]),
        );
        let result = evaluate(&metrics, &[], &Thresholds::default());
        let line = result.summary_line(&metrics);
        assert!(line.contains("1 build event(s)"));
        assert!(line.contains("100/100"));
        assert!(line.contains("Excellent"));
    }
}
