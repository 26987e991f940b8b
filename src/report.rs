use crate::detect::ProjectInfo;
use crate::evaluate::EvaluationResult;
use crate::metrics::{BuildKind, Issue, IssueLevel, Metrics};
use crate::score::HealthLevel;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Text,
}

impl ReportFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "text" | "txt" => Some(ReportFormat::Text),
            _ => None,
        }
    }
}

/// Everything one analysis run produced, in the shape the JSON report emits.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub framework: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectInfo>,
    pub metrics: Metrics,
    pub score: u8,
    pub level: HealthLevel,
    pub summary: String,
    pub recommendations: Vec<Issue>,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn new(
        framework: impl Into<String>,
        project: Option<ProjectInfo>,
        metrics: Metrics,
        result: EvaluationResult,
        insight: Option<String>,
    ) -> Self {
        let summary = result.summary_line(&metrics);
        AnalysisReport {
            framework: framework.into(),
            project,
            metrics,
            score: result.score,
            level: result.level,
            summary,
            recommendations: result.recommendations,
            issues: result.issues,
            insight,
            generated_at: Utc::now(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize JSON report")
            }
            ReportFormat::Markdown => Ok(self.render_markdown()),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    /// Render and either print to stdout or write to a file.
    pub fn write(&self, format: ReportFormat, output: Option<&Path>) -> anyhow::Result<()> {
        let rendered = self.render(format)?;
        match output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                log::info!("Report written to {}", path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }

    fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Dev build health report\n\n");
        out.push_str(&format!("- **Framework:** {}\n", self.framework));
        out.push_str(&format!("- **Score:** {}/100 ({})\n", self.score, self.level));
        out.push_str(&format!("- **Summary:** {}\n", self.summary));

        if !self.metrics.build_events.is_empty() {
            out.push_str("\n## Build events\n\n");
            for event in &self.metrics.build_events {
                out.push_str(&format!(
                    "- `{}`: {}, {} ({})\n",
                    event.target,
                    fmt_duration(event.duration_ms),
                    fmt_modules(event.modules),
                    kind_name(event.kind)
                ));
            }
        }

        if !self.issues.is_empty() {
            out.push_str("\n## Issues\n\n");
            for issue in &self.issues {
                out.push_str(&format!("- **{}**: {}\n", level_name(issue.level), issue.message));
            }
        }

        if !self.metrics.notes.is_empty() {
            out.push_str("\n## Notes\n\n");
            for note in &self.metrics.notes {
                out.push_str(&format!("- {}\n", note.message));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\n## Recommendations\n\n");
            for recommendation in &self.recommendations {
                out.push_str(&format!(
                    "- [{}] {}\n",
                    level_name(recommendation.level),
                    recommendation.message
                ));
            }
        }

        if let Some(insight) = &self.insight {
            out.push_str("\n## LLM insight\n\n");
            out.push_str(insight);
            out.push('\n');
        }

        out
    }

    fn render_text(&self) -> String {
        let icon = match self.level {
            HealthLevel::Excellent => "✅",
            HealthLevel::Good => "👍",
            HealthLevel::Average => "⚠️",
            HealthLevel::Poor => "❌",
        };

        let mut out = String::new();
        out.push_str(&format!("{icon} Build health: {}/100 ({})\n", self.score, self.level));
        out.push_str(&format!("   Framework: {}\n", self.framework));
        out.push_str(&format!("   {}\n", self.summary));

        if !self.metrics.build_events.is_empty() {
            out.push_str("\nBuild events:\n");
            for event in &self.metrics.build_events {
                out.push_str(&format!(
                    "  - {}: {}, {} ({})\n",
                    event.target,
                    fmt_duration(event.duration_ms),
                    fmt_modules(event.modules),
                    kind_name(event.kind)
                ));
            }
        }

        if !self.issues.is_empty() {
            out.push_str("\nIssues:\n");
            for issue in &self.issues {
                out.push_str(&format!("  [{}] {}\n", level_name(issue.level), issue.message));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\nRecommendations:\n");
            for recommendation in &self.recommendations {
                out.push_str(&format!(
                    "  [{}] {}\n",
                    level_name(recommendation.level),
                    recommendation.message
                ));
            }
        }

        if let Some(insight) = &self.insight {
            out.push_str("\nLLM insight:\n");
            out.push_str(insight);
            out.push('\n');
        }

        out
    }
}

fn fmt_duration(duration_ms: Option<f64>) -> String {
    match duration_ms {
        Some(ms) => format!("{ms}ms"),
        None => "unknown duration".to_string(),
    }
}

fn fmt_modules(modules: Option<u64>) -> String {
    match modules {
        Some(count) => format!("{count} modules"),
        None => "module count unknown".to_string(),
    }
}

fn kind_name(kind: BuildKind) -> &'static str {
    match kind {
        BuildKind::Initial => "initial",
        BuildKind::Incremental => "incremental",
    }
}

fn level_name(level: IssueLevel) -> &'static str {
    match level {
        IssueLevel::Info => "info",
        IssueLevel::Warning => "warning",
        IssueLevel::Error => "error",
        IssueLevel::Critical => "critical",
    }
}
