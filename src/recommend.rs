use crate::config::Thresholds;
use crate::metrics::{Issue, IssueLevel, Metrics};
use serde::{Deserialize, Serialize};

/// Presence snapshot for one expected configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFileStatus {
    pub path: String,
    pub exists: bool,
}

/// Turn metrics and the config-file snapshot into an ordered recommendation
/// list: criticals for errors, warnings for warnings, then the slow-build
/// warning, then one info naming every missing config file. No dedup and no
/// reordering beyond this category order.
pub fn build_recommendations(
    metrics: &Metrics,
    config_files: &[ConfigFileStatus],
    thresholds: &Thresholds,
) -> Vec<Issue> {
    let mut recommendations = Vec::new();

    for error in &metrics.errors {
        recommendations.push(Issue {
            level: IssueLevel::Critical,
            message: error.message.clone(),
            details: error.details.clone(),
            occurrences: error.occurrences,
        });
    }

    for warning in &metrics.warnings {
        recommendations.push(Issue {
            level: IssueLevel::Warning,
            message: warning.message.clone(),
            details: warning.details.clone(),
            occurrences: warning.occurrences,
        });
    }

    if let Some(summary) = &metrics.summary {
        if let Some(longest) = summary.longest_build_ms {
            if longest > thresholds.slow_build_ms as f64 {
                recommendations.push(Issue::new(
                    IssueLevel::Warning,
                    format!(
                        "Longest build took {longest}ms, exceeding the {}ms threshold. Check \
                         bundle size and dependency graph for {}.",
                        thresholds.slow_build_ms, summary.longest_target
                    ),
                ));
            }
        }
    }

    let missing: Vec<&str> = config_files
        .iter()
        .filter(|status| !status.exists)
        .map(|status| status.path.as_str())
        .collect();
    if !missing.is_empty() {
        recommendations.push(Issue::new(
            IssueLevel::Info,
            format!("Missing expected configuration files: {}", missing.join(", ")),
        ));
    }

    recommendations
}
