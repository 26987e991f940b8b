use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project to analyze; defaults to the current directory.
    pub project_dir: Option<String>,
    /// Framework override; skips package.json detection when set.
    pub framework: Option<String>,
    pub thresholds: Thresholds,
    pub collector: CollectorConfig,
    pub llm: LlmConfig,
    /// Override the framework's expected configuration files.
    pub expected_config_files: Option<Vec<String>>,
}

/// Numeric cutoffs feeding the scorer. The camelCase aliases keep config
/// files written for the JSON-style option names working.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    #[serde(alias = "warningPenalty")]
    pub warning_penalty: u32,
    #[serde(alias = "errorPenalty")]
    pub error_penalty: u32,
    #[serde(alias = "slowBuildMs")]
    pub slow_build_ms: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            warning_penalty: 5,
            error_penalty: 20,
            slow_build_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Stop capturing after this many lines.
    pub max_lines: usize,
    /// Stop capturing after this many seconds.
    pub max_duration_seconds: u64,
    /// Run this instead of the detected dev command.
    pub command: Option<Vec<String>>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            max_lines: 2000,
            max_duration_seconds: 30,
            command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model: String,
    pub api_url: String,
    /// Environment variable holding the API key. The key itself never lives
    /// in the config file.
    pub api_key_env: String,
    pub max_tokens: u32,
    /// Free text appended to the advice prompt.
    pub context: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            enabled: true,
            model: "gpt-4o-mini".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 512,
            context: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.warning_penalty, 5);
        assert_eq!(thresholds.error_penalty, 20);
        assert_eq!(thresholds.slow_build_ms, 30_000);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.thresholds.error_penalty, config.thresholds.error_penalty);
        assert_eq!(parsed.llm.model, config.llm.model);
        assert_eq!(parsed.collector.max_lines, config.collector.max_lines);
    }

    #[test]
    fn test_camel_case_threshold_aliases() {
        let yaml = "thresholds:\n  warningPenalty: 3\n  errorPenalty: 25\n  slowBuildMs: 15000\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.thresholds.warning_penalty, 3);
        assert_eq!(config.thresholds.error_penalty, 25);
        assert_eq!(config.thresholds.slow_build_ms, 15_000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "framework: next\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.framework.as_deref(), Some("next"));
        assert_eq!(config.thresholds.warning_penalty, 5);
        assert!(config.llm.enabled);
    }
}
