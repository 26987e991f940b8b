use crate::config::LlmConfig;
use crate::evaluate::EvaluationResult;
use crate::metrics::Metrics;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

const PROMPT_HEADER: &str =
    "You are reviewing the build log analysis of a frontend dev server. \
     Suggest concrete remediation steps for the issues below.";
const MAX_PROMPT_WARNINGS: usize = 5;

/// Build the advice prompt handed verbatim to the completion call.
pub fn build_prompt(
    metrics: &Metrics,
    result: &EvaluationResult,
    user_context: Option<&str>,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Summary: {}\n", result.summary_line(metrics)));

    if !metrics.warnings.is_empty() {
        prompt.push_str("\nWarnings:\n");
        for warning in metrics.warnings.iter().take(MAX_PROMPT_WARNINGS) {
            prompt.push_str(&format!("- {}\n", warning.message));
        }
        if metrics.warnings.len() > MAX_PROMPT_WARNINGS {
            prompt.push_str(&format!(
                "... and {} more\n",
                metrics.warnings.len() - MAX_PROMPT_WARNINGS
            ));
        }
    }

    if !metrics.errors.is_empty() {
        prompt.push_str("\nErrors:\n");
        for error in &metrics.errors {
            prompt.push_str(&format!("- {}\n", error.message));
        }
    }

    if !result.recommendations.is_empty() {
        prompt.push_str("\nCurrent recommendations:\n");
        for recommendation in &result.recommendations {
            prompt.push_str(&format!("- {}\n", recommendation.message));
        }
    }

    if let Some(context) = user_context {
        prompt.push_str("\nAdditional context from the user:\n");
        prompt.push_str(context);
        prompt.push('\n');
    }

    prompt
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Thin wrapper around a chat-completions endpoint. Every failure mode
/// degrades to "no insight" with a warning in the log; the analysis pipeline
/// never depends on this call succeeding.
pub struct InsightClient {
    client: Client,
    config: LlmConfig,
}

impl InsightClient {
    pub fn new(config: LlmConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("devlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(InsightClient { client, config })
    }

    pub async fn fetch_insight(&self, api_key: Option<&str>, prompt: &str) -> Option<String> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                log::warn!(
                    "No API key in {}, skipping LLM insight",
                    self.config.api_key_env
                );
                return None;
            }
        };

        if let Err(e) = Url::parse(&self.config.api_url) {
            log::warn!("Invalid LLM endpoint '{}': {e}", self.config.api_url);
            return None;
        }

        let payload = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
        });

        let response = match self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("LLM request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!("LLM endpoint returned status {}", response.status());
            return None;
        }

        let body: ChatResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to decode LLM response: {e}");
                return None;
            }
        };

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        let content = content.trim();

        if content.is_empty() {
            log::warn!("LLM returned an empty completion");
            None
        } else {
            Some(content.to_string())
        }
    }
}
