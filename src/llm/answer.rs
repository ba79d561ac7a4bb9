use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Canned responses returned in dry-run mode.
pub const DRY_RUN_RESPONSES: [&str; 5] = [
    "Yes, this abstract mentions the treatment.",
    "No, this is not mentioned in the abstract.",
    "Partially relevant - see details in abstract.",
    "Not applicable to this study.",
    "Further investigation needed.",
];

const SYSTEM_PROMPT: &str = "You are a helpful assistant analyzing medical abstracts. \
     Provide concise, factual answers based only on the information in the abstract.";

/// Answers one question about one abstract.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, abstract_text: &str, question: &str) -> Result<String>;
}

/// Fabricates answers without calling any service.
pub struct DryRunAnswerer {
    delay: Duration,
}

impl DryRunAnswerer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Answerer for DryRunAnswerer {
    async fn answer(&self, _abstract_text: &str, _question: &str) -> Result<String> {
        let response = {
            let mut rng = rand::thread_rng();
            DRY_RUN_RESPONSES
                .choose(&mut rng)
                .copied()
                .unwrap_or(DRY_RUN_RESPONSES[0])
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(response.to_string())
    }
}

/// Asks the configured chat API, one request per abstract.
pub struct LlmAnswerer {
    client: reqwest::Client,
    config: LlmConfig,
    model: String,
    api_key: Option<String>,
}

impl LlmAnswerer {
    pub fn new(
        client: reqwest::Client,
        config: LlmConfig,
        model: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            config,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl Answerer for LlmAnswerer {
    async fn answer(&self, abstract_text: &str, question: &str) -> Result<String> {
        let prompt = build_prompt(abstract_text, question);
        let content = match self.config.provider.as_str() {
            "openai" => {
                call_openai(
                    &self.client,
                    &self.config,
                    &self.model,
                    self.api_key.as_deref(),
                    &prompt,
                )
                .await?
            }
            "ollama" => call_ollama(&self.client, &self.config, &self.model, &prompt).await?,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        };
        Ok(content.trim().to_string())
    }
}

fn build_prompt(abstract_text: &str, question: &str) -> String {
    format!(
        "Given the following abstract, please answer the question concisely.\n\n\
         Abstract:\n{abstract_text}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

fn messages(prompt: &str) -> Vec<Message> {
    vec![
        Message {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        },
    ]
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    model: &str,
    api_key: Option<&str>,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = api_key.context("No API key configured")?;

    let req = OpenAiChatRequest {
        model: model.to_string(),
        messages: messages(prompt),
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp
        .json()
        .await
        .context("Invalid OpenAI chat response")?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("OpenAI chat API returned no content")
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: model.to_string(),
        messages: messages(prompt),
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_returns_canned_response() {
        let answerer = DryRunAnswerer::new(Duration::ZERO);
        for _ in 0..20 {
            let answer = answerer.answer("text", "question?").await.unwrap();
            assert!(DRY_RUN_RESPONSES.contains(&answer.as_str()));
        }
    }

    #[test]
    fn test_prompt_contains_abstract_and_question() {
        let prompt = build_prompt("PD-L1 inhibitor trial", "Is this phase 3?");
        assert!(prompt.contains("Abstract:\nPD-L1 inhibitor trial"));
        assert!(prompt.contains("Question: Is this phase 3?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_an_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let answerer = LlmAnswerer::new(
            reqwest::Client::new(),
            config,
            "gpt-5-nano".to_string(),
            Some("key".to_string()),
        );
        let err = answerer.answer("text", "q").await.unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }

    #[tokio::test]
    async fn test_openai_without_key_is_an_error() {
        let answerer = LlmAnswerer::new(
            reqwest::Client::new(),
            LlmConfig::default(),
            "gpt-5-nano".to_string(),
            None,
        );
        let err = answerer.answer("text", "q").await.unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }
}
