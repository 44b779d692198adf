//! Text generation capability
//!
//! The router only needs `prompt -> completion`. Two implementations:
//! - [`ChatCompletionGenerator`]: any OpenAI-compatible chat endpoint
//!   (Groq, OpenAI, vLLM, llama.cpp server)
//! - [`OfflineGenerator`]: canned responses when no endpoint is configured
//!
//! Transient failures are retried here, inside the client. Callers above
//! this layer never retry.

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Maps a prompt to a completion
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// OpenAI-compatible chat-completion client
pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
}

impl ChatCompletionGenerator {
    pub fn new(config: &LlmConfig, model: &str, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
        })
    }

    async fn call(&self, prompt: &str) -> std::result::Result<String, backoff::Error<AppError>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                backoff::Error::transient(AppError::GenerationError {
                    message: format!("Chat completion request failed: {}", e),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = AppError::GenerationError {
                message: format!("Chat completion error {}: {}", status, body),
            };
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                backoff::Error::transient(err)
            } else {
                backoff::Error::permanent(err)
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            backoff::Error::permanent(AppError::GenerationError {
                message: format!("Failed to parse chat completion: {}", e),
            })
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                backoff::Error::permanent(AppError::GenerationError {
                    message: "Empty response from chat completion".to_string(),
                })
            })
    }
}

#[async_trait]
impl Generator for ChatCompletionGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(Duration::from_secs(30)))
            .build();
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result = backoff::future::retry(policy, || async {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            match self.call(prompt).await {
                Err(backoff::Error::Transient { err, .. }) if attempt < self.max_retries => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %err,
                        "Generation request failed, retrying"
                    );
                    Err(backoff::Error::transient(err))
                }
                Err(backoff::Error::Transient { err, .. }) => Err(backoff::Error::permanent(err)),
                other => other,
            }
        })
        .await;

        metrics::record_generation(start.elapsed().as_secs_f64(), &self.model, result.is_ok());
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Generator used when no endpoint is configured
///
/// Replies with a short fixed text that names the prompt's last line, so the
/// whole pipeline stays runnable offline. Its output is never a valid intent
/// label, which routes every question to strict document answering.
pub struct OfflineGenerator {
    model: String,
}

impl OfflineGenerator {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let last_line = prompt
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default();

        Ok(format!(
            "[offline {}] No generation endpoint configured. Prompt ended with: {}",
            self.model, last_line
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create a generator for `model` based on configuration
pub fn create_generator(config: &LlmConfig, model: &str) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "llm.api_key is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(ChatCompletionGenerator::new(config, model, key)?))
        }
        "mock" => Ok(Arc::new(OfflineGenerator::new(model))),
        other => Err(AppError::Configuration {
            message: format!("Unknown llm provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_generator_names_last_line() {
        let generator = OfflineGenerator::new("tiny");
        let out = generator.generate("Context:\nabc\n\nQuestion:\nwhat now?\n").await.unwrap();
        assert!(out.contains("what now?"));
        assert!(out.contains("tiny"));
    }

    #[test]
    fn test_create_generator() {
        let config = LlmConfig::default();
        let generator = create_generator(&config, &config.fast_model).unwrap();
        assert_eq!(generator.model_name(), "llama-3.1-8b-instant");

        let openai = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        assert!(create_generator(&openai, "m").is_err());

        let unknown = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_generator(&unknown, "m"),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let config = LlmConfig {
            api_base: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        };
        let generator = ChatCompletionGenerator::new(&config, "m", "k".to_string()).unwrap();
        assert_eq!(generator.endpoint, "http://localhost:8000/v1/chat/completions");
    }
}
