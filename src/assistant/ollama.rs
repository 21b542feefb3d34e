//! Ollama model client
//!
//! Talks to a local Ollama server through its non-streaming
//! `POST /api/generate` endpoint.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::collaborators::{Model, ModelError};
use crate::config::ApiConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
}

/// Blocking client for a local Ollama server
pub struct OllamaClient {
    http_client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ModelError> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ModelError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(&config.base_url),
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Model for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .map_err(|e| {
                ModelError::Unavailable(format!(
                    "Ollama request failed: {}. Is Ollama running at {}?",
                    e, self.base_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Unavailable(format!("Ollama error ({status}): {body}")));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            tokens = body.eval_count.unwrap_or(0),
            "Model replied"
        );

        Ok(body.response)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Strip trailing slashes and an OpenAI-style `/v1` suffix
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/v1").unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:11434"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://localhost:11434/v1"), "http://localhost:11434");
    }

    #[test]
    fn test_unreachable_server_is_unavailable() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ApiConfig::default()
        };
        let client = OllamaClient::new(&config).unwrap();

        match client.generate("hello") {
            Err(ModelError::Unavailable(msg)) => assert!(msg.contains("Is Ollama running")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}
