//! Ollama-protocol client implementing the reasoning port.

use std::time::Duration;

use async_trait::async_trait;
use quarry_config::ReasoningConfig;
use quarry_core::{AnswerDetail, ReasoningService, RetrievedDocument, Route, ServiceError};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::check_response;
use crate::prompts;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for `POST {base_url}/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    num_predict: u32,
}

impl OllamaClient {
    /// Build a client from the reasoning section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` fails
    /// to build.
    pub fn from_config(config: &ReasoningConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .user_agent("quarry/0.1")
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one non-streaming generate request and return the trimmed text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, non-success status, or an
    /// undecodable body.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        };
        let resp = check_response(self.http.post(&self.endpoint).json(&body).send().await?).await?;
        let text = resp.text().await?;
        parse_generate(&text)
    }
}

fn parse_generate(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;
    Ok(parsed.response.trim().to_string())
}

#[async_trait]
impl ReasoningService for OllamaClient {
    async fn classify(&self, question: &str) -> Result<Route, ServiceError> {
        let verdict = self.generate(&prompts::classify(question)).await?;
        tracing::debug!(verdict = %verdict, "reasoning verdict");
        Ok(Route::from_verdict(&verdict))
    }

    async fn generate_query(
        &self,
        question: &str,
        schema_description: &str,
        allowed_tables: &[String],
    ) -> Result<String, ServiceError> {
        let prompt = prompts::generate_query(question, schema_description, allowed_tables);
        Ok(self.generate(&prompt).await?)
    }

    async fn answer(
        &self,
        question: &str,
        context: &[RetrievedDocument],
        detail: AnswerDetail,
    ) -> Result<String, ServiceError> {
        let prompt = prompts::answer(question, context, detail);
        Ok(self.generate(&prompt).await?)
    }
}
