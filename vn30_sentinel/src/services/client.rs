use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::{Result, SentinelError};
use crate::models::{GroundingCitation, RawAnalysis};
use crate::services::prompt::build_prompt;

/// Внешний вызов модели для одного тикера
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, ticker: &str) -> Result<RawAnalysis>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: AppConfig,
}

impl GeminiClient {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;
        Ok(GeminiClient { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.gemini_api_url.trim_end_matches('/'),
            self.config.model_name,
            urlencoding::encode(&self.config.gemini_api_key),
        )
    }

    fn request_body(&self, ticker: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [{ "text": build_prompt(ticker) }] }
            ],
            "tools": [{ "google_search": {} }],
            "generationConfig": { "temperature": self.config.temperature() }
        })
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, ticker: &str) -> Result<RawAnalysis> {
        tracing::debug!("Запрос к модели {} для {}", self.config.model_name, ticker);

        let response = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(ticker))
            .send()
            .await
            .map_err(|e| timeout_or_http(ticker, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Неизвестная ошибка".to_string());
            return Err(SentinelError::ApiError(format!(
                "Gemini API error: {} - {}",
                status, error_text
            )));
        }

        let content = response.text().await.map_err(|e| timeout_or_http(ticker, e))?;
        let body: Value = serde_json::from_str(&content)?;
        parse_generate_content(&body)
    }
}

fn timeout_or_http(ticker: &str, error: reqwest::Error) -> SentinelError {
    if error.is_timeout() {
        SentinelError::Timeout(ticker.to_string())
    } else {
        SentinelError::HttpError(error)
    }
}

/// Разбирает ответ generateContent: текст первого кандидата и источники из groundingMetadata
pub fn parse_generate_content(body: &Value) -> Result<RawAnalysis> {
    let candidate = body["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| SentinelError::InvalidDataFormat("Отсутствует поле candidates".to_string()))?;

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let citations = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .map(|chunk| GroundingCitation {
                    title: chunk["web"]["title"].as_str().map(str::to_string),
                    url: chunk["web"]["uri"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RawAnalysis { text, citations })
}
