use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Client for Groq's OpenAI-style chat-completions endpoint. The server-held
/// credential is attached here; inbound requests never carry one.
#[derive(Clone)]
pub struct GroqService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug)]
pub enum GroqError {
    /// Groq answered, but with a body that is not JSON. The status code is
    /// preserved for the caller.
    NonJsonResponse { status: StatusCode, raw: String },
    /// The outbound call itself failed, or no credential is configured.
    Unreachable(String),
}

impl fmt::Display for GroqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroqError::NonJsonResponse { status, .. } => {
                write!(f, "Groq returned a non-JSON response (status {})", status)
            }
            GroqError::Unreachable(detail) => write!(f, "failed to contact Groq: {}", detail),
        }
    }
}

impl std::error::Error for GroqError {}

impl GroqService {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap(),
            api_key,
            base_url,
        }
    }

    /// Forward a validated chat request. One attempt, no retries; a JSON
    /// response is relayed with the provider's status code whatever it is.
    pub async fn chat_completion(&self, body: &Value) -> Result<(StatusCode, Value), GroqError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GroqError::Unreachable("GROQ_API_KEY is not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| GroqError::Unreachable(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| GroqError::Unreachable(e.to_string()))?;

        match serde_json::from_str::<Value>(&raw) {
            Ok(json) => Ok((status, json)),
            Err(_) => Err(GroqError::NonJsonResponse { status, raw }),
        }
    }
}
