use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_PROMPT: &str = "Listen to the audio. Write a transcription of the text. \
    Then respond to or comment on what was said. \
    Reply with a JSON object with two string fields: \
    \"transcript\" (the transcription) and \"commentary\" (your response).";

#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("GenAI request failed: {0}")]
    RequestFailed(String),
    #[error("GenAI error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("GenAI returned no candidates")]
    EmptyResponse,
}

/// What the model produced for one audio file. Stored as-is in the task row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcription {
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Clone)]
pub struct GenAiService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiService {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build never fails with default TLS config");

        info!("GenAI: using model '{}'", model);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Send the audio bytes to the model inline and return the structured
    /// transcription. The request is bounded by the client timeout; exceeding
    /// it surfaces as `RequestFailed`.
    pub async fn transcribe_and_comment(
        &self,
        audio_data: &[u8],
        mime_type: &str,
    ) -> Result<Transcription, GenAiError> {
        info!(
            bytes = audio_data.len(),
            "GenAI: received audio for processing"
        );

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": DEFAULT_PROMPT },
                    {
                        "inlineData": {
                            "mimeType": mime_type,
                            "data": general_purpose::STANDARD.encode(audio_data)
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenAiError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenAiError::Api { status, body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::RequestFailed(format!("decoding response: {}", e)))?;

        let text = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts.unwrap_or_default())
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GenAiError::EmptyResponse);
        }

        info!("GenAI: received response from the model");
        Ok(parse_outcome(&text))
    }
}

/// The model is asked for `{"transcript", "commentary"}` JSON; when it
/// answers with plain prose anyway, keep the whole text as the transcript.
fn parse_outcome(text: &str) -> Transcription {
    let trimmed = text.trim();
    match serde_json::from_str::<Transcription>(trimmed) {
        Ok(outcome) => outcome,
        Err(_) => Transcription {
            transcript: trimmed.to_string(),
            commentary: None,
        },
    }
}
