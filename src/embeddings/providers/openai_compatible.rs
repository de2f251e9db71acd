//! OpenAI-compatible embeddings provider (`/v1/embeddings`).
//!
//! Works against OpenAI and any local server speaking the same wire format
//! (Ollama, LM Studio, llama.cpp server…). All wire types are private to this
//! module. Uses the blocking `reqwest` client: the engine answers one query
//! at a time and has no async runtime.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embeddings::ProviderError;

// ── Public provider ───────────────────────────────────────────────────────────

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::blocking::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleEmbedder {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleEmbedder {
    /// `api_key` is `None` for keyless local servers. When present it is sent
    /// as `Authorization: Bearer <key>` on every request.
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, api_key })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut out = self.request(vec![text.to_string()])?;
        out.pop()
            .ok_or_else(|| ProviderError::Request("empty embedding response".into()))
    }

    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let out = self.request(texts.to_vec())?;
        if out.len() != texts.len() {
            return Err(ProviderError::Request(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                out.len()
            )));
        }
        Ok(out)
    }

    fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, ProviderError> {
        let payload = EmbeddingsRequest { model: self.model.clone(), input };

        debug!(model = %payload.model, inputs = payload.input.len(), "sending embeddings request");

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "embeddings HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;
        let response = check_status(response)?;

        let mut parsed = response.json::<EmbeddingsResponse>().map_err(|e| {
            error!(error = %e, "failed to deserialize embeddings response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        // The API may return items out of order; `index` is authoritative.
        parsed.data.sort_by_key(|d| d.index);
        debug!(vectors = parsed.data.len(), "received embeddings");
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    error!(%status, body = %body, "embeddings endpoint returned an error");
    Err(ProviderError::Request(format!("HTTP {status}: {body}")))
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_and_orders_by_index() {
        let raw = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.0,1.0]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}
        ],"model":"m"}"#;
        let mut parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
        assert_eq!(parsed.data[1].embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn request_serializes_input_list() {
        let req = EmbeddingsRequest { model: "m".into(), input: vec!["a".into(), "b".into()] };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["input"][1], "b");
    }

    #[test]
    fn unreachable_endpoint_is_request_error() {
        let p = OpenAiCompatibleEmbedder::new(
            "http://127.0.0.1:9/v1/embeddings".into(),
            "m".into(),
            1,
            None,
        )
        .unwrap();
        assert!(matches!(p.encode("hola"), Err(ProviderError::Request(_))));
    }

    #[test]
    fn empty_batch_skips_network() {
        let p = OpenAiCompatibleEmbedder::new(
            "http://127.0.0.1:9/v1/embeddings".into(),
            "m".into(),
            1,
            None,
        )
        .unwrap();
        assert!(p.encode_batch(&[]).unwrap().is_empty());
    }
}
