//! Blocking Gemini embeddings client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Base URL for the Google Generative Language API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Maximum inputs sent per embedding request when no override is given.
pub const DEFAULT_BATCH_SIZE: usize = 32;
/// Request timeout applied when no override is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking embeddings client that talks to the Gemini API.
///
/// Constructed once per process and reused for every ingestion batch and
/// query embedding. Failures surface directly; nothing is retried.
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: Client,
    base_url: String,
    model: String,
    batch_size: usize,
}

impl GeminiEmbedder {
    /// Builds a new Gemini embeddings client.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout: Duration,
        batch_size: usize,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Google API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        let client = build_client(api_key, timeout)?;
        Ok(Self {
            client,
            base_url: GEMINI_API_BASE.to_string(),
            model: qualify_model(model),
            batch_size: batch_size.max(1),
        })
    }

    /// Maximum batch size configured for this client.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Qualified model identifier used in request paths.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a batch of strings to Gemini and returns embedding vectors.
    pub fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        anyhow::ensure!(
            inputs.len() <= self.batch_size,
            "batch of {} exceeds configured max {}",
            inputs.len(),
            self.batch_size
        );

        let endpoint = format!("{}/{}:batchEmbedContents", self.base_url, self.model);
        let request = BatchEmbedRequest {
            requests: inputs
                .iter()
                .map(|text| EmbedRequest {
                    model: &self.model,
                    content: Content {
                        parts: vec![Part { text }],
                    },
                })
                .collect(),
        };
        let resp = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .context("failed to call Gemini embeddings")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Gemini embeddings request failed ({}): {}", status, body);
        }
        let parsed: BatchEmbedResponse = resp
            .json()
            .context("failed to parse Gemini embeddings response")?;
        anyhow::ensure!(
            parsed.embeddings.len() == inputs.len(),
            "Gemini returned {} embeddings for {} inputs",
            parsed.embeddings.len(),
            inputs.len()
        );
        Ok(parsed
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect())
    }

    /// Embeds a single query string.
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let endpoint = format!("{}/{}:embedContent", self.base_url, self.model);
        let request = SingleEmbedRequest {
            content: Content {
                parts: vec![Part { text }],
            },
        };
        let resp = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .context("failed to call Gemini embeddings")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Gemini embedding request failed ({}): {}", status, body);
        }
        let parsed: SingleEmbedResponse = resp
            .json()
            .context("failed to parse Gemini embedding response")?;
        Ok(parsed.embedding.values)
    }
}

pub(crate) fn build_client(api_key: &str, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key.trim()).context("invalid Google API key")?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("failed to build Gemini HTTP client")
}

/// Prefixes bare model names with the `models/` resource path.
pub(crate) fn qualify_model(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct SingleEmbedRequest<'a> {
    content: Content<'a>,
}

#[derive(Serialize)]
pub(crate) struct Content<'a> {
    pub(crate) parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
pub(crate) struct Part<'a> {
    pub(crate) text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<Embedding>,
}

#[derive(Debug, Deserialize)]
struct SingleEmbedResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}
