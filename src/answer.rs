//! Context-grounded answering through the Gemini chat API.

use std::time::Duration;

use anyhow::{Context as _, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::embedder::{build_client, qualify_model, Content, Part, GEMINI_API_BASE};

/// Sentence the model is instructed to emit when the context has no answer.
pub const REFUSAL_SENTENCE: &str =
    "I do not have the information needed to answer your question.";

/// Request timeout applied when no override is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking Gemini chat client with sampling pinned to temperature 0.
///
/// A failed call propagates directly to the caller; there is no retry and no
/// fallback model. Whether the model honors the context-only instruction is
/// a prompt-level convention, not something this client enforces.
pub struct ChatModel {
    client: Client,
    endpoint: String,
}

impl ChatModel {
    /// Builds a new chat client for the given model.
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Google API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing chat model name");
        let client = build_client(api_key, timeout)?;
        let endpoint = format!(
            "{}/{}:generateContent",
            GEMINI_API_BASE,
            qualify_model(model)
        );
        Ok(Self { client, endpoint })
    }

    /// Answers a question strictly from the supplied context.
    pub fn answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = build_prompt(question, context);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .context("failed to call Gemini chat completion")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Gemini chat request failed ({}): {}", status, text);
        }
        let parsed: GenerateResponse = resp
            .json()
            .context("failed to parse Gemini chat response")?;
        let answer = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;
        Ok(answer.trim().to_string())
    }
}

/// Renders the fixed instructional template around context and question.
pub fn build_prompt(question: &str, context: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("CONTEXT:\n");
    prompt.push_str(context);
    prompt.push_str("\n\nRULES:\n");
    prompt.push_str("- Answer strictly from the CONTEXT above.\n");
    prompt.push_str(&format!(
        "- If the answer is not explicitly present in the CONTEXT, reply exactly:\n  \"{REFUSAL_SENTENCE}\"\n"
    ));
    prompt.push_str("- Never invent facts or use outside knowledge.\n");
    prompt.push_str("- Never add opinions or interpretation beyond what is written.\n");
    prompt.push_str("\nEXAMPLES OF OUT-OF-CONTEXT QUESTIONS:\n");
    prompt.push_str(&format!(
        "Question: \"What is the capital of France?\"\nAnswer: \"{REFUSAL_SENTENCE}\"\n\n"
    ));
    prompt.push_str(&format!(
        "Question: \"Do you think this is good or bad?\"\nAnswer: \"{REFUSAL_SENTENCE}\"\n"
    ));
    prompt.push_str("\nUSER QUESTION:\n");
    prompt.push_str(question);
    prompt.push_str("\n\nANSWER THE \"USER QUESTION\"\n");
    prompt
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_question_and_refusal() {
        let prompt = build_prompt("What was the revenue?", "Revenue in 2024 was $5M.");
        assert!(prompt.contains("Revenue in 2024 was $5M."));
        assert!(prompt.contains("What was the revenue?"));
        assert!(prompt.contains(REFUSAL_SENTENCE));
        assert!(prompt.starts_with("CONTEXT:\n"));
    }

    #[test]
    fn prompt_places_context_before_question() {
        let prompt = build_prompt("q", "ctx");
        let context_at = prompt.find("ctx").unwrap();
        let question_at = prompt.find("USER QUESTION").unwrap();
        assert!(context_at < question_at);
    }

    #[test]
    fn blank_model_settings_are_rejected() {
        assert!(ChatModel::new("", "gemini-2.5-flash-lite", DEFAULT_TIMEOUT).is_err());
        assert!(ChatModel::new("key", "  ", DEFAULT_TIMEOUT).is_err());
    }
}
