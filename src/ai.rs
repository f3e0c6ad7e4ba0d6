//! AI card generation through a `generateContent` text model.
//!
//! The model is asked for a bare JSON object `{"cards": [...]}`. Requests go
//! either straight to the model URL with an API key, or through a proxy that
//! receives the model URL in its `quest` query parameter.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AiConfig;
use crate::error::FlashError;
use crate::exchange::valid_cards;
use crate::models::ExchangeCard;

const MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// What to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub count: u32,
    pub level: String,
    pub question_lang: String,
    pub answer_lang: String,
}

impl GenerationRequest {
    /// A request for `topic` using the configured defaults.
    pub fn new(topic: impl Into<String>, defaults: &AiConfig) -> Self {
        Self {
            topic: topic.into(),
            count: defaults.count,
            level: defaults.level.clone(),
            question_lang: defaults.question_lang.clone(),
            answer_lang: defaults.answer_lang.clone(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            r#"You are an assistant that writes study flashcards.

Your task: write {count} flashcards on the topic "{topic}".

Parameters:
- Difficulty level: {level}
- Question language: {question_lang}
- Answer language: {answer_lang}

Rules:
1. Questions must be clear and specific.
2. Answers must be short and precise (1-3 words or a short sentence).
3. Do not repeat questions.
4. Match the difficulty level.
5. Use exactly the requested languages.
6. For language cards the question is a word or phrase and the answer is its translation.
7. For fact cards the question asks what, who, where or when and the answer is the fact.

Return ONLY JSON with no other text:
{{
  "cards": [
    {{"question": "question 1", "answer": "answer 1"}},
    {{"question": "question 2", "answer": "answer 2"}}
  ]
}}"#,
            count = self.count,
            topic = self.topic,
            level = self.level,
            question_lang = self.question_lang,
            answer_lang = self.answer_lang,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateBody {
    fn new(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 8192,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, FlashError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| FlashError::Generation("the model returned no candidates".to_string()))
    }
}

/// Parse the model's text reply into cards.
///
/// Markdown code fences around the JSON are tolerated. Cards without text on
/// both sides are dropped.
pub fn parse_reply(text: &str) -> Result<Vec<ExchangeCard>, FlashError> {
    let clean = text.trim().replace("```json", "").replace("```", "");
    let doc: Value = serde_json::from_str(clean.trim())
        .map_err(|e| FlashError::Generation(format!("reply is not valid JSON ({e})")))?;
    let cards = doc
        .get("cards")
        .and_then(Value::as_array)
        .ok_or_else(|| FlashError::Generation("reply has no \"cards\" array".to_string()))?;
    valid_cards(cards)
}

/// Blocking client for the generation endpoint.
pub struct AiClient {
    http: reqwest::blocking::Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    fn model_url(&self) -> String {
        format!("{}/{}:generateContent", MODEL_BASE_URL, self.config.model)
    }

    fn request(&self, body: &GenerateBody) -> reqwest::blocking::RequestBuilder {
        let model_url = self.model_url();
        let builder = match &self.config.proxy_url {
            Some(proxy) => self.http.post(proxy).query(&[("quest", model_url)]),
            None => {
                let builder = self.http.post(model_url);
                match &self.config.api_key {
                    Some(key) => builder.header("x-goog-api-key", key),
                    None => builder,
                }
            }
        };
        builder.json(body)
    }

    /// Ask the model for cards. One attempt, no retries.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Vec<ExchangeCard>> {
        if self.config.proxy_url.is_none() && self.config.api_key.is_none() {
            bail!("No AI endpoint configured: set ai.proxy_url or ai.api_key in the config file");
        }

        log::info!(
            "Generating {} cards on '{}' with {}",
            request.count,
            request.topic,
            self.config.model
        );
        let body = GenerateBody::new(request.prompt());
        let response = self
            .request(&body)
            .send()
            .context("Failed to reach the generation endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            log::error!("Generation request failed with status {}: {}", status, detail);
            bail!("API error: {}", status);
        }

        let reply: GenerateResponse = response
            .json()
            .context("Failed to decode the generation response")?;
        let text = reply.into_text()?;
        let cards = parse_reply(&text).map_err(|e| {
            log::debug!("Unusable reply: {}", text);
            e
        })?;
        log::info!("Model returned {} usable cards", cards.len());
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_request_parameters() {
        let request = GenerationRequest {
            topic: "Planets".to_string(),
            count: 7,
            level: "beginner".to_string(),
            question_lang: "English".to_string(),
            answer_lang: "Ukrainian".to_string(),
        };
        let prompt = request.prompt();
        assert!(prompt.contains("write 7 flashcards on the topic \"Planets\""));
        assert!(prompt.contains("Difficulty level: beginner"));
        assert!(prompt.contains("Answer language: Ukrainian"));
        assert!(prompt.contains(r#"{"question": "question 1", "answer": "answer 1"}"#));
    }

    #[test]
    fn test_request_uses_config_defaults() {
        let request = GenerationRequest::new("Rust", &AiConfig::default());
        assert_eq!(request.count, 10);
        assert_eq!(request.level, "intermediate");
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(GenerateBody::new("hi".to_string())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_response_text_extraction() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "payload"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.into_text().unwrap(), "payload");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(empty.into_text(), Err(FlashError::Generation(_))));
    }

    #[test]
    fn test_parse_reply_strips_code_fences() {
        let text = "```json\n{\"cards\": [{\"question\": \"Largest planet\", \"answer\": \"Jupiter\"}]}\n```";
        let cards = parse_reply(text).unwrap();
        assert_eq!(cards, vec![ExchangeCard::new("Largest planet", "Jupiter")]);
    }

    #[test]
    fn test_parse_reply_filters_blank_cards() {
        let text = r#"{"cards": [{"question": " ", "answer": "x"}, {"question": "q", "answer": "a"}]}"#;
        assert_eq!(parse_reply(text).unwrap().len(), 1);

        let text = r#"{"cards": [{"question": "", "answer": ""}]}"#;
        assert_eq!(parse_reply(text).unwrap_err(), FlashError::NoValidCards);
    }

    #[test]
    fn test_parse_reply_rejects_other_shapes() {
        assert!(matches!(parse_reply("Sorry, I can't"), Err(FlashError::Generation(_))));
        assert!(matches!(parse_reply(r#"{"items": []}"#), Err(FlashError::Generation(_))));
    }

    #[test]
    fn test_generate_requires_an_endpoint() {
        let client = AiClient::new(AiConfig::default()).unwrap();
        let request = GenerationRequest::new("Rust", &AiConfig::default());
        assert!(client.generate(&request).is_err());
    }

    #[test]
    fn test_proxy_request_carries_model_url() {
        let config = AiConfig {
            proxy_url: Some("https://proxy.example/".to_string()),
            ..AiConfig::default()
        };
        let client = AiClient::new(config).unwrap();
        let request = client
            .request(&GenerateBody::new("hi".to_string()))
            .build()
            .unwrap();
        let quest = request
            .url()
            .query_pairs()
            .find(|(k, _)| k == "quest")
            .map(|(_, v)| v.into_owned());
        assert_eq!(
            quest.as_deref(),
            Some("https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent")
        );
    }
}
