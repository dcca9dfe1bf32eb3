// src/services/enrichment.rs

//! Enrichment client.
//!
//! Sends each posting to an external scoring service and folds every
//! failure mode into a degraded-default result, so downstream code
//! never needs failure branches for this step.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{Category, EnrichedPosting, EnrichmentConfig, Posting};
use crate::utils::truncate_graphemes;

/// Prompt template for the scoring service.
///
/// The service must answer with a bare JSON object using the
/// `{categoria, score_relevancia, palavras_chave, resumo}` field names;
/// that wire contract predates this implementation and is kept as-is.
const SCORING_PROMPT: &str = r#"You are a technology recruitment specialist.
Analyze the job posting below and return ONLY a valid JSON object, no markdown.

Posting:
Title: {title}
Description: {description}

Available categories: {categories}

Return exactly this shape:
{
  "categoria": "<one of the categories above>",
  "score_relevancia": <number from 0 to 10 rating relevance for a data science student>,
  "palavras_chave": ["<keyword1>", "<keyword2>", "<keyword3>"],
  "resumo": "<one-sentence summary of what the posting requires>"
}"#;

/// Backend that exchanges a prompt for the model's raw answer.
///
/// Abstracted so tests can exercise the client without a network.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response body, reduced to what we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// HTTP backend speaking the chat-completions protocol.
pub struct HttpScoringBackend {
    config: EnrichmentConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpScoringBackend {
    /// Create a backend from the enrichment configuration.
    pub fn new(config: EnrichmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            log::warn!("No enrichment API key configured; calls will likely be rejected");
        }
        Ok(Self {
            config,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ScoringBackend for HttpScoringBackend {
    async fn score(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: ChatResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::enrichment("response contained no choices"))
    }
}

/// The embedded JSON the service answers with.
#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(default)]
    categoria: String,

    /// Left as a raw value: the service sometimes returns the score as
    /// a string, or not at all.
    #[serde(default)]
    score_relevancia: serde_json::Value,

    #[serde(default)]
    palavras_chave: Vec<String>,

    #[serde(default)]
    resumo: String,
}

/// Client that enriches postings one at a time, rate-limited.
pub struct EnrichmentClient {
    config: EnrichmentConfig,
    backend: Box<dyn ScoringBackend>,
    last_call: Mutex<Option<Instant>>,
}

impl EnrichmentClient {
    /// Create a client over the given backend.
    pub fn new(config: EnrichmentConfig, backend: Box<dyn ScoringBackend>) -> Self {
        Self {
            config,
            backend,
            last_call: Mutex::new(None),
        }
    }

    /// Create a client with the HTTP backend from configuration.
    pub fn from_config(config: EnrichmentConfig) -> Result<Self> {
        let backend = HttpScoringBackend::new(config.clone())?;
        Ok(Self::new(config, Box::new(backend)))
    }

    /// Enrich a single posting. Never fails: on any backend or parse
    /// error the posting comes back with degraded defaults.
    pub async fn enrich(&self, posting: Posting) -> EnrichedPosting {
        self.throttle().await;

        let prompt = self.build_prompt(&posting);
        match self.backend.score(&prompt).await.and_then(|c| parse_verdict(&c)) {
            Ok(verdict) => EnrichedPosting {
                category: Category::parse(&verdict.categoria),
                score: clamp_score(&verdict.score_relevancia),
                keywords: verdict.palavras_chave,
                summary: verdict.resumo,
                degraded: false,
                posting,
            },
            Err(error) => {
                log::warn!("Enrichment failed for '{}': {}", posting.title, error);
                EnrichedPosting::degraded(posting)
            }
        }
    }

    /// Enrich a batch strictly sequentially, preserving order.
    ///
    /// The output always has the same length as the input.
    pub async fn enrich_batch(&self, batch: Vec<Posting>) -> Vec<EnrichedPosting> {
        let mut enriched = Vec::with_capacity(batch.len());
        for posting in batch {
            enriched.push(self.enrich(posting).await);
        }
        enriched
    }

    /// Enforce the minimum delay between consecutive backend calls.
    async fn throttle(&self) {
        let delay = Duration::from_millis(self.config.call_delay_ms);
        if delay.is_zero() {
            return;
        }

        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    fn build_prompt(&self, posting: &Posting) -> String {
        let description =
            truncate_graphemes(&posting.description, self.config.prompt_max_chars);
        SCORING_PROMPT
            .replace("{title}", &posting.title)
            .replace("{description}", &description)
            .replace("{categories}", &Category::vocabulary())
    }
}

/// Parse the service's answer into a verdict.
///
/// Tolerates markdown code fences and prose around the JSON object, a
/// habit this class of model never quite loses.
fn parse_verdict(content: &str) -> Result<Verdict> {
    let trimmed = content.trim();
    if let Ok(verdict) = serde_json::from_str(trimmed) {
        return Ok(verdict);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&trimmed[start..=end]).map_err(AppError::from)
        }
        _ => Err(AppError::enrichment("no JSON object in response")),
    }
}

/// Clamp a raw score value to [0, 10]; anything non-numeric becomes 0.
fn clamp_score(raw: &serde_json::Value) -> f64 {
    let score = match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if score.is_finite() {
        score.clamp(0.0, 10.0)
    } else {
        0.0
    }
}
