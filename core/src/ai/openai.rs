/// OpenAI bindings for the three collaborator traits.
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::prompts::{
    extraction_prompt, translation_prompt, verification_prompt, verified_terms_block,
};
use super::retry::{evaluate_retry, parse_retry_after, RetryClass, RetryPolicy};
use super::{AiError, EntityExtractor, TermVerifier, Translator};
use crate::config::OpenAiConfig;
use crate::entity::{sanitize_entities, Entity, VerificationRecord, VerificationStatus};
use crate::matcher::MatchResult;
use crate::merger::{CanonicalTerm, MAX_TERM_LINKS};

static HAN_CHARACTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Han}").expect("valid Han character regex"));

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct EntityListPayload {
    #[serde(default)]
    entities: Vec<Entity>,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build language model client");
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// POST a JSON body, retrying on 429/5xx per the retry policy.
    async fn post_json(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut attempts = 0u32;
        loop {
            let result = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await;

            let decision = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.json::<serde_json::Value>().await?);
                    }
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| parse_retry_after(value, SystemTime::now()));
                    let body_text = response.text().await.unwrap_or_default();
                    let decision = evaluate_retry(
                        RetryClass::Http {
                            status,
                            retry_after,
                        },
                        self.policy,
                        attempts,
                    );
                    if !decision.should_retry {
                        return Err(AiError::Api {
                            status,
                            body: body_text,
                        });
                    }
                    log::warn!(
                        "language model returned {status}; retrying in {:?}",
                        decision.delay
                    );
                    decision
                }
                Err(err) => {
                    let decision = evaluate_retry(RetryClass::Network, self.policy, attempts);
                    if !decision.should_retry {
                        return Err(AiError::Http(err));
                    }
                    log::warn!("language model request failed ({err}); retrying in {:?}", decision.delay);
                    decision
                }
            };

            attempts += 1;
            tokio::time::sleep(decision.delay).await;
        }
    }

    /// Chat-completions call; returns the first choice's message content.
    async fn chat(&self, prompt: &str, json_output: bool) -> Result<String, AiError> {
        let mut body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
        });
        if json_output {
            body["response_format"] = json!({ "type": "json_object" });
        }
        let value = self.post_json("/v1/chat/completions", &body).await?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AiError::BadPayload("chat completion had no message content".into()))
    }

    /// Responses-API call with the hosted web-search tool enabled.
    async fn respond_with_search(&self, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "model": self.model,
            "input": prompt,
            "tools": [{ "type": "web_search" }],
            "temperature": 0.2,
            "max_output_tokens": 500,
        });
        let value = self.post_json("/v1/responses", &body).await?;
        let text = collect_output_text(&value);
        if text.is_empty() {
            return Err(AiError::BadPayload("response had no output text".into()));
        }
        Ok(text)
    }

    async fn lookup_one(&self, entity: &Entity) -> Result<VerificationRecord, AiError> {
        let reply = self.respond_with_search(&verification_prompt(entity)).await?;
        let payload = extract_json_object(&reply)
            .ok_or_else(|| AiError::BadPayload("no JSON object in verification output".into()))?;
        let parsed: VerificationRecord = serde_json::from_str(payload)
            .map_err(|err| AiError::BadPayload(err.to_string()))?;

        // the entity's own fields are authoritative for traceability; only
        // the looked-up values come from the model
        Ok(VerificationRecord {
            entity_id: entity.entity_id,
            source_term: entity.source_text.clone(),
            context_used: entity.context_phrase.clone(),
            target_term: parsed.target_term,
            source_links: parsed
                .source_links
                .into_iter()
                .take(MAX_TERM_LINKS)
                .collect(),
            verification_status: parsed.verification_status,
            notes: parsed.notes,
        })
    }
}

fn error_record(entity: &Entity, err: &AiError) -> VerificationRecord {
    VerificationRecord {
        entity_id: entity.entity_id,
        source_term: entity.source_text.clone(),
        context_used: entity.context_phrase.clone(),
        target_term: format!("{} (unverified)", entity.source_text),
        source_links: Vec::new(),
        verification_status: VerificationStatus::Error,
        notes: err.to_string(),
    }
}

/// Cut the first `{` … last `}` span out of a model reply. Models wrap JSON
/// in prose or code fences often enough that strict parsing of the whole
/// reply is a losing game.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

/// Concatenate the output_text fragments of a Responses-API reply.
fn collect_output_text(value: &serde_json::Value) -> String {
    let mut out = String::new();
    if let Some(items) = value["output"].as_array() {
        for item in items {
            if item["type"].as_str() != Some("message") {
                continue;
            }
            if let Some(parts) = item["content"].as_array() {
                for part in parts {
                    if part["type"].as_str() == Some("output_text") {
                        if let Some(text) = part["text"].as_str() {
                            out.push_str(text);
                        }
                    }
                }
            }
        }
    }
    out
}

#[async_trait]
impl EntityExtractor for OpenAiClient {
    async fn extract(&self, text: &str) -> Result<Vec<Entity>, AiError> {
        if !HAN_CHARACTER.is_match(text) {
            log::info!("input has no Chinese characters; skipping entity extraction");
            return Ok(Vec::new());
        }
        let reply = self.chat(&extraction_prompt(text), true).await?;
        let payload = extract_json_object(&reply)
            .ok_or_else(|| AiError::BadPayload("no JSON object in extraction output".into()))?;
        let parsed: EntityListPayload = serde_json::from_str(payload)
            .map_err(|err| AiError::BadPayload(err.to_string()))?;
        Ok(sanitize_entities(parsed.entities))
    }
}

#[async_trait]
impl TermVerifier for OpenAiClient {
    async fn verify(
        &self,
        unmatched: &[MatchResult],
        batch_limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, AiError> {
        let limit = batch_limit.unwrap_or(unmatched.len());
        if unmatched.len() > limit {
            log::warn!(
                "verification batch limit {limit} reached; {} entities skipped this run",
                unmatched.len() - limit
            );
        }

        let mut records = Vec::new();
        for result in unmatched.iter().take(limit) {
            let entity = &result.entity;
            let record = match self.lookup_one(entity).await {
                Ok(record) => record,
                Err(err) => {
                    log::warn!(
                        "verification failed for {}: {err}",
                        entity.source_text
                    );
                    error_record(entity, &err)
                }
            };
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl Translator for OpenAiClient {
    async fn translate(&self, text: &str, terms: &[CanonicalTerm]) -> Result<String, AiError> {
        let block = verified_terms_block(terms);
        self.chat(&translation_prompt(text, &block), false).await
    }
}
