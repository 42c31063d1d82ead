/// LLM collaborator boundary.
///
/// The deterministic core talks to three collaborators: entity extraction,
/// web verification, and translation. Each is an async trait so tests can
/// inject fakes; the production binding is [`openai::OpenAiClient`].
pub mod openai;
pub mod prompts;
pub mod retry;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::entity::{Entity, VerificationRecord};
use crate::matcher::MatchResult;
use crate::merger::CanonicalTerm;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("could not parse model output: {0}")]
    BadPayload(String),
}

/// Extracts candidate entities and idioms from the source text.
///
/// Contract: non-Mandarin input yields an empty list, never an error; the
/// rest of the pipeline propagates an empty list through to an empty
/// canonical term list.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<Entity>, AiError>;
}

/// Confirms target terms for unmatched entities via authoritative lookup.
///
/// One record per submitted entity, `entity_id` echoed for traceability.
/// At most `batch_limit` entities are submitted per run (`None` = all);
/// entities beyond the bound are not verified in this run. A lookup that
/// fails for one entity yields an ERROR-status record, not an `Err`.
#[async_trait]
pub trait TermVerifier: Send + Sync {
    async fn verify(
        &self,
        unmatched: &[MatchResult],
        batch_limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, AiError>;
}

/// Produces the final translation, holding the resolved terminology fixed.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, terms: &[CanonicalTerm]) -> Result<String, AiError>;
}

// One client instance can serve all three seams when shared behind an Arc.

#[async_trait]
impl<T: EntityExtractor + ?Sized> EntityExtractor for std::sync::Arc<T> {
    async fn extract(&self, text: &str) -> Result<Vec<Entity>, AiError> {
        (**self).extract(text).await
    }
}

#[async_trait]
impl<T: TermVerifier + ?Sized> TermVerifier for std::sync::Arc<T> {
    async fn verify(
        &self,
        unmatched: &[MatchResult],
        batch_limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, AiError> {
        (**self).verify(unmatched, batch_limit).await
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    async fn translate(&self, text: &str, terms: &[CanonicalTerm]) -> Result<String, AiError> {
        (**self).translate(text, terms).await
    }
}
