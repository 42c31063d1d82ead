/// The translation pipeline: extraction → glossary match → verification →
/// merge → glossary append → translation, as one linear sequence of blocking
/// steps. No step retries here; a failure aborts the rest of the run with an
/// error naming the step, and the glossary is untouched unless the append
/// step itself completed.
use thiserror::Error;

use crate::ai::{AiError, EntityExtractor, TermVerifier, Translator};
use crate::glossary::store::{GlossaryStore, StoreError};
use crate::matcher::match_entities;
use crate::merger::{merge_terms, CanonicalTerm};
use crate::updater::append_new;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("entity extraction failed: {0}")]
    Extraction(#[source] AiError),
    #[error("glossary read failed: {0}")]
    GlossaryRead(#[source] StoreError),
    #[error("term verification failed: {0}")]
    Verification(#[source] AiError),
    #[error("glossary update failed: {0}")]
    GlossaryWrite(#[source] StoreError),
    #[error("translation failed: {0}")]
    Translation(#[source] AiError),
}

/// Outcome of one run: the translation plus the canonical terms that were
/// injected into it, and counts for reporting.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub translation: String,
    pub terms: Vec<CanonicalTerm>,
    pub matched: usize,
    pub unmatched: usize,
    pub verified: usize,
    pub appended: usize,
}

pub struct TranslationPipeline {
    store: Box<dyn GlossaryStore>,
    extractor: Box<dyn EntityExtractor>,
    verifier: Box<dyn TermVerifier>,
    translator: Box<dyn Translator>,
    verify_batch_limit: Option<usize>,
}

impl TranslationPipeline {
    pub fn new(
        store: Box<dyn GlossaryStore>,
        extractor: Box<dyn EntityExtractor>,
        verifier: Box<dyn TermVerifier>,
        translator: Box<dyn Translator>,
        verify_batch_limit: Option<usize>,
    ) -> Self {
        Self {
            store,
            extractor,
            verifier,
            translator,
            verify_batch_limit,
        }
    }

    pub async fn run(&self, text: &str) -> Result<PipelineReport, PipelineError> {
        log::info!("step 1: entity extraction");
        let entities = self
            .extractor
            .extract(text)
            .await
            .map_err(PipelineError::Extraction)?;
        log::info!("extracted {} candidate entities", entities.len());

        log::info!("step 2: glossary matching");
        let glossary = self
            .store
            .load()
            .await
            .map_err(PipelineError::GlossaryRead)?;
        let outcome = match_entities(&entities, &glossary);

        let verified = if outcome.unmatched.is_empty() {
            Vec::new()
        } else {
            log::info!(
                "step 3: verifying {} unknown terms via web lookup",
                outcome.unmatched.len()
            );
            self.verifier
                .verify(&outcome.unmatched, self.verify_batch_limit)
                .await
                .map_err(PipelineError::Verification)?
        };

        log::info!("step 4: merging terms and updating glossary");
        let terms = merge_terms(&outcome.matched, &verified);
        let appended = append_new(self.store.as_ref(), &terms)
            .await
            .map_err(PipelineError::GlossaryWrite)?;

        log::info!("step 5: translation");
        let translation = self
            .translator
            .translate(text, &terms)
            .await
            .map_err(PipelineError::Translation)?;
        log::info!("translation complete");

        Ok(PipelineReport {
            translation,
            matched: outcome.matched.len(),
            unmatched: outcome.unmatched.len(),
            verified: verified.len(),
            appended,
            terms,
        })
    }
}
