/// End-to-end pipeline runs over in-memory collaborators: extraction and
/// verification are scripted, the store is real table logic, and the
/// translator echoes the term block it was handed.
use std::sync::Arc;

use async_trait::async_trait;

use tong_translate_core::{
    verified_terms_block, AiError, CanonicalTerm, Entity, EntityExtractor, GlossaryRecord,
    MatchResult, MemoryStore, TermVerifier, TranslationPipeline, Translator,
    VerificationRecord, VerificationStatus,
};

struct ScriptedExtractor(Vec<Entity>);

#[async_trait]
impl EntityExtractor for ScriptedExtractor {
    async fn extract(&self, _text: &str) -> Result<Vec<Entity>, AiError> {
        Ok(self.0.clone())
    }
}

struct ScriptedVerifier(Vec<VerificationRecord>);

#[async_trait]
impl TermVerifier for ScriptedVerifier {
    async fn verify(
        &self,
        unmatched: &[MatchResult],
        batch_limit: Option<usize>,
    ) -> Result<Vec<VerificationRecord>, AiError> {
        let limit = batch_limit.unwrap_or(unmatched.len());
        assert!(
            unmatched.len() <= limit,
            "verifier was handed more entities than the batch limit"
        );
        Ok(self.0.clone())
    }
}

struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, _text: &str, terms: &[CanonicalTerm]) -> Result<String, AiError> {
        Ok(verified_terms_block(terms))
    }
}

fn entity(id: i64, source: &str) -> Entity {
    Entity {
        entity_id: id,
        source_text: source.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn substring_match_resolves_minister_title() {
    let store = Arc::new(MemoryStore::new(vec![GlossaryRecord {
        source_term: "王乙康".into(),
        target_term: "Ong Ye Kung".into(),
        status: "KNOWN".into(),
        source: "glossary".into(),
        ..Default::default()
    }]));
    let pipeline = TranslationPipeline::new(
        Box::new(store.clone()),
        Box::new(ScriptedExtractor(vec![entity(
            1,
            "社会政策统筹部长兼卫生部长王乙康",
        )])),
        Box::new(ScriptedVerifier(Vec::new())),
        Box::new(EchoTranslator),
        Some(10),
    );

    let report = pipeline.run("……王乙康说。").await.expect("runs");
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 0);
    assert_eq!(report.verified, 0);
    assert_eq!(
        report.translation,
        "- 社会政策统筹部长兼卫生部长王乙康 → Ong Ye Kung (KNOWN)"
    );
    // the full entity text was new to the glossary and got appended
    assert_eq!(report.appended, 1);
    let rows = store.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].source_term, "社会政策统筹部长兼卫生部长王乙康");
    assert_eq!(rows[1].target_term, "Ong Ye Kung");
}

#[tokio::test]
async fn verified_term_flows_into_prompt_and_glossary() {
    let store = Arc::new(MemoryStore::new(Vec::new()));
    let record = VerificationRecord {
        entity_id: 1,
        source_term: "飞达喜".into(),
        target_term: "Ahmad Firdaus Daud".into(),
        source_links: vec!["https://example.gov.sg/x".into()],
        verification_status: VerificationStatus::Verified,
        ..Default::default()
    };
    let pipeline = TranslationPipeline::new(
        Box::new(store.clone()),
        Box::new(ScriptedExtractor(vec![entity(1, "飞达喜")])),
        Box::new(ScriptedVerifier(vec![record])),
        Box::new(EchoTranslator),
        Some(10),
    );

    let report = pipeline.run("飞达喜……").await.expect("runs");
    assert_eq!(report.matched, 0);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.verified, 1);
    assert_eq!(report.appended, 1);

    assert_eq!(report.terms.len(), 1);
    let term = &report.terms[0];
    assert_eq!(term.source, "verified");
    assert_eq!(term.status, "VERIFIED");
    assert_eq!(term.links, vec!["https://example.gov.sg/x".to_string()]);
    assert_eq!(
        report.translation,
        "- 飞达喜 → Ahmad Firdaus Daud (VERIFIED)"
    );

    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_term, "飞达喜");
    assert_eq!(rows[0].target_term, "Ahmad Firdaus Daud");
    assert_eq!(rows[0].status, "VERIFIED");
    assert_eq!(rows[0].links, vec!["https://example.gov.sg/x".to_string()]);

    // a second identical run adds nothing new
    let report = pipeline.run("飞达喜……").await.expect("second run");
    assert_eq!(report.appended, 0);
    assert_eq!(store.rows().len(), 1);
    // this time the term resolves from the glossary, no verification needed
    assert_eq!(report.matched, 1);
    assert_eq!(report.verified, 0);
}
