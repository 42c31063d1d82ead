/// Combine glossary matches with freshly verified terms into the canonical
/// term list handed to translation and to the glossary updater.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::VerificationRecord;
use crate::matcher::{MatchResult, MATCH_SOURCE_GLOSSARY};
use crate::normalize::normalize;

pub const TERM_SOURCE_VERIFIED: &str = "verified";

/// Maximum number of provenance links kept per term.
pub const MAX_TERM_LINKS: usize = 3;

/// The resolved (source, target) pair for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTerm {
    pub source_term: String,
    pub target_term: String,
    pub status: String,
    pub source: String,
    pub links: Vec<String>,
}

/// Merge matched and verified terms, keyed by normalized source term.
///
/// Matched entries go in first, then every verification record inserts or
/// overwrites its key. A verification result replaces a glossary hit for the
/// same term entirely: the lookup just ran against live sources, while the
/// stored entry may be stale. This also means an ERROR-status verification
/// displaces a glossary hit; callers see the status on the merged term.
///
/// Output order is insertion order, with overwrites keeping the original
/// position. Duplicate verification records resolve last-write-wins.
pub fn merge_terms(
    matched: &[MatchResult],
    verified: &[VerificationRecord],
) -> Vec<CanonicalTerm> {
    let mut terms: Vec<CanonicalTerm> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut upsert = |key: String, term: CanonicalTerm| match index.get(&key) {
        Some(&pos) => terms[pos] = term,
        None => {
            index.insert(key, terms.len());
            terms.push(term);
        }
    };

    for result in matched {
        let key = normalize(&result.entity.source_text);
        let target = result.matched_target.clone().unwrap_or_default();
        if key.is_empty() || target.is_empty() {
            continue;
        }
        upsert(
            key,
            CanonicalTerm {
                source_term: result.entity.source_text.clone(),
                target_term: target,
                status: "KNOWN".to_string(),
                source: result
                    .match_source
                    .clone()
                    .unwrap_or_else(|| MATCH_SOURCE_GLOSSARY.to_string()),
                links: Vec::new(),
            },
        );
    }

    for record in verified {
        let key = normalize(&record.source_term);
        if key.is_empty() {
            continue;
        }
        upsert(
            key,
            CanonicalTerm {
                source_term: record.source_term.clone(),
                target_term: record.target_term.clone(),
                status: record.verification_status.as_str().to_string(),
                source: TERM_SOURCE_VERIFIED.to_string(),
                links: record
                    .source_links
                    .iter()
                    .take(MAX_TERM_LINKS)
                    .cloned()
                    .collect(),
            },
        );
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, VerificationStatus};
    use crate::matcher::GlossaryStatus;

    fn matched(source: &str, target: &str) -> MatchResult {
        MatchResult {
            entity: Entity {
                source_text: source.to_string(),
                ..Default::default()
            },
            glossary_status: GlossaryStatus::Known,
            matched_target: Some(target.to_string()),
            match_source: Some(MATCH_SOURCE_GLOSSARY.to_string()),
        }
    }

    fn verified(source: &str, target: &str, status: VerificationStatus) -> VerificationRecord {
        VerificationRecord {
            source_term: source.to_string(),
            target_term: target.to_string(),
            verification_status: status,
            ..Default::default()
        }
    }

    #[test]
    fn identity_on_empty_verification() {
        let input = vec![
            matched("王乙康", "Ong Ye Kung"),
            matched("卫生部", "Ministry of Health"),
        ];
        let terms = merge_terms(&input, &[]);
        assert_eq!(terms.len(), 2);
        for term in &terms {
            assert_eq!(term.status, "KNOWN");
            assert_eq!(term.source, MATCH_SOURCE_GLOSSARY);
            assert!(term.links.is_empty());
        }
        assert_eq!(terms[0].source_term, "王乙康");
        assert_eq!(terms[1].source_term, "卫生部");
    }

    #[test]
    fn verification_overrides_glossary_match() {
        let mut record = verified("王乙康", "Ong Ye Kung (MOH)", VerificationStatus::Verified);
        record.source_links = vec!["https://www.moh.gov.sg/".to_string()];
        let terms = merge_terms(&[matched("王乙康", "Ong Ye Kung")], &[record]);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].target_term, "Ong Ye Kung (MOH)");
        assert_eq!(terms[0].status, "VERIFIED");
        assert_eq!(terms[0].source, TERM_SOURCE_VERIFIED);
        assert_eq!(terms[0].links, vec!["https://www.moh.gov.sg/".to_string()]);
    }

    #[test]
    fn error_status_verification_still_overrides() {
        let terms = merge_terms(
            &[matched("王乙康", "Ong Ye Kung")],
            &[verified("王乙康", "王乙康 (unverified)", VerificationStatus::Error)],
        );
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].status, "ERROR");
        assert_eq!(terms[0].source, TERM_SOURCE_VERIFIED);
    }

    #[test]
    fn verified_only_entity_produces_one_term() {
        let mut record = verified("飞达喜", "Ahmad Firdaus Daud", VerificationStatus::Verified);
        record.source_links = vec!["https://example.gov.sg/x".to_string()];
        let terms = merge_terms(&[], &[record]);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].source_term, "飞达喜");
        assert_eq!(terms[0].target_term, "Ahmad Firdaus Daud");
        assert_eq!(terms[0].status, "VERIFIED");
        assert_eq!(terms[0].links, vec!["https://example.gov.sg/x".to_string()]);
    }

    #[test]
    fn duplicate_verifications_resolve_last_write_wins() {
        let terms = merge_terms(
            &[],
            &[
                verified("飞达喜", "Fei Daxi", VerificationStatus::Multiple),
                verified("飞达喜", "Ahmad Firdaus Daud", VerificationStatus::Verified),
            ],
        );
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].target_term, "Ahmad Firdaus Daud");
        assert_eq!(terms[0].status, "VERIFIED");
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let mut missing_target = matched("卫生部", "");
        missing_target.matched_target = None;
        let inputs = vec![matched("", "ghost"), missing_target];
        let records = vec![verified("", "nobody", VerificationStatus::Verified)];
        assert!(merge_terms(&inputs, &records).is_empty());
    }

    #[test]
    fn links_are_capped_at_three() {
        let mut record = verified("飞达喜", "Ahmad Firdaus Daud", VerificationStatus::Verified);
        record.source_links = (1..=5).map(|i| format!("https://example.org/{i}")).collect();
        let terms = merge_terms(&[], &[record]);
        assert_eq!(terms[0].links.len(), MAX_TERM_LINKS);
        assert_eq!(terms[0].links[2], "https://example.org/3");
    }

    #[test]
    fn overwrite_keeps_original_position() {
        let records = vec![verified("王乙康", "Ong Ye Kung (updated)", VerificationStatus::Verified)];
        let terms = merge_terms(
            &[matched("王乙康", "Ong Ye Kung"), matched("卫生部", "Ministry of Health")],
            &records,
        );
        assert_eq!(terms.len(), 2);
        // the overridden term stays first
        assert_eq!(terms[0].source_term, "王乙康");
        assert_eq!(terms[0].target_term, "Ong Ye Kung (updated)");
        assert_eq!(terms[1].source_term, "卫生部");
    }
}
