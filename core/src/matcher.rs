/// Deterministic entity-to-glossary matching.
///
/// Matching is plain code on purpose: an earlier incarnation of this step
/// asked the model to decide which glossary entry applied and the answers
/// drifted between runs. Everything here is a pure function of its inputs.
use serde::Serialize;

use crate::entity::Entity;
use crate::glossary::GlossaryTable;
use crate::normalize::normalize;

pub const MATCH_SOURCE_GLOSSARY: &str = "glossary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlossaryStatus {
    Known,
    Unknown,
}

/// An entity annotated with the outcome of the glossary lookup.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub entity: Entity,
    pub glossary_status: GlossaryStatus,
    pub matched_target: Option<String>,
    pub match_source: Option<String>,
}

impl MatchResult {
    pub fn is_known(&self) -> bool {
        self.glossary_status == GlossaryStatus::Known
    }
}

/// Partition of a candidate batch. Input order is preserved in both halves;
/// every input entity lands in exactly one of them.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matched: Vec<MatchResult>,
    pub unmatched: Vec<MatchResult>,
}

/// Match a batch of candidate entities against the loaded glossary.
///
/// Per entity: exact lookup on the normalized source text first, then a
/// substring fallback that scans every glossary key contained in the entity
/// text and keeps the candidate with the longest target term. An empty
/// target term counts as no translation either way.
pub fn match_entities(entities: &[Entity], glossary: &GlossaryTable) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    for entity in entities {
        let key = normalize(&entity.source_text);
        let target = if key.is_empty() {
            None
        } else {
            exact_target(&key, glossary).or_else(|| longest_target_substring(&key, glossary))
        };

        match target {
            Some(target) => outcome.matched.push(MatchResult {
                entity: entity.clone(),
                glossary_status: GlossaryStatus::Known,
                matched_target: Some(target),
                match_source: Some(MATCH_SOURCE_GLOSSARY.to_string()),
            }),
            None => outcome.unmatched.push(MatchResult {
                entity: entity.clone(),
                glossary_status: GlossaryStatus::Unknown,
                matched_target: None,
                match_source: None,
            }),
        }
    }
    log::info!(
        "glossary matching done: {} matched, {} unmatched",
        outcome.matched.len(),
        outcome.unmatched.len()
    );
    outcome
}

fn exact_target(key: &str, glossary: &GlossaryTable) -> Option<String> {
    glossary
        .get(key)
        .map(|record| record.target_term.clone())
        .filter(|target| !target.is_empty())
}

/// Scan all glossary keys that occur inside `text` and return the target
/// term of the best candidate.
///
/// The tie-break is the longest *target* string, not the longest key. Keys
/// are visited in sorted order and only a strictly longer target displaces
/// the current best, so the scan is deterministic even when several targets
/// share a length.
fn longest_target_substring(text: &str, glossary: &GlossaryTable) -> Option<String> {
    let mut best: Option<&str> = None;
    for (key, record) in glossary.iter_keys() {
        if key.is_empty() || record.target_term.is_empty() || !text.contains(key) {
            continue;
        }
        let candidate = record.target_term.as_str();
        if best.map_or(true, |current| candidate.len() > current.len()) {
            best = Some(candidate);
        }
    }
    best.map(str::to_string)
}
