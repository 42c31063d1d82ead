/// Boundary records produced by the LLM collaborators.
///
/// Extraction and verification both return model-generated JSON, so every
/// field is tolerant: missing fields default, unknown enum strings coerce to
/// a catch-all variant, and records without a usable source term are dropped
/// at this boundary instead of deep inside the matching logic.
use log::warn;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Organisation,
    Person,
    Location,
    Event,
    Idiom,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Sg,
    Cn,
    Hk,
    Tw,
    #[default]
    #[serde(other)]
    Others,
}

/// A candidate term produced by the extraction collaborator.
///
/// Created fresh each pipeline run and never persisted on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub entity_id: i64,
    #[serde(default)]
    pub source_text: String,
    #[serde(default)]
    pub target_text: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub context_phrase: String,
    #[serde(default)]
    pub region: Region,
    /// Romanized reading, only meaningful for PERSON entities.
    #[serde(default)]
    pub romanization: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Verified,
    Multiple,
    Error,
    #[default]
    #[serde(other)]
    Unverified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Multiple => "MULTIPLE",
            VerificationStatus::Unverified => "UNVERIFIED",
            VerificationStatus::Error => "ERROR",
        }
    }
}

/// Result of a web lookup for a single unmatched entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(default)]
    pub entity_id: i64,
    #[serde(default)]
    pub source_term: String,
    #[serde(default)]
    pub target_term: String,
    #[serde(default)]
    pub context_used: String,
    #[serde(default)]
    pub source_links: Vec<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub notes: String,
}

/// Drop extraction records that cannot participate in matching.
///
/// An entity whose source text normalizes to the empty string has no usable
/// key; it is skipped with a warning rather than failing the batch.
pub fn sanitize_entities(entities: Vec<Entity>) -> Vec<Entity> {
    entities
        .into_iter()
        .filter(|entity| {
            let usable = !normalize(&entity.source_text).is_empty();
            if !usable {
                warn!(
                    "dropping extracted entity {} with empty source text",
                    entity.entity_id
                );
            }
            usable
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_deserializes_with_missing_fields() {
        let entity: Entity =
            serde_json::from_str(r#"{"source_text":"飞达喜"}"#).expect("minimal entity");
        assert_eq!(entity.entity_id, 0);
        assert_eq!(entity.source_text, "飞达喜");
        assert_eq!(entity.kind, EntityKind::Other);
        assert_eq!(entity.region, Region::Others);
        assert!(entity.target_text.is_none());
    }

    #[test]
    fn unknown_kind_and_region_coerce() {
        let entity: Entity = serde_json::from_str(
            r#"{"source_text":"x","kind":"MOVIE","region":"Others"}"#,
        )
        .expect("tolerant entity");
        assert_eq!(entity.kind, EntityKind::Other);
        assert_eq!(entity.region, Region::Others);

        let entity: Entity =
            serde_json::from_str(r#"{"source_text":"x","kind":"PERSON","region":"SG"}"#)
                .expect("known variants");
        assert_eq!(entity.kind, EntityKind::Person);
        assert_eq!(entity.region, Region::Sg);
    }

    #[test]
    fn verification_status_defaults_to_unverified() {
        let record: VerificationRecord =
            serde_json::from_str(r#"{"source_term":"飞达喜"}"#).expect("minimal record");
        assert_eq!(record.verification_status, VerificationStatus::Unverified);

        let record: VerificationRecord = serde_json::from_str(
            r#"{"source_term":"飞达喜","verification_status":"SOMETHING_NEW"}"#,
        )
        .expect("unknown status");
        assert_eq!(record.verification_status, VerificationStatus::Unverified);
    }

    #[test]
    fn sanitize_drops_blank_source_text() {
        let entities = vec![
            Entity {
                source_text: "王乙康".into(),
                ..Default::default()
            },
            Entity {
                source_text: "  \u{3000} ".into(),
                ..Default::default()
            },
            Entity {
                source_text: String::new(),
                ..Default::default()
            },
        ];
        let kept = sanitize_entities(entities);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_text, "王乙康");
    }
}
