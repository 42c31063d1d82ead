/// Persisted bilingual glossary: one record per source term.
pub mod csv;
pub mod store;

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

pub const LINKS_SEPARATOR: &str = "; ";

/// One row of the glossary file.
///
/// `source_term` acts as the unique key after normalization. Automated
/// appends never touch `edited`/`last_modified`; those are stamped only by
/// the editing path ([`GlossaryTable::apply_edit`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryRecord {
    pub source_term: String,
    pub target_term: String,
    pub status: String,
    pub source: String,
    pub links: Vec<String>,
    pub edited: bool,
    pub last_modified: String,
}

/// In-memory view of the glossary file.
///
/// Row order mirrors the file so a save writes back exactly what was loaded
/// plus any appended rows. The lookup index is keyed by the normalized source
/// term; when two rows normalize to the same key the later row wins, matching
/// how the file has always been interpreted.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTable {
    rows: Vec<GlossaryRecord>,
    index: BTreeMap<String, usize>,
}

impl GlossaryTable {
    pub fn from_rows(rows: Vec<GlossaryRecord>) -> Self {
        let mut index = BTreeMap::new();
        for (pos, row) in rows.iter().enumerate() {
            let key = normalize(&row.source_term);
            if !key.is_empty() {
                index.insert(key, pos);
            }
        }
        Self { rows, index }
    }

    pub fn rows(&self) -> &[GlossaryRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact lookup by normalized source term.
    pub fn get(&self, normalized_key: &str) -> Option<&GlossaryRecord> {
        self.index
            .get(normalized_key)
            .map(|&pos| &self.rows[pos])
    }

    /// Iterate `(normalized key, record)` pairs in sorted key order.
    ///
    /// Sorted iteration keeps the substring scan in the matcher fully
    /// deterministic regardless of file order.
    pub fn iter_keys(&self) -> impl Iterator<Item = (&str, &GlossaryRecord)> {
        self.index
            .iter()
            .map(|(key, &pos)| (key.as_str(), &self.rows[pos]))
    }

    /// Append a row and index it.
    pub fn push(&mut self, record: GlossaryRecord) {
        let key = normalize(&record.source_term);
        self.rows.push(record);
        if !key.is_empty() {
            self.index.insert(key, self.rows.len() - 1);
        }
    }

    /// Update the row whose stripped source term matches, or append a new one.
    ///
    /// This is the editing path: it stamps `edited` and `last_modified`, and
    /// is the only way existing rows change. Returns `true` when an existing
    /// row was updated in place.
    pub fn apply_edit(
        &mut self,
        source_term: &str,
        target_term: &str,
        status: &str,
        timestamp: &str,
    ) -> bool {
        let wanted = source_term.trim();
        if let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| row.source_term.trim() == wanted)
        {
            row.target_term = target_term.trim().to_string();
            if !status.trim().is_empty() {
                row.status = status.trim().to_string();
            }
            row.edited = true;
            row.last_modified = timestamp.to_string();
            return true;
        }

        self.push(GlossaryRecord {
            source_term: wanted.to_string(),
            target_term: target_term.trim().to_string(),
            status: status.trim().to_string(),
            source: "glossary".to_string(),
            links: Vec::new(),
            edited: true,
            last_modified: timestamp.to_string(),
        });
        false
    }
}

/// Current local time in ISO-8601 form, for `last_modified` stamps.
pub fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Join link URLs for the `links` column.
pub fn join_links(links: &[String]) -> String {
    links.join(LINKS_SEPARATOR)
}

/// Split the `links` column back into URLs.
pub fn split_links(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
