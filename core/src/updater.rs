/// Append newly resolved terms back into the persisted glossary.
use std::collections::HashSet;

use crate::glossary::store::{GlossaryStore, StoreError};
use crate::glossary::GlossaryRecord;
use crate::merger::CanonicalTerm;

/// Append canonical terms whose source text is not already in the glossary.
///
/// Loads the table immediately before saving (the save is a full overwrite,
/// so a stale load would clobber concurrent edits). Existing rows are never
/// modified or removed here; when nothing new is collected, no write happens
/// at all. Returns the number of rows added.
///
/// There is no cross-process locking around the load→append→save window; a
/// concurrent writer can still lose an update. Callers running more than one
/// pipeline instance must serialize calls per glossary location themselves.
pub async fn append_new(
    store: &dyn GlossaryStore,
    terms: &[CanonicalTerm],
) -> Result<usize, StoreError> {
    let mut table = store.load().await?;

    let mut existing: HashSet<String> = table
        .rows()
        .iter()
        .map(|row| row.source_term.clone())
        .collect();

    let mut added = 0;
    for term in terms {
        let source = term.source_term.trim();
        if source.is_empty() || existing.contains(source) {
            continue;
        }
        table.push(GlossaryRecord {
            source_term: source.to_string(),
            target_term: term.target_term.trim().to_string(),
            status: term.status.clone(),
            source: term.source.clone(),
            links: term.links.clone(),
            edited: false,
            last_modified: String::new(),
        });
        existing.insert(source.to_string());
        added += 1;
    }

    if added > 0 {
        store.save(&table).await?;
        log::info!("glossary updated with {added} new entries");
    } else {
        log::info!("no new glossary terms to add");
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::store::MemoryStore;

    fn term(source: &str, target: &str, status: &str, source_kind: &str) -> CanonicalTerm {
        CanonicalTerm {
            source_term: source.to_string(),
            target_term: target.to_string(),
            status: status.to_string(),
            source: source_kind.to_string(),
            links: Vec::new(),
        }
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::new(vec![GlossaryRecord {
            source_term: "王乙康".into(),
            target_term: "Ong Ye Kung".into(),
            status: "KNOWN".into(),
            source: "glossary".into(),
            ..Default::default()
        }])
    }

    #[tokio::test]
    async fn appends_only_unseen_terms() {
        let store = seeded_store();
        let terms = vec![
            term("王乙康", "Ong Ye Kung", "KNOWN", "glossary"),
            term("飞达喜", "Ahmad Firdaus Daud", "VERIFIED", "verified"),
        ];
        let added = append_new(&store, &terms).await.expect("appends");
        assert_eq!(added, 1);

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        // the pre-existing row is untouched
        assert_eq!(rows[0].source_term, "王乙康");
        assert_eq!(rows[0].target_term, "Ong Ye Kung");
        assert_eq!(rows[1].source_term, "飞达喜");
        assert_eq!(rows[1].status, "VERIFIED");
        assert!(!rows[1].edited);
        assert!(rows[1].last_modified.is_empty());
    }

    #[tokio::test]
    async fn second_identical_call_changes_nothing() {
        let store = seeded_store();
        let terms = vec![term("飞达喜", "Ahmad Firdaus Daud", "VERIFIED", "verified")];

        let first = append_new(&store, &terms).await.expect("first call");
        let rows_after_first = store.rows();
        let second = append_new(&store, &terms).await.expect("second call");

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(store.rows(), rows_after_first);
        // the second call must not have written at all
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn blank_and_duplicate_sources_are_skipped() {
        let store = seeded_store();
        let terms = vec![
            term("  ", "ghost", "VERIFIED", "verified"),
            term(" 飞达喜 ", "Ahmad Firdaus Daud", "VERIFIED", "verified"),
            term("飞达喜", "Somebody Else", "MULTIPLE", "verified"),
        ];
        let added = append_new(&store, &terms).await.expect("appends");
        assert_eq!(added, 1);
        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        // stored stripped, first occurrence wins within the batch
        assert_eq!(rows[1].source_term, "飞达喜");
        assert_eq!(rows[1].target_term, "Ahmad Firdaus Daud");
    }

    #[tokio::test]
    async fn empty_term_list_does_not_write() {
        let store = seeded_store();
        let added = append_new(&store, &[]).await.expect("no-op");
        assert_eq!(added, 0);
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.rows().len(), 1);
    }
}
