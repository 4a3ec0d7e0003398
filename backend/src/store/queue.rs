use shared::ReviewQueueEntry;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::{StoreError, load_or_empty, write_json};

/// Documents waiting for a human decision, persisted as a JSON array.
///
/// Filenames are unique among pending entries. Every mutation is written
/// to disk before it becomes visible to readers.
pub struct ReviewQueueStore {
    path: PathBuf,
    entries: Mutex<Vec<ReviewQueueEntry>>,
}

impl ReviewQueueStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries: Vec<ReviewQueueEntry> = load_or_empty(&path, "review queue");

        let before = entries.len();
        let mut seen = std::collections::HashSet::new();
        // Keep the latest of any duplicated filename, as an upsert would have.
        entries.reverse();
        entries.retain(|entry| seen.insert(entry.filename.clone()));
        entries.reverse();
        if entries.len() != before {
            log::warn!(
                "Dropped {} duplicate review queue entries from {}",
                before - entries.len(),
                path.display()
            );
        }

        log::info!("Review queue loaded with {} pending entries", entries.len());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub async fn list(&self) -> Vec<ReviewQueueEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn contains(&self, filename: &str) -> bool {
        self.entries
            .lock()
            .await
            .iter()
            .any(|entry| entry.filename == filename)
    }

    /// Adds an entry, replacing any pending entry with the same filename.
    pub async fn upsert(&self, entry: ReviewQueueEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        if let Some(existing) = next.iter_mut().find(|e| e.filename == entry.filename) {
            log::warn!(
                "Review queue already holds {}; replacing its entry ({} {} -> {} {})",
                entry.filename,
                existing.model_guess,
                existing.model_confidence,
                entry.model_guess,
                entry.model_confidence
            );
            *existing = entry;
        } else {
            log::info!("Queued {} for review", entry.filename);
            next.push(entry);
        }
        write_json(&self.path, &next).await?;
        *entries = next;
        Ok(())
    }

    /// Removes the entry for `filename`. Returns whether one was pending.
    pub async fn remove(&self, filename: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        if !entries.iter().any(|e| e.filename == filename) {
            return Ok(false);
        }
        let next: Vec<ReviewQueueEntry> = entries
            .iter()
            .filter(|e| e.filename != filename)
            .cloned()
            .collect();
        write_json(&self.path, &next).await?;
        *entries = next;
        log::info!("Removed {} from the review queue", filename);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::DocumentType;

    fn entry(name: &str, guess: DocumentType, confidence: f64) -> ReviewQueueEntry {
        ReviewQueueEntry::new(name, guess, confidence)
    }

    #[actix_web::test]
    async fn missing_file_is_an_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewQueueStore::open(dir.path().join("queue.json"));
        assert!(store.list().await.is_empty());
    }

    #[actix_web::test]
    async fn unreadable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        std::fs::write(&path, "not json").unwrap();
        let store = ReviewQueueStore::open(&path);
        assert!(store.list().await.is_empty());
    }

    #[actix_web::test]
    async fn upsert_replaces_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewQueueStore::open(dir.path().join("queue.json"));
        store.upsert(entry("a.pdf", DocumentType::Unknown, 0.40)).await.unwrap();
        store.upsert(entry("b.pdf", DocumentType::ClaimForm, 0.41)).await.unwrap();
        store.upsert(entry("a.pdf", DocumentType::Invoice, 0.70)).await.unwrap();

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].filename, "a.pdf");
        assert_eq!(listed[0].model_guess, DocumentType::Invoice);
        assert_eq!(listed[0].model_confidence, "70%");
        assert_eq!(listed[1].filename, "b.pdf");
    }

    #[actix_web::test]
    async fn changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("queue.json");
        {
            let store = ReviewQueueStore::open(&path);
            store.upsert(entry("a.pdf", DocumentType::Unknown, 0.40)).await.unwrap();
            store.upsert(entry("b.pdf", DocumentType::Unknown, 0.40)).await.unwrap();
            assert!(store.remove("a.pdf").await.unwrap());
        }
        let reopened = ReviewQueueStore::open(&path);
        let listed = reopened.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "b.pdf");
        assert!(reopened.contains("b.pdf").await);
    }

    #[actix_web::test]
    async fn removing_an_absent_entry_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReviewQueueStore::open(dir.path().join("queue.json"));
        assert!(!store.remove("ghost.pdf").await.unwrap());
    }

    #[actix_web::test]
    async fn duplicates_on_disk_collapse_to_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        let raw = r#"[
            {"filename":"a.pdf","ai_guess":"Unknown Document","confidence":"40%"},
            {"filename":"b.pdf","ai_guess":"Claim Form","confidence":"41%"},
            {"filename":"a.pdf","ai_guess":"Invoice","confidence":"75%"}
        ]"#;
        std::fs::write(&path, raw).unwrap();
        let listed = ReviewQueueStore::open(&path).list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].filename, "b.pdf");
        assert_eq!(listed[1].model_guess, DocumentType::Invoice);
    }
}
