use crate::error::{MemoryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryEntry {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MemoryEntry {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    fn haystack(&self) -> String {
        let mut hay = self.content.to_lowercase();
        for tag in &self.tags {
            hay.push(' ');
            hay.push_str(&tag.to_lowercase());
        }
        hay
    }
}

/// A recalled entry with its lexical score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryHit {
    pub id: String,
    pub content: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
struct MemoryFile {
    #[serde(default)]
    schema_version: Option<u32>,
    entries: Vec<MemoryEntry>,
}

/// In-process knowledge memory with lexical recall.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Vec<MemoryEntry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<MemoryEntry>) -> Result<Self> {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry)?;
        }
        Ok(store)
    }

    /// Load a `{"schema_version": 1, "entries": [...]}` memory file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file: MemoryFile = serde_json::from_slice(&bytes)?;
        if let Some(version) = file.schema_version {
            if version != 1 {
                return Err(MemoryError::UnsupportedSchema(version));
            }
        }
        let store = Self::from_entries(file.entries)?;
        log::info!(
            "Loaded {} memory entries from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Insert or replace an entry by id.
    pub fn insert(&mut self, entry: MemoryEntry) -> Result<()> {
        if entry.id.trim().is_empty() {
            return Err(MemoryError::EmptyId);
        }
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Score every entry by the fraction of query tokens it mentions.
    ///
    /// Entries that match nothing are dropped. Ties break on id so the output is stable.
    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<MemoryHit> {
        let tokens = query_tokens(query);
        if tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let total = tokens.len() as f64;
        let mut hits: Vec<MemoryHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let hay = entry.haystack();
                let matched = tokens.iter().filter(|t| hay.contains(t.as_str())).count();
                (matched > 0).then(|| MemoryHit {
                    id: entry.id.clone(),
                    content: entry.content.clone(),
                    score: matched as f64 / total,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(top_k);

        log::debug!("Memory recall for '{}': {} hits", query, hits.len());
        hits
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn query_tokens(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .unicode_words()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        MemoryStore::from_entries(vec![
            MemoryEntry::new("deploy", "Deployments go through the staging cluster first"),
            MemoryEntry::new("editor", "The user prefers vim with a dark theme")
                .with_tags(["preferences", "editor"]),
            MemoryEntry::new("agents", "VANA routes requests to specialist agents"),
        ])
        .unwrap()
    }

    #[test]
    fn tokens_drop_short_words_and_duplicates() {
        assert_eq!(
            query_tokens("Is the VANA vana agent up?"),
            vec!["the".to_string(), "vana".to_string(), "agent".to_string()]
        );
    }

    #[test]
    fn search_scores_by_token_fraction() {
        let hits = store().search("which editor theme", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "editor");
        assert!((hits[0].score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn search_matches_tags() {
        let hits = store().search("preferences", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "editor");
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn search_respects_top_k_and_orders_ties_by_id() {
        let store = MemoryStore::from_entries(vec![
            MemoryEntry::new("b", "alpha"),
            MemoryEntry::new("a", "alpha"),
            MemoryEntry::new("c", "alpha"),
        ])
        .unwrap();
        let hits = store.search("alpha", 2);
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn empty_query_returns_nothing() {
        assert!(store().search("  ", 5).is_empty());
        assert!(store().search("a b", 5).is_empty());
    }

    #[test]
    fn insert_replaces_by_id_and_rejects_empty_ids() {
        let mut store = store();
        store
            .insert(MemoryEntry::new("deploy", "Deployments are manual"))
            .unwrap();
        assert_eq!(store.len(), 3);
        assert!(matches!(
            store.insert(MemoryEntry::new(" ", "x")),
            Err(MemoryError::EmptyId)
        ));
    }
}
