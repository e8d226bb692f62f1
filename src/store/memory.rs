//! In-memory catalog store
//!
//! Holds the full catalog sorted by name with precomputed lowercase names,
//! so every fetch is a single ordered scan. Immutable after construction;
//! wrap in an `Arc` to share across concurrent requests.

use super::{Medicine, RecordStore, StoreError, BROAD_FETCH_CAP};
use std::fs;
use std::path::Path;
use tracing::info;

/// Catalog entry plus its lowercase name for case-insensitive matching
struct Entry {
    name_lower: String,
    record: Medicine,
}

/// In-memory record store backing the search engine
pub struct MemoryStore {
    entries: Vec<Entry>,
}

impl MemoryStore {
    /// Build a store from records, sorting by name ascending
    pub fn from_records(mut records: Vec<Medicine>) -> Self {
        records.sort_by(|a, b| a.name.cmp(&b.name));

        let entries = records
            .into_iter()
            .map(|record| Entry {
                name_lower: record.name.to_lowercase(),
                record,
            })
            .collect();

        Self { entries }
    }

    /// Load a store from a catalog JSON file (an array of records)
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let data = fs::read_to_string(path)?;
        let records: Vec<Medicine> = serde_json::from_str(&data)?;

        info!(
            "Loaded {} medicine records from {}",
            records.len(),
            path.display()
        );

        Ok(Self::from_records(records))
    }

    /// Number of records in the catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_matching<F>(&self, predicate: F, cap: Option<usize>) -> Vec<Medicine>
    where
        F: Fn(&str) -> bool,
    {
        let mut results = Vec::new();
        for entry in &self.entries {
            if predicate(&entry.name_lower) {
                results.push(entry.record.clone());
                if cap.is_some_and(|c| results.len() >= c) {
                    break;
                }
            }
        }
        results
    }
}

impl RecordStore for MemoryStore {
    fn fetch_by_prefix(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        let needle = pattern.to_lowercase();
        Ok(self.collect_matching(|name| name.starts_with(&needle), None))
    }

    fn fetch_by_contains(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        let needle = pattern.to_lowercase();
        Ok(self.collect_matching(|name| name.contains(&needle), None))
    }

    fn fetch_broad(
        &self,
        pattern: &str,
        alt_pattern: &str,
    ) -> Result<Vec<Medicine>, StoreError> {
        let needle = pattern.to_lowercase();
        let alt = alt_pattern.to_lowercase();
        Ok(self.collect_matching(
            |name| name.contains(&needle) || name.contains(&alt),
            Some(BROAD_FETCH_CAP),
        ))
    }
}
