//! Record store: the catalog of medicine records and the narrow read-only
//! query capability the search engine consumes.
//!
//! The engine only depends on the [`RecordStore`] trait; any storage that can
//! answer the three case-insensitive fetches conforms.

pub mod import;
pub mod memory;

pub use import::{import_catalog, load_data_dir};
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-side cap on broad (fuzzy) candidate fetches
pub const BROAD_FETCH_CAP: usize = 200;

/// A catalog entry. `name` is the primary matching field; everything else is
/// carried through to the wire response untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(default)]
    pub sku_id: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer_name: Option<String>,
    #[serde(default)]
    pub marketer_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub pack_size_label: Option<String>,
    #[serde(default)]
    pub short_composition: Option<String>,
}

impl Medicine {
    /// Minimal record with only a name, used by tests and fixtures
    pub fn named(name: &str) -> Self {
        Self {
            sku_id: String::new(),
            name: name.to_string(),
            manufacturer_name: None,
            marketer_name: None,
            kind: None,
            price: 0.0,
            pack_size_label: None,
            short_composition: None,
        }
    }
}

/// Errors surfaced by a record store fetch
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Read-only query capability over the catalog.
///
/// All three fetches match case-insensitively against `name`. Prefix and
/// containment fetches return records ordered by name ascending; broad
/// fetches are capped at [`BROAD_FETCH_CAP`] and carry no ordering promise
/// beyond determinism (the engine re-sorts).
pub trait RecordStore {
    /// Records whose name starts with `pattern`
    fn fetch_by_prefix(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError>;

    /// Records whose name contains `pattern`
    fn fetch_by_contains(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError>;

    /// Records whose name contains `pattern` or `alt_pattern`, capped at 200
    fn fetch_broad(&self, pattern: &str, alt_pattern: &str)
        -> Result<Vec<Medicine>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn fetch_by_prefix(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_by_prefix(pattern)
    }

    fn fetch_by_contains(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_by_contains(pattern)
    }

    fn fetch_broad(
        &self,
        pattern: &str,
        alt_pattern: &str,
    ) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_broad(pattern, alt_pattern)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn fetch_by_prefix(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_by_prefix(pattern)
    }

    fn fetch_by_contains(&self, pattern: &str) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_by_contains(pattern)
    }

    fn fetch_broad(
        &self,
        pattern: &str,
        alt_pattern: &str,
    ) -> Result<Vec<Medicine>, StoreError> {
        (**self).fetch_broad(pattern, alt_pattern)
    }
}
