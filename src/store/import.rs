//! Bulk catalog ingestion
//!
//! Reads structured JSON files from a data directory into normalized
//! [`Medicine`] records, tolerating the field-name variants found in the
//! source datasets, and de-duplicates by `sku_id`.

use super::Medicine;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Read every `*.json` file under `dir` (sorted by file name), normalize and
/// de-duplicate the records.
pub fn load_data_dir(dir: &Path) -> Result<Vec<Medicine>> {
    if !dir.is_dir() {
        anyhow::bail!("data directory not found: {}", dir.display());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut all_records = Vec::new();
    let mut files_processed = 0;

    for path in paths {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        if content.trim().is_empty() {
            warn!("Skipping empty file: {}", path.display());
            continue;
        }

        let value: Value = match serde_json::from_str(content.trim()) {
            Ok(v) => v,
            Err(e) => {
                warn!("Error parsing {}: {}", path.display(), e);
                continue;
            }
        };

        for item in unwrap_envelope(value) {
            if let Some(record) = extract_record(&item) {
                all_records.push(record);
            }
        }

        files_processed += 1;
    }

    info!(
        "Processed {} files, found {} medicines",
        files_processed,
        all_records.len()
    );

    Ok(deduplicate(all_records))
}

/// Load, normalize and write the catalog file the server reads.
/// Returns the number of unique records written.
pub fn import_catalog(data_dir: &Path, out: &Path) -> Result<usize> {
    let records = load_data_dir(data_dir)?;

    let json = serde_json::to_string_pretty(&records)?;
    fs::write(out, json)
        .with_context(|| format!("failed to write catalog to {}", out.display()))?;

    info!(
        "Imported {} medicine records into {}",
        records.len(),
        out.display()
    );

    Ok(records.len())
}

/// Handle the envelope variants seen in source data: a bare array, an object
/// wrapping the list under "medicines" or "data", or a single record.
fn unwrap_envelope(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("medicines") {
                items.clone()
            } else if let Some(Value::Array(items)) = map.get("data") {
                items.clone()
            } else {
                vec![Value::Object(map)]
            }
        }
        _ => Vec::new(),
    }
}

/// Build a record from one raw entry, applying field-name fallbacks.
/// Entries without a name are dropped.
fn extract_record(item: &Value) -> Option<Medicine> {
    let obj = item.as_object()?;

    let name = text_field(obj, &["name"])?;

    Some(Medicine {
        sku_id: text_field(obj, &["sku_id", "id"]).unwrap_or_default(),
        name,
        manufacturer_name: text_field(obj, &["manufacturer_name", "manufacturer"]),
        marketer_name: text_field(obj, &["marketer_name", "marketer"]),
        kind: text_field(obj, &["type", "category"]).or_else(|| Some("unknown".to_string())),
        price: price_field(obj),
        pack_size_label: text_field(obj, &["pack_size_label", "pack_size"]),
        short_composition: text_field(obj, &["short_composition", "composition"]),
    })
}

/// First non-empty string value among the candidate keys
fn text_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = obj.get(*key) {
            if !s.is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// Price as a non-negative number; accepts numbers or numeric strings,
/// defaults to 0.0 when absent or unparseable.
fn price_field(obj: &serde_json::Map<String, Value>) -> f64 {
    match obj.get("price") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// De-duplicate by `sku_id`, keeping first occurrence. Records with a blank
/// sku get a generated `auto_{n}` id so they survive deduplication.
fn deduplicate(records: Vec<Medicine>) -> Vec<Medicine> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for mut record in records {
        if record.sku_id.is_empty() {
            record.sku_id = format!("auto_{}", unique.len());
        }
        if seen.insert(record.sku_id.clone()) {
            unique.push(record);
        }
    }

    info!("Unique medicines after deduplication: {}", unique.len());
    unique
}
