//! Record store capability and its implementations.
//!
//! The report samples raw population records and counts them. Unlike the
//! batch result files, a store that cannot be read is an outage and is
//! reported as an error.

use crate::error::{StoreError, StoreResult};
use crate::types::JsonObject;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Up to `limit` records sorted ascending by `sort_key`.
    async fn sample(&self, limit: usize, sort_key: &str) -> StoreResult<Vec<JsonObject>>;

    async fn count(&self) -> StoreResult<u64>;
}

/// Cross-type ordering for sort keys: missing and null first, then numbers,
/// strings, objects, arrays and booleans.
fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

pub fn cmp_sort_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let by_type = type_rank(a).cmp(&type_rank(b));
    if by_type != Ordering::Equal {
        return by_type;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ Value::Object(_)), Some(y @ Value::Object(_)))
        | (Some(x @ Value::Array(_)), Some(y @ Value::Array(_))) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => Ordering::Equal,
    }
}

fn sample_sorted(mut records: Vec<JsonObject>, limit: usize, sort_key: &str) -> Vec<JsonObject> {
    records.sort_by(|a, b| cmp_sort_values(a.get(sort_key), b.get(sort_key)));
    records.truncate(limit);
    records
}

/// Records held in memory.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<JsonObject>,
}

#[cfg(test)]
impl MemoryRecordStore {
    pub fn new(records: Vec<JsonObject>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn sample(&self, limit: usize, sort_key: &str) -> StoreResult<Vec<JsonObject>> {
        Ok(sample_sorted(self.records.clone(), limit, sort_key))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.records.len() as u64)
    }
}

/// A JSON Lines export of the population collection, one object per line.
///
/// The file is read once per store; `sample` and `count` both see that
/// snapshot, so a report never mixes two versions of the export.
#[derive(Debug, Clone)]
pub struct JsonlRecordStore {
    path: PathBuf,
    records: OnceCell<Vec<JsonObject>>,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn records(&self) -> StoreResult<&[JsonObject]> {
        let records = self.records.get_or_try_init(|| self.load()).await?;
        Ok(records.as_slice())
    }

    async fn load(&self) -> StoreResult<Vec<JsonObject>> {
        log::debug!("Loading records from {}", self.path.display());
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        let mut records = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value =
                serde_json::from_str(line).map_err(|source| StoreError::Decode {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })?;
            match value {
                Value::Object(map) => records.push(map),
                _ => {
                    return Err(StoreError::NotAnObject {
                        path: self.path.clone(),
                        line: idx + 1,
                    })
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn sample(&self, limit: usize, sort_key: &str) -> StoreResult<Vec<JsonObject>> {
        let records = self.records().await?;
        Ok(sample_sorted(records.to_vec(), limit, sort_key))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.records().await?.len() as u64)
    }
}
