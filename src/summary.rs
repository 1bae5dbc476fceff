//! Clustering summary produced by the Spark training job.
//!
//! The document is passed through to the report untouched; [`TrainingSummary`]
//! is only a tolerant view used when rendering it.

use crate::loader::read_file_safe;
use crate::util::{coerce_value, trim_text};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const SUMMARY_FILE: &str = "training_summary.json";

/// Parse the whole document. Any parse failure, and a literal `null`, means
/// there is no summary.
pub fn parse_summary(raw: &str) -> Option<Value> {
    if trim_text(raw).is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(v) => Some(v),
        Err(e) => {
            log::debug!("Discarding malformed training summary: {}", e);
            None
        }
    }
}

pub async fn load_summary(dir: &Path, deadline: Option<Duration>) -> Option<Value> {
    let raw = read_file_safe(&dir.join(SUMMARY_FILE), deadline).await?;
    parse_summary(&raw)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSummary {
    #[serde(default)]
    pub algorithm: Option<Value>,
    #[serde(default)]
    pub k: Option<Value>,
    #[serde(default)]
    pub within_set_sum_of_squared_errors: Option<Value>,
    pub clusters: Vec<ClusterSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSummary {
    #[serde(default)]
    pub cluster_id: Option<Value>,
    #[serde(default)]
    pub country_count: Option<Value>,
    #[serde(default)]
    pub center_population: Option<Value>,
    #[serde(default)]
    pub center_density: Option<Value>,
    #[serde(default)]
    pub center_area_km2: Option<Value>,
}

impl TrainingSummary {
    /// Returns `None` unless the document carries a `clusters` array of objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    pub fn wssse(&self) -> f64 {
        coerce_value(self.within_set_sum_of_squared_errors.as_ref())
    }
}

/// Display a loose scalar; strings unquoted, anything else as JSON.
pub fn display_scalar(v: Option<&Value>) -> String {
    match v {
        None => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
