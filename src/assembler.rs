//! Report assembly: fan out to every source, join, and merge.

use crate::config::{ReportConfig, SourceConfig, SAMPLE_SORT_KEY};
use crate::error::ReportError;
use crate::questions::{load_q1, load_q2, load_q3, load_q4};
use crate::store::RecordStore;
use crate::summary::load_summary;
use crate::types::{
    CountryDegree, CountryDensity, JsonObject, PopulationBucket, QuestionResult,
    RegionPopulation, Report,
};
use serde_json::Value;

/// Everything the file-based sources contributed to one report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsResults {
    pub q1: QuestionResult<RegionPopulation>,
    pub q2: QuestionResult<CountryDensity>,
    pub q3: QuestionResult<PopulationBucket>,
    pub q4: QuestionResult<CountryDegree>,
    pub spark_summary: Option<Value>,
}

/// Load the four result files and the training summary concurrently. Never
/// fails: each absent or unreadable source contributes an empty section.
pub async fn load_analytics(sources: &SourceConfig) -> AnalyticsResults {
    let hadoop = sources.hadoop_dir.as_path();
    let deadline = sources.deadline;
    let (q1, q2, q3, q4, spark_summary) = tokio::join!(
        load_q1(hadoop, deadline),
        load_q2(hadoop, deadline),
        load_q3(hadoop, deadline),
        load_q4(hadoop, deadline),
        load_summary(&sources.spark_dir, deadline),
    );
    AnalyticsResults {
        q1,
        q2,
        q3,
        q4,
        spark_summary,
    }
}

pub fn build_report(
    population_sample: Vec<JsonObject>,
    total_records: u64,
    analytics: AnalyticsResults,
) -> Report {
    Report {
        population_sample,
        total_records,
        q1: analytics.q1,
        q2: analytics.q2,
        q3: analytics.q3,
        q4: analytics.q4,
        spark_summary: analytics.spark_summary,
    }
}

/// Query the store and every file source together, then merge. Only a
/// store failure is an error.
pub async fn generate_report(
    store: &dyn RecordStore,
    config: &ReportConfig,
) -> Result<Report, ReportError> {
    let (sample, count, analytics) = tokio::join!(
        store.sample(config.sample_limit, SAMPLE_SORT_KEY),
        store.count(),
        load_analytics(&config.sources),
    );
    let sample = sample?;
    let total_records = count?;
    log::info!(
        "Report assembled: {} sampled of {} records; Q1={} Q2={} Q3={} Q4={} rows; summary {}",
        sample.len(),
        total_records,
        analytics.q1.results.len(),
        analytics.q2.results.len(),
        analytics.q3.results.len(),
        analytics.q4.results.len(),
        if analytics.spark_summary.is_some() {
            "present"
        } else {
            "absent"
        }
    );
    Ok(build_report(sample, total_records, analytics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::store::MemoryRecordStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn config_for(hadoop: &Path, spark: &Path) -> ReportConfig {
        ReportConfig {
            sources: SourceConfig {
                hadoop_dir: hadoop.to_path_buf(),
                spark_dir: spark.to_path_buf(),
                deadline: Some(Duration::from_secs(5)),
            },
            records_path: PathBuf::from("unused.jsonl"),
            sample_limit: 20,
        }
    }

    /// Reports a fixed total regardless of what it holds.
    struct FixedCountStore {
        inner: MemoryRecordStore,
        total: u64,
    }

    #[async_trait]
    impl RecordStore for FixedCountStore {
        async fn sample(&self, limit: usize, sort_key: &str) -> StoreResult<Vec<JsonObject>> {
            self.inner.sample(limit, sort_key).await
        }

        async fn count(&self) -> StoreResult<u64> {
            Ok(self.total)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn sample(&self, _limit: usize, _sort_key: &str) -> StoreResult<Vec<JsonObject>> {
            Err(StoreError::NotAnObject {
                path: PathBuf::from("db"),
                line: 1,
            })
        }

        async fn count(&self) -> StoreResult<u64> {
            Ok(0)
        }
    }

    fn records(names: &[&str]) -> Vec<JsonObject> {
        names
            .iter()
            .map(|n| match json!({ "Country": n }) {
                Value::Object(m) => m,
                _ => unreachable!(),
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_sources_still_produce_a_report() {
        let hadoop = tempfile::tempdir().unwrap();
        let spark = tempfile::tempdir().unwrap();
        for name in ["q1.tsv", "q2.jsonl", "q3.tsv", "q4.jsonl"] {
            std::fs::write(hadoop.path().join(name), "").unwrap();
        }
        let store = FixedCountStore {
            inner: MemoryRecordStore::new(records(&["Chad", "Benin", "Togo"])),
            total: 500,
        };

        let report = generate_report(&store, &config_for(hadoop.path(), spark.path()))
            .await
            .unwrap();

        assert_eq!(report.total_records, 500);
        assert_eq!(report.population_sample.len(), 3);
        assert!(report.q1.results.is_empty());
        assert!(report.q2.results.is_empty());
        assert!(report.q3.results.is_empty());
        assert!(report.q4.results.is_empty());
        assert_eq!(report.spark_summary, None);
    }

    #[tokio::test]
    async fn populated_sources_are_merged_into_named_sections() {
        let hadoop = tempfile::tempdir().unwrap();
        let spark = tempfile::tempdir().unwrap();
        std::fs::write(hadoop.path().join("q1.tsv"), "Asia\t10\nAfrica\t20\n").unwrap();
        std::fs::write(
            hadoop.path().join("q2.jsonl"),
            "{\"Country\":\"Monaco\",\"density\":26000,\"population\":39000}\n",
        )
        .unwrap();
        std::fs::write(hadoop.path().join("q3.tsv"), ">100M\t14\n<1M\t40\n").unwrap();
        std::fs::write(spark.path().join("training_summary.json"), "{\"k\": 4, \"clusters\": []}")
            .unwrap();
        let store = MemoryRecordStore::new(records(&["Chad"]));

        let report = generate_report(&store, &config_for(hadoop.path(), spark.path()))
            .await
            .unwrap();

        assert_eq!(report.total_records, 1);
        assert_eq!(report.q1.results[0].region, "Africa");
        assert_eq!(report.q2.results[0].country, "Monaco");
        assert_eq!(report.q3.results[0].bucket, "<1M");
        assert!(report.q4.results.is_empty());
        assert_eq!(report.spark_summary, Some(json!({"k": 4, "clusters": []})));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stalled_source_is_abandoned_at_the_deadline() {
        let hadoop = tempfile::tempdir().unwrap();
        let spark = tempfile::tempdir().unwrap();
        let status = std::process::Command::new("mkfifo")
            .arg(hadoop.path().join("q1.tsv"))
            .status()
            .unwrap();
        assert!(status.success());
        std::fs::write(hadoop.path().join("q3.tsv"), "<1M\t40\n").unwrap();
        let mut cfg = config_for(hadoop.path(), spark.path());
        cfg.sources.deadline = Some(Duration::from_millis(200));

        let report = generate_report(&MemoryRecordStore::new(records(&["Chad"])), &cfg)
            .await
            .unwrap();

        assert!(report.q1.results.is_empty());
        assert_eq!(report.q3.results[0].bucket, "<1M");
    }

    #[tokio::test]
    async fn store_failure_fails_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate_report(&BrokenStore, &config_for(dir.path(), dir.path())).await;
        assert!(matches!(result, Err(ReportError::Store(_))));
    }

    #[tokio::test]
    async fn report_serializes_with_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let analytics = load_analytics(&config_for(dir.path(), dir.path()).sources).await;
        let report = build_report(records(&["Chad"]), 1, analytics);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            json!({
                "populationSample": [{"Country": "Chad"}],
                "totalRecords": 1,
                "q1": {"question": "Q1", "results": []},
                "q2": {"question": "Q2", "results": []},
                "q3": {"question": "Q3", "results": []},
                "q4": {"question": "Q4", "results": []},
                "sparkSummary": null
            })
        );
    }
}
