// Projection, filtering and ordering for the four batch result files.
//
// Each `parse_qN` is a pure function over the file text; each `load_qN`
// reads the file and degrades to an empty result when it is absent.
use crate::loader::{parse_jsonl_objects, parse_tsv_pairs, read_file_safe, LineStats};
use crate::types::{
    CountryDegree, CountryDensity, PopulationBucket, QuestionResult, RegionPopulation,
};
use crate::util::{cmp_desc, cmp_label, coerce_str, coerce_value, present_label, scalar_label};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const Q1_FILE: &str = "q1.tsv";
pub const Q2_FILE: &str = "q2.jsonl";
pub const Q3_FILE: &str = "q3.tsv";
pub const Q4_FILE: &str = "q4.jsonl";

/// Maximum number of rows kept for the ranked questions (Q2, Q4).
pub const TOP_N: usize = 10;

/// Field names that may carry the country name in Q2, in priority order.
pub const COUNTRY_FIELDS: [&str; 3] = ["Country", "country", "country_name"];
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Known Q3 buckets in display order.
pub const BUCKET_ORDER: [&str; 6] = ["<1M", "1M-10M", "10M-50M", "50M-100M", ">100M", "Unknown"];

static BUCKET_RANK: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    BUCKET_ORDER
        .iter()
        .enumerate()
        .map(|(i, b)| (*b, i))
        .collect()
});

/// Unrecognised buckets share a single rank after every known one.
fn bucket_rank(bucket: &str) -> usize {
    BUCKET_RANK
        .get(bucket)
        .copied()
        .unwrap_or(BUCKET_ORDER.len())
}

fn log_stats(question: &str, stats: &LineStats) {
    log::debug!(
        "{}: {} lines, {} kept, {} dropped",
        question,
        stats.total_lines,
        stats.kept,
        stats.dropped
    );
}

pub fn parse_q1(raw: &str) -> Vec<RegionPopulation> {
    let (pairs, stats) = parse_tsv_pairs(raw);
    log_stats("Q1", &stats);
    let mut rows: Vec<RegionPopulation> = pairs
        .into_iter()
        .map(|(region, population)| RegionPopulation {
            region,
            population: coerce_str(&population),
        })
        .collect();
    rows.sort_by(|a, b| cmp_desc(a.population, b.population));
    rows
}

pub fn parse_q2(raw: &str) -> Vec<CountryDensity> {
    let (objects, stats) = parse_jsonl_objects(raw);
    log_stats("Q2", &stats);
    let mut rows: Vec<CountryDensity> = objects
        .iter()
        .map(|record| CountryDensity {
            country: COUNTRY_FIELDS
                .iter()
                .find_map(|key| present_label(record.get(*key)))
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            density: coerce_value(record.get("density")),
            population: coerce_value(record.get("population")),
        })
        .filter(|row| row.density.is_finite())
        .collect();
    rows.sort_by(|a, b| cmp_desc(a.density, b.density));
    rows.truncate(TOP_N);
    rows
}

pub fn parse_q3(raw: &str) -> Vec<PopulationBucket> {
    let (pairs, stats) = parse_tsv_pairs(raw);
    log_stats("Q3", &stats);
    let mut rows: Vec<PopulationBucket> = pairs
        .into_iter()
        .map(|(bucket, count)| PopulationBucket {
            bucket,
            count: coerce_str(&count),
        })
        .collect();
    rows.sort_by(|a, b| {
        bucket_rank(&a.bucket)
            .cmp(&bucket_rank(&b.bucket))
            .then_with(|| cmp_label(&a.bucket, &b.bucket))
    });
    rows
}

pub fn parse_q4(raw: &str) -> Vec<CountryDegree> {
    let (objects, stats) = parse_jsonl_objects(raw);
    log_stats("Q4", &stats);
    let mut rows: Vec<CountryDegree> = objects
        .iter()
        .map(|record| CountryDegree {
            country: record.get("country").and_then(scalar_label),
            in_degree: coerce_value(record.get("in_degree")),
            out_degree: coerce_value(record.get("out_degree")),
            total_degree: coerce_value(record.get("total_degree")),
        })
        .collect();
    rows.sort_by(|a, b| cmp_desc(a.total_degree, b.total_degree));
    rows.truncate(TOP_N);
    rows
}

async fn load_question<T>(
    question: &'static str,
    path: &Path,
    deadline: Option<Duration>,
    parse: fn(&str) -> Vec<T>,
) -> QuestionResult<T> {
    match read_file_safe(path, deadline).await {
        Some(raw) => QuestionResult {
            question,
            results: parse(&raw),
        },
        None => QuestionResult::empty(question),
    }
}

pub async fn load_q1(dir: &Path, deadline: Option<Duration>) -> QuestionResult<RegionPopulation> {
    load_question("Q1", &dir.join(Q1_FILE), deadline, parse_q1).await
}

pub async fn load_q2(dir: &Path, deadline: Option<Duration>) -> QuestionResult<CountryDensity> {
    load_question("Q2", &dir.join(Q2_FILE), deadline, parse_q2).await
}

pub async fn load_q3(dir: &Path, deadline: Option<Duration>) -> QuestionResult<PopulationBucket> {
    load_question("Q3", &dir.join(Q3_FILE), deadline, parse_q3).await
}

pub async fn load_q4(dir: &Path, deadline: Option<Duration>) -> QuestionResult<CountryDegree> {
    load_question("Q4", &dir.join(Q4_FILE), deadline, parse_q4).await
}
