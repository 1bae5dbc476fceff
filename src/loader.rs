use crate::types::JsonObject;
use crate::util::trim_text;
use csv::{ReaderBuilder, Terminator};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

/// Per-file line accounting, logged at debug level by the callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStats {
    pub total_lines: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Read a result file as text. Missing files, permission errors, and reads
/// that outlive `deadline` all collapse to `None`; a pipeline that has not run
/// yet looks exactly like an absent file.
pub async fn read_file_safe(path: &Path, deadline: Option<Duration>) -> Option<String> {
    let bytes = match deadline {
        Some(limit) => match tokio::time::timeout(limit, read_detached(path)).await {
            Ok(res) => res,
            Err(_) => {
                log::warn!(
                    "Timed out after {}ms reading {}; treating as absent.",
                    limit.as_millis(),
                    path.display()
                );
                return None;
            }
        },
        None => tokio::fs::read(path).await,
    };
    match bytes {
        Ok(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        Err(e) => {
            log::debug!("Source {} unavailable: {}", path.display(), e);
            None
        }
    }
}

/// Read on a detached OS thread rather than the runtime's blocking pool, so
/// a read stuck past its deadline never holds up runtime shutdown.
async fn read_detached(path: &Path) -> io::Result<Vec<u8>> {
    let (tx, rx) = oneshot::channel();
    let owned: PathBuf = path.to_path_buf();
    thread::Builder::new()
        .name("source-read".to_string())
        .spawn(move || {
            let _ = tx.send(std::fs::read(owned));
        })?;
    rx.await
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "reader thread vanished")))
}

/// Split tab-separated text into `(first, second)` pairs. Rows that do not
/// have exactly two fields are dropped.
pub fn parse_tsv_pairs(raw: &str) -> (Vec<(String, String)>, LineStats) {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(trim_text(raw).as_bytes());

    let mut stats = LineStats::default();
    let mut pairs = Vec::new();
    for result in rdr.records() {
        stats.total_lines += 1;
        match result {
            Ok(rec) if rec.len() == 2 => {
                pairs.push((rec[0].to_string(), rec[1].to_string()));
                stats.kept += 1;
            }
            _ => stats.dropped += 1,
        }
    }
    (pairs, stats)
}

/// Parse line-delimited JSON into objects. Blank lines are skipped; lines
/// that fail to parse, or parse to something other than an object, are
/// dropped without affecting their neighbours.
pub fn parse_jsonl_objects(raw: &str) -> (Vec<JsonObject>, LineStats) {
    let mut stats = LineStats::default();
    let mut objects = Vec::new();
    for line in trim_text(raw).split('\n') {
        if line.is_empty() {
            continue;
        }
        stats.total_lines += 1;
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => {
                objects.push(map);
                stats.kept += 1;
            }
            _ => stats.dropped += 1,
        }
    }
    (objects, stats)
}
