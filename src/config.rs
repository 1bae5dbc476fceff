// Source locations and request limits, from flags or the environment.
//
// Every value can come from a flag or its environment variable; directory
// defaults are resolved relative to the deployment root.
use crate::util::parse_leading_int;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SAMPLE_LIMIT: usize = 20;
pub const MAX_SAMPLE_LIMIT: usize = 200;

/// Records are always sampled in country order.
pub const SAMPLE_SORT_KEY: &str = "Country";

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Deployment root used to resolve the default data locations
    #[arg(long, env = "REPORT_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory holding q1.tsv, q2.jsonl, q3.tsv and q4.jsonl
    #[arg(long, env = "HADOOP_OUTPUT_DIR")]
    pub hadoop_dir: Option<PathBuf>,

    /// Directory holding training_summary.json
    #[arg(long, env = "SPARK_OUTPUT_DIR")]
    pub spark_dir: Option<PathBuf>,

    /// JSON Lines export of the population records
    #[arg(long, env = "POPULATION_RECORDS_PATH")]
    pub records: Option<PathBuf>,

    /// Number of records to sample (capped at 200)
    #[arg(long, env = "REPORT_SAMPLE_LIMIT")]
    pub sample_limit: Option<String>,

    /// Give up on a result file read after this many milliseconds
    #[arg(long, env = "REPORT_SOURCE_TIMEOUT_MS")]
    pub source_timeout_ms: Option<u64>,
}

/// Where the file-based sources live and how long a read may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub hadoop_dir: PathBuf,
    pub spark_dir: PathBuf,
    pub deadline: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub sources: SourceConfig,
    pub records_path: PathBuf,
    pub sample_limit: usize,
}

impl ReportConfig {
    pub fn from_args(args: &ConfigArgs, cwd: PathBuf) -> Self {
        let root = args.root.clone().unwrap_or(cwd);
        let data = root.join("data");
        Self {
            sources: SourceConfig {
                hadoop_dir: args
                    .hadoop_dir
                    .clone()
                    .unwrap_or_else(|| data.join("hadoop")),
                spark_dir: args.spark_dir.clone().unwrap_or_else(|| data.join("spark")),
                deadline: args.source_timeout_ms.map(Duration::from_millis),
            },
            records_path: args
                .records
                .clone()
                .unwrap_or_else(|| data.join("pop_clean.jsonl")),
            sample_limit: resolve_sample_limit(args.sample_limit.as_deref()),
        }
    }
}

/// The `.env` file read at startup lives in the deployment root.
pub fn dotenv_path(args: &ConfigArgs, cwd: &Path) -> PathBuf {
    args.root
        .clone()
        .unwrap_or_else(|| cwd.to_path_buf())
        .join(".env")
}

/// Leading integer of the raw value; zero or garbage falls back to the
/// default, a negative limit counts by magnitude, and the result is capped.
pub fn resolve_sample_limit(raw: Option<&str>) -> usize {
    let requested = match raw.and_then(parse_leading_int) {
        Some(0) | None => DEFAULT_SAMPLE_LIMIT,
        Some(n) => usize::try_from(n.unsigned_abs()).unwrap_or(MAX_SAMPLE_LIMIT),
    };
    requested.min(MAX_SAMPLE_LIMIT)
}
