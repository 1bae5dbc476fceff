use crate::summary::{display_scalar, TrainingSummary};
use crate::types::{
    BucketRow, ClusterRow, DegreeRow, DensityRow, JsonObject, RegionRow, Report, ReportEnvelope,
    SampleRow,
};
use crate::util::{coerce_value, format_int, format_number, present_label};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Rows of the population sample shown in the overview.
pub const SAMPLE_PREVIEW_ROWS: usize = 10;

pub fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportEnvelope {
        success: true,
        data: Some(report),
        error: None,
    })
}

pub fn render_json_failure(message: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportEnvelope {
        success: false,
        data: None,
        error: Some(message.to_string()),
    })
}

fn table_or<T: Tabled>(rows: Vec<T>, placeholder: &str) -> String {
    if rows.is_empty() {
        return format!("_{}_\n", placeholder);
    }
    format!("{}\n", Table::new(rows).with(Style::markdown()))
}

fn text_field(record: &JsonObject, key: &str) -> String {
    present_label(record.get(key)).unwrap_or_else(|| "N/A".to_string())
}

fn sample_rows(sample: &[JsonObject]) -> Vec<SampleRow> {
    sample
        .iter()
        .take(SAMPLE_PREVIEW_ROWS)
        .map(|r| SampleRow {
            country: text_field(r, "Country"),
            region: text_field(r, "Region"),
            population: format_number(coerce_value(r.get("population")), 0),
            area_km2: format_number(coerce_value(r.get("area_km2")), 2),
            density: format_number(coerce_value(r.get("density")), 2),
        })
        .collect()
}

fn render_summary(md: &mut String, summary: Option<&Value>) {
    let Some(view) = summary.and_then(TrainingSummary::from_value) else {
        md.push_str("_No clustering results from Spark yet._\n");
        return;
    };
    let _ = writeln!(
        md,
        "Algorithm: {} | Clusters (k): {}\n",
        display_scalar(view.algorithm.as_ref()),
        display_scalar(view.k.as_ref())
    );
    let _ = writeln!(
        md,
        "Within-set sum of squared errors: {}\n",
        format_number(view.wssse(), 2)
    );
    let rows: Vec<ClusterRow> = view
        .clusters
        .iter()
        .map(|c| ClusterRow {
            cluster_id: display_scalar(c.cluster_id.as_ref()),
            country_count: format_number(coerce_value(c.country_count.as_ref()), 0),
            center_population: format_number(coerce_value(c.center_population.as_ref()), 2),
            center_density: format_number(coerce_value(c.center_density.as_ref()), 2),
            center_area_km2: format_number(coerce_value(c.center_area_km2.as_ref()), 2),
        })
        .collect();
    md.push_str(&table_or(rows, "No clusters."));
}

/// Render the whole report as a Markdown document.
pub fn render_markdown(report: &Report, generated_at: DateTime<Local>) -> String {
    let mut md = String::new();
    md.push_str("# Global Population Report\n\n");
    let _ = writeln!(md, "Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S"));

    md.push_str("## I. Record store overview\n\n");
    let _ = writeln!(md, "**Total countries:** {}\n", format_int(report.total_records));
    let _ = writeln!(md, "### Sample (first {} records)\n", SAMPLE_PREVIEW_ROWS);
    md.push_str(&table_or(
        sample_rows(&report.population_sample),
        "No sample data.",
    ));

    md.push_str("\n## II. Hadoop MapReduce results\n\n");

    md.push_str("### Q1 - Total population by region\n\n");
    let q1: Vec<RegionRow> = report
        .q1
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| RegionRow {
            rank: i + 1,
            region: r.region.clone(),
            population: format_number(r.population, 0),
        })
        .collect();
    md.push_str(&table_or(q1, "No Q1 results from Hadoop yet."));

    md.push_str("\n### Q2 - Top 10 countries by population density\n\n");
    let q2: Vec<DensityRow> = report
        .q2
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| DensityRow {
            rank: i + 1,
            country: r.country.clone(),
            density: format_number(r.density, 2),
            population: format_number(r.population, 0),
        })
        .collect();
    md.push_str(&table_or(q2, "No Q2 results from Hadoop yet."));

    md.push_str("\n### Q3 - Population buckets\n\n");
    let q3: Vec<BucketRow> = report
        .q3
        .results
        .iter()
        .map(|r| BucketRow {
            bucket: r.bucket.clone(),
            count: format_number(r.count, 0),
        })
        .collect();
    md.push_str(&table_or(q3, "No Q3 results from Hadoop yet."));

    md.push_str("\n### Q4 - Influence from the country link graph\n\n");
    let q4: Vec<DegreeRow> = report
        .q4
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| DegreeRow {
            rank: i + 1,
            country: r.country.clone().unwrap_or_else(|| "N/A".to_string()),
            in_degree: format_number(r.in_degree, 0),
            out_degree: format_number(r.out_degree, 0),
            total_degree: format_number(r.total_degree, 0),
        })
        .collect();
    md.push_str(&table_or(q4, "No Q4 results from Hadoop yet."));

    md.push_str("\n## III. Spark MLlib clustering\n\n");
    render_summary(&mut md, report.spark_summary.as_ref());

    md
}
