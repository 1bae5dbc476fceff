use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

/// A loosely shaped JSON object, as stored in the record store or read from a
/// line-delimited result file.
pub type JsonObject = Map<String, Value>;

/// Q1: total population per region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPopulation {
    pub region: String,
    pub population: f64,
}

/// Q2: countries ranked by population density.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDensity {
    pub country: String,
    pub density: f64,
    pub population: f64,
}

/// Q3: number of countries per population bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationBucket {
    pub bucket: String,
    pub count: f64,
}

/// Q4: degree centrality from the country link graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDegree {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub in_degree: f64,
    pub out_degree: f64,
    pub total_degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult<T> {
    pub question: &'static str,
    pub results: Vec<T>,
}

impl<T> QuestionResult<T> {
    pub fn empty(question: &'static str) -> Self {
        Self {
            question,
            results: Vec::new(),
        }
    }
}

/// The merged report handed to the presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub population_sample: Vec<JsonObject>,
    pub total_records: u64,
    pub q1: QuestionResult<RegionPopulation>,
    pub q2: QuestionResult<CountryDensity>,
    pub q3: QuestionResult<PopulationBucket>,
    pub q4: QuestionResult<CountryDegree>,
    pub spark_summary: Option<Value>,
}

/// Response envelope used by the JSON view.
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Tabled, Clone)]
pub struct SampleRow {
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Population")]
    pub population: String,
    #[tabled(rename = "Area (km²)")]
    pub area_km2: String,
    #[tabled(rename = "Density")]
    pub density: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RegionRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Total population")]
    pub population: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DensityRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Density")]
    pub density: String,
    #[tabled(rename = "Population")]
    pub population: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct BucketRow {
    #[tabled(rename = "Population bucket")]
    pub bucket: String,
    #[tabled(rename = "Countries")]
    pub count: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DegreeRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "In-degree")]
    pub in_degree: String,
    #[tabled(rename = "Out-degree")]
    pub out_degree: String,
    #[tabled(rename = "Total degree")]
    pub total_degree: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ClusterRow {
    #[tabled(rename = "Cluster")]
    pub cluster_id: String,
    #[tabled(rename = "Countries")]
    pub country_count: String,
    #[tabled(rename = "Mean population")]
    pub center_population: String,
    #[tabled(rename = "Mean density")]
    pub center_density: String,
    #[tabled(rename = "Mean area")]
    pub center_area_km2: String,
}
