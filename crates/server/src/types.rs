use courserec_vector::{EngineState, RatingBucket, Recommendation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recommendation query
#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// Selected course name
    pub name: String,

    /// Number of recommendations (config default when absent)
    pub top_k: Option<usize>,
}

/// Search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring of the course name
    #[serde(default)]
    pub q: String,

    /// Match case exactly
    #[serde(default)]
    pub case_sensitive: bool,

    /// Include the embedding vector in each row
    #[serde(default)]
    pub include_vectors: bool,
}

/// Recommended course as shown to the user
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub id: usize,
    pub name: String,

    /// Description preview (truncated)
    pub description: String,

    pub rating: Option<f32>,
    pub url: String,
    pub score: f32,
}

impl RecommendationItem {
    pub fn from_recommendation(rec: Recommendation, preview_chars: usize) -> Self {
        Self {
            description: rec.preview(preview_chars),
            id: rec.id,
            name: rec.name,
            rating: rec.rating,
            url: rec.url,
            score: rec.score,
        }
    }
}

/// Recommendation response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Selected course name
    pub course: String,

    pub results: Vec<RecommendationItem>,
    pub count: usize,
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,

    /// Matching rows with all original columns
    pub results: Vec<Map<String, Value>>,

    pub count: usize,
}

/// Course name list
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub courses: Vec<String>,
    pub count: usize,
}

/// Corpus statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub courses: usize,
    pub dimension: usize,
    pub state: EngineState,
    pub columns: Vec<String>,
}

/// Rating distribution
#[derive(Debug, Serialize, Deserialize)]
pub struct RatingDistributionResponse {
    pub buckets: Vec<RatingBucket>,
    pub total: usize,
}

/// Export request
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    /// Bare file name written next to the configured `export_path`
    /// (the configured file itself when absent)
    pub file_name: Option<String>,
}

/// Export response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub path: String,
    pub rows: usize,
    pub message: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
