use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One CSV row as uploaded, plus the id assigned while loading.
///
/// Ground-truth columns are kept verbatim; a column missing from the file is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: u64,
    pub review: Option<String>,
    pub food_rating: Option<String>,
    pub delivery_rating: Option<String>,
    pub acceptance_score: Option<String>,
}

/// A batch whose completion call or answer could not be turned into predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub batch: usize,
    pub first_id: u64,
    pub last_id: u64,
    pub reason: String,
}

/// Share of rows (in percent) whose prediction agrees with the ground truth.
///
/// `None` means undefined: there were no rows to compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionReport {
    pub food: Option<f64>,
    pub delivery: Option<f64>,
    pub acceptance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRow {
    pub id: u64,
    pub review: Option<String>,
    pub food_rating: Option<String>,
    pub delivery_rating: Option<String>,
    pub acceptance_score: Option<String>,
    pub predicted_food_rating: i64,
    pub predicted_delivery_rating: i64,
    pub predicted_confidence: f64,
    pub food_match: bool,
    pub delivery_match: bool,
    pub acceptance_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub threshold: f64,
    pub total: usize,
    pub rows: Vec<ScoredRow>,
    pub precision: PrecisionReport,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub csv_data: Vec<ReviewRecord>,
    /// Model answers keyed by review id, exactly as parsed.
    pub api_data: Map<String, Value>,
    #[serde(default)]
    pub failed_batches: Vec<BatchFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
