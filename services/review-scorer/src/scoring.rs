//! Joins ground truth with predictions and computes the precision report.
//!
//! Ground-truth columns are compared loosely: only the leading number of the
//! stored text counts, so `"5"`, `" 5"` and `"5.0"` all rate as 5. A
//! prediction element that is missing, zero or not a number falls back to
//! the defaults below.

use serde_json::Value;
use shared::dto::{PrecisionReport, ReviewRecord, ScoreReport, ScoredRow};

use crate::parser::Predictions;

pub const DEFAULT_FOOD_RATING: f64 = 1.0;
pub const DEFAULT_DELIVERY_RATING: f64 = 1.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionTuple {
    pub food_rating: f64,
    pub delivery_rating: f64,
    pub confidence: f64,
}

impl Default for PredictionTuple {
    fn default() -> Self {
        Self {
            food_rating: DEFAULT_FOOD_RATING,
            delivery_rating: DEFAULT_DELIVERY_RATING,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl PredictionTuple {
    /// Interpret one raw answer value, expected to be `[food, delivery, confidence]`.
    pub fn from_value(value: Option<&Value>) -> Self {
        let element = |idx: usize| value.and_then(|v| v.get(idx)).and_then(usable_number);
        Self {
            food_rating: element(0).unwrap_or(DEFAULT_FOOD_RATING),
            delivery_rating: element(1).unwrap_or(DEFAULT_DELIVERY_RATING),
            confidence: element(2).unwrap_or(DEFAULT_CONFIDENCE),
        }
    }
}

fn usable_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (n != 0.0 && n.is_finite()).then_some(n)
}

/// Leading integer of `s`, after leading whitespace: `"4 stars"` → 4.
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Leading decimal number of `s`, after leading whitespace: `"0.9 (high)"` → 0.9.
pub fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(s.starts_with(['+', '-']));
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse().ok()
}

/// Accepts only a finite number within `[0, 1]`.
pub fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| (0.0..=1.0).contains(t))
}

fn rating_matches(ground_truth: Option<&str>, predicted: f64) -> bool {
    ground_truth
        .and_then(leading_integer)
        .is_some_and(|g| g as f64 == predicted)
}

fn accepted(score: Option<f64>, threshold: f64) -> bool {
    score.is_some_and(|s| s >= threshold)
}

pub fn score_row(record: &ReviewRecord, prediction: PredictionTuple, threshold: f64) -> ScoredRow {
    let actual = accepted(
        record.acceptance_score.as_deref().and_then(leading_float),
        threshold,
    );
    let predicted = accepted(Some(prediction.confidence), threshold);

    ScoredRow {
        id: record.id,
        review: record.review.clone(),
        food_rating: record.food_rating.clone(),
        delivery_rating: record.delivery_rating.clone(),
        acceptance_score: record.acceptance_score.clone(),
        predicted_food_rating: prediction.food_rating.trunc() as i64,
        predicted_delivery_rating: prediction.delivery_rating.trunc() as i64,
        predicted_confidence: prediction.confidence,
        food_match: rating_matches(record.food_rating.as_deref(), prediction.food_rating),
        delivery_match: rating_matches(
            record.delivery_rating.as_deref(),
            prediction.delivery_rating,
        ),
        acceptance_match: actual == predicted,
    }
}

/// `matches / total × 100`, undefined (`None`) without rows.
pub fn percentage(matches: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| matches as f64 / total as f64 * 100.0)
}

pub fn format_percentage(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

/// Score every record against the prediction stored under its own id.
pub fn score(records: &[ReviewRecord], predictions: &Predictions, threshold: f64) -> ScoreReport {
    let rows: Vec<ScoredRow> = records
        .iter()
        .map(|record| {
            let prediction = PredictionTuple::from_value(predictions.get(&record.id.to_string()));
            score_row(record, prediction, threshold)
        })
        .collect();

    let total = rows.len();
    let count = |pick: fn(&ScoredRow) -> bool| rows.iter().filter(|r| pick(r)).count();
    let precision = PrecisionReport {
        food: percentage(count(|r| r.food_match), total),
        delivery: percentage(count(|r| r.delivery_match), total),
        acceptance: percentage(count(|r| r.acceptance_match), total),
    };

    ScoreReport {
        threshold,
        total,
        rows,
        precision,
    }
}
