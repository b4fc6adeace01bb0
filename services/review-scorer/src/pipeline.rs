use shared::dto::{BatchFailure, ReviewRecord};
use shared::openai_client::CompletionBackend;
use tracing::{debug, error, info, warn};

use crate::parser::{parse_predictions, Predictions};
use crate::prompt::{batches, build_prompt};

/// Everything the model produced for one upload.
#[derive(Debug, Default)]
pub struct PredictionRun {
    pub predictions: Predictions,
    pub failures: Vec<BatchFailure>,
}

/// Ask the model for predictions, one sequential call per batch.
///
/// A batch that fails (call or parse) contributes no predictions and is
/// listed in `failures`; the remaining batches still run. Keys already
/// answered by an earlier batch are kept.
pub async fn run_predictions(
    backend: &dyn CompletionBackend,
    records: &[ReviewRecord],
    max_per_call: usize,
    relaxed_json: bool,
) -> PredictionRun {
    let mut run = PredictionRun::default();

    for (idx, batch) in batches(records, max_per_call).into_iter().enumerate() {
        let number = idx + 1;
        let first_id = batch.first().map(|r| r.id).unwrap_or_default();
        let last_id = batch.last().map(|r| r.id).unwrap_or_default();
        let prompt = build_prompt(batch);
        debug!(batch = number, reviews = batch.len(), bytes = prompt.len(), "sending batch");

        let failure = |reason: String| BatchFailure {
            batch: number,
            first_id,
            last_id,
            reason,
        };

        let answer = match backend.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(batch = number, %e, "completion call failed");
                run.failures.push(failure(e.to_string()));
                continue;
            }
        };

        match parse_predictions(&answer, relaxed_json) {
            Ok(map) => {
                info!(batch = number, predictions = map.len(), "batch answered");
                for (id, value) in map {
                    run.predictions.entry(id).or_insert(value);
                }
            }
            Err(e) => {
                warn!(batch = number, %e, "error parsing completion answer");
                run.failures.push(failure(e.to_string()));
            }
        }
    }

    run
}
