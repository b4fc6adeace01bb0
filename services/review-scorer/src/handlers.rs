//! HTTP surface: the upload endpoint, the page and its static assets.

use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::error::ErrorInternalServerError;
use actix_web::{web, Error, HttpResponse, Responder};
use futures_util::StreamExt as _;
use shared::config::Settings;
use shared::dto::{MessageResponse, UploadResponse};
use shared::openai_client::CompletionBackend;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{loader, pipeline, scoring};

pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, settings: Settings) -> Self {
        Self { backend, settings }
    }
}

pub async fn health() -> impl Responder {
    "OK"
}

pub async fn index(data: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    let path = Path::new(&data.settings.template_dir).join("index.html");
    Ok(NamedFile::open(path)?)
}

/// Longest `threshold` value accepted; anything longer cannot be a valid number in [0, 1].
const MAX_THRESHOLD_BYTES: usize = 32;

fn too_large(upload_id: Uuid, size: usize) -> HttpResponse {
    warn!(%upload_id, size, "upload exceeds size limit");
    HttpResponse::PayloadTooLarge().json(MessageResponse::new("Uploaded file is too large"))
}

fn bad_threshold() -> HttpResponse {
    HttpResponse::BadRequest().json(MessageResponse::new(
        "Threshold must be a number between 0 and 1",
    ))
}

/// Accept a CSV (`file`) plus an optional `threshold`, run the predictions
/// and answer with rows, raw predictions and, given a threshold, the report.
pub async fn upload(mut payload: Multipart, data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let upload_id = Uuid::new_v4();
    let limit = data.settings.max_upload_bytes;
    let mut received = 0usize;
    let mut stored: Option<NamedTempFile> = None;
    let mut threshold_raw: Option<String> = None;

    while let Some(field_res) = payload.next().await {
        let mut field = field_res?;
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);
        match (name.as_str(), filename) {
            ("file", Some(filename)) => {
                let tmp = NamedTempFile::new().map_err(ErrorInternalServerError)?;
                let mut out = OpenOptions::new()
                    .write(true)
                    .open(tmp.path())
                    .await
                    .map_err(ErrorInternalServerError)?;
                let mut size = 0usize;
                while let Some(chunk) = field.next().await {
                    let data_chunk = chunk?;
                    size += data_chunk.len();
                    received += data_chunk.len();
                    if received > limit {
                        return Ok(too_large(upload_id, received));
                    }
                    out.write_all(&data_chunk)
                        .await
                        .map_err(ErrorInternalServerError)?;
                }
                out.flush().await.map_err(ErrorInternalServerError)?;
                info!(%upload_id, file = %filename, bytes = size, "stored upload");
                stored = Some(tmp);
            }
            ("threshold", _) => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    raw.extend_from_slice(&chunk?);
                    if raw.len() > MAX_THRESHOLD_BYTES {
                        warn!(%upload_id, "threshold field too long");
                        return Ok(bad_threshold());
                    }
                }
                threshold_raw = Some(String::from_utf8_lossy(&raw).into_owned());
            }
            (other, _) => {
                if other == "file" {
                    warn!(%upload_id, "file part without filename ignored");
                }
                while let Some(chunk) = field.next().await {
                    received += chunk?.len();
                    if received > limit {
                        return Ok(too_large(upload_id, received));
                    }
                }
            }
        }
    }

    let Some(file) = stored else {
        return Ok(HttpResponse::BadRequest().json(MessageResponse::new("No file uploaded")));
    };

    let threshold = match threshold_raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match scoring::parse_threshold(raw) {
            Some(t) => Some(t),
            None => return Ok(bad_threshold()),
        },
    };

    let records = match web::block(move || loader::load_upload(file)).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => {
            error!(%upload_id, %e, "Error processing CSV");
            return Ok(HttpResponse::InternalServerError()
                .json(MessageResponse::new("Error processing CSV file")));
        }
        Err(e) => {
            error!(%upload_id, %e, "csv loading task failed");
            return Ok(HttpResponse::InternalServerError()
                .json(MessageResponse::new("Error processing CSV file")));
        }
    };

    let settings = &data.settings;
    let run = pipeline::run_predictions(
        data.backend.as_ref(),
        &records,
        settings.max_reviews_per_call,
        settings.relaxed_json,
    )
    .await;

    let report = threshold.map(|t| scoring::score(&records, &run.predictions, t));
    if let Some(report) = &report {
        info!(
            %upload_id,
            rows = report.total,
            threshold = report.threshold,
            food = %scoring::format_percentage(report.precision.food),
            delivery = %scoring::format_percentage(report.precision.delivery),
            acceptance = %scoring::format_percentage(report.precision.acceptance),
            "upload scored"
        );
    }
    info!(
        %upload_id,
        rows = records.len(),
        predictions = run.predictions.len(),
        failed_batches = run.failures.len(),
        "upload complete"
    );

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Upload complete".into(),
        csv_data: records,
        api_data: run.predictions,
        failed_batches: run.failures,
        report,
    }))
}

/// Register routes; the static directory is served last so it never shadows them.
pub fn configure(cfg: &mut web::ServiceConfig, settings: &Settings) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/upload", web::post().to(upload))
        .service(Files::new("/", &settings.static_dir));
}
