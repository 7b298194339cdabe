//! Manifest upload handler
//!
//! POST /dataset accepts a multipart form with a `file` field holding the
//! CSV manifest, runs the batch on a blocking thread and answers with the
//! HTML report.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::post,
    Router,
};

use crate::{
    error::{ApiError, ApiResult},
    services::run_http_batch,
    AppState,
};

/// Validated upload
struct ManifestUpload {
    filename: String,
    bytes: Vec<u8>,
}

/// Build manifest upload routes
pub fn dataset_routes() -> Router<AppState> {
    Router::new().route("/dataset", post(process_dataset))
}

/// POST /dataset
pub async fn process_dataset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Html<String>> {
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        "Manifest received"
    );

    // One batch at a time per process. The guard moves into the blocking
    // task so it is held until the batch ends, even if the client goes away.
    let batch_guard = state.batch_lock.clone().lock_owned().await;

    let config = state.downloader.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _batch_guard = batch_guard;
        run_http_batch(&config, &upload.bytes)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Batch task failed: {}", e)))
    .and_then(|result| result.map_err(ApiError::from));

    match outcome {
        Ok(report) => Ok(Html(report.render_html())),
        Err(e) => {
            tracing::error!(error = %e, "Batch aborted");
            *state.last_error.write().await = Some(e.to_string());
            Err(e)
        }
    }
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<ManifestUpload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        // A part without a filename is a plain form value, not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No selected file".to_string()));
        }
        if !filename.ends_with(".csv") {
            return Err(ApiError::BadRequest("File must be a CSV".to_string()));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ManifestUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::BadRequest("No file part".to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
