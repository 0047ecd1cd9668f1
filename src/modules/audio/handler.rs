use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::dto::{AudioProcessResponse, AudioTaskResultResponse};
use super::service::AudioTaskService;
use crate::common::response::{ApiError, ErrorResponse};
use crate::state::AppState;

/// Accept an audio file, store it, create a task and hand it to the worker
/// pool. The caller gets the task id back immediately and polls for the
/// outcome.
#[utoipa::path(
    post,
    path = "/api/v1/audiofiles/process",
    responses(
        (status = 202, description = "Task accepted for processing", body = AudioProcessResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 500, description = "Submission failed", body = ErrorResponse)
    ),
    tag = "Audio"
)]
pub async fn process_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let name = field.name().unwrap_or("").to_string();

        if name == "audio_file" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let data = match field.bytes().await {
                Ok(data) => data,
                Err(e) => {
                    return ApiError(
                        format!("Failed to read upload: {}", e),
                        StatusCode::BAD_REQUEST,
                    )
                    .into_response();
                }
            };

            info!(
                "Received upload '{}' ({} bytes)",
                file_name.as_deref().unwrap_or("<unnamed>"),
                data.len()
            );

            return match AudioTaskService::submit(state, file_name, content_type, data).await
            {
                Ok(res) => (StatusCode::ACCEPTED, Json(res)).into_response(),
                Err(e) => e.into_response(),
            };
        }
    }

    ApiError(
        "No audio_file field found in multipart request".to_string(),
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

/// Status and result of a processing task by its ID.
#[utoipa::path(
    get,
    path = "/api/v1/audiofiles/results/{task_id}",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task state", body = AudioTaskResultResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Audio"
)]
pub async fn get_task_result(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> impl IntoResponse {
    match AudioTaskService::get_result(state, task_id).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}
