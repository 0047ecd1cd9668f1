use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::common::response::ApiError;

/// Errors surfaced synchronously to the HTTP caller. Validation failures are
/// the client's fault; storage/database/queue failures during intake are
/// distinct kinds of submission failure.
#[derive(Debug, thiserror::Error)]
pub enum AudioTaskError {
    #[error("invalid upload: {0}")]
    Validation(String),
    #[error("failed to store audio file: {0}")]
    Storage(String),
    #[error("failed to persist task: {0}")]
    Database(String),
    #[error("failed to enqueue task: {0}")]
    Queue(String),
    #[error("Task not found.")]
    NotFound,
}

impl AudioTaskError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AudioTaskError::Validation(_) => StatusCode::BAD_REQUEST,
            AudioTaskError::NotFound => StatusCode::NOT_FOUND,
            AudioTaskError::Storage(_)
            | AudioTaskError::Database(_)
            | AudioTaskError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AudioTaskError {
    fn into_response(self) -> Response {
        ApiError(self.to_string(), self.status_code()).into_response()
    }
}

/// Errors hit while working a queued job. Never surfaced to a caller; they
/// are written into the task row as the FAILURE description.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("failed to fetch audio from storage: {0}")]
    BlobFetch(String),
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("failed to record outcome: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(
            AudioTaskError::Validation("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_task_maps_to_not_found() {
        assert_eq!(
            AudioTaskError::NotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn submission_failures_map_to_internal_error() {
        for err in [
            AudioTaskError::Storage("s3 down".into()),
            AudioTaskError::Database("pg down".into()),
            AudioTaskError::Queue("amqp down".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
