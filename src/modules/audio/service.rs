use bytes::Bytes;
use mime::Mime;
use tracing::{error, info};
use uuid::Uuid;

use super::dto::{AudioProcessResponse, AudioTaskResultResponse};
use super::error::AudioTaskError;
use super::events::{ProcessAudioJob, AUDIO_QUEUE};
use super::repository::AudioTaskRepository;
use crate::state::AppState;

pub struct AudioTaskService;

impl AudioTaskService {
    /// Intake: validate, store the blob, insert the PENDING row, publish the
    /// job. A failure after the blob/row landed rolls the earlier steps back
    /// so no half-submitted task is visible to pollers.
    pub async fn submit(
        state: AppState,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Result<AudioProcessResponse, AudioTaskError> {
        let mime = validate_upload(content_type.as_deref(), &data)?;

        let task_id = Uuid::new_v4();
        let blob_key = blob_key(task_id, file_name.as_deref(), &mime);

        state
            .storage
            .put_object(&blob_key, data, mime.as_ref())
            .await
            .map_err(|e| AudioTaskError::Storage(e.to_string()))?;

        let task = match AudioTaskRepository::create(&state.db, task_id, &blob_key).await {
            Ok(task) => task,
            Err(e) => {
                cleanup_blob(&state, &blob_key).await;
                return Err(AudioTaskError::Database(e.to_string()));
            }
        };

        let job = ProcessAudioJob {
            job_id: task.id,
            blob_key: blob_key.clone(),
        };
        let payload =
            serde_json::to_vec(&job).map_err(|e| AudioTaskError::Queue(e.to_string()))?;

        if let Err(e) = state.queue.publish(AUDIO_QUEUE, &payload).await {
            cleanup_record(&state, task.id).await;
            cleanup_blob(&state, &blob_key).await;
            return Err(AudioTaskError::Queue(e.to_string()));
        }

        info!("Task {} queued for processing", task.id);
        Ok(AudioProcessResponse { task_id: task.id })
    }

    pub async fn get_result(
        state: AppState,
        task_id: Uuid,
    ) -> Result<AudioTaskResultResponse, AudioTaskError> {
        let task = AudioTaskRepository::find_by_id(&state.db, task_id)
            .await
            .map_err(|e| AudioTaskError::Database(e.to_string()))?
            .ok_or(AudioTaskError::NotFound)?;

        Ok(task.into())
    }
}

fn validate_upload(content_type: Option<&str>, data: &[u8]) -> Result<Mime, AudioTaskError> {
    if data.is_empty() {
        return Err(AudioTaskError::Validation(
            "The uploaded file is empty".to_string(),
        ));
    }

    let raw = content_type.ok_or_else(|| {
        AudioTaskError::Validation("The file must be an audiofile".to_string())
    })?;

    let mime = raw.parse::<Mime>().map_err(|_| {
        AudioTaskError::Validation(format!("Unrecognized content type: {}", raw))
    })?;

    if mime.type_() != mime::AUDIO {
        return Err(AudioTaskError::Validation(
            "The file must be an audiofile".to_string(),
        ));
    }

    Ok(mime)
}

/// One object per task, addressed by a key derived from the task id. The
/// extension comes from the uploaded filename when it has one, otherwise from
/// the MIME subtype.
fn blob_key(task_id: Uuid, file_name: Option<&str>, mime: &Mime) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| mime.subtype().as_str().to_ascii_lowercase());

    format!("audio/{}.{}", task_id, extension)
}

async fn cleanup_blob(state: &AppState, blob_key: &str) {
    if let Err(e) = state.storage.delete_object(blob_key).await {
        error!("Failed to clean up blob '{}': {}", blob_key, e);
    }
}

async fn cleanup_record(state: &AppState, task_id: Uuid) {
    if let Err(e) = AudioTaskRepository::delete(&state.db, task_id).await {
        error!("Failed to clean up task record {}: {}", task_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_content_types_are_accepted() {
        for ct in ["audio/mpeg", "audio/wav", "audio/ogg", "audio/mp4"] {
            let mime = validate_upload(Some(ct), b"riff").unwrap();
            assert_eq!(mime.type_(), mime::AUDIO);
        }
    }

    #[test]
    fn non_audio_content_types_are_rejected() {
        for ct in ["text/plain", "video/mp4", "application/octet-stream", "image/png"] {
            assert!(matches!(
                validate_upload(Some(ct), b"data"),
                Err(AudioTaskError::Validation(_))
            ));
        }
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            validate_upload(Some("audio/mpeg"), b""),
            Err(AudioTaskError::Validation(_))
        ));
    }

    #[test]
    fn missing_content_type_is_rejected() {
        assert!(matches!(
            validate_upload(None, b"data"),
            Err(AudioTaskError::Validation(_))
        ));
    }

    #[test]
    fn garbled_content_type_is_rejected() {
        assert!(matches!(
            validate_upload(Some("not a mime"), b"data"),
            Err(AudioTaskError::Validation(_))
        ));
    }

    #[test]
    fn blob_key_prefers_the_filename_extension() {
        let id = Uuid::nil();
        let mime: Mime = "audio/mpeg".parse().unwrap();

        let key = blob_key(id, Some("Recording.MP3"), &mime);
        assert_eq!(key, format!("audio/{}.mp3", id));
    }

    #[test]
    fn blob_key_falls_back_to_the_mime_subtype() {
        let id = Uuid::nil();
        let mime: Mime = "audio/wav".parse().unwrap();

        assert_eq!(blob_key(id, None, &mime), format!("audio/{}.wav", id));
        assert_eq!(
            blob_key(id, Some("no-extension"), &mime),
            format!("audio/{}.wav", id)
        );
    }

    #[test]
    fn blob_key_ignores_suspicious_extensions() {
        let id = Uuid::nil();
        let mime: Mime = "audio/mpeg".parse().unwrap();

        // Path separators and other non-alphanumerics never reach the key.
        let key = blob_key(id, Some("evil.mp3/../../x"), &mime);
        assert_eq!(key, format!("audio/{}.mpeg", id));
    }
}
