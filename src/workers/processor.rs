use futures_util::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use tracing::{error, info};

use crate::modules::audio::error::ProcessingError;
use crate::modules::audio::events::{ProcessAudioJob, AUDIO_QUEUE};
use crate::modules::audio::repository::AudioTaskRepository;
use crate::state::AppState;

/// Consume the audio queue for the lifetime of the process. Each delivery is
/// worked in its own task; the channel prefetch bounds how many run at once.
pub async fn start_audio_worker(state: AppState) -> anyhow::Result<()> {
    info!("Starting audio processing worker...");

    let channel = state
        .queue
        .consumer_channel(state.config.worker_prefetch)
        .await?;

    channel
        .queue_declare(
            AUDIO_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await?;

    let mut consumer = channel
        .basic_consume(
            AUDIO_QUEUE,
            "audio_worker",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!("Audio worker listening on '{}'", AUDIO_QUEUE);

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!("Failed to receive delivery: {}", e);
                continue;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            match serde_json::from_slice::<ProcessAudioJob>(&delivery.data) {
                Ok(job) => {
                    info!("[worker] received task {} ({})", job.job_id, job.blob_key);
                    match process_job(&state, &job).await {
                        Ok(_) => info!("[worker] task {} completed", job.job_id),
                        Err(e) => error!("[worker] task {} failed: {}", job.job_id, e),
                    }
                }
                Err(e) => error!("Failed to parse job message: {}", e),
            }

            // Ack either way: the outcome lives in the task row, and
            // redelivery only needs to cover worker crashes.
            if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                error!("Failed to ack message: {}", e);
            }
        });
    }

    Ok(())
}

async fn process_job(state: &AppState, job: &ProcessAudioJob) -> Result<(), ProcessingError> {
    let audio = match state.storage.get_object(&job.blob_key).await {
        Ok(audio) => audio,
        Err(e) => {
            let err = ProcessingError::BlobFetch(e.to_string());
            record_failure(state, job, &err).await;
            return Err(err);
        }
    };

    info!(
        "[worker] downloaded {} ({} bytes)",
        job.blob_key,
        audio.len()
    );

    let mime_type = mime_for_key(&job.blob_key);
    match state.genai.transcribe_and_comment(&audio, mime_type).await {
        Ok(outcome) => {
            let result = serde_json::to_value(&outcome)
                .map_err(|e| ProcessingError::Database(e.to_string()))?;

            AudioTaskRepository::mark_success(&state.db, job.job_id, &result)
                .await
                .map_err(|e| ProcessingError::Database(e.to_string()))?;

            Ok(())
        }
        Err(e) => {
            let err = ProcessingError::Transcription(e.to_string());
            record_failure(state, job, &err).await;
            Err(err)
        }
    }
}

async fn record_failure(state: &AppState, job: &ProcessAudioJob, err: &ProcessingError) {
    if let Err(db_err) =
        AudioTaskRepository::mark_failure(&state.db, job.job_id, &err.to_string()).await
    {
        error!(
            "[worker] could not record failure for task {}: {}",
            job.job_id, db_err
        );
    }
}

/// The blob key ends in the upload's extension; map it back to a MIME type
/// for the model request.
fn mime_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp3") | Some("mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("webm") => "audio/webm",
        _ => "audio/mpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_their_mime_type() {
        assert_eq!(mime_for_key("audio/abc.mp3"), "audio/mpeg");
        assert_eq!(mime_for_key("audio/abc.wav"), "audio/wav");
        assert_eq!(mime_for_key("audio/abc.m4a"), "audio/mp4");
        assert_eq!(mime_for_key("audio/abc.flac"), "audio/flac");
    }

    #[test]
    fn unknown_extension_falls_back_to_mpeg() {
        assert_eq!(mime_for_key("audio/abc.xyz"), "audio/mpeg");
        assert_eq!(mime_for_key("no-extension"), "audio/mpeg");
    }
}
