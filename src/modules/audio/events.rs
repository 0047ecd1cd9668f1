use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AUDIO_QUEUE: &str = "audio_processing";

/// Message published at submission time and consumed by the worker pool.
/// Delivered at-least-once; processing must tolerate redelivery.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessAudioJob {
    pub job_id: Uuid,
    pub blob_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_message_round_trips_through_json() {
        let job = ProcessAudioJob {
            job_id: Uuid::new_v4(),
            blob_key: "audio/abc.mp3".to_string(),
        };

        let bytes = serde_json::to_vec(&job).unwrap();
        let decoded: ProcessAudioJob = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded.job_id, job.job_id);
        assert_eq!(decoded.blob_key, job.blob_key);
    }

    #[test]
    fn job_message_uses_the_wire_field_names() {
        let job = ProcessAudioJob {
            job_id: Uuid::nil(),
            blob_key: "audio/x.wav".to_string(),
        };

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "job_id": "00000000-0000-0000-0000-000000000000",
                "blob_key": "audio/x.wav"
            })
        );
    }
}
