use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{AudioTask, TaskStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct AudioProcessResponse {
    pub task_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AudioTaskResultResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    pub updated_at: OffsetDateTime,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl From<AudioTask> for AudioTaskResultResponse {
    fn from(task: AudioTask) -> Self {
        // Result and error are surfaced only in their own terminal state.
        let result = match task.status {
            TaskStatus::Success => task.result,
            _ => None,
        };
        let error = match task.status {
            TaskStatus::Failure => task.error_message,
            _ => None,
        };

        Self {
            task_id: task.id,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
            result,
            error,
        }
    }
}
