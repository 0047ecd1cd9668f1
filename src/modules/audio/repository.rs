use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{AudioTask, TaskStatus};

const TASK_COLUMNS: &str =
    "id, status, audio_file_key, result, error_message, created_at, updated_at";

#[derive(FromRow)]
struct AudioTaskRow {
    id: Uuid,
    status: String,
    audio_file_key: String,
    result: Option<serde_json::Value>,
    error_message: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<AudioTaskRow> for AudioTask {
    type Error = sqlx::Error;

    fn try_from(row: AudioTaskRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(AudioTask {
            id: row.id,
            status,
            audio_file_key: row.audio_file_key,
            result: row.result,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct AudioTaskRepository;

impl AudioTaskRepository {
    pub async fn create(pool: &PgPool, id: Uuid, audio_file_key: &str) -> Result<AudioTask, sqlx::Error> {
        let row = sqlx::query_as::<_, AudioTaskRow>(&format!(
            r#"
            INSERT INTO audio_tasks (id, status, audio_file_key)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(TaskStatus::Pending.as_str())
        .bind(audio_file_key)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AudioTask>, sqlx::Error> {
        let row = sqlx::query_as::<_, AudioTaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM audio_tasks
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(AudioTask::try_from).transpose()
    }

    /// Unconditional single-row terminal write: redelivered jobs simply
    /// overwrite the previous outcome (last writer wins).
    pub async fn mark_success(
        pool: &PgPool,
        id: Uuid,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE audio_tasks
            SET status = $2, result = $3, error_message = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(TaskStatus::Success.as_str())
        .bind(result)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn mark_failure(pool: &PgPool, id: Uuid, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE audio_tasks
            SET status = $2, result = NULL, error_message = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(TaskStatus::Failure.as_str())
        .bind(error)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Submission compensation only: a row whose enqueue step failed must not
    /// stay visible to pollers.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM audio_tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
