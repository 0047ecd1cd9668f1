use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of one processing task. PENDING moves to exactly one of the
/// terminal states; terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "SUCCESS" => Ok(TaskStatus::Success),
            "FAILURE" => Ok(TaskStatus::Failure),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AudioTask {
    pub id: Uuid,
    pub status: TaskStatus,
    pub audio_file_key: String,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [TaskStatus::Pending, TaskStatus::Success, TaskStatus::Failure] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("STARTED".parse::<TaskStatus>().is_err());
        assert!("pending".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failure.is_terminal());
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_value(TaskStatus::Pending).unwrap(),
            serde_json::json!("PENDING")
        );
    }
}
