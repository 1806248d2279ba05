// src/models/test_attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::test_answer::ReviewedAnswer;

/// Represents the 'test_attempts' table in the database.
///
/// Created in progress (`is_completed = false`, result fields unset) and
/// moved to completed by the scoring step.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestAttempt {
    pub id: Uuid,

    /// Owning student (`students.id`).
    pub student_id: Uuid,

    pub course_id: Uuid,

    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Percentage, two decimal places.
    pub score: Option<f64>,
    pub total_questions: Option<i32>,
    pub correct_answers: Option<i32>,

    /// Seconds reported by the client when the attempt was completed.
    pub time_spent: Option<i32>,

    pub is_completed: bool,
}

/// History row: a completed attempt joined with its course name.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptHistoryEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attempt: TestAttempt,
    pub course_name: String,
}

/// DTO for starting a test.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRequest {
    pub course_id: Uuid,
}

/// DTO for finishing a test.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTestRequest {
    pub test_attempt_id: Uuid,
    #[validate(range(min = 0, message = "timeSpent cannot be negative"))]
    pub time_spent: i32,
}

/// Review payload for a single attempt.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsResponse {
    pub test_attempt: TestAttempt,
    pub answers: Vec<ReviewedAnswer>,
}

/// Result fields written when an attempt is completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptOutcome {
    pub score: f64,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub time_spent: i32,
    pub completed_at: DateTime<Utc>,
}
