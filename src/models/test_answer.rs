// src/models/test_answer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::AnswerOption;

/// Represents the 'test_answers' table in the database.
/// At most one row exists per (attempt, question); resubmissions overwrite it.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestAnswer {
    pub id: Uuid,
    pub test_attempt_id: Uuid,
    pub question_id: Uuid,

    #[sqlx(try_from = "String")]
    pub selected_answer: AnswerOption,

    /// Computed on the server from the question's correct answer.
    pub is_correct: bool,

    /// Seconds the student spent on the question.
    pub time_spent: i32,

    /// Time of the latest submission for this question.
    pub submitted_at: DateTime<Utc>,
}

/// Review row: an answer joined with its question text and correct answer.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedAnswer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub answer: TestAnswer,
    pub question_text: String,
    #[sqlx(try_from = "String")]
    pub correct_answer: AnswerOption,
}

/// DTO for submitting one answer.
/// Any correctness flag sent by the client is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub test_attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: AnswerOption,
    #[validate(range(min = 0, message = "timeSpent cannot be negative"))]
    pub time_spent: Option<i32>,
}

/// Fields written by the answer recorder.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub test_attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: AnswerOption,
    pub is_correct: bool,
    pub time_spent: i32,
}
