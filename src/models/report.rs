// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Dashboard counters for administrators.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_students: i64,
    pub total_questions: i64,
    /// Attempts completed since midnight UTC.
    pub tests_today: i64,
    /// Mean score over all completed attempts, 0 when there are none.
    pub average_score: f64,
}

/// Best result of one student in one course.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub student_id: String,
    pub student_name: String,
    pub email: String,
    pub course_name: String,
    pub score: f64,
    pub attempts: i64,
    pub last_test: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub student_name: String,
    pub course_name: String,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}
