// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Represents the 'courses' table in the database.
/// Courses are never deleted, only deactivated.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,

    pub name: String,

    /// HTML fragment, sanitized on write. Plain text comes back
    /// entity-escaped (`Q&A` is stored as `Q&amp;A`); render it as HTML.
    pub description: Option<String>,

    /// Time allowed for one attempt, enforced by the client-side countdown.
    pub duration_minutes: i32,

    /// `false` once an administrator has removed the course.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// HTML; unsafe markup is stripped before storing.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: i32,
    pub is_active: Option<bool>,
}

/// DTO for updating a course. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.duration_minutes.is_none()
            && self.is_active.is_none()
    }
}
