// src/handlers/admin.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::report::{AdminStats, RecentActivity, StudentResult},
    store::Store,
};

const RECENT_ACTIVITY_LIMIT: i64 = 10;

fn start_of_today() -> DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

/// Dashboard counters.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    responses((status = 200, description = "Counters", body = AdminStats)),
    security(("bearer" = []))
)]
pub async fn get_stats(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let stats = store.admin_stats(start_of_today()).await?;
    Ok(Json(stats))
}

/// Best score per student and course.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/student-results",
    tag = "admin",
    responses((status = 200, description = "Per-course results", body = Vec<StudentResult>)),
    security(("bearer" = []))
)]
pub async fn get_student_results(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let results = store.student_results().await?;
    Ok(Json(results))
}

/// Latest completed attempts across all students.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/recent-activity",
    tag = "admin",
    responses((status = 200, description = "Recent completions", body = Vec<RecentActivity>)),
    security(("bearer" = []))
)]
pub async fn get_recent_activity(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let activity = store.recent_activity(RECENT_ACTIVITY_LIMIT).await?;
    Ok(Json(activity))
}
