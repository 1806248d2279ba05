// src/handlers/courses.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::course::{Course, CreateCourseRequest, UpdateCourseRequest},
    store::Store,
    utils::{
        extract::{PathParam, ValidatedJson},
        sanitize::clean_optional_html,
    },
};

/// Lists courses open for testing.
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    responses((status = 200, description = "Active courses", body = Vec<Course>))
)]
pub async fn list_courses(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let courses = store.list_active_courses().await?;
    Ok(Json(courses))
}

/// Creates a course.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/courses",
    tag = "admin",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid input")
    ),
    security(("bearer" = []))
)]
pub async fn create_course(
    State(store): State<Arc<dyn Store>>,
    ValidatedJson(mut payload): ValidatedJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.description = clean_optional_html(payload.description);

    let course = store.create_course(payload).await?;
    tracing::info!(course_id = %course.id, name = %course.name, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Updates a course. Fields are optional.
/// Admin only.
#[utoipa::path(
    put,
    path = "/api/admin/courses/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = Course),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_course(
    State(store): State<Arc<dyn Store>>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(mut payload): ValidatedJson<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.description = clean_optional_html(payload.description);

    let course = if payload.is_empty() {
        store.find_course(id).await?
    } else {
        store.update_course(id, payload).await?
    };

    let course = course.ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course))
}

/// Removes a course from the catalog.
/// The row is kept (deactivated) so past attempts stay readable.
/// Admin only.
#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deactivated"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_course(
    State(store): State<Arc<dyn Store>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !store.deactivate_course(id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    tracing::info!(course_id = %id, "Course deactivated");
    Ok(StatusCode::NO_CONTENT)
}
