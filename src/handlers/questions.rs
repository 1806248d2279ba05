// src/handlers/questions.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::question::{
        CreateQuestionRequest, PublicQuestion, Question, QuestionWithCourse, UpdateQuestionRequest,
    },
    store::Store,
    utils::extract::{PathParam, ValidatedJson},
};

async fn ensure_course_exists(store: &dyn Store, course_id: Uuid) -> Result<(), AppError> {
    store
        .find_course(course_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

/// Questions of a course as shown to a student: no correct answers.
#[utoipa::path(
    get,
    path = "/api/questions/{course_id}",
    tag = "questions",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Questions without answers", body = Vec<PublicQuestion>),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_questions_for_student(
    State(store): State<Arc<dyn Store>>,
    PathParam(course_id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure_course_exists(store.as_ref(), course_id).await?;

    let questions: Vec<PublicQuestion> = store
        .list_questions_by_course(course_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(questions))
}

/// Lists every question with its course name.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/questions",
    tag = "admin",
    responses((status = 200, description = "All questions", body = Vec<QuestionWithCourse>)),
    security(("bearer" = []))
)]
pub async fn list_all_questions(
    State(store): State<Arc<dyn Store>>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions_with_course().await?;
    Ok(Json(questions))
}

/// Full questions of one course, including correct answers.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/courses/{id}/questions",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Questions with answers", body = Vec<Question>),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_course_questions(
    State(store): State<Arc<dyn Store>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure_course_exists(store.as_ref(), id).await?;
    let questions = store.list_questions_by_course(id).await?;
    Ok(Json(questions))
}

/// Creates a new question in an existing course.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/questions",
    tag = "admin",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_question(
    State(store): State<Arc<dyn Store>>,
    ValidatedJson(payload): ValidatedJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_course_exists(store.as_ref(), payload.course_id).await?;

    let question = store.create_question(payload).await?;
    tracing::info!(question_id = %question.id, course_id = %question.course_id, "Question created");

    Ok((StatusCode::CREATED, Json(question)))
}

/// Updates a question by ID. Fields are optional.
/// Admin only.
#[utoipa::path(
    put,
    path = "/api/admin/questions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Question id")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Updated question", body = Question),
        (status = 404, description = "Question or target course not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_question(
    State(store): State<Arc<dyn Store>>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(course_id) = payload.course_id {
        ensure_course_exists(store.as_ref(), course_id).await?;
    }

    let question = if payload.is_empty() {
        store.find_question(id).await?
    } else {
        store.update_question(id, payload).await?
    };

    let question = question.ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(question))
}

/// Deletes a question by ID.
/// Admin only.
#[utoipa::path(
    delete,
    path = "/api/admin/questions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_question(
    State(store): State<Arc<dyn Store>>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!(question_id = %id, "Question deleted");
    Ok(StatusCode::NO_CONTENT)
}
