// src/handlers/test.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        test_answer::{SubmitAnswerRequest, TestAnswer},
        test_attempt::{
            AttemptHistoryEntry, CompleteTestRequest, StartTestRequest, TestAttempt,
            TestResultsResponse,
        },
    },
    services::{
        answers::{AnswerSubmission, record_answer},
        attempts::{attempt_results, complete_attempt, start_attempt},
    },
    store::Store,
    utils::{
        extract::{PathParam, ValidatedJson},
        jwt::Principal,
    },
};

/// Opens a new attempt on an active course.
#[utoipa::path(
    post,
    path = "/api/student/test/start",
    tag = "test",
    request_body = StartTestRequest,
    responses(
        (status = 200, description = "Attempt started", body = TestAttempt),
        (status = 404, description = "Course not found or inactive")
    ),
    security(("bearer" = []))
)]
pub async fn start_test(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<StartTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = start_attempt(store.as_ref(), principal.id, payload.course_id).await?;
    Ok(Json(attempt))
}

/// Records (or replaces) the answer to one question of an open attempt.
///
/// Correctness is decided here from the stored key; a client-supplied
/// `isCorrect` field is never read.
#[utoipa::path(
    post,
    path = "/api/student/test/answer",
    tag = "test",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = TestAnswer),
        (status = 400, description = "Attempt already completed"),
        (status = 403, description = "Attempt or question belongs elsewhere"),
        (status = 404, description = "Attempt or question not found")
    ),
    security(("bearer" = []))
)]
pub async fn submit_answer(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let submission = AnswerSubmission {
        attempt_id: payload.test_attempt_id,
        question_id: payload.question_id,
        selected_answer: payload.selected_answer,
        time_spent: payload.time_spent.unwrap_or(0),
    };

    let answer = record_answer(store.as_ref(), submission, principal.id).await?;
    Ok(Json(answer))
}

/// Scores the attempt and marks it completed.
#[utoipa::path(
    post,
    path = "/api/student/test/complete",
    tag = "test",
    request_body = CompleteTestRequest,
    responses(
        (status = 200, description = "Attempt scored", body = TestAttempt),
        (status = 403, description = "Not your attempt"),
        (status = 404, description = "Attempt not found")
    ),
    security(("bearer" = []))
)]
pub async fn complete_test(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<CompleteTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = complete_attempt(
        store.as_ref(),
        payload.test_attempt_id,
        principal.id,
        payload.time_spent,
    )
    .await?;

    Ok(Json(attempt))
}

/// Completed attempts of the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/student/test/history",
    tag = "test",
    responses((status = 200, description = "Completed attempts", body = Vec<AttemptHistoryEntry>)),
    security(("bearer" = []))
)]
pub async fn test_history(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let history = store.completed_attempts(principal.id).await?;
    Ok(Json(history))
}

/// Attempt plus every recorded answer with the question text and key.
#[utoipa::path(
    get,
    path = "/api/student/test/results/{id}",
    tag = "test",
    params(("id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Attempt review", body = TestResultsResponse),
        (status = 403, description = "Not your attempt"),
        (status = 404, description = "Attempt not found")
    ),
    security(("bearer" = []))
)]
pub async fn test_results(
    State(store): State<Arc<dyn Store>>,
    Extension(principal): Extension<Principal>,
    PathParam(id): PathParam<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = attempt_results(store.as_ref(), id, principal.id).await?;
    Ok(Json(results))
}
