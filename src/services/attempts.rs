// src/services/attempts.rs

//! Test attempt lifecycle: start, complete, and owner-scoped reads.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::test_attempt::{AttemptOutcome, TestAttempt, TestResultsResponse},
    services::scoring::score_attempt,
    store::Store,
};

/// Opens a new in-progress attempt for `student_id` on an active course.
///
/// Every call creates a fresh attempt; an unfinished attempt on the same
/// course is left as is.
pub async fn start_attempt(
    store: &dyn Store,
    student_id: Uuid,
    course_id: Uuid,
) -> Result<TestAttempt, AppError> {
    let course = store
        .find_course(course_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let attempt = store.create_attempt(student_id, course.id).await?;

    tracing::info!(
        attempt_id = %attempt.id,
        student_id = %student_id,
        course_id = %course.id,
        "Test attempt started"
    );

    Ok(attempt)
}

/// Loads an attempt and checks that `requester` owns it.
pub async fn owned_attempt(
    store: &dyn Store,
    attempt_id: Uuid,
    requester: Uuid,
) -> Result<TestAttempt, AppError> {
    let attempt = store
        .find_attempt(attempt_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test attempt not found".to_string()))?;

    if attempt.student_id != requester {
        return Err(AppError::Forbidden(
            "Test attempt belongs to another student".to_string(),
        ));
    }

    Ok(attempt)
}

/// Grades and closes an attempt.
///
/// The score is recomputed from persisted answers against the course's
/// question set as it is now. Completing an already completed attempt
/// grades it again and overwrites the stored result.
pub async fn complete_attempt(
    store: &dyn Store,
    attempt_id: Uuid,
    requester: Uuid,
    time_spent: i32,
) -> Result<TestAttempt, AppError> {
    let attempt = owned_attempt(store, attempt_id, requester).await?;

    if attempt.is_completed {
        tracing::debug!(attempt_id = %attempt.id, "Re-grading completed attempt");
    }

    let snapshot = store.scoring_snapshot(attempt.id, attempt.course_id).await?;
    let summary = score_attempt(&snapshot.question_ids, &snapshot.answers);

    let outcome = AttemptOutcome {
        score: summary.score,
        correct_answers: summary.correct_answers,
        total_questions: summary.total_questions,
        time_spent,
        completed_at: Utc::now(),
    };

    let attempt = store
        .finalize_attempt(attempt.id, outcome)
        .await?
        .ok_or_else(|| AppError::NotFound("Test attempt not found".to_string()))?;

    tracing::info!(
        attempt_id = %attempt.id,
        student_id = %requester,
        score = summary.score,
        correct = summary.correct_answers,
        total = summary.total_questions,
        "Test attempt completed"
    );

    Ok(attempt)
}

/// Attempt plus reviewed answers, for the owner only.
pub async fn attempt_results(
    store: &dyn Store,
    attempt_id: Uuid,
    requester: Uuid,
) -> Result<TestResultsResponse, AppError> {
    let test_attempt = owned_attempt(store, attempt_id, requester).await?;
    let answers = store.reviewed_answers(test_attempt.id).await?;

    Ok(TestResultsResponse {
        test_attempt,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            course::{CreateCourseRequest, UpdateCourseRequest},
            question::AnswerOption,
            test_answer::NewAnswer,
        },
        services::test_support::{seed_course, seed_student},
        store::MemoryStore,
    };

    #[tokio::test]
    async fn test_start_creates_in_progress_attempt() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S100").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;

        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();
        assert!(!attempt.is_completed);
        assert_eq!(attempt.score, None);
        assert_eq!(attempt.total_questions, None);
        assert_eq!(attempt.correct_answers, None);
        assert_eq!(attempt.completed_at, None);
    }

    #[tokio::test]
    async fn test_start_twice_creates_two_attempts() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S101").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;

        let first = start_attempt(&store, student.id, course.id).await.unwrap();
        let second = start_attempt(&store, student.id, course.id).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_or_inactive_course() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S102").await;

        let missing = start_attempt(&store, student.id, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let course = store
            .create_course(CreateCourseRequest {
                name: "Retired".to_string(),
                description: None,
                duration_minutes: 10,
                is_active: Some(true),
            })
            .await
            .unwrap();
        store
            .update_course(
                course.id,
                UpdateCourseRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let inactive = start_attempt(&store, student.id, course.id).await;
        assert!(matches!(inactive, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_complete_scores_against_live_question_set() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S103").await;
        let (course, questions) =
            seed_course(&store, "Math", &[AnswerOption::A, AnswerOption::B]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        for q in &questions {
            store
                .upsert_answer(NewAnswer {
                    test_attempt_id: attempt.id,
                    question_id: q.id,
                    selected_answer: q.correct_answer,
                    is_correct: true,
                    time_spent: 5,
                })
                .await
                .unwrap();
        }
        store.delete_question(questions[1].id).await.unwrap();

        let done = complete_attempt(&store, attempt.id, student.id, 90)
            .await
            .unwrap();
        assert!(done.is_completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.total_questions, Some(1));
        assert_eq!(done.correct_answers, Some(1));
        assert_eq!(done.score, Some(100.0));
        assert_eq!(done.time_spent, Some(90));
    }

    #[tokio::test]
    async fn test_complete_unknown_attempt_is_not_found() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S104").await;
        let result = complete_attempt(&store, Uuid::new_v4(), student.id, 0).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_complete_by_other_student_is_forbidden_and_leaves_attempt() {
        let store = MemoryStore::new();
        let owner = seed_student(&store, "S105").await;
        let intruder = seed_student(&store, "S106").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, owner.id, course.id).await.unwrap();

        let result = complete_attempt(&store, attempt.id, intruder.id, 10).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let unchanged = store.find_attempt(attempt.id).await.unwrap().unwrap();
        assert!(!unchanged.is_completed);
        assert_eq!(unchanged.score, None);
    }

    #[tokio::test]
    async fn test_complete_twice_regrades() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S107").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        let first = complete_attempt(&store, attempt.id, student.id, 10)
            .await
            .unwrap();
        let second = complete_attempt(&store, attempt.id, student.id, 20)
            .await
            .unwrap();
        assert_eq!(first.score, second.score);
        assert_eq!(second.time_spent, Some(20));
    }

    #[tokio::test]
    async fn test_results_are_owner_only() {
        let store = MemoryStore::new();
        let owner = seed_student(&store, "S108").await;
        let other = seed_student(&store, "S109").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, owner.id, course.id).await.unwrap();

        assert!(attempt_results(&store, attempt.id, owner.id).await.is_ok());
        assert!(matches!(
            attempt_results(&store, attempt.id, other.id).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
