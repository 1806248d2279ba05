// src/services/answers.rs

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::AnswerOption,
        test_answer::{NewAnswer, TestAnswer},
    },
    services::attempts::owned_attempt,
    store::Store,
};

/// One answer submission, after request validation.
#[derive(Debug, Clone, Copy)]
pub struct AnswerSubmission {
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: AnswerOption,
    pub time_spent: i32,
}

/// Records a student's answer to one question of an attempt.
///
/// Checks run in a fixed order and the first failure wins: attempt exists,
/// attempt is the requester's, attempt is still open, question exists,
/// question belongs to the attempt's course. Nothing is written unless all
/// pass. Correctness is always computed here from the stored key.
pub async fn record_answer(
    store: &dyn Store,
    submission: AnswerSubmission,
    requester: Uuid,
) -> Result<TestAnswer, AppError> {
    let attempt = owned_attempt(store, submission.attempt_id, requester).await?;

    if attempt.is_completed {
        return Err(AppError::InvalidState(
            "Cannot submit answers to a completed test".to_string(),
        ));
    }

    let question = store
        .find_question(submission.question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.course_id != attempt.course_id {
        return Err(AppError::Forbidden(
            "Question does not belong to this test's course".to_string(),
        ));
    }

    let is_correct = submission.selected_answer == question.correct_answer;

    let answer = store
        .upsert_answer(NewAnswer {
            test_attempt_id: attempt.id,
            question_id: question.id,
            selected_answer: submission.selected_answer,
            is_correct,
            time_spent: submission.time_spent,
        })
        .await?;

    tracing::debug!(
        attempt_id = %attempt.id,
        question_id = %question.id,
        is_correct,
        "Answer recorded"
    );

    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{
            attempts::{complete_attempt, start_attempt},
            test_support::{seed_course, seed_student},
        },
        store::MemoryStore,
    };

    fn submission(attempt_id: Uuid, question_id: Uuid, selected: AnswerOption) -> AnswerSubmission {
        AnswerSubmission {
            attempt_id,
            question_id,
            selected_answer: selected,
            time_spent: 3,
        }
    }

    #[tokio::test]
    async fn test_correctness_is_computed_from_key() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S200").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::C]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        let right = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::C),
            student.id,
        )
        .await
        .unwrap();
        assert!(right.is_correct);

        let wrong = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::A),
            student.id,
        )
        .await
        .unwrap();
        assert!(!wrong.is_correct);
    }

    #[tokio::test]
    async fn test_resubmission_replaces_previous_answer() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S201").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        let first = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::A),
            student.id,
        )
        .await
        .unwrap();
        let second = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::B),
            student.id,
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        let snapshot = store.scoring_snapshot(attempt.id, course.id).await.unwrap();
        assert_eq!(snapshot.answers.len(), 1);
        assert_eq!(snapshot.answers[0].selected_answer, AnswerOption::B);
        assert!(!snapshot.answers[0].is_correct);
    }

    #[tokio::test]
    async fn test_unknown_attempt_is_not_found() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S202").await;
        let (_, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;

        let result = record_answer(
            &store,
            submission(Uuid::new_v4(), questions[0].id, AnswerOption::A),
            student.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_other_students_attempt_is_forbidden() {
        let store = MemoryStore::new();
        let owner = seed_student(&store, "S203").await;
        let intruder = seed_student(&store, "S204").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, owner.id, course.id).await.unwrap();

        let result = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::A),
            intruder.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_completed_attempt_rejects_answers_without_writing() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S205").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();
        complete_attempt(&store, attempt.id, student.id, 30)
            .await
            .unwrap();

        let result = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::A),
            student.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));

        let snapshot = store.scoring_snapshot(attempt.id, course.id).await.unwrap();
        assert!(snapshot.answers.is_empty());
    }

    #[tokio::test]
    async fn test_store_refuses_write_after_completion_lands() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S210").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        // Completion sneaks in between the state check and the write.
        complete_attempt(&store, attempt.id, student.id, 30)
            .await
            .unwrap();
        let result = store
            .upsert_answer(NewAnswer {
                test_attempt_id: attempt.id,
                question_id: questions[0].id,
                selected_answer: AnswerOption::A,
                is_correct: true,
                time_spent: 3,
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));

        let snapshot = store.scoring_snapshot(attempt.id, course.id).await.unwrap();
        assert!(snapshot.answers.is_empty());
    }

    #[tokio::test]
    async fn test_ownership_is_checked_before_completion_state() {
        let store = MemoryStore::new();
        let owner = seed_student(&store, "S206").await;
        let intruder = seed_student(&store, "S207").await;
        let (course, questions) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, owner.id, course.id).await.unwrap();
        complete_attempt(&store, attempt.id, owner.id, 30)
            .await
            .unwrap();

        let result = record_answer(
            &store,
            submission(attempt.id, questions[0].id, AnswerOption::A),
            intruder.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_unknown_question_is_not_found() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S208").await;
        let (course, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let attempt = start_attempt(&store, student.id, course.id).await.unwrap();

        let result = record_answer(
            &store,
            submission(attempt.id, Uuid::new_v4(), AnswerOption::A),
            student.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_question_from_other_course_is_forbidden() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "S209").await;
        let (math, _) = seed_course(&store, "Math", &[AnswerOption::A]).await;
        let (_, physics_questions) = seed_course(&store, "Physics", &[AnswerOption::B]).await;
        let attempt = start_attempt(&store, student.id, math.id).await.unwrap();

        let result = record_answer(
            &store,
            submission(attempt.id, physics_questions[0].id, AnswerOption::B),
            student.id,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let snapshot = store.scoring_snapshot(attempt.id, math.id).await.unwrap();
        assert!(snapshot.answers.is_empty());
    }
}
