// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ScoringSnapshot, Store, StoreResult};
use crate::{
    error::AppError,
    models::{
        course::{Course, CreateCourseRequest, UpdateCourseRequest},
        question::{CreateQuestionRequest, Question, QuestionWithCourse, UpdateQuestionRequest},
        report::{AdminStats, RecentActivity, StudentResult},
        test_answer::{NewAnswer, ReviewedAnswer, TestAnswer},
        test_attempt::{AttemptHistoryEntry, AttemptOutcome, TestAttempt},
        user::{Admin, NewAdmin, NewStudent, Student},
    },
};

const ADMIN_COLUMNS: &str = "id, admin_id, email, password_hash, first_name, last_name, created_at";

const STUDENT_COLUMNS: &str =
    "id, student_id, email, password_hash, first_name, last_name, created_at";

const COURSE_COLUMNS: &str =
    "id, name, description, duration_minutes, is_active, created_at, updated_at";

const QUESTION_COLUMNS: &str = "id, course_id, question_text, option_a, option_b, option_c, \
     option_d, correct_answer, difficulty, created_at, updated_at";

const ATTEMPT_COLUMNS: &str = "id, student_id, course_id, started_at, completed_at, score, \
     total_questions, correct_answers, time_spent, is_completed";

const ANSWER_COLUMNS: &str =
    "id, test_attempt_id, question_id, selected_answer, is_correct, time_spent, submitted_at";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_admin_by_admin_id(&self, admin_id: &str) -> StoreResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE admin_id = $1"
        ))
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        let admin =
            sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(admin)
    }

    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (admin_id, email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(admin.admin_id)
        .bind(admin.email)
        .bind(admin.password_hash)
        .bind(admin.first_name)
        .bind(admin.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn find_student_by_id(&self, id: Uuid) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn find_student_by_student_id(&self, student_id: &str) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = $1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn create_student(&self, student: NewStudent) -> StoreResult<Student> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (student_id, email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(student.student_id)
        .bind(student.email)
        .bind(student.password_hash)
        .bind(student.first_name)
        .bind(student.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    async fn list_active_courses(&self) -> StoreResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_active ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn create_course(&self, course: CreateCourseRequest) -> StoreResult<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (name, description, duration_minutes, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(course.name)
        .bind(course.description)
        .bind(course.duration_minutes)
        .bind(course.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn update_course(
        &self,
        id: Uuid,
        changes: UpdateCourseRequest,
    ) -> StoreResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                duration_minutes = COALESCE($3, duration_minutes),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.duration_minutes)
        .bind(changes.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn deactivate_course(&self, id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE courses SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn list_questions_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE course_id = $1 ORDER BY created_at, id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn list_questions_with_course(&self) -> StoreResult<Vec<QuestionWithCourse>> {
        let questions = sqlx::query_as::<_, QuestionWithCourse>(
            "SELECT q.id, q.course_id, q.question_text, q.option_a, q.option_b, q.option_c,
                    q.option_d, q.correct_answer, q.difficulty, q.created_at, q.updated_at,
                    c.name AS course_name
             FROM questions q
             JOIN courses c ON q.course_id = c.id
             ORDER BY c.name, q.created_at, q.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn create_question(&self, question: CreateQuestionRequest) -> StoreResult<Question> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "INSERT INTO questions
                (course_id, question_text, option_a, option_b, option_c, option_d,
                 correct_answer, difficulty)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(question.course_id)
        .bind(question.question_text)
        .bind(question.option_a)
        .bind(question.option_b)
        .bind(question.option_c)
        .bind(question.option_d)
        .bind(question.correct_answer.as_str())
        .bind(question.difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(question)
    }

    async fn update_question(
        &self,
        id: Uuid,
        changes: UpdateQuestionRequest,
    ) -> StoreResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "UPDATE questions SET
                course_id = COALESCE($1, course_id),
                question_text = COALESCE($2, question_text),
                option_a = COALESCE($3, option_a),
                option_b = COALESCE($4, option_b),
                option_c = COALESCE($5, option_c),
                option_d = COALESCE($6, option_d),
                correct_answer = COALESCE($7, correct_answer),
                difficulty = COALESCE($8, difficulty),
                updated_at = NOW()
             WHERE id = $9
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(changes.course_id)
        .bind(changes.question_text)
        .bind(changes.option_a)
        .bind(changes.option_b)
        .bind(changes.option_c)
        .bind(changes.option_d)
        .bind(changes.correct_answer.map(|a| a.as_str()))
        .bind(changes.difficulty.map(|d| d.as_str()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_attempt(&self, student_id: Uuid, course_id: Uuid) -> StoreResult<TestAttempt> {
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            "INSERT INTO test_attempts (student_id, course_id)
             VALUES ($1, $2)
             RETURNING {ATTEMPT_COLUMNS}"
        ))
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn find_attempt(&self, id: Uuid) -> StoreResult<Option<TestAttempt>> {
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM test_attempts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn scoring_snapshot(
        &self,
        attempt_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<ScoringSnapshot> {
        let mut tx = self.pool.begin().await?;

        // Both reads must see the same committed state.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let question_ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM questions WHERE course_id = $1")
                .bind(course_id)
                .fetch_all(&mut *tx)
                .await?;

        let answers = sqlx::query_as::<_, TestAnswer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM test_answers
             WHERE test_attempt_id = $1
             ORDER BY submitted_at, id"
        ))
        .bind(attempt_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ScoringSnapshot {
            question_ids,
            answers,
        })
    }

    async fn finalize_attempt(
        &self,
        id: Uuid,
        outcome: AttemptOutcome,
    ) -> StoreResult<Option<TestAttempt>> {
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            "UPDATE test_attempts SET
                completed_at = $1,
                score = $2,
                correct_answers = $3,
                total_questions = $4,
                time_spent = $5,
                is_completed = TRUE
             WHERE id = $6
             RETURNING {ATTEMPT_COLUMNS}"
        ))
        .bind(outcome.completed_at)
        .bind(outcome.score)
        .bind(outcome.correct_answers)
        .bind(outcome.total_questions)
        .bind(outcome.time_spent)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn completed_attempts(&self, student_id: Uuid) -> StoreResult<Vec<AttemptHistoryEntry>> {
        let history = sqlx::query_as::<_, AttemptHistoryEntry>(
            "SELECT a.id, a.student_id, a.course_id, a.started_at, a.completed_at, a.score,
                    a.total_questions, a.correct_answers, a.time_spent, a.is_completed,
                    c.name AS course_name
             FROM test_attempts a
             JOIN courses c ON a.course_id = c.id
             WHERE a.student_id = $1 AND a.is_completed
             ORDER BY a.completed_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }

    async fn upsert_answer(&self, answer: NewAnswer) -> StoreResult<TestAnswer> {
        // Writes nothing once the attempt is completed, even if completion
        // landed after the caller's own state check.
        let answer = sqlx::query_as::<_, TestAnswer>(&format!(
            "INSERT INTO test_answers
                (test_attempt_id, question_id, selected_answer, is_correct, time_spent)
             SELECT $1::UUID, $2::UUID, $3::VARCHAR, $4::BOOLEAN, $5::INTEGER
             WHERE EXISTS (
                SELECT 1 FROM test_attempts WHERE id = $1 AND NOT is_completed
             )
             ON CONFLICT (test_attempt_id, question_id) DO UPDATE SET
                selected_answer = EXCLUDED.selected_answer,
                is_correct = EXCLUDED.is_correct,
                time_spent = EXCLUDED.time_spent,
                submitted_at = NOW()
             RETURNING {ANSWER_COLUMNS}"
        ))
        .bind(answer.test_attempt_id)
        .bind(answer.question_id)
        .bind(answer.selected_answer.as_str())
        .bind(answer.is_correct)
        .bind(answer.time_spent)
        .fetch_optional(&self.pool)
        .await?;

        answer.ok_or_else(|| {
            AppError::InvalidState("Cannot submit answers to a completed test".to_string())
        })
    }

    async fn reviewed_answers(&self, attempt_id: Uuid) -> StoreResult<Vec<ReviewedAnswer>> {
        let answers = sqlx::query_as::<_, ReviewedAnswer>(
            "SELECT a.id, a.test_attempt_id, a.question_id, a.selected_answer, a.is_correct,
                    a.time_spent, a.submitted_at,
                    q.question_text, q.correct_answer
             FROM test_answers a
             JOIN questions q ON a.question_id = q.id
             WHERE a.test_attempt_id = $1
             ORDER BY a.submitted_at, a.id",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn admin_stats(&self, day_start: DateTime<Utc>) -> StoreResult<AdminStats> {
        let total_students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?;

        let total_questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;

        let tests_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM test_attempts WHERE is_completed AND completed_at >= $1",
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        let average_score: f64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG(score), 0)::DOUBLE PRECISION FROM test_attempts WHERE is_completed",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_students,
            total_questions,
            tests_today,
            average_score,
        })
    }

    async fn student_results(&self) -> StoreResult<Vec<StudentResult>> {
        let results = sqlx::query_as::<_, StudentResult>(
            "SELECT s.student_id,
                    s.first_name || ' ' || s.last_name AS student_name,
                    s.email,
                    c.name AS course_name,
                    COALESCE(MAX(a.score), 0)::DOUBLE PRECISION AS score,
                    COUNT(a.id) AS attempts,
                    MAX(a.completed_at) AS last_test
             FROM test_attempts a
             JOIN students s ON a.student_id = s.id
             JOIN courses c ON a.course_id = c.id
             WHERE a.is_completed
             GROUP BY s.id, c.id, s.student_id, s.first_name, s.last_name, s.email, c.name
             ORDER BY last_test DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    async fn recent_activity(&self, limit: i64) -> StoreResult<Vec<RecentActivity>> {
        let activity = sqlx::query_as::<_, RecentActivity>(
            "SELECT s.first_name || ' ' || s.last_name AS student_name,
                    c.name AS course_name,
                    COALESCE(a.score, 0)::DOUBLE PRECISION AS score,
                    COALESCE(a.completed_at, NOW()) AS completed_at
             FROM test_attempts a
             JOIN students s ON a.student_id = s.id
             JOIN courses c ON a.course_id = c.id
             WHERE a.is_completed
             ORDER BY a.completed_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(activity)
    }
}
