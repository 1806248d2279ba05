// src/store/mod.rs

//! Persistence boundary.
//!
//! Handlers and services only see `Arc<dyn Store>`. `PgStore` is the
//! production backend; `MemoryStore` keeps everything in process and backs
//! development runs without a database as well as the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

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

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

/// Everything the scoring step reads, captured at one point in time.
#[derive(Debug, Clone, Default)]
pub struct ScoringSnapshot {
    /// Ids of the questions currently belonging to the attempt's course.
    pub question_ids: Vec<Uuid>,
    /// Answers recorded for the attempt, oldest submission first.
    pub answers: Vec<TestAnswer>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Admins
    async fn find_admin_by_admin_id(&self, admin_id: &str) -> StoreResult<Option<Admin>>;
    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Option<Admin>>;
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin>;

    // Students
    async fn find_student_by_id(&self, id: Uuid) -> StoreResult<Option<Student>>;
    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>>;
    async fn find_student_by_student_id(&self, student_id: &str) -> StoreResult<Option<Student>>;
    async fn create_student(&self, student: NewStudent) -> StoreResult<Student>;

    // Courses
    /// Active courses, ordered by name.
    async fn list_active_courses(&self) -> StoreResult<Vec<Course>>;
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    async fn create_course(&self, course: CreateCourseRequest) -> StoreResult<Course>;
    /// Returns `None` if the course does not exist.
    async fn update_course(
        &self,
        id: Uuid,
        changes: UpdateCourseRequest,
    ) -> StoreResult<Option<Course>>;
    /// Soft delete. Returns `false` if the course does not exist.
    async fn deactivate_course(&self, id: Uuid) -> StoreResult<bool>;

    // Questions
    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>>;
    /// Questions of one course, oldest first.
    async fn list_questions_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Question>>;
    async fn list_questions_with_course(&self) -> StoreResult<Vec<QuestionWithCourse>>;
    async fn create_question(&self, question: CreateQuestionRequest) -> StoreResult<Question>;
    async fn update_question(
        &self,
        id: Uuid,
        changes: UpdateQuestionRequest,
    ) -> StoreResult<Option<Question>>;
    /// Hard delete; recorded answers for the question go with it.
    async fn delete_question(&self, id: Uuid) -> StoreResult<bool>;

    // Attempts
    async fn create_attempt(&self, student_id: Uuid, course_id: Uuid) -> StoreResult<TestAttempt>;
    async fn find_attempt(&self, id: Uuid) -> StoreResult<Option<TestAttempt>>;
    /// Reads the course's question ids and the attempt's answers consistently.
    async fn scoring_snapshot(
        &self,
        attempt_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<ScoringSnapshot>;
    async fn finalize_attempt(
        &self,
        id: Uuid,
        outcome: AttemptOutcome,
    ) -> StoreResult<Option<TestAttempt>>;
    /// Completed attempts of a student, most recently completed first.
    async fn completed_attempts(&self, student_id: Uuid) -> StoreResult<Vec<AttemptHistoryEntry>>;

    // Answers
    /// Inserts the answer or replaces the existing one for the same
    /// (attempt, question) pair. Fails with `InvalidState` if the attempt is
    /// not open at write time.
    async fn upsert_answer(&self, answer: NewAnswer) -> StoreResult<TestAnswer>;
    /// Answers of an attempt with question text and key, oldest submission first.
    async fn reviewed_answers(&self, attempt_id: Uuid) -> StoreResult<Vec<ReviewedAnswer>>;

    // Reports
    async fn admin_stats(&self, day_start: DateTime<Utc>) -> StoreResult<AdminStats>;
    async fn student_results(&self) -> StoreResult<Vec<StudentResult>>;
    async fn recent_activity(&self, limit: i64) -> StoreResult<Vec<RecentActivity>>;
}
