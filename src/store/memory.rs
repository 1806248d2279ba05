// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
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

/// Rows are kept in insertion order, which doubles as submission order for
/// answers.
#[derive(Default)]
struct Tables {
    admins: Vec<Admin>,
    students: Vec<Student>,
    courses: Vec<Course>,
    questions: Vec<Question>,
    attempts: Vec<TestAttempt>,
    answers: Vec<TestAnswer>,
}

impl Tables {
    fn course_name(&self, course_id: Uuid) -> Option<&str> {
        self.courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.name.as_str())
    }
}

/// Process-local store with the same observable behavior as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_admin_by_admin_id(&self, admin_id: &str) -> StoreResult<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.admin_id == admin_id).cloned())
    }

    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.id == id).cloned())
    }

    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let mut tables = self.tables.write().await;
        if tables
            .admins
            .iter()
            .any(|a| a.admin_id == admin.admin_id || a.email == admin.email)
        {
            return Err(AppError::Conflict("Record already exists".to_string()));
        }

        let admin = Admin {
            id: Uuid::new_v4(),
            admin_id: admin.admin_id,
            email: admin.email,
            password_hash: admin.password_hash,
            first_name: admin.first_name,
            last_name: admin.last_name,
            created_at: Utc::now(),
        };
        tables.admins.push(admin.clone());
        Ok(admin)
    }

    async fn find_student_by_id(&self, id: Uuid) -> StoreResult<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables.students.iter().find(|s| s.email == email).cloned())
    }

    async fn find_student_by_student_id(&self, student_id: &str) -> StoreResult<Option<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .find(|s| s.student_id == student_id)
            .cloned())
    }

    async fn create_student(&self, student: NewStudent) -> StoreResult<Student> {
        let mut tables = self.tables.write().await;
        if tables
            .students
            .iter()
            .any(|s| s.student_id == student.student_id || s.email == student.email)
        {
            return Err(AppError::Conflict("Record already exists".to_string()));
        }

        let student = Student {
            id: Uuid::new_v4(),
            student_id: student.student_id,
            email: student.email,
            password_hash: student.password_hash,
            first_name: student.first_name,
            last_name: student.last_name,
            created_at: Utc::now(),
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn list_active_courses(&self) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn create_course(&self, course: CreateCourseRequest) -> StoreResult<Course> {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            name: course.name,
            description: course.description,
            duration_minutes: course.duration_minutes,
            is_active: course.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(
        &self,
        id: Uuid,
        changes: UpdateCourseRequest,
    ) -> StoreResult<Option<Course>> {
        let mut tables = self.tables.write().await;
        let Some(course) = tables.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            course.name = name;
        }
        if let Some(description) = changes.description {
            course.description = Some(description);
        }
        if let Some(duration) = changes.duration_minutes {
            course.duration_minutes = duration;
        }
        if let Some(is_active) = changes.is_active {
            course.is_active = is_active;
        }
        course.updated_at = Utc::now();

        Ok(Some(course.clone()))
    }

    async fn deactivate_course(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                course.is_active = false;
                course.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn list_questions_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_questions_with_course(&self) -> StoreResult<Vec<QuestionWithCourse>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<QuestionWithCourse> = tables
            .questions
            .iter()
            .filter_map(|q| {
                tables.course_name(q.course_id).map(|name| QuestionWithCourse {
                    question: q.clone(),
                    course_name: name.to_string(),
                })
            })
            .collect();
        // Stable sort keeps creation order inside a course.
        rows.sort_by(|a, b| a.course_name.cmp(&b.course_name));
        Ok(rows)
    }

    async fn create_question(&self, question: CreateQuestionRequest) -> StoreResult<Question> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == question.course_id) {
            return Err(AppError::InternalServerError(
                "questions.course_id violates foreign key".to_string(),
            ));
        }

        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            course_id: question.course_id,
            question_text: question.question_text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
            correct_answer: question.correct_answer,
            difficulty: question.difficulty,
            created_at: now,
            updated_at: now,
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    async fn update_question(
        &self,
        id: Uuid,
        changes: UpdateQuestionRequest,
    ) -> StoreResult<Option<Question>> {
        let mut tables = self.tables.write().await;
        let Some(question) = tables.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };

        if let Some(course_id) = changes.course_id {
            question.course_id = course_id;
        }
        if let Some(text) = changes.question_text {
            question.question_text = text;
        }
        if let Some(option) = changes.option_a {
            question.option_a = option;
        }
        if let Some(option) = changes.option_b {
            question.option_b = option;
        }
        if let Some(option) = changes.option_c {
            question.option_c = option;
        }
        if let Some(option) = changes.option_d {
            question.option_d = option;
        }
        if let Some(correct) = changes.correct_answer {
            question.correct_answer = correct;
        }
        if let Some(difficulty) = changes.difficulty {
            question.difficulty = difficulty;
        }
        question.updated_at = Utc::now();

        Ok(Some(question.clone()))
    }

    async fn delete_question(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        if tables.questions.len() == before {
            return Ok(false);
        }
        tables.answers.retain(|a| a.question_id != id);
        Ok(true)
    }

    async fn create_attempt(&self, student_id: Uuid, course_id: Uuid) -> StoreResult<TestAttempt> {
        let attempt = TestAttempt {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            started_at: Utc::now(),
            completed_at: None,
            score: None,
            total_questions: None,
            correct_answers: None,
            time_spent: None,
            is_completed: false,
        };
        self.tables.write().await.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, id: Uuid) -> StoreResult<Option<TestAttempt>> {
        let tables = self.tables.read().await;
        Ok(tables.attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn scoring_snapshot(
        &self,
        attempt_id: Uuid,
        course_id: Uuid,
    ) -> StoreResult<ScoringSnapshot> {
        let tables = self.tables.read().await;
        Ok(ScoringSnapshot {
            question_ids: tables
                .questions
                .iter()
                .filter(|q| q.course_id == course_id)
                .map(|q| q.id)
                .collect(),
            answers: tables
                .answers
                .iter()
                .filter(|a| a.test_attempt_id == attempt_id)
                .cloned()
                .collect(),
        })
    }

    async fn finalize_attempt(
        &self,
        id: Uuid,
        outcome: AttemptOutcome,
    ) -> StoreResult<Option<TestAttempt>> {
        let mut tables = self.tables.write().await;
        let Some(attempt) = tables.attempts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        attempt.completed_at = Some(outcome.completed_at);
        attempt.score = Some(outcome.score);
        attempt.correct_answers = Some(outcome.correct_answers);
        attempt.total_questions = Some(outcome.total_questions);
        attempt.time_spent = Some(outcome.time_spent);
        attempt.is_completed = true;

        Ok(Some(attempt.clone()))
    }

    async fn completed_attempts(&self, student_id: Uuid) -> StoreResult<Vec<AttemptHistoryEntry>> {
        let tables = self.tables.read().await;
        let mut history: Vec<AttemptHistoryEntry> = tables
            .attempts
            .iter()
            .filter(|a| a.student_id == student_id && a.is_completed)
            .filter_map(|a| {
                tables.course_name(a.course_id).map(|name| AttemptHistoryEntry {
                    attempt: a.clone(),
                    course_name: name.to_string(),
                })
            })
            .collect();
        history.sort_by(|a, b| b.attempt.completed_at.cmp(&a.attempt.completed_at));
        Ok(history)
    }

    async fn upsert_answer(&self, answer: NewAnswer) -> StoreResult<TestAnswer> {
        let mut tables = self.tables.write().await;

        let open = tables
            .attempts
            .iter()
            .any(|a| a.id == answer.test_attempt_id && !a.is_completed);
        if !open {
            return Err(AppError::InvalidState(
                "Cannot submit answers to a completed test".to_string(),
            ));
        }

        // A replaced answer moves to the end so that row order stays
        // submission order.
        let existing = tables.answers.iter().position(|a| {
            a.test_attempt_id == answer.test_attempt_id && a.question_id == answer.question_id
        });
        let id = match existing {
            Some(index) => tables.answers.remove(index).id,
            None => Uuid::new_v4(),
        };

        let stored = TestAnswer {
            id,
            test_attempt_id: answer.test_attempt_id,
            question_id: answer.question_id,
            selected_answer: answer.selected_answer,
            is_correct: answer.is_correct,
            time_spent: answer.time_spent,
            submitted_at: Utc::now(),
        };
        tables.answers.push(stored.clone());
        Ok(stored)
    }

    async fn reviewed_answers(&self, attempt_id: Uuid) -> StoreResult<Vec<ReviewedAnswer>> {
        let tables = self.tables.read().await;
        let questions: HashMap<Uuid, &Question> =
            tables.questions.iter().map(|q| (q.id, q)).collect();

        Ok(tables
            .answers
            .iter()
            .filter(|a| a.test_attempt_id == attempt_id)
            .filter_map(|a| {
                questions.get(&a.question_id).map(|q| ReviewedAnswer {
                    answer: a.clone(),
                    question_text: q.question_text.clone(),
                    correct_answer: q.correct_answer,
                })
            })
            .collect())
    }

    async fn admin_stats(&self, day_start: DateTime<Utc>) -> StoreResult<AdminStats> {
        let tables = self.tables.read().await;
        let completed: Vec<&TestAttempt> =
            tables.attempts.iter().filter(|a| a.is_completed).collect();

        let tests_today = completed
            .iter()
            .filter(|a| a.completed_at.is_some_and(|at| at >= day_start))
            .count();

        let average_score = if completed.is_empty() {
            0.0
        } else {
            completed.iter().filter_map(|a| a.score).sum::<f64>() / completed.len() as f64
        };

        Ok(AdminStats {
            total_students: tables.students.len() as i64,
            total_questions: tables.questions.len() as i64,
            tests_today: tests_today as i64,
            average_score,
        })
    }

    async fn student_results(&self) -> StoreResult<Vec<StudentResult>> {
        let tables = self.tables.read().await;
        let mut grouped: HashMap<(Uuid, Uuid), StudentResult> = HashMap::new();

        for attempt in tables.attempts.iter().filter(|a| a.is_completed) {
            let Some(student) = tables.students.iter().find(|s| s.id == attempt.student_id) else {
                continue;
            };
            let Some(course_name) = tables.course_name(attempt.course_id) else {
                continue;
            };
            let score = attempt.score.unwrap_or(0.0);

            let entry = grouped
                .entry((student.id, attempt.course_id))
                .or_insert_with(|| StudentResult {
                    student_id: student.student_id.clone(),
                    student_name: student.full_name(),
                    email: student.email.clone(),
                    course_name: course_name.to_string(),
                    score,
                    attempts: 0,
                    last_test: attempt.completed_at,
                });
            entry.attempts += 1;
            entry.score = entry.score.max(score);
            entry.last_test = entry.last_test.max(attempt.completed_at);
        }

        let mut results: Vec<StudentResult> = grouped.into_values().collect();
        results.sort_by(|a, b| b.last_test.cmp(&a.last_test));
        Ok(results)
    }

    async fn recent_activity(&self, limit: i64) -> StoreResult<Vec<RecentActivity>> {
        let tables = self.tables.read().await;
        let mut activity: Vec<RecentActivity> = tables
            .attempts
            .iter()
            .filter(|a| a.is_completed)
            .filter_map(|a| {
                let student = tables.students.iter().find(|s| s.id == a.student_id)?;
                let course_name = tables.course_name(a.course_id)?;
                Some(RecentActivity {
                    student_name: student.full_name(),
                    course_name: course_name.to_string(),
                    score: a.score.unwrap_or(0.0),
                    completed_at: a.completed_at.unwrap_or_else(Utc::now),
                })
            })
            .collect();
        activity.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        activity.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(activity)
    }
}
