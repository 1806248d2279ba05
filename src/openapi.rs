// src/openapi.rs

use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{admin, auth, courses, questions, test},
    models::{
        course::{Course, CreateCourseRequest, UpdateCourseRequest},
        question::{
            AnswerOption, CreateQuestionRequest, Difficulty, PublicQuestion, Question,
            QuestionWithCourse, UpdateQuestionRequest,
        },
        report::{AdminStats, RecentActivity, StudentResult},
        test_answer::{ReviewedAnswer, SubmitAnswerRequest, TestAnswer},
        test_attempt::{
            AttemptHistoryEntry, CompleteTestRequest, StartTestRequest, TestAttempt,
            TestResultsResponse,
        },
        user::{
            Admin, AdminAuthResponse, AdminLoginRequest, RegisterStudentRequest, Student,
            StudentAuthResponse, StudentLoginRequest,
        },
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "CBT Backend", description = "Computer-based testing API"),
    paths(
        auth::register_student,
        auth::login_student,
        auth::student_me,
        auth::login_admin,
        auth::admin_me,
        courses::list_courses,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        questions::list_questions_for_student,
        questions::list_all_questions,
        questions::list_course_questions,
        questions::create_question,
        questions::update_question,
        questions::delete_question,
        test::start_test,
        test::submit_answer,
        test::complete_test,
        test::test_history,
        test::test_results,
        admin::get_stats,
        admin::get_student_results,
        admin::get_recent_activity,
    ),
    components(schemas(
        Course,
        CreateCourseRequest,
        UpdateCourseRequest,
        AnswerOption,
        Difficulty,
        Question,
        PublicQuestion,
        QuestionWithCourse,
        CreateQuestionRequest,
        UpdateQuestionRequest,
        TestAttempt,
        AttemptHistoryEntry,
        StartTestRequest,
        CompleteTestRequest,
        TestResultsResponse,
        TestAnswer,
        ReviewedAnswer,
        SubmitAnswerRequest,
        AdminStats,
        StudentResult,
        RecentActivity,
        Student,
        Admin,
        RegisterStudentRequest,
        StudentLoginRequest,
        AdminLoginRequest,
        StudentAuthResponse,
        AdminAuthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "courses", description = "Course catalog"),
        (name = "questions", description = "Question delivery"),
        (name = "test", description = "Attempt lifecycle"),
        (name = "admin", description = "Administration and reports"),
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_attempt_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/student/test/complete"));
        assert!(doc.paths.paths.contains_key("/api/questions/{course_id}"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer"))
        );
    }
}
