// src/services/test_support.rs

use crate::{
    models::{
        course::{Course, CreateCourseRequest},
        question::{AnswerOption, CreateQuestionRequest, Difficulty, Question},
        user::{NewStudent, Student},
    },
    store::Store,
};

pub(crate) async fn seed_student(store: &dyn Store, student_id: &str) -> Student {
    store
        .create_student(NewStudent {
            student_id: student_id.to_string(),
            email: format!("{}@example.com", student_id.to_lowercase()),
            password_hash: "not-used".to_string(),
            first_name: "Test".to_string(),
            last_name: student_id.to_string(),
        })
        .await
        .expect("seed student")
}

/// Creates an active course with one question per entry of `keys`.
pub(crate) async fn seed_course(
    store: &dyn Store,
    name: &str,
    keys: &[AnswerOption],
) -> (Course, Vec<Question>) {
    let course = store
        .create_course(CreateCourseRequest {
            name: name.to_string(),
            description: None,
            duration_minutes: 30,
            is_active: Some(true),
        })
        .await
        .expect("seed course");

    let mut questions = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        let question = store
            .create_question(CreateQuestionRequest {
                course_id: course.id,
                question_text: format!("{} question {}", name, i + 1),
                option_a: "a".to_string(),
                option_b: "b".to_string(),
                option_c: "c".to_string(),
                option_d: "d".to_string(),
                correct_answer: *key,
                difficulty: Difficulty::Medium,
            })
            .await
            .expect("seed question");
        questions.push(question);
    }

    (course, questions)
}
