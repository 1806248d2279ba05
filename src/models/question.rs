// src/models/question.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Returned when a stored enum column holds an unexpected value.
#[derive(Debug)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// One of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

impl TryFrom<String> for AnswerOption {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            _ => Err(UnknownVariant {
                kind: "answer option",
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownVariant {
                kind: "difficulty",
                value,
            }),
        }
    }
}

/// Represents the 'questions' table in the database.
/// Carries the correct answer, so it is only ever serialized to administrators.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,

    /// Owning course.
    pub course_id: Uuid,

    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    #[sqlx(try_from = "String")]
    pub correct_answer: AnswerOption,

    #[sqlx(try_from = "String")]
    pub difficulty: Difficulty,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for sending a question to a student (excludes the correct answer).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
        }
    }
}

/// Admin listing row: a question joined with its course name.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub question: Question,
    pub course_name: String,
}

/// DTO for creating a new question.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    pub correct_answer: AnswerOption,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub course_id: Option<Uuid>,
    #[validate(length(min = 1, max = 2000))]
    pub question_text: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_a: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_b: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_c: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub option_d: Option<String>,
    pub correct_answer: Option<AnswerOption>,
    pub difficulty: Option<Difficulty>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.course_id.is_none()
            && self.question_text.is_none()
            && self.option_a.is_none()
            && self.option_b.is_none()
            && self.option_c.is_none()
            && self.option_d.is_none()
            && self.correct_answer.is_none()
            && self.difficulty.is_none()
    }
}
