// src/services/scoring.rs

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::test_answer::TestAnswer;

/// Result of grading one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    /// Percentage of the course's questions answered correctly, two decimals.
    pub score: f64,
    pub correct_answers: i32,
    pub total_questions: i32,
}

/// Grades an attempt against the course's current question set.
///
/// * Answers to questions no longer in the course are discarded.
/// * For a question answered several times, the last answer in `answers`
///   counts.
/// * Unanswered questions count as wrong: the denominator is the size of
///   the question set, not the number of answers.
pub fn score_attempt(course_question_ids: &[Uuid], answers: &[TestAnswer]) -> ScoreSummary {
    let question_set: HashSet<Uuid> = course_question_ids.iter().copied().collect();

    let mut latest: HashMap<Uuid, bool> = HashMap::with_capacity(question_set.len());
    for answer in answers
        .iter()
        .filter(|a| question_set.contains(&a.question_id))
    {
        latest.insert(answer.question_id, answer.is_correct);
    }

    let correct_answers = latest.values().filter(|&&correct| correct).count() as i32;
    let total_questions = question_set.len() as i32;

    ScoreSummary {
        score: percentage(correct_answers, total_questions),
        correct_answers,
        total_questions,
    }
}

/// `correct / total * 100` rounded to two decimals, 0 for an empty course.
pub fn percentage(correct: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = f64::from(correct) / f64::from(total) * 100.0;
    (raw * 100.0).round() / 100.0
}
