use serde::Serialize;

use learnhub_core::{DomainError, DomainResult, TopicId};

use crate::Topic;

/// Minimum percentage for a quiz attempt to count as a pass.
pub const PASSING_SCORE: u32 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionResult {
    pub question_id: u32,
    pub selected: usize,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizGrade {
    pub topic_id: TopicId,
    pub correct: usize,
    pub total: usize,
    /// Integer percentage, rounded down.
    pub score: u32,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
}

/// Grade one answer per question, in question order.
pub fn grade_quiz(topic: &Topic, answers: &[usize]) -> DomainResult<QuizGrade> {
    let total = topic.quiz.len();
    if answers.len() != total {
        return Err(DomainError::validation(format!(
            "expected {total} answers, got {}",
            answers.len()
        )));
    }

    let results: Vec<QuestionResult> = topic
        .quiz
        .iter()
        .zip(answers)
        .map(|(q, &selected)| QuestionResult {
            question_id: q.id,
            selected,
            correct_answer: q.answer,
            is_correct: selected == q.answer,
            explanation: q.explanation.clone(),
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let score = if total == 0 {
        100
    } else {
        (correct * 100 / total) as u32
    };

    Ok(QuizGrade {
        topic_id: topic.id.clone(),
        correct,
        total,
        score,
        passed: score >= PASSING_SCORE,
        results,
    })
}
