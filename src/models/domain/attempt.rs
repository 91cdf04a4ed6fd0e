use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::{Question, QuestionType};
use crate::models::domain::Quiz;
use crate::models::dto::request::AnswerInput;

/// One learner's try at one quiz. `(quiz_id, user_id, attempt_number)` is
/// unique at the storage layer; `attempt_number` is 1-based and gap-free per
/// (quiz, user) pair.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub enrollment_id: String,
    pub attempt_number: i16,
    pub status: AttemptStatus,
    pub answers: Vec<AttemptAnswer>,
    pub total_points_earned: i16,
    /// Sum of `points_worth` across answers. Fixed at creation; definition
    /// edits made mid-attempt do not reach into existing attempts.
    pub total_points_possible: i16,
    pub score_percentage: i16,
    /// Unset until the attempt is fully graded; a premature `false` would be
    /// indistinguishable from a failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub needs_grading: bool,
    pub fully_graded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_graded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_graded_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_seconds: Option<i64>,
    /// Optimistic lock; bumped by the repository on every write.
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttemptAnswer {
    pub question_id: String,
    pub question_type: QuestionType,
    pub points_worth: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_answer: Option<String>,
    pub points_earned: i16,
    pub is_auto_graded: bool,
    pub needs_grading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Submitted => "submitted",
            AttemptStatus::Graded => "graded",
        }
    }
}

impl AttemptAnswer {
    fn placeholder(question: &Question) -> Self {
        AttemptAnswer {
            question_id: question.id.clone(),
            question_type: question.question_type,
            points_worth: question.points_worth,
            selected_option_index: None,
            text_answer: None,
            points_earned: 0,
            is_auto_graded: false,
            needs_grading: question.question_type == QuestionType::TextAnswer,
            feedback: None,
            graded_by: None,
            graded_at: None,
        }
    }
}

impl QuizAttempt {
    /// Creates a fresh in-progress attempt, materializing one answer
    /// placeholder per definition question. Point values are copied now so
    /// that later definition edits cannot change what this attempt is worth.
    pub fn start(quiz: &Quiz, user_id: &str, enrollment_id: &str, attempt_number: i16) -> Self {
        let answers: Vec<AttemptAnswer> = quiz
            .questions
            .iter()
            .map(AttemptAnswer::placeholder)
            .collect();
        let total_points_possible = answers.iter().map(|a| a.points_worth).sum();
        let now = Utc::now();

        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            enrollment_id: enrollment_id.to_string(),
            attempt_number,
            status: AttemptStatus::InProgress,
            answers,
            total_points_earned: 0,
            total_points_possible,
            score_percentage: 0,
            passed: None,
            needs_grading: true,
            fully_graded: false,
            overall_feedback: None,
            final_graded_by: None,
            final_graded_at: None,
            started_at: now,
            submitted_at: None,
            time_spent_seconds: None,
            version: 1,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    /// Overwrites the response field of matching answer placeholders. The
    /// stored placeholder's type decides which field is written; answers for
    /// unknown question ids are ignored, and no new entries are ever added
    /// after creation. Repeatable, and performs no scoring.
    pub fn record_responses(&mut self, answers: &[AnswerInput]) {
        for input in answers {
            let Some(answer) = self
                .answers
                .iter_mut()
                .find(|a| a.question_id == input.question_id)
            else {
                continue;
            };

            match answer.question_type {
                QuestionType::MultipleChoice => {
                    answer.selected_option_index = input.selected_option_index;
                }
                QuestionType::TextAnswer => {
                    answer.text_answer = input.text_answer.clone();
                }
            }
        }
    }

    pub fn answer(&self, question_id: &str) -> Option<&AttemptAnswer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    pub fn answer_mut(&mut self, question_id: &str) -> Option<&mut AttemptAnswer> {
        self.answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
    }
}
