use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::question::Question;

/// A quiz definition. Authored and published elsewhere; this service only
/// reads it, and treats it as immutable for the lifetime of any attempt.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: QuizStatus,
    /// Percentage (0-100) a learner must meet or exceed to pass.
    pub passing_score: i16,
    pub max_attempts: i16,
    /// Enforced by the caller against `started_at`; carried here as data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<i16>,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Draft,
    Published,
    Archived,
}

impl Quiz {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn total_points(&self) -> i16 {
        self.questions.iter().map(|q| q.points_worth).sum()
    }
}
