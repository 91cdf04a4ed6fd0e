use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{AttemptAnswer, AttemptStatus, QuizAttempt};

/// Full attempt view returned to the owning learner and to instructors.
/// The storage-level `version` field stays internal.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptDto {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub enrollment_id: String,
    pub attempt_number: i16,
    pub status: AttemptStatus,
    pub answers: Vec<AttemptAnswer>,
    pub total_points_earned: i16,
    pub total_points_possible: i16,
    pub score_percentage: i16,
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
}

impl From<QuizAttempt> for AttemptDto {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptDto {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            user_id: attempt.user_id,
            enrollment_id: attempt.enrollment_id,
            attempt_number: attempt.attempt_number,
            status: attempt.status,
            answers: attempt.answers,
            total_points_earned: attempt.total_points_earned,
            total_points_possible: attempt.total_points_possible,
            score_percentage: attempt.score_percentage,
            passed: attempt.passed,
            needs_grading: attempt.needs_grading,
            fully_graded: attempt.fully_graded,
            overall_feedback: attempt.overall_feedback,
            final_graded_by: attempt.final_graded_by,
            final_graded_at: attempt.final_graded_at,
            started_at: attempt.started_at,
            submitted_at: attempt.submitted_at,
            time_spent_seconds: attempt.time_spent_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummaryDto {
    pub id: String,
    pub attempt_number: i16,
    pub status: AttemptStatus,
    pub score_percentage: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub needs_grading: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<QuizAttempt> for AttemptSummaryDto {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptSummaryDto {
            id: attempt.id,
            attempt_number: attempt.attempt_number,
            status: attempt.status,
            score_percentage: attempt.score_percentage,
            passed: attempt.passed,
            needs_grading: attempt.needs_grading,
            started_at: attempt.started_at,
            submitted_at: attempt.submitted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartAttemptResponse {
    pub attempt: AttemptDto,
    pub resumed: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResultDto {
    pub status: AttemptStatus,
    pub score_percentage: i16,
    pub needs_grading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub total_points_earned: i16,
    pub total_points_possible: i16,
}

impl From<QuizAttempt> for SubmitResultDto {
    fn from(attempt: QuizAttempt) -> Self {
        SubmitResultDto {
            status: attempt.status,
            score_percentage: attempt.score_percentage,
            needs_grading: attempt.needs_grading,
            passed: attempt.passed,
            total_points_earned: attempt.total_points_earned,
            total_points_possible: attempt.total_points_possible,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GradingQueueResponse {
    pub attempts: Vec<AttemptSummaryDto>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
