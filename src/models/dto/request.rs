use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::question::QuestionType;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1))]
    pub enrollment_id: String,
}

/// One answer in a save payload. The `question_type` some clients echo back
/// is accepted but never trusted; the attempt's stored placeholder decides
/// which response field applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: String,

    pub question_type: Option<QuestionType>,

    pub selected_option_index: Option<i32>,

    pub text_answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveAnswersRequest {
    #[validate(length(max = 200))]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(range(min = 0))]
    pub time_spent_seconds: i64,

    /// Set by time-limit enforcement; a forced submission is processed the
    /// same as a learner-initiated one.
    #[serde(default)]
    pub forced: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeAnswerRequest {
    #[validate(range(min = 0))]
    pub points_earned: i16,

    #[validate(length(max = 5000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverallFeedbackRequest {
    #[validate(length(min = 1, max = 5000))]
    pub feedback: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}
