use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub question_type: QuestionType,
    pub points_worth: i16,
    /// Empty for text answers; at least one option is flagged correct for
    /// multiple choice.
    pub options: Vec<QuestionOption>,
    /// Sample answer or grading guidance. Never exposed to learners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_notes: Option<String>,
    pub order: i16,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TextAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TextAnswer => "text_answer",
        }
    }
}
