use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::domain::question::QuestionType;
use crate::models::domain::{AttemptAnswer, Quiz, QuizAttempt};

/// Scoring logic, kept free of persistence so every rule is testable on
/// plain values. Callers mutate an attempt through these functions and then
/// persist the result as a separate step.
pub struct GradingService;

impl GradingService {
    /// Grades every multiple-choice answer against the quiz definition.
    /// Text answers are left for manual grading. Does not touch status,
    /// timestamps, or aggregates; run [`Self::recompute_score`] afterwards.
    pub fn auto_grade_submission(attempt: &mut QuizAttempt, quiz: &Quiz) {
        for answer in &mut attempt.answers {
            match answer.question_type {
                QuestionType::MultipleChoice => {
                    answer.points_earned = if Self::selected_correct_option(answer, quiz) {
                        answer.points_worth
                    } else {
                        0
                    };
                    answer.is_auto_graded = true;
                    answer.needs_grading = false;
                }
                QuestionType::TextAnswer => {
                    answer.needs_grading = true;
                }
            }
        }
    }

    /// An absent or out-of-range selection grades as incorrect, as does an
    /// answer whose question no longer exists in the definition.
    fn selected_correct_option(answer: &AttemptAnswer, quiz: &Quiz) -> bool {
        let Some(question) = quiz.question(&answer.question_id) else {
            return false;
        };
        let Some(index) = answer.selected_option_index else {
            return false;
        };
        let Ok(index) = usize::try_from(index) else {
            return false;
        };

        question
            .options
            .get(index)
            .map(|option| option.is_correct)
            .unwrap_or(false)
    }

    /// Records an instructor's grade for one text answer. Re-grading the same
    /// question later is allowed; the latest call wins.
    pub fn apply_text_grade(
        attempt: &mut QuizAttempt,
        question_id: &str,
        points_earned: i16,
        feedback: Option<String>,
        grader_id: &str,
    ) -> AppResult<()> {
        let answer = attempt.answer_mut(question_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Question '{}' not found in this attempt",
                question_id
            ))
        })?;

        if answer.question_type != QuestionType::TextAnswer {
            return Err(AppError::ValidationError(
                "Only text answers can be graded manually".to_string(),
            ));
        }

        if points_earned < 0 || points_earned > answer.points_worth {
            return Err(AppError::ValidationError(format!(
                "points_earned must be between 0 and {}",
                answer.points_worth
            )));
        }

        answer.points_earned = points_earned;
        answer.feedback = feedback;
        answer.graded_by = Some(grader_id.to_string());
        answer.graded_at = Some(Utc::now());
        answer.needs_grading = false;

        Ok(())
    }

    /// Recomputes every aggregate from the answer set. This is the only code
    /// that writes `total_points_earned`, `score_percentage`, `fully_graded`,
    /// `needs_grading`, or `passed`; every answer mutation is followed by a
    /// call here.
    ///
    /// `passed` stays untouched until the attempt is fully graded, then
    /// tracks the score on every subsequent recomputation.
    pub fn recompute_score(attempt: &mut QuizAttempt, passing_score: i16) {
        attempt.total_points_earned = attempt.answers.iter().map(|a| a.points_earned).sum();

        attempt.score_percentage = if attempt.total_points_possible > 0 {
            let ratio = f64::from(attempt.total_points_earned)
                / f64::from(attempt.total_points_possible);
            (ratio * 100.0).round() as i16
        } else {
            0
        };

        attempt.fully_graded = attempt.answers.iter().all(|a| !a.needs_grading);
        attempt.needs_grading = !attempt.fully_graded;

        if attempt.fully_graded {
            attempt.passed = Some(attempt.score_percentage >= passing_score);
        }
    }
}
