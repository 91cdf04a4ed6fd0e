use std::sync::Arc;

use chrono::Utc;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{AttemptStatus, Quiz, QuizAttempt, QuizStatus};
use crate::models::dto::request::AnswerInput;
use crate::repositories::{EnrollmentRepository, QuizAttemptRepository, QuizRepository};
use crate::services::grading::GradingService;

/// Creation races resolve on the second read almost always; one extra lap
/// covers a competitor that submitted in between.
const MAX_CREATE_RETRIES: usize = 2;
/// Bound on optimistic-lock retries for writes to one attempt.
const MAX_WRITE_RETRIES: usize = 3;

pub struct StartOutcome {
    pub attempt: QuizAttempt,
    pub resumed: bool,
}

pub struct AttemptService {
    attempts: Arc<dyn QuizAttemptRepository>,
    quizzes: Arc<dyn QuizRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl AttemptService {
    pub fn new(
        attempts: Arc<dyn QuizAttemptRepository>,
        quizzes: Arc<dyn QuizRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            attempts,
            quizzes,
            enrollments,
        }
    }

    /// Returns the caller's in-progress attempt for the quiz, creating one if
    /// none exists. Concurrent callers racing on a fresh (quiz, user) pair
    /// collide on the storage uniqueness constraint; the losers re-read and
    /// resume the winner's attempt instead of failing.
    pub async fn start_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        enrollment_id: &str,
    ) -> AppResult<StartOutcome> {
        let quiz = self.require_quiz(quiz_id).await?;
        if quiz.status != QuizStatus::Published {
            return Err(AppError::QuizUnavailable(format!(
                "Quiz '{}' is not open for attempts",
                quiz_id
            )));
        }
        self.check_enrollment(enrollment_id, user_id, &quiz).await?;

        for _ in 0..=MAX_CREATE_RETRIES {
            if let Some(existing) = self.attempts.find_in_progress(user_id, quiz_id).await? {
                return Ok(StartOutcome {
                    attempt: existing,
                    resumed: true,
                });
            }

            let completed = self.attempts.count_completed(user_id, quiz_id).await?;
            if completed >= i64::from(quiz.max_attempts) {
                return Err(AppError::MaxAttemptsExceeded(quiz.max_attempts));
            }

            let next_number = self.attempts.latest_attempt_number(user_id, quiz_id).await? + 1;
            let attempt = QuizAttempt::start(&quiz, user_id, enrollment_id, next_number);

            match self.attempts.insert(attempt).await {
                Ok(created) => {
                    log::info!(
                        "Started attempt {} on quiz '{}' for user '{}'",
                        created.attempt_number,
                        quiz_id,
                        user_id
                    );
                    return Ok(StartOutcome {
                        attempt: created,
                        resumed: false,
                    });
                }
                Err(AppError::AlreadyExists(_)) => {
                    log::warn!(
                        "Concurrent attempt creation on quiz '{}' for user '{}', re-reading",
                        quiz_id,
                        user_id
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        // The competing writer holds the slot; hand its attempt back
        self.attempts
            .find_in_progress(user_id, quiz_id)
            .await?
            .map(|attempt| StartOutcome {
                attempt,
                resumed: true,
            })
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Could not start an attempt on quiz '{}' after concurrent retries",
                    quiz_id
                ))
            })
    }

    /// Saves a batch of responses onto an in-progress attempt. Repeatable;
    /// performs no scoring.
    pub async fn record_answers(
        &self,
        attempt_id: &str,
        user_id: &str,
        quiz_id: &str,
        answers: &[AnswerInput],
    ) -> AppResult<QuizAttempt> {
        self.persist_with_retry(attempt_id, |attempt| {
            Self::require_owned(attempt, user_id, quiz_id)?;
            if attempt.status != AttemptStatus::InProgress {
                return Err(AppError::AttemptNotEditable(format!(
                    "Attempt '{}' can no longer be edited",
                    attempt_id
                )));
            }
            attempt.record_responses(answers);
            Ok(())
        })
        .await
    }

    /// Finalizes an in-progress attempt: auto-grades choice questions,
    /// recomputes aggregates, and lands on `submitted` or, when nothing is
    /// left to grade manually, directly on `graded`.
    pub async fn submit_attempt(
        &self,
        attempt_id: &str,
        user_id: &str,
        quiz_id: &str,
        time_spent_seconds: i64,
        forced: bool,
    ) -> AppResult<QuizAttempt> {
        let quiz = self.require_quiz(quiz_id).await?;

        let submitted = self
            .persist_with_retry(attempt_id, |attempt| {
                Self::require_owned(attempt, user_id, quiz_id)?;
                if attempt.status != AttemptStatus::InProgress {
                    return Err(AppError::AlreadySubmitted(format!(
                        "Attempt '{}' has already been submitted",
                        attempt_id
                    )));
                }

                attempt.status = AttemptStatus::Submitted;
                attempt.submitted_at = Some(Utc::now());
                attempt.time_spent_seconds = Some(time_spent_seconds);

                GradingService::auto_grade_submission(attempt, &quiz);
                GradingService::recompute_score(attempt, quiz.passing_score);

                if attempt.fully_graded {
                    attempt.status = AttemptStatus::Graded;
                }
                Ok(())
            })
            .await?;

        if forced {
            log::info!("Attempt '{}' was force-submitted at the time limit", attempt_id);
        }

        Ok(submitted)
    }

    /// Applies an instructor's grade to one text answer and recomputes the
    /// attempt. The final grader to complete the attempt is recorded on it;
    /// later corrections update that record.
    pub async fn grade_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        points_earned: i16,
        feedback: Option<String>,
        grader_id: &str,
    ) -> AppResult<QuizAttempt> {
        let attempt = self.require_attempt(attempt_id).await?;
        let quiz = self.require_quiz(&attempt.quiz_id).await?;

        self.persist_with_retry(attempt_id, |attempt| {
            if attempt.status == AttemptStatus::InProgress {
                return Err(AppError::ValidationError(
                    "Attempt has not been submitted yet".to_string(),
                ));
            }

            GradingService::apply_text_grade(
                attempt,
                question_id,
                points_earned,
                feedback.clone(),
                grader_id,
            )?;
            GradingService::recompute_score(attempt, quiz.passing_score);

            if attempt.fully_graded {
                attempt.status = AttemptStatus::Graded;
                attempt.final_graded_by = Some(grader_id.to_string());
                attempt.final_graded_at = Some(Utc::now());
            }
            Ok(())
        })
        .await
    }

    /// Attaches overall feedback to an attempt. Has no effect on scoring and
    /// is allowed in any status.
    pub async fn set_overall_feedback(
        &self,
        attempt_id: &str,
        feedback: &str,
        grader_id: &str,
    ) -> AppResult<QuizAttempt> {
        let updated = self
            .persist_with_retry(attempt_id, |attempt| {
                attempt.overall_feedback = Some(feedback.to_string());
                Ok(())
            })
            .await?;

        log::info!(
            "Instructor '{}' left overall feedback on attempt '{}'",
            grader_id,
            attempt_id
        );
        Ok(updated)
    }

    pub async fn get_attempt(&self, attempt_id: &str) -> AppResult<QuizAttempt> {
        self.require_attempt(attempt_id).await
    }

    pub async fn list_attempts(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        self.attempts.find_by_user_and_quiz(user_id, quiz_id).await
    }

    pub async fn grading_queue(
        &self,
        quiz_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        self.require_quiz(quiz_id).await?;
        self.attempts
            .find_needing_grading(quiz_id, offset, limit)
            .await
    }

    /// Read-modify-write with optimistic locking. `apply` runs on a fresh
    /// copy each lap, so a conflicting writer costs a re-read, never a lost
    /// update.
    async fn persist_with_retry<F>(&self, attempt_id: &str, apply: F) -> AppResult<QuizAttempt>
    where
        F: Fn(&mut QuizAttempt) -> AppResult<()>,
    {
        let mut last_conflict = None;

        for _ in 0..MAX_WRITE_RETRIES {
            let mut attempt = self.require_attempt(attempt_id).await?;
            apply(&mut attempt)?;

            match self.attempts.update(attempt).await {
                Ok(updated) => return Ok(updated),
                Err(AppError::Conflict(message)) => {
                    log::warn!("Version conflict on attempt '{}', retrying", attempt_id);
                    last_conflict = Some(message);
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::Conflict(last_conflict.unwrap_or_else(|| {
            format!("Attempt '{}' kept changing concurrently", attempt_id)
        })))
    }

    async fn require_attempt(&self, attempt_id: &str) -> AppResult<QuizAttempt> {
        self.attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))
    }

    async fn require_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }

    async fn check_enrollment(
        &self,
        enrollment_id: &str,
        user_id: &str,
        quiz: &Quiz,
    ) -> AppResult<()> {
        let enrollment = self
            .enrollments
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotEnrolled("Enrollment not found".to_string()))?;

        if enrollment.user_id != user_id
            || enrollment.course_id != quiz.course_id
            || !enrollment.is_active()
        {
            return Err(AppError::NotEnrolled(
                "You are not actively enrolled in this course".to_string(),
            ));
        }
        Ok(())
    }

    /// An attempt reached through someone else's ids looks exactly like a
    /// missing attempt.
    fn require_owned(attempt: &QuizAttempt, user_id: &str, quiz_id: &str) -> AppResult<()> {
        if attempt.user_id != user_id || attempt.quiz_id != quiz_id {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt.id
            )));
        }
        Ok(())
    }
}
