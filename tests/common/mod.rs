#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use aula_server::{
    errors::{AppError, AppResult},
    models::domain::{
        question::{Question, QuestionOption, QuestionType},
        AttemptStatus, Enrollment, EnrollmentStatus, Quiz, QuizAttempt, QuizStatus,
    },
    models::dto::request::AnswerInput,
    repositories::{EnrollmentRepository, QuizAttemptRepository, QuizRepository},
    services::AttemptService,
};

pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn put(&self, quiz: Quiz) {
        let mut quizzes = self.quizzes.write().await;
        quizzes.insert(quiz.id.clone(), quiz);
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(id).cloned())
    }
}

pub struct InMemoryEnrollmentRepository {
    enrollments: Arc<RwLock<HashMap<String, Enrollment>>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self {
            enrollments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn put(&self, enrollment: Enrollment) {
        let mut enrollments = self.enrollments.write().await;
        enrollments.insert(enrollment.id.clone(), enrollment);
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Enrollment>> {
        let enrollments = self.enrollments.read().await;
        Ok(enrollments.get(id).cloned())
    }
}

/// Mirrors the storage contract of the Mongo-backed attempt repository:
/// unique `(quiz_id, user_id, attempt_number)` on insert, compare-and-swap
/// on `version` with a bump on every successful update.
pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<HashMap<String, QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn insert(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;

        let number_taken = attempts.values().any(|a| {
            a.quiz_id == attempt.quiz_id
                && a.user_id == attempt.user_id
                && a.attempt_number == attempt.attempt_number
        });
        if number_taken || attempts.contains_key(&attempt.id) {
            return Err(AppError::AlreadyExists(format!(
                "Attempt {} already exists for this quiz and user",
                attempt.attempt_number
            )));
        }

        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.get(id).cloned())
    }

    async fn find_in_progress(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .find(|a| {
                a.user_id == user_id
                    && a.quiz_id == quiz_id
                    && a.status == AttemptStatus::InProgress
            })
            .cloned())
    }

    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<i64> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| {
                a.user_id == user_id
                    && a.quiz_id == quiz_id
                    && matches!(a.status, AttemptStatus::Submitted | AttemptStatus::Graded)
            })
            .count() as i64)
    }

    async fn latest_attempt_number(&self, user_id: &str, quiz_id: &str) -> AppResult<i16> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .filter(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .map(|a| a.attempt_number)
            .max()
            .unwrap_or(0))
    }

    async fn update(&self, mut attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;

        // The stored version must still match what the caller read
        let stored_version = attempts.get(&attempt.id).map(|stored| stored.version);
        if stored_version != Some(attempt.version) {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' was modified concurrently",
                attempt.id
            )));
        }

        attempt.version += 1;
        attempt.modified_at = Some(Utc::now());
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.attempt_number.cmp(&a.attempt_number));
        Ok(items)
    }

    async fn find_needing_grading(
        &self,
        quiz_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| {
                a.quiz_id == quiz_id && a.status == AttemptStatus::Submitted && a.needs_grading
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));

        let total = items.len() as i64;
        let start = offset.max(0) as usize;
        let end = (start + limit.max(0) as usize).min(items.len());

        let page = if start >= items.len() {
            vec![]
        } else {
            items[start..end].to_vec()
        };

        Ok((page, total))
    }
}

pub struct TestBackend {
    pub service: Arc<AttemptService>,
    pub attempts: Arc<InMemoryQuizAttemptRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub enrollments: Arc<InMemoryEnrollmentRepository>,
}

impl TestBackend {
    pub fn new() -> Self {
        let attempts = Arc::new(InMemoryQuizAttemptRepository::new());
        let quizzes = Arc::new(InMemoryQuizRepository::new());
        let enrollments = Arc::new(InMemoryEnrollmentRepository::new());
        let service = Arc::new(AttemptService::new(
            attempts.clone(),
            quizzes.clone(),
            enrollments.clone(),
        ));
        Self {
            service,
            attempts,
            quizzes,
            enrollments,
        }
    }

    /// A backend seeded with the standard published quiz and an active
    /// enrollment "enr-1" for "student-1" in "course-1".
    pub async fn with_published_quiz() -> Self {
        let backend = Self::new();
        backend.quizzes.put(make_quiz()).await;
        backend
            .enrollments
            .put(make_enrollment("enr-1", "student-1", "course-1"))
            .await;
        backend
    }
}

fn make_option(text: &str, is_correct: bool) -> QuestionOption {
    QuestionOption {
        text: text.to_string(),
        is_correct,
    }
}

/// A published quiz worth 10 points: two choice questions (2 and 3 points)
/// and one 5-point text question. Passing score 70, three attempts allowed.
pub fn make_quiz() -> Quiz {
    Quiz {
        id: "quiz-1".to_string(),
        course_id: "course-1".to_string(),
        title: "Rust fundamentals".to_string(),
        description: None,
        status: QuizStatus::Published,
        passing_score: 70,
        max_attempts: 3,
        time_limit_minutes: None,
        questions: vec![
            Question {
                id: "q-mc-1".to_string(),
                prompt: "How does Rust manage memory?".to_string(),
                question_type: QuestionType::MultipleChoice,
                points_worth: 2,
                options: vec![
                    make_option("Ownership and borrowing", true),
                    make_option("Garbage collection", false),
                    make_option("Manual malloc and free", false),
                ],
                instructor_notes: None,
                order: 1,
            },
            Question {
                id: "q-mc-2".to_string(),
                prompt: "Which pointer type is reference counted?".to_string(),
                question_type: QuestionType::MultipleChoice,
                points_worth: 3,
                options: vec![
                    make_option("Box<T>", false),
                    make_option("Rc<T>", true),
                    make_option("&mut T", false),
                ],
                instructor_notes: None,
                order: 2,
            },
            Question {
                id: "q-text-1".to_string(),
                prompt: "Explain move semantics in your own words.".to_string(),
                question_type: QuestionType::TextAnswer,
                points_worth: 5,
                options: vec![],
                instructor_notes: Some(
                    "Full marks require mentioning ownership transfer.".to_string(),
                ),
                order: 3,
            },
        ],
        created_at: None,
        modified_at: None,
    }
}

/// A published quiz with two text questions (4 and 6 points) and nothing to
/// auto-grade. Passing score 50.
pub fn make_essay_quiz() -> Quiz {
    Quiz {
        id: "quiz-essay".to_string(),
        course_id: "course-1".to_string(),
        title: "Ownership essays".to_string(),
        description: None,
        status: QuizStatus::Published,
        passing_score: 50,
        max_attempts: 1,
        time_limit_minutes: None,
        questions: vec![
            Question {
                id: "q-essay-1".to_string(),
                prompt: "Describe the borrow checker's job.".to_string(),
                question_type: QuestionType::TextAnswer,
                points_worth: 4,
                options: vec![],
                instructor_notes: None,
                order: 1,
            },
            Question {
                id: "q-essay-2".to_string(),
                prompt: "When would you reach for interior mutability?".to_string(),
                question_type: QuestionType::TextAnswer,
                points_worth: 6,
                options: vec![],
                instructor_notes: None,
                order: 2,
            },
        ],
        created_at: None,
        modified_at: None,
    }
}

pub fn make_enrollment(id: &str, user_id: &str, course_id: &str) -> Enrollment {
    Enrollment {
        id: id.to_string(),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        status: EnrollmentStatus::Active,
        created_at: None,
        modified_at: None,
    }
}

pub fn choice_answer(question_id: &str, index: i32) -> AnswerInput {
    AnswerInput {
        question_id: question_id.to_string(),
        question_type: None,
        selected_option_index: Some(index),
        text_answer: None,
    }
}

pub fn text_answer(question_id: &str, text: &str) -> AnswerInput {
    AnswerInput {
        question_id: question_id.to_string(),
        question_type: None,
        selected_option_index: None,
        text_answer: Some(text.to_string()),
    }
}
