use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{db::Database, errors::{AppError, AppResult}, models::domain::QuizAttempt};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    /// Inserts a new attempt. A duplicate `(quiz_id, user_id, attempt_number)`
    /// surfaces as [`AppError::AlreadyExists`] so callers can re-read the
    /// attempt that won the race.
    async fn insert(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;

    async fn find_in_progress(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizAttempt>>;

    /// Counts attempts that consume the quiz's attempt allowance. In-progress
    /// attempts do not count until they are submitted.
    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<i64>;

    async fn latest_attempt_number(&self, user_id: &str, quiz_id: &str) -> AppResult<i16>;

    /// Replaces the stored attempt if and only if the stored `version` still
    /// matches. The returned attempt carries the bumped version; a mismatch
    /// surfaces as [`AppError::Conflict`].
    async fn update(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;

    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>>;

    async fn find_needing_grading(
        &self,
        quiz_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // Backs both attempt-number assignment and the one-in-flight rule;
        // concurrent starts collide here instead of double-inserting.
        let quiz_user_attempt_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "user_id": 1, "attempt_number": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("quiz_user_attempt_unique".to_string())
                    .build(),
            )
            .build();

        let user_quiz_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_quiz".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(quiz_user_attempt_index).await?;
        self.collection.create_index(user_quiz_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn insert(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Attempt {} already exists for this quiz and user",
                attempt.attempt_number
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_in_progress(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id,
                "status": "in_progress"
            })
            .await?;
        Ok(attempt)
    }

    async fn count_completed(&self, user_id: &str, quiz_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id,
                "status": { "$in": ["submitted", "graded"] }
            })
            .await?;
        Ok(count as i64)
    }

    async fn latest_attempt_number(&self, user_id: &str, quiz_id: &str) -> AppResult<i16> {
        let latest = self
            .collection
            .find(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id
            })
            .sort(doc! { "attempt_number": -1 })
            .limit(1)
            .await?
            .try_next()
            .await?;

        Ok(latest.map(|attempt| attempt.attempt_number).unwrap_or(0))
    }

    async fn update(&self, mut attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let expected_version = attempt.version;
        attempt.version += 1;
        attempt.modified_at = Some(Utc::now());

        let result = self
            .collection
            .replace_one(
                doc! { "id": &attempt.id, "version": expected_version },
                &attempt,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' was modified concurrently",
                attempt.id
            )));
        }

        Ok(attempt)
    }

    async fn find_by_user_and_quiz(
        &self,
        user_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id
            })
            .sort(doc! { "attempt_number": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn find_needing_grading(
        &self,
        quiz_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let filter = doc! {
            "quiz_id": quiz_id,
            "status": "submitted",
            "needs_grading": true
        };

        let total = self.collection.count_documents(filter.clone()).await?;

        // Oldest submissions first so nothing sits in the queue indefinitely
        let attempts = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "submitted_at": 1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }
}
