pub mod attempt_repository;
pub mod enrollment_repository;
pub mod quiz_repository;

pub use attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use enrollment_repository::{EnrollmentRepository, MongoEnrollmentRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
