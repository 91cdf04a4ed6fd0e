pub mod attempt;
pub mod enrollment;
pub mod question;
pub mod quiz;
pub use attempt::{AttemptAnswer, AttemptStatus, QuizAttempt};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use question::{Question, QuestionOption, QuestionType};
pub use quiz::{Quiz, QuizStatus};
