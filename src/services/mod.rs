pub mod attempt_service;
pub mod grading;

pub use attempt_service::{AttemptService, StartOutcome};
pub use grading::GradingService;
