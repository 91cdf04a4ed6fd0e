pub mod attempt_handler;
pub mod health_handler;

pub use attempt_handler::{
    get_attempt, grade_answer, grading_queue, list_my_attempts, save_answers,
    set_overall_feedback, start_attempt, submit_attempt,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};
