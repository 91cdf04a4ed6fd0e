use crate::models::domain::question::{Question, QuestionOption, QuestionType};
use crate::models::domain::{Enrollment, EnrollmentStatus, Quiz, QuizStatus};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    fn option(text: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            text: text.to_string(),
            is_correct,
        }
    }

    /// A published quiz with two choice questions (2 and 3 points, correct
    /// options at index 0 and 1) and one 5-point text question. Passing
    /// score 70, three attempts allowed.
    pub fn mixed_quiz() -> Quiz {
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
                        option("Ownership and borrowing", true),
                        option("Garbage collection", false),
                        option("Manual malloc and free", false),
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
                        option("Box<T>", false),
                        option("Rc<T>", true),
                        option("&mut T", false),
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
                    instructor_notes: Some("Full marks require mentioning ownership transfer.".to_string()),
                    order: 3,
                },
            ],
            created_at: None,
            modified_at: None,
        }
    }

    /// The same quiz before publication.
    pub fn draft_quiz() -> Quiz {
        Quiz {
            status: QuizStatus::Draft,
            ..mixed_quiz()
        }
    }

    /// An active enrollment with id "enr-1".
    pub fn active_enrollment(user_id: &str, course_id: &str) -> Enrollment {
        Enrollment {
            id: "enr-1".to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            status: EnrollmentStatus::Active,
            created_at: None,
            modified_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::question::QuestionType;

    #[test]
    fn test_fixtures_mixed_quiz() {
        let quiz = mixed_quiz();
        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.total_points(), 10);
        assert_eq!(
            quiz.question("q-text-1").unwrap().question_type,
            QuestionType::TextAnswer
        );
    }

    #[test]
    fn test_fixtures_active_enrollment() {
        let enrollment = active_enrollment("student-1", "course-1");
        assert!(enrollment.is_active());
        assert_eq!(enrollment.user_id, "student-1");
    }
}
