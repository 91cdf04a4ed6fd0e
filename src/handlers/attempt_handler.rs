use actix_web::{get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_instructor, require_owner_or_instructor, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{
        GradeAnswerRequest, OverallFeedbackRequest, PaginationParams, SaveAnswersRequest,
        StartAttemptRequest, SubmitAttemptRequest,
    },
    models::dto::response::{
        AttemptDto, AttemptSummaryDto, GradingQueueResponse, MessageResponse,
        StartAttemptResponse, SubmitResultDto,
    },
};

/// Starts a new attempt or returns the caller's in-progress one. Resuming
/// answers 200, a fresh attempt 201.
#[post("/quizzes/{quiz_id}/attempts")]
async fn start_attempt(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<StartAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let outcome = state
        .attempt_service
        .start_attempt(&quiz_id, &auth.0.sub, &request.enrollment_id)
        .await?;

    let resumed = outcome.resumed;
    let response = StartAttemptResponse {
        attempt: AttemptDto::from(outcome.attempt),
        resumed,
    };

    if resumed {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::Created().json(response))
    }
}

#[put("/quizzes/{quiz_id}/attempts/{attempt_id}/answers")]
async fn save_answers(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SaveAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (quiz_id, attempt_id) = path.into_inner();

    state
        .attempt_service
        .record_answers(&attempt_id, &auth.0.sub, &quiz_id, &request.answers)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Answers saved".to_string(),
    }))
}

#[post("/quizzes/{quiz_id}/attempts/{attempt_id}/submit")]
async fn submit_attempt(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SubmitAttemptRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (quiz_id, attempt_id) = path.into_inner();

    let attempt = state
        .attempt_service
        .submit_attempt(
            &attempt_id,
            &auth.0.sub,
            &quiz_id,
            request.time_spent_seconds,
            request.forced,
        )
        .await?;

    Ok(HttpResponse::Ok().json(SubmitResultDto::from(attempt)))
}

/// The caller's own attempt history for a quiz, newest first.
#[get("/quizzes/{quiz_id}/attempts")]
async fn list_my_attempts(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .attempt_service
        .list_attempts(&auth.0.sub, &quiz_id)
        .await?;

    let summaries: Vec<AttemptSummaryDto> =
        attempts.into_iter().map(AttemptSummaryDto::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}

/// Submitted attempts still waiting on manual grading, oldest first.
#[get("/quizzes/{quiz_id}/grading-queue")]
async fn grading_queue(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_instructor(&auth.0)?;
    query.validate()?;

    let pagination = query.into_inner();
    let (attempts, total) = state
        .attempt_service
        .grading_queue(&quiz_id, pagination.offset(), pagination.limit())
        .await?;

    let response = GradingQueueResponse {
        attempts: attempts.into_iter().map(AttemptSummaryDto::from).collect(),
        total,
    };
    Ok(HttpResponse::Ok().json(response))
}

#[get("/attempts/{attempt_id}")]
async fn get_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state.attempt_service.get_attempt(&attempt_id).await?;
    require_owner_or_instructor(&auth.0, &attempt.user_id)?;

    Ok(HttpResponse::Ok().json(AttemptDto::from(attempt)))
}

#[put("/attempts/{attempt_id}/questions/{question_id}/grade")]
async fn grade_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<GradeAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_instructor(&auth.0)?;
    request.validate()?;
    let (attempt_id, question_id) = path.into_inner();
    let request = request.into_inner();

    let attempt = state
        .attempt_service
        .grade_answer(
            &attempt_id,
            &question_id,
            request.points_earned,
            request.feedback,
            &auth.0.sub,
        )
        .await?;

    Ok(HttpResponse::Ok().json(AttemptDto::from(attempt)))
}

#[post("/attempts/{attempt_id}/feedback")]
async fn set_overall_feedback(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    request: web::Json<OverallFeedbackRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_instructor(&auth.0)?;
    request.validate()?;

    let attempt = state
        .attempt_service
        .set_overall_feedback(&attempt_id, &request.feedback, &auth.0.sub)
        .await?;

    Ok(HttpResponse::Ok().json(AttemptDto::from(attempt)))
}
