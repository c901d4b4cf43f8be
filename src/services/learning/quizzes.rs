use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::{LmsError, Result};
use crate::models::ApiResponse;
use crate::models::quizzes::entities::QuizAttempt;
use crate::models::quizzes::requests::SubmitQuizRequest;
use crate::models::quizzes::responses::{QuizForTaking, QuizSubmissionResponse};
use crate::services::api_error_response;

use super::{LearningService, current_user_id, load_owned_enrollment};

/// 作答用的测验，不含正确答案
pub async fn handle_get_quiz(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    match get_quiz(service, request, enrollment_id, quiz_id).await {
        Ok(quiz) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            quiz,
            "Quiz retrieved successfully",
        ))),
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn get_quiz(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    quiz_id: i64,
) -> Result<QuizForTaking> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage.get_quiz_for_taking(enrollment_id, quiz_id).await
}

/// 开始一次新的作答，不限制次数
pub async fn handle_start_attempt(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    match start_attempt(service, request, enrollment_id, quiz_id).await {
        Ok(attempt) => {
            tracing::debug!(
                "Quiz attempt {} started for quiz {} in enrollment {}",
                attempt.id,
                quiz_id,
                enrollment_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(attempt, "Quiz attempt started")))
        }
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn start_attempt(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    quiz_id: i64,
) -> Result<QuizAttempt> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage.start_quiz_attempt(enrollment_id, quiz_id).await
}

/// 提交答案并评分；每次作答只能提交一次
pub async fn handle_submit_attempt(
    service: &LearningService,
    request: &HttpRequest,
    attempt_id: i64,
    body: SubmitQuizRequest,
) -> ActixResult<HttpResponse> {
    match submit_attempt(service, request, attempt_id, body).await {
        Ok(result) => {
            let message = if result.attempt.is_passed {
                "Quiz passed"
            } else {
                "Quiz submitted"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, message)))
        }
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn submit_attempt(
    service: &LearningService,
    request: &HttpRequest,
    attempt_id: i64,
    body: SubmitQuizRequest,
) -> Result<QuizSubmissionResponse> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;

    let attempt = storage
        .get_quiz_attempt_by_id(attempt_id)
        .await?
        .ok_or_else(|| LmsError::not_found(format!("Quiz attempt {attempt_id} not found")))?;
    load_owned_enrollment(&storage, attempt.enrollment_id, user_id)
        .await
        .map_err(|e| hide_foreign_attempt(e, attempt_id))?;

    storage.submit_quiz_attempt(attempt_id, body.answers).await
}

// 他人的作答按不存在处理，其余错误原样返回
fn hide_foreign_attempt(err: LmsError, attempt_id: i64) -> LmsError {
    match err {
        LmsError::NotFound(_) => {
            LmsError::not_found(format!("Quiz attempt {attempt_id} not found"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_enrollment_hides_attempt() {
        let hidden = hide_foreign_attempt(LmsError::not_found("Enrollment 3 not found"), 9);
        assert!(matches!(hidden, LmsError::NotFound(_)));
        assert_eq!(hidden.message(), "Quiz attempt 9 not found");

        let db = hide_foreign_attempt(LmsError::database_operation("连接已断开"), 9);
        assert!(matches!(db, LmsError::DatabaseOperation(_)));
    }
}
