use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::{LmsError, Result};
use crate::models::ApiResponse;
use crate::models::progress::entities::LessonProgress;
use crate::models::progress::requests::RecordPositionRequest;
use crate::models::progress::responses::{EnrollmentProgressResponse, LessonProgressUpdate};
use crate::services::api_error_response;

use super::{LearningService, current_user_id, load_owned_enrollment};

/// 标记课时完成（幂等），返回重新计算后的进度
pub async fn handle_complete_lesson(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    lesson_id: i64,
) -> ActixResult<HttpResponse> {
    match complete_lesson(service, request, enrollment_id, lesson_id).await {
        Ok(update) => {
            tracing::debug!(
                "Lesson {} completed in enrollment {} ({}%)",
                lesson_id,
                enrollment_id,
                update.enrollment.progress
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(update, "Lesson completed")))
        }
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn complete_lesson(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    lesson_id: i64,
) -> Result<LessonProgressUpdate> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage.complete_lesson(enrollment_id, lesson_id).await
}

/// 记录视频播放位置
pub async fn handle_record_position(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    lesson_id: i64,
    body: RecordPositionRequest,
) -> ActixResult<HttpResponse> {
    match record_position(service, request, enrollment_id, lesson_id, &body).await {
        Ok(progress) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(progress, "Position saved")))
        }
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn record_position(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
    lesson_id: i64,
    body: &RecordPositionRequest,
) -> Result<LessonProgress> {
    body.validate()?;
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage
        .record_lesson_position(enrollment_id, lesson_id, body.seconds)
        .await
}

pub async fn handle_progress(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    match progress(service, request, enrollment_id).await {
        Ok(progress) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            progress,
            "Progress retrieved successfully",
        ))),
        Err(e) => Ok(api_error_response(&e)),
    }
}

async fn progress(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> Result<EnrollmentProgressResponse> {
    let storage = service.get_storage(request);
    let user_id = current_user_id(request)?;
    load_owned_enrollment(&storage, enrollment_id, user_id).await?;
    storage
        .get_enrollment_progress(enrollment_id)
        .await?
        .ok_or_else(|| LmsError::not_found(format!("Enrollment {enrollment_id} not found")))
}
