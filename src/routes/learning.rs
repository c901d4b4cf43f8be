use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::progress::requests::RecordPositionRequest;
use crate::models::quizzes::requests::SubmitQuizRequest;
use crate::models::users::entities::UserRole;
use crate::services::LearningService;
use crate::utils::{SafeAttemptId, SafeEnrollmentId, SafeLessonId, SafeQuizId};

// 懒加载的全局 LearningService 实例
static LEARNING_SERVICE: Lazy<LearningService> = Lazy::new(LearningService::new_lazy);

pub async fn complete_lesson(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
    lesson_id: SafeLessonId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .complete_lesson(&req, enrollment_id.0, lesson_id.0)
        .await
}

pub async fn record_position(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
    lesson_id: SafeLessonId,
    body: web::Json<RecordPositionRequest>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .record_position(&req, enrollment_id.0, lesson_id.0, body.into_inner())
        .await
}

pub async fn progress(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.progress(&req, enrollment_id.0).await
}

pub async fn get_quiz(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
    quiz_id: SafeQuizId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .get_quiz(&req, enrollment_id.0, quiz_id.0)
        .await
}

pub async fn start_attempt(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
    quiz_id: SafeQuizId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .start_attempt(&req, enrollment_id.0, quiz_id.0)
        .await
}

pub async fn submit_attempt(
    req: HttpRequest,
    attempt_id: SafeAttemptId,
    body: web::Json<SubmitQuizRequest>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .submit_attempt(&req, attempt_id.0, body.into_inner())
        .await
}

pub async fn issue_certificate(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .issue_certificate(&req, enrollment_id.0)
        .await
}

// 配置路由
pub fn configure_learning_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments/{enrollment_id}")
            .wrap(RequireJWT::required())
            .service(
                web::scope("")
                    .wrap(RequireRole::new(&UserRole::Student))
                    .route(
                        "/lessons/{lesson_id}/complete",
                        web::post().to(complete_lesson),
                    )
                    .route(
                        "/lessons/{lesson_id}/position",
                        web::put().to(record_position),
                    )
                    .route("/progress", web::get().to(progress))
                    .route("/quizzes/{quiz_id}", web::get().to(get_quiz))
                    .route("/quizzes/{quiz_id}/attempts", web::post().to(start_attempt))
                    .route("/certificate", web::post().to(issue_certificate)),
            ),
    )
    .service(
        web::scope("/api/v1/quiz-attempts")
            .wrap(RequireJWT::required())
            .service(
                web::scope("")
                    .wrap(RequireRole::new(&UserRole::Student))
                    .route("/{attempt_id}/submit", web::post().to(submit_attempt)),
            ),
    );
}
