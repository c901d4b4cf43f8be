//! 学习过程：学习页、课时进度、测验作答与证书
//!
//! 所有操作都以选课记录为边界，不属于当前学生的选课与作答一律视为不存在。

pub mod certificates;
pub mod lessons;
pub mod pages;
pub mod quizzes;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{LmsError, Result};
use crate::models::enrollments::entities::Enrollment;
use crate::models::progress::requests::RecordPositionRequest;
use crate::models::quizzes::requests::SubmitQuizRequest;
use crate::storage::Storage;

pub struct LearningService {
    storage: Option<Arc<dyn Storage>>,
}

impl LearningService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 学习页
    pub async fn learning_view(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        pages::handle_learning_view(self, request, course_id).await
    }

    // 证书页
    pub async fn certificate_page(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        pages::handle_certificate_page(self, request, enrollment_id).await
    }

    pub async fn complete_lesson(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        lesson_id: i64,
    ) -> ActixResult<HttpResponse> {
        lessons::handle_complete_lesson(self, request, enrollment_id, lesson_id).await
    }

    pub async fn record_position(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        lesson_id: i64,
        body: RecordPositionRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::handle_record_position(self, request, enrollment_id, lesson_id, body).await
    }

    pub async fn progress(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        lessons::handle_progress(self, request, enrollment_id).await
    }

    pub async fn get_quiz(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        quizzes::handle_get_quiz(self, request, enrollment_id, quiz_id).await
    }

    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        quizzes::handle_start_attempt(self, request, enrollment_id, quiz_id).await
    }

    pub async fn submit_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        body: SubmitQuizRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::handle_submit_attempt(self, request, attempt_id, body).await
    }

    pub async fn issue_certificate(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        certificates::handle_issue_certificate(self, request, enrollment_id).await
    }
}

/// 读取属于该学生的选课记录
pub(crate) async fn load_owned_enrollment(
    storage: &Arc<dyn Storage>,
    enrollment_id: i64,
    student_id: i64,
) -> Result<Enrollment> {
    storage
        .get_enrollment_by_id(enrollment_id)
        .await?
        .filter(|e| e.belongs_to(student_id))
        .ok_or_else(|| LmsError::not_found(format!("Enrollment {enrollment_id} not found")))
}

/// 当前登录用户 ID；路由都在 RequireJWT 之后，缺失时按未认证处理
pub(crate) fn current_user_id(request: &HttpRequest) -> Result<i64> {
    crate::middlewares::RequireJWT::extract_user_id(request)
        .ok_or_else(|| LmsError::not_authenticated("Authentication required"))
}
