use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::LmsError;
use crate::middlewares::RequireJWT;
use crate::models::FlashMessage;
use crate::models::enrollments::requests::CreateEnrollmentRequest;
use crate::models::users::entities::UserRole;
use crate::utils::flash::redirect_with_flash;

use super::EnrollmentService;

const LOGIN_REQUIRED: &str = "You must be logged in as a student to enroll in courses.";

/// 选课的每种结果都映射为一次重定向
///
/// | 结果 | 跳转 |
/// |------|------|
/// | 成功 | /student/dashboard |
/// | 已选过 | /course/{id}（提示） |
/// | 非学生 | /course/{id}（错误） |
/// | 未登录 | /login |
/// | 课程不存在或未发布 | /courses |
pub async fn handle_enroll(
    service: &EnrollmentService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let course_page = format!("/course/{course_id}");

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(redirect_with_flash("/login", FlashMessage::error(LOGIN_REQUIRED)));
    };

    let storage = service.get_storage(request);
    let course_title = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) if course.is_published() => course.title,
        Ok(_) => {
            return Ok(redirect_with_flash(
                "/courses",
                FlashMessage::error("Course not found."),
            ));
        }
        Err(e) => {
            tracing::error!("Failed to load course {} for enrollment: {}", course_id, e);
            return Ok(redirect_with_flash(
                &course_page,
                FlashMessage::error("Enrollment failed, please try again."),
            ));
        }
    };

    let result = storage
        .enroll_student(CreateEnrollmentRequest {
            student_id: user.id,
            course_id,
            currency: service.get_config().payment.currency.clone(),
        })
        .await;

    let response = match result {
        Ok(_) => redirect_with_flash(
            UserRole::Student.dashboard_path(),
            FlashMessage::success(format!("Successfully enrolled in {course_title}!")),
        ),
        Err(LmsError::AlreadyEnrolled(_)) => redirect_with_flash(
            &course_page,
            FlashMessage::info("You are already enrolled in this course."),
        ),
        Err(LmsError::WrongRole(_)) => {
            tracing::info!(
                "User {} (role: {}) tried to enroll in course {}",
                user.id,
                user.role,
                course_id
            );
            redirect_with_flash(
                &course_page,
                FlashMessage::error("Only students can enroll in courses."),
            )
        }
        Err(LmsError::NotAuthenticated(_)) => {
            redirect_with_flash("/login", FlashMessage::error(LOGIN_REQUIRED))
        }
        Err(LmsError::NotFound(_)) => {
            redirect_with_flash("/courses", FlashMessage::error("Course not found."))
        }
        Err(e) => {
            tracing::error!(
                "Enrollment of user {} in course {} failed: {}",
                user.id,
                course_id,
                e
            );
            redirect_with_flash(
                &course_page,
                FlashMessage::error("Enrollment failed, please try again."),
            )
        }
    };
    Ok(response)
}
