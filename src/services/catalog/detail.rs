use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::FlashMessage;
use crate::models::courses::responses::{CourseDetailPage, EnrollmentState};
use crate::services::render_page;
use crate::utils::flash::redirect_with_flash;

use super::CatalogService;

/// 课程详情：草稿课程只对作者可见，其他人视为不存在
pub async fn handle_course_detail(
    service: &CatalogService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let viewer = RequireJWT::extract_user_claims(request);

    let tree = match storage
        .get_course_tree(course_id, viewer.as_ref().map(|u| u.id))
        .await
    {
        Ok(Some(tree)) => tree,
        Ok(None) => {
            return Ok(redirect_with_flash(
                "/courses",
                FlashMessage::error("Course not found."),
            ));
        }
        Err(e) => {
            tracing::error!("Failed to load course {}: {}", course_id, e);
            return Ok(redirect_with_flash(
                "/courses",
                FlashMessage::error("Unable to load the course, please try again."),
            ));
        }
    };

    let is_student = viewer.as_ref().is_some_and(|u| u.is_student());
    let enrollment = match viewer.as_ref().filter(|u| u.is_student()) {
        Some(student) => {
            match storage
                .get_enrollment_by_student_and_course(student.id, course_id)
                .await
            {
                Ok(enrollment) => enrollment,
                Err(e) => {
                    // 选课状态读取失败时按未选课展示
                    tracing::error!(
                        "Failed to load enrollment of student {} in course {}: {}",
                        student.id,
                        course_id,
                        e
                    );
                    None
                }
            }
        }
        None => None,
    };

    let enrollment_state = enrollment.map(|e| EnrollmentState {
        enrollment_id: e.id,
        progress: e.progress,
        is_completed: e.is_completed,
    });
    let is_enrolled = enrollment_state.is_some();
    let can_enroll = tree.course.is_published() && !is_enrolled && (viewer.is_none() || is_student);

    let page = CourseDetailPage {
        enroll_label: tree.course.enroll_action_label().to_string(),
        tree,
        is_enrolled,
        enrollment: enrollment_state,
        can_enroll,
    };
    Ok(render_page(request, "Courses/Show", page))
}
