use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{LmsError, Result};
use crate::middlewares::RequireJWT;
use crate::models::FlashMessage;
use crate::models::certificates::responses::CertificatePage;
use crate::models::progress::responses::LearningViewPage;
use crate::models::users::entities::{User, UserRole};
use crate::services::render_page;
use crate::storage::Storage;
use crate::utils::flash::{redirect_to, redirect_with_flash};

use super::{LearningService, load_owned_enrollment};

/// 学习页：只对已选课的学生开放
pub async fn handle_learning_view(
    service: &LearningService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(redirect_to("/login"));
    };
    let storage = service.get_storage(request);

    match learning_view(&storage, &user, course_id).await {
        Ok(Some(page)) => Ok(render_page(request, "Student/CourseLearning", page)),
        Ok(None) => Ok(redirect_with_flash(
            &format!("/course/{course_id}"),
            FlashMessage::info("Enroll in this course to start learning."),
        )),
        Err(LmsError::NotFound(_)) => Ok(redirect_with_flash(
            "/courses",
            FlashMessage::error("Course not found."),
        )),
        Err(e) => {
            tracing::error!("Failed to load learning view of course {}: {}", course_id, e);
            Ok(redirect_with_flash(
                UserRole::Student.dashboard_path(),
                FlashMessage::error("Unable to load the course, please try again."),
            ))
        }
    }
}

async fn learning_view(
    storage: &Arc<dyn Storage>,
    user: &User,
    course_id: i64,
) -> Result<Option<LearningViewPage>> {
    let Some(enrollment) = storage
        .get_enrollment_by_student_and_course(user.id, course_id)
        .await?
    else {
        return Ok(None);
    };

    let tree = storage
        .get_course_tree(course_id, Some(user.id))
        .await?
        .ok_or_else(|| LmsError::not_found(format!("Course {course_id} not found")))?;
    let progress = storage
        .get_enrollment_progress(enrollment.id)
        .await?
        .ok_or_else(|| LmsError::not_found(format!("Enrollment {} not found", enrollment.id)))?;

    Ok(Some(LearningViewPage { tree, progress }))
}

/// 证书页：只能查看自己的证书
pub async fn handle_certificate_page(
    service: &LearningService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(redirect_to("/login"));
    };
    let storage = service.get_storage(request);
    let dashboard = UserRole::Student.dashboard_path();

    match certificate_page(&storage, &user, enrollment_id).await {
        Ok(Some(page)) => Ok(render_page(request, "Student/Certificate", page)),
        Ok(None) => Ok(redirect_with_flash(
            dashboard,
            FlashMessage::info("Complete the course to receive your certificate."),
        )),
        Err(LmsError::NotFound(_)) => Ok(redirect_with_flash(
            dashboard,
            FlashMessage::error("Certificate not found."),
        )),
        Err(e) => {
            tracing::error!(
                "Failed to load certificate of enrollment {}: {}",
                enrollment_id,
                e
            );
            Ok(redirect_with_flash(
                dashboard,
                FlashMessage::error("Unable to load the certificate, please try again."),
            ))
        }
    }
}

async fn certificate_page(
    storage: &Arc<dyn Storage>,
    user: &User,
    enrollment_id: i64,
) -> Result<Option<CertificatePage>> {
    let enrollment = load_owned_enrollment(storage, enrollment_id, user.id).await?;
    let Some(certificate) = storage.get_certificate_by_enrollment(enrollment_id).await? else {
        return Ok(None);
    };
    let course = storage
        .get_course_by_id(enrollment.course_id)
        .await?
        .ok_or_else(|| LmsError::not_found(format!("Course {} not found", enrollment.course_id)))?;

    Ok(Some(CertificatePage {
        certificate,
        course_id: course.id,
        course_title: course.title,
        student_name: user.name.clone(),
        completed_at: enrollment.completed_at,
    }))
}
