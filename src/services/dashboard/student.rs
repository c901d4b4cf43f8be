use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::dashboard::responses::{StudentDashboard, StudentStats};
use crate::services::{page_error_redirect, render_page};
use crate::utils::flash::redirect_to;

use super::DashboardService;

pub async fn handle_student_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(student_id) = RequireJWT::extract_user_id(request) else {
        return Ok(redirect_to("/login"));
    };

    match service
        .get_storage(request)
        .list_student_enrollments(student_id)
        .await
    {
        Ok(enrollments) => {
            let stats = StudentStats::from_items(&enrollments);
            Ok(render_page(
                request,
                "Student/Dashboard",
                StudentDashboard { enrollments, stats },
            ))
        }
        Err(e) => Ok(page_error_redirect("/", &e)),
    }
}
