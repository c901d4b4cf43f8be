use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::dashboard::responses::TeacherDashboard;
use crate::services::{page_error_redirect, render_page};
use crate::utils::flash::redirect_to;

use super::DashboardService;

pub async fn handle_teacher_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(teacher_id) = RequireJWT::extract_user_id(request) else {
        return Ok(redirect_to("/login"));
    };

    match service
        .get_storage(request)
        .list_teacher_courses(teacher_id)
        .await
    {
        Ok(courses) => Ok(render_page(
            request,
            "Teacher/Dashboard",
            TeacherDashboard { courses },
        )),
        Err(e) => Ok(page_error_redirect("/", &e)),
    }
}
