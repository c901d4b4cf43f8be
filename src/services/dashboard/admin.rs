use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::dashboard::responses::AdminDashboard;
use crate::services::catalog::home::platform_stats;
use crate::services::{page_error_redirect, render_page};

use super::DashboardService;

pub async fn handle_admin_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let stats = match platform_stats(&storage).await {
        Ok(stats) => stats,
        Err(e) => return Ok(page_error_redirect("/", &e)),
    };
    let total_certificates = match storage.count_certificates().await {
        Ok(count) => count,
        Err(e) => return Ok(page_error_redirect("/", &e)),
    };

    Ok(render_page(
        request,
        "Admin/Dashboard",
        AdminDashboard {
            stats,
            total_certificates,
        },
    ))
}
