use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::dashboard::responses::{HomePage, PlatformStats};
use crate::models::users::entities::UserRole;
use crate::services::{api_error_response, render_page};
use crate::storage::Storage;

use super::CatalogService;

pub async fn handle_home(
    service: &CatalogService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let featured_count = service.get_config().catalog.featured_count;

    let featured_courses = match storage.list_featured_courses(featured_count).await {
        Ok(courses) => courses,
        Err(e) => return Ok(api_error_response(&e)),
    };
    let stats = match platform_stats(&storage).await {
        Ok(stats) => stats,
        Err(e) => return Ok(api_error_response(&e)),
    };

    let page = HomePage {
        featured_courses,
        stats,
        user_role: RequireJWT::extract_user_role(request),
    };
    Ok(render_page(request, "Welcome", page))
}

/// 平台统计，首页与管理员仪表盘共用
pub(crate) async fn platform_stats(storage: &Arc<dyn Storage>) -> Result<PlatformStats> {
    Ok(PlatformStats {
        total_courses: storage.count_published_courses().await?,
        total_students: storage
            .count_active_users_by_role(UserRole::Student)
            .await?,
        total_teachers: storage
            .count_active_users_by_role(UserRole::Teacher)
            .await?,
        total_enrollments: storage.count_enrollments().await?,
    })
}
