use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::courses::requests::{CatalogFilter, CourseCatalogQuery};
use crate::models::courses::responses::{AppliedFilters, CatalogPage};
use crate::services::{page_error_redirect, render_page};

use super::CatalogService;

/// 课程目录；无法识别的筛选值直接忽略
pub async fn handle_list_courses(
    service: &CatalogService,
    request: &HttpRequest,
    query: CourseCatalogQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let filter = CatalogFilter::from(&query);
    let page_size = service.get_config().catalog.page_size;

    let courses = match storage.list_published_courses(&filter, page_size).await {
        Ok(courses) => courses,
        Err(e) => return Ok(page_error_redirect("/", &e)),
    };
    let categories = match storage.list_published_categories().await {
        Ok(categories) => categories,
        Err(e) => return Ok(page_error_redirect("/", &e)),
    };

    let page = CatalogPage {
        courses,
        categories,
        filters: AppliedFilters::from(&filter),
    };
    Ok(render_page(request, "Courses/Index", page))
}
