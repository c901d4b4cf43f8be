pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod enrollments;
pub mod learning;
pub mod system;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use enrollments::EnrollmentService;
pub use learning::LearningService;
pub use system::SystemService;

use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use ts_rs::TS;

use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, FlashMessage, PageResponse};
use crate::utils::flash::{clear_flash_cookie, read_flash, redirect_with_flash};

/// 业务错误转为 JSON 响应，服务端错误只记录日志，客户端只看到通用提示
pub(crate) fn api_error_response(err: &LmsError) -> HttpResponse {
    let status = err.status_code();
    if err.is_client_error() {
        tracing::debug!("Request rejected: {}", err);
        HttpResponse::build(status).json(ApiResponse::error_empty(err.api_code(), err.message()))
    } else {
        tracing::error!("Request failed: {}", err);
        HttpResponse::build(status).json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Internal server error",
        ))
    }
}

/// 页面加载失败：记录日志后带提示重定向
pub(crate) fn page_error_redirect(location: &str, err: &LmsError) -> HttpResponse {
    tracing::error!("Failed to load page: {}", err);
    redirect_with_flash(
        location,
        FlashMessage::error("Something went wrong, please try again."),
    )
}

/// 页面负载：读取并清除闪存消息
pub(crate) fn render_page<T: TS + Serialize>(
    request: &HttpRequest,
    component: &str,
    props: T,
) -> HttpResponse {
    let flash = read_flash(request);
    let page = PageResponse {
        component: component.to_string(),
        props,
        flash: flash.clone(),
    };

    let mut builder = HttpResponse::Ok();
    if flash.is_some() {
        builder.cookie(clear_flash_cookie());
    }
    builder.json(ApiResponse::success(page, "OK"))
}
