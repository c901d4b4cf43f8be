use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Serialize;

use crate::models::AppStartTime;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<i64>,
}

/// 不访问数据库，只要进程能处理请求就返回 ok
pub async fn handle_health_check(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let now = chrono::Utc::now();
    let uptime_seconds = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| now.signed_duration_since(start.start_datetime).num_seconds());

    Ok(HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        timestamp: now,
        uptime_seconds,
    }))
}
