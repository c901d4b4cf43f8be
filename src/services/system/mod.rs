pub mod health;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    // 存活探针
    pub async fn health_check(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        health::handle_health_check(request).await
    }
}
