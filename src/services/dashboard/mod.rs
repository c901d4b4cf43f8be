pub mod admin;
pub mod student;
pub mod teacher;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::FlashMessage;
use crate::storage::Storage;
use crate::utils::flash::{redirect_to, redirect_with_flash};

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 按角色跳转到对应仪表盘，访客跳转到登录页
    pub async fn redirect(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        match RequireJWT::extract_user_role(request) {
            Some(role) => Ok(redirect_to(role.dashboard_path())),
            None => Ok(redirect_with_flash(
                "/login",
                FlashMessage::error("Please log in to continue."),
            )),
        }
    }

    pub async fn student(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::handle_student_dashboard(self, request).await
    }

    pub async fn teacher(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        teacher::handle_teacher_dashboard(self, request).await
    }

    pub async fn admin(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        admin::handle_admin_dashboard(self, request).await
    }
}
