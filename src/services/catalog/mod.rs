pub mod detail;
pub mod home;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::courses::requests::CourseCatalogQuery;
use crate::storage::Storage;

/// 公共页面：首页、课程目录、课程详情
pub struct CatalogService {
    storage: Option<Arc<dyn Storage>>,
}

impl CatalogService {
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

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    pub async fn home(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        home::handle_home(self, request).await
    }

    pub async fn list_courses(
        &self,
        request: &HttpRequest,
        query: CourseCatalogQuery,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_courses(self, request, query).await
    }

    pub async fn course_detail(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::handle_course_detail(self, request, course_id).await
    }
}
