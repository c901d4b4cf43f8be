pub mod auth;

pub mod pages;

pub mod learning;

pub mod system;

pub use auth::configure_auth_routes;
pub use learning::configure_learning_routes;
pub use pages::configure_page_routes;
pub use system::configure_system_routes;

use actix_web::web;

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_system_routes)
        .configure(configure_auth_routes)
        .configure(configure_learning_routes)
        .configure(configure_page_routes);
}
