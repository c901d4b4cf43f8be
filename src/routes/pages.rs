//! 页面路由：返回页面负载（组件名 + 属性 + 闪存消息）或带提示的重定向

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::courses::requests::CourseCatalogQuery;
use crate::models::users::entities::UserRole;
use crate::services::{CatalogService, DashboardService, EnrollmentService, LearningService};
use crate::utils::{SafeCourseId, SafeEnrollmentId};

static CATALOG_SERVICE: Lazy<CatalogService> = Lazy::new(CatalogService::new_lazy);
static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);
static LEARNING_SERVICE: Lazy<LearningService> = Lazy::new(LearningService::new_lazy);

pub async fn home(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.home(&req).await
}

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseCatalogQuery>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.list_courses(&req, query.into_inner()).await
}

pub async fn course_detail(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.course_detail(&req, course_id.0).await
}

pub async fn enroll(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.enroll(&req, course_id.0).await
}

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.redirect(&req).await
}

pub async fn student_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.student(&req).await
}

pub async fn learning_view(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.learning_view(&req, course_id.0).await
}

pub async fn certificate(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentId,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.certificate_page(&req, enrollment_id.0).await
}

pub async fn teacher_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.teacher(&req).await
}

pub async fn admin_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.admin(&req).await
}

// 配置路由
pub fn configure_page_routes(cfg: &mut web::ServiceConfig) {
    // 公共页面：登录可选
    cfg.service(
        web::resource("/")
            .wrap(RequireJWT::optional())
            .route(web::get().to(home)),
    )
    .service(
        web::resource("/courses")
            .wrap(RequireJWT::optional())
            .route(web::get().to(list_courses)),
    )
    .service(
        web::resource("/course/{course_id}")
            .wrap(RequireJWT::optional())
            .route(web::get().to(course_detail)),
    )
    // 未登录时由服务层跳转到登录页并给出选课专用提示
    .service(
        web::resource("/enroll/{course_id}")
            .wrap(RequireJWT::optional())
            .route(web::post().to(enroll)),
    )
    .service(
        web::resource("/dashboard")
            .wrap(RequireJWT::optional())
            .route(web::get().to(dashboard)),
    );

    // 角色仪表盘：角色不符时回到 /dashboard 重新分发
    cfg.service(
        web::scope("/student")
            .wrap(RequireJWT::redirect_to_login())
            .service(
                web::scope("")
                    .wrap(RequireRole::new(&UserRole::Student).redirect_to("/dashboard"))
                    .route("/dashboard", web::get().to(student_dashboard))
                    .route("/course/{course_id}", web::get().to(learning_view))
                    .route("/certificate/{enrollment_id}", web::get().to(certificate)),
            ),
    )
    .service(
        web::scope("/teacher")
            .wrap(RequireJWT::redirect_to_login())
            .service(
                web::scope("")
                    .wrap(
                        RequireRole::new_any(UserRole::teacher_roles()).redirect_to("/dashboard"),
                    )
                    .route("/dashboard", web::get().to(teacher_dashboard)),
            ),
    )
    .service(
        web::scope("/admin")
            .wrap(RequireJWT::redirect_to_login())
            .service(
                web::scope("")
                    .wrap(RequireRole::new_any(UserRole::admin_roles()).redirect_to("/dashboard"))
                    .route("/dashboard", web::get().to(admin_dashboard)),
            ),
    );
}
